//! Target generators, one per [`ShapeKind`].
//!
//! Each generator is a pure function of the particle count, the shape config
//! and the RNG. Sphere and ring use no randomness; the flat shapes draw a
//! bounded z jitter so they read as volumes rather than sheets.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use rand::Rng;

use crate::config::ShapeConfig;
use crate::constants::{GOLDEN_ANGLE, PHI};
use crate::font::rasterize;
use crate::gesture::ShapeKind;

/// Generate `count` target positions for `kind`.
pub fn generate(kind: ShapeKind, count: usize, cfg: &ShapeConfig, rng: &mut impl Rng) -> Vec<Vec3> {
    match kind {
        ShapeKind::Sphere => sphere(count, cfg.sphere_radius),
        ShapeKind::Ring => torus(count, cfg.ring_major, cfg.ring_minor),
        ShapeKind::Star => star(count, cfg, rng),
        ShapeKind::Heart => heart(count, cfg, rng),
        ShapeKind::Text => text(count, cfg, rng),
    }
}

/// Write targets for `kind` into a flat `[x, y, z, ...]` buffer of length 3N.
pub fn fill_targets(kind: ShapeKind, target: &mut [f32], cfg: &ShapeConfig, rng: &mut impl Rng) {
    let points = generate(kind, target.len() / 3, cfg, rng);
    for (chunk, p) in target.chunks_exact_mut(3).zip(points) {
        p.write_to_slice(chunk);
    }
}

fn jitter(rng: &mut impl Rng, half_range: f32) -> f32 {
    if half_range > 0.0 {
        symmetric(rng, half_range)
    } else {
        0.0
    }
}

/// Uniform sample in `[-half_range, half_range)`, without range construction
/// that rejects huge spans.
pub(crate) fn symmetric(rng: &mut impl Rng, half_range: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * half_range
}

/// Low-discrepancy area fill in (0, 1]; every third point sits on the outline.
fn fill_fraction(i: usize) -> f32 {
    if i % 3 == 0 {
        1.0
    } else {
        ((i as f32 * PHI).fract()).sqrt().max(0.05)
    }
}

/// Fibonacci lattice: equal-area points on a sphere.
pub fn sphere(count: usize, radius: f32) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let y = 1.0 - 2.0 * (i as f32 + 0.5) / n;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * i as f32;
            Vec3::new(ring * theta.cos(), y, ring * theta.sin()) * radius
        })
        .collect()
}

/// Torus facing the camera: `u` runs around the ring, `v` around the tube.
pub fn torus(count: usize, major: f32, minor: f32) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let u = TAU * i as f32 / n;
            let v = GOLDEN_ANGLE * i as f32;
            let r = major + minor * v.cos();
            Vec3::new(r * u.cos(), r * u.sin(), minor * v.sin())
        })
        .collect()
}

/// Radially modulated polar curve `r = base (1 + 0.5 cos kθ)`, one point up.
pub fn star(count: usize, cfg: &ShapeConfig, rng: &mut impl Rng) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    let k = cfg.star_points.max(2) as f32;
    (0..count)
        .map(|i| {
            let theta = TAU * i as f32 / n;
            let r = cfg.star_radius * (1.0 + 0.5 * (k * (theta - FRAC_PI_2)).cos()) / 1.5;
            let r = r * fill_fraction(i);
            Vec3::new(
                r * theta.cos(),
                r * theta.sin(),
                jitter(rng, cfg.depth_jitter),
            )
        })
        .collect()
}

/// Classic parametric heart: `x = 16 sin³t`, `y = 13 cos t − 5 cos 2t − 2 cos 3t − cos 4t`.
pub fn heart(count: usize, cfg: &ShapeConfig, rng: &mut impl Rng) -> Vec<Vec3> {
    let n = count.max(1) as f32;
    (0..count)
        .map(|i| {
            let t = TAU * i as f32 / n;
            let x = 16.0 * t.sin().powi(3);
            // Shift so the curve's vertical extent is centered on the origin
            let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos()
                + 2.5;
            let s = cfg.heart_scale * fill_fraction(i);
            Vec3::new(x * s, y * s, jitter(rng, cfg.depth_jitter))
        })
        .collect()
}

/// Lit pixels of the configured string, centered and scaled to world units.
///
/// More pixels than particles: evenly strided. Fewer: wrapped around with a
/// sub-pixel offset on repeats. No pixels at all: every target collapses to a
/// single default point at the origin.
pub fn text(count: usize, cfg: &ShapeConfig, rng: &mut impl Rng) -> Vec<Vec3> {
    let bitmap = rasterize(&cfg.text, cfg.text_raster_scale);
    let pixel = cfg.text_pixel / cfg.text_raster_scale.max(1) as f32;
    let half_w = bitmap.width as f32 * 0.5;
    let half_h = bitmap.height as f32 * 0.5;

    let mut points: Vec<Vec3> = bitmap
        .foreground()
        .into_iter()
        .map(|(x, y)| Vec3::new((x as f32 + 0.5 - half_w) * pixel, (half_h - y as f32 - 0.5) * pixel, 0.0))
        .collect();
    if points.is_empty() {
        points.push(Vec3::ZERO);
    }

    let available = points.len();
    (0..count)
        .map(|i| {
            let (base, wrapped) = if available >= count {
                (points[i * available / count.max(1)], false)
            } else {
                (points[i % available], i >= available)
            };
            let spread = if wrapped && available > 1 { pixel * 0.5 } else { 0.0 };
            Vec3::new(
                base.x + jitter(rng, spread),
                base.y + jitter(rng, spread),
                jitter(rng, cfg.depth_jitter),
            )
        })
        .collect()
}
