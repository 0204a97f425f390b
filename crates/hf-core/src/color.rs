//! Per-shape palettes and the periodic hue cycle.
//!
//! This is the external writer of base colors: every rewrite goes through
//! `ParticleField::set_base_colors`, which advances the version token the
//! occlusion pass watches.

use crate::config::ColorConfig;
use crate::constants::PHI;
use crate::gesture::ShapeKind;
use crate::particles::ParticleField;

/// Base hue (in turns) for each shape; `None` is the idle palette.
pub fn palette_hue(shape: Option<ShapeKind>) -> f32 {
    match shape {
        None => 0.60,
        Some(ShapeKind::Sphere) => 0.52,
        Some(ShapeKind::Ring) => 0.07,
        Some(ShapeKind::Star) => 0.13,
        Some(ShapeKind::Heart) => 0.94,
        Some(ShapeKind::Text) => 0.76,
    }
}

/// HSL → linear RGB, all components in [0, 1]. Hue wraps.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(1.0);
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    if s == 0.0 {
        return [l, l, l];
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[derive(Clone, Debug)]
pub struct ColorCycler {
    config: ColorConfig,
    shape: Option<ShapeKind>,
    hue_offset: f32,
    last_cycle_ms: Option<f64>,
}

impl ColorCycler {
    pub fn new(config: ColorConfig) -> Self {
        Self {
            config,
            shape: None,
            hue_offset: 0.0,
            last_cycle_ms: None,
        }
    }

    /// Switch palettes for a newly committed shape and repaint immediately.
    pub fn retarget(&mut self, field: &mut ParticleField, shape: Option<ShapeKind>, now_ms: f64) {
        self.shape = shape;
        self.last_cycle_ms = Some(now_ms);
        self.repaint(field);
    }

    /// Advance the hue when a full period has passed. Returns whether the
    /// base colors were rewritten.
    pub fn update(&mut self, field: &mut ParticleField, now_ms: f64) -> bool {
        if !self.config.cycle {
            return false;
        }
        let Some(last) = self.last_cycle_ms else {
            self.last_cycle_ms = Some(now_ms);
            return false;
        };
        if now_ms - last < self.config.cycle_period_ms {
            return false;
        }
        self.hue_offset = (self.hue_offset + self.config.hue_step).rem_euclid(1.0);
        self.last_cycle_ms = Some(now_ms);
        self.repaint(field);
        true
    }

    fn repaint(&self, field: &mut ParticleField) {
        let hue = palette_hue(self.shape) + self.hue_offset;
        let (s, l) = (self.config.saturation, self.config.lightness);
        field.set_base_colors(|i| {
            // Spread each particle a little around the palette hue
            let spread = ((i as f32 * PHI).fract() - 0.5) * 0.12;
            hsl_to_rgb(hue + spread, s, l)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hsl_primaries() {
        let red = hsl_to_rgb(0.0, 1.0, 0.5);
        assert_relative_eq!(red[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(red[1], 0.0, epsilon = 1e-5);
        assert_relative_eq!(red[2], 0.0, epsilon = 1e-5);

        let green = hsl_to_rgb(1.0 / 3.0, 1.0, 0.5);
        assert_relative_eq!(green[1], 1.0, epsilon = 1e-5);

        assert_eq!(hsl_to_rgb(0.3, 0.0, 0.4), [0.4, 0.4, 0.4]);
    }

    #[test]
    fn test_retarget_bumps_version() {
        let mut field = ParticleField::new(10);
        let mut cycler = ColorCycler::new(ColorConfig::default());
        let v = field.color_version();
        cycler.retarget(&mut field, Some(ShapeKind::Heart), 0.0);
        assert_eq!(field.color_version(), v + 1);
        assert!(field.base_color().iter().all(|c| c.iter().all(|x| (0.0..=1.0).contains(x))));
    }

    #[test]
    fn test_cycle_period() {
        let cfg = ColorConfig::default();
        let period = cfg.cycle_period_ms;
        let mut field = ParticleField::new(4);
        let mut cycler = ColorCycler::new(cfg);
        cycler.retarget(&mut field, None, 0.0);
        let v = field.color_version();

        assert!(!cycler.update(&mut field, period - 1.0));
        assert!(cycler.update(&mut field, period));
        assert_eq!(field.color_version(), v + 1);
    }

    #[test]
    fn test_cycle_disabled() {
        let cfg = ColorConfig {
            cycle: false,
            ..ColorConfig::default()
        };
        let mut field = ParticleField::new(4);
        let mut cycler = ColorCycler::new(cfg);
        cycler.retarget(&mut field, None, 0.0);
        assert!(!cycler.update(&mut field, 1e9));
    }
}
