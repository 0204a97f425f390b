//! Depth occlusion: dim particles sitting behind the hand as seen from the camera.
//!
//! The camera looks down −z, so a particle is hidden by the hand when its z is
//! smaller than the hand centroid's. Displayed colors are always rebuilt from
//! the stored base colors; nothing is divided back out.

use glam::{Vec2, Vec3};

use crate::config::OcclusionConfig;
use crate::constants::{EPSILON, OCCLUSION_DEPTH_RAMP, OCCLUSION_LATERAL_REACH};
use crate::hand::HandPose;
use crate::particles::ParticleField;

#[derive(Clone, Debug)]
pub struct OcclusionPass {
    config: OcclusionConfig,
    applied_version: Option<u64>,
}

fn scaled(c: [f32; 3], k: f32) -> [f32; 3] {
    [c[0] * k, c[1] * k, c[2] * k]
}

impl OcclusionPass {
    pub fn new(config: OcclusionConfig) -> Self {
        Self {
            config,
            applied_version: None,
        }
    }

    /// Fade multiplier for a particle at `p`: 1 when unoccluded, never below
    /// `1 - max_fade`.
    pub fn fade_for(&self, p: Vec3, hand: &HandPose) -> f32 {
        if !hand.present {
            return 1.0;
        }
        let depth = hand.centroid.z - p.z;
        if depth <= 0.0 {
            return 1.0;
        }
        let lateral = Vec2::new(p.x - hand.centroid.x, p.y - hand.centroid.y).length();
        if lateral > OCCLUSION_LATERAL_REACH * hand.radius.max(EPSILON) {
            return 1.0;
        }

        // Past one radius the ramp is already zero; clamp keeps the fade in range.
        let radial = (1.0 - lateral / hand.radius.max(EPSILON)).clamp(0.0, 1.0);
        let depth_factor = (depth / (OCCLUSION_DEPTH_RAMP * hand.radius).max(EPSILON)).min(1.0);
        let max_fade = self.config.max_fade;
        1.0 - (radial * depth_factor * max_fade).min(max_fade)
    }

    /// Update occlusion factors and displayed colors. Returns whether the color
    /// buffer was marked dirty.
    ///
    /// A new color version means the bases were rewritten: every factor is
    /// reset to 1 and every displayed color restored to its base first.
    pub fn apply(&mut self, field: &mut ParticleField, hand: &HandPose) -> bool {
        let version = field.color_version();
        let mut dirty = false;
        if self.applied_version != Some(version) {
            self.reset(field);
            self.applied_version = Some(version);
            dirty = true;
        }

        let parts = field.occlusion_parts();
        for (i, p) in parts.position.chunks_exact(3).enumerate() {
            let fade = self.fade_for(Vec3::from_slice(p), hand);
            let old = parts.occlusion[i];
            let changed = (fade - old).abs() > self.config.epsilon;
            if changed || (fade == 1.0 && old != 1.0) {
                parts.occlusion[i] = fade;
                parts.color[i] = scaled(parts.base_color[i], fade);
                dirty |= changed;
            }
        }

        if dirty {
            field.mark_color_dirty();
        }
        dirty
    }

    /// Restore every particle to its base color with factor 1.
    pub fn reset(&mut self, field: &mut ParticleField) {
        let parts = field.occlusion_parts();
        parts.occlusion.fill(1.0);
        parts.color.copy_from_slice(parts.base_color);
        field.mark_color_dirty();
    }
}
