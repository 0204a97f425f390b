//! Exponential smoothing of the hand centroid and radius.

use glam::Vec3;

use crate::config::SmoothingConfig;
use crate::hand::HandPose;
use crate::pose::NormalizedHand;

#[derive(Clone, Debug)]
pub struct PoseSmoother {
    config: SmoothingConfig,
    initialized: bool,
}

impl PoseSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            initialized: false,
        }
    }

    /// Fold a new raw hand into `pose`.
    ///
    /// The first sample after a reset is taken as-is with zero velocity.
    /// Smoothed centroid moves under the dead zone keep the previous centroid
    /// and report zero velocity.
    pub fn update(&mut self, pose: &mut HandPose, raw: &NormalizedHand, now_ms: f64) {
        if raw.is_empty() {
            self.reset(pose);
            return;
        }

        if !self.initialized || !pose.present {
            pose.centroid = raw.centroid;
            pose.velocity = Vec3::ZERO;
            pose.radius = raw.radius;
            pose.palm_size = raw.palm_size;
            self.initialized = true;
        } else {
            let previous = pose.centroid;
            let smoothed = previous.lerp(raw.centroid, self.config.centroid_alpha);
            if smoothed.distance(previous) < self.config.dead_zone {
                pose.velocity = Vec3::ZERO;
            } else {
                pose.centroid = smoothed;
                pose.velocity = smoothed - previous;
            }
            pose.radius += (raw.radius - pose.radius) * self.config.radius_alpha;
            pose.palm_size += (raw.palm_size - pose.palm_size) * self.config.radius_alpha;
        }

        pose.present = true;
        pose.last_update_ms = now_ms;
    }

    pub fn reset(&mut self, pose: &mut HandPose) {
        self.initialized = false;
        pose.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn raw_at(c: Vec3, radius: f32) -> NormalizedHand {
        NormalizedHand {
            points: vec![c; 21],
            centroid: c,
            radius,
            palm_size: radius * 0.5,
        }
    }

    #[test]
    fn test_first_sample_taken_directly() {
        let mut s = PoseSmoother::new(SmoothingConfig::default());
        let mut pose = HandPose::absent();
        s.update(&mut pose, &raw_at(Vec3::new(1.0, 2.0, 0.0), 1.0), 10.0);
        assert!(pose.present);
        assert_eq!(pose.centroid, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(pose.velocity, Vec3::ZERO);
        assert_eq!(pose.last_update_ms, 10.0);
    }

    #[test]
    fn test_lerp_and_velocity() {
        let cfg = SmoothingConfig::default();
        let mut s = PoseSmoother::new(cfg.clone());
        let mut pose = HandPose::absent();
        s.update(&mut pose, &raw_at(Vec3::ZERO, 1.0), 0.0);
        s.update(&mut pose, &raw_at(Vec3::new(1.0, 0.0, 0.0), 2.0), 16.0);

        assert_relative_eq!(pose.centroid.x, cfg.centroid_alpha);
        assert_relative_eq!(pose.velocity.x, cfg.centroid_alpha);
        assert_relative_eq!(pose.radius, 1.0 + cfg.radius_alpha);
    }

    #[test]
    fn test_dead_zone_suppresses_jitter() {
        let mut s = PoseSmoother::new(SmoothingConfig::default());
        let mut pose = HandPose::absent();
        s.update(&mut pose, &raw_at(Vec3::ZERO, 1.0), 0.0);
        s.update(&mut pose, &raw_at(Vec3::new(0.001, 0.0, 0.0), 1.0), 16.0);

        assert_eq!(pose.centroid, Vec3::ZERO);
        assert_eq!(pose.velocity, Vec3::ZERO);
        assert_eq!(pose.last_update_ms, 16.0);
    }

    #[test]
    fn test_empty_resets() {
        let mut s = PoseSmoother::new(SmoothingConfig::default());
        let mut pose = HandPose::absent();
        s.update(&mut pose, &raw_at(Vec3::ONE, 1.0), 0.0);
        s.update(&mut pose, &NormalizedHand::default(), 16.0);
        assert!(!pose.present);
        assert_eq!(pose.velocity, Vec3::ZERO);

        // Re-acquired hand starts fresh rather than lerping from the old centroid
        s.update(&mut pose, &raw_at(Vec3::new(3.0, 0.0, 0.0), 1.0), 32.0);
        assert_eq!(pose.centroid, Vec3::new(3.0, 0.0, 0.0));
    }
}
