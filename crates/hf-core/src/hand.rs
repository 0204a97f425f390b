use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smoothed hand state shared read-only with physics, occlusion and the HUD.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandPose {
    pub centroid: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
    pub palm_size: f32,
    pub present: bool,
    pub last_update_ms: f64,
}

impl Default for HandPose {
    fn default() -> Self {
        Self::absent()
    }
}

impl HandPose {
    pub fn absent() -> Self {
        Self {
            centroid: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius: 0.0,
            palm_size: 0.0,
            present: false,
            last_update_ms: 0.0,
        }
    }

    /// Drop to absent, keeping the last update time for diagnostics.
    pub fn clear(&mut self) {
        let last = self.last_update_ms;
        *self = Self::absent();
        self.last_update_ms = last;
    }

    /// Whether a present hand has gone without updates for longer than `timeout_ms`.
    pub fn is_stale(&self, now_ms: f64, timeout_ms: f64) -> bool {
        self.present && now_ms - self.last_update_ms > timeout_ms
    }

    pub fn view(&self) -> HandView {
        HandView {
            present: self.present,
            centroid: self.centroid.to_array(),
            velocity: self.velocity.to_array(),
            radius: self.radius,
            last_update_ms: self.last_update_ms,
        }
    }
}

/// Plain-data copy of a [`HandPose`] for snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandView {
    pub present: bool,
    pub centroid: [f32; 3],
    pub velocity: [f32; 3],
    pub radius: f32,
    pub last_update_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staleness() {
        let mut hand = HandPose {
            present: true,
            last_update_ms: 1_000.0,
            ..HandPose::absent()
        };
        assert!(!hand.is_stale(1_800.0, 800.0));
        assert!(hand.is_stale(1_800.5, 800.0));

        hand.clear();
        assert!(!hand.present);
        assert!(!hand.is_stale(10_000.0, 800.0));
        assert_eq!(hand.last_update_ms, 1_000.0);
    }
}
