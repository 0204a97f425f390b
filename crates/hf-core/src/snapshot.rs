//! Read-only view of the simulation for HUD/debug collaborators.

use serde::{Deserialize, Serialize};

use crate::gesture::ShapeKind;
use crate::hand::HandView;
use crate::scene::SceneView;

/// Exponential moving average of frame intervals.
#[derive(Clone, Debug, Default)]
pub struct FrameTimer {
    last_ms: Option<f64>,
    avg_frame_ms: f64,
    ticks: u64,
}

impl FrameTimer {
    const SMOOTHING: f64 = 0.1;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) {
        if let Some(last) = self.last_ms {
            let dt = (now_ms - last).max(0.0);
            self.avg_frame_ms = if self.ticks <= 1 {
                dt
            } else {
                self.avg_frame_ms + (dt - self.avg_frame_ms) * Self::SMOOTHING
            };
        }
        self.last_ms = Some(now_ms);
        self.ticks += 1;
    }

    pub fn avg_frame_ms(&self) -> f64 {
        self.avg_frame_ms
    }

    pub fn fps(&self) -> f64 {
        if self.avg_frame_ms > 0.0 {
            1_000.0 / self.avg_frame_ms
        } else {
            0.0
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HudSnapshot {
    pub hand: HandView,
    pub shape: Option<ShapeKind>,
    /// Trailing run of identical raw labels
    pub stability: usize,
    pub particle_count: usize,
    pub frame_ms: f64,
    pub fps: f64,
    pub ticks: u64,
    pub explosions: u64,
    pub dynamic_radius: f32,
    pub scene: SceneView,
}
