//! Landmark → world-space conversion.

use glam::Vec3;

use crate::config::WorldConfig;
use crate::constants::RADIUS_MARGIN;
use crate::landmarks::{Landmark, MIDDLE_MCP, WRIST};

/// One hand in world space. An empty `points` list means "no hand".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedHand {
    pub points: Vec<Vec3>,
    pub centroid: Vec3,
    /// Max distance from the centroid, with safety margin
    pub radius: f32,
    /// Wrist to middle-finger MCP
    pub palm_size: f32,
}

impl NormalizedHand {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Map one landmark into world space.
pub fn to_world(l: Landmark, world: &WorldConfig) -> Vec3 {
    Vec3::new(
        (0.5 - l.x) * world.width,
        (0.5 - l.y) * world.height,
        l.z * world.depth_scale,
    )
}

/// Convert a hand's landmarks to world space with centroid and bounding radius.
///
/// Fails soft: an empty slice yields an empty hand with a zero centroid.
pub fn normalize(landmarks: &[Landmark], world: &WorldConfig) -> NormalizedHand {
    if landmarks.is_empty() {
        return NormalizedHand::default();
    }

    let points: Vec<Vec3> = landmarks.iter().map(|&l| to_world(l, world)).collect();
    let centroid = points.iter().copied().sum::<Vec3>() / points.len() as f32;
    let radius = points
        .iter()
        .map(|p| p.distance(centroid))
        .fold(0.0_f32, f32::max)
        * RADIUS_MARGIN;
    let palm_size = match (points.get(WRIST), points.get(MIDDLE_MCP)) {
        (Some(w), Some(m)) => w.distance(*m),
        _ => 0.0,
    };

    NormalizedHand {
        points,
        centroid,
        radius,
        palm_size,
    }
}
