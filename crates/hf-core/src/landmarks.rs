//! Hand landmark types in the estimator's output format.
//!
//! Coordinates are normalized: `x`, `y` in [0, 1] with `y` growing downward,
//! `z` a depth relative to the wrist (smaller is closer to the camera).

use serde::{Deserialize, Serialize};

use crate::constants::LANDMARK_COUNT;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (MCP, PIP, TIP) for index, middle, ring, pinky.
pub const FINGER_JOINTS: [(usize, usize, usize); 4] = [
    (INDEX_MCP, INDEX_PIP, INDEX_TIP),
    (MIDDLE_MCP, MIDDLE_PIP, MIDDLE_TIP),
    (RING_MCP, RING_PIP, RING_TIP),
    (PINKY_MCP, PINKY_PIP, PINKY_TIP),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One estimator result: the first detected hand, or none.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp_ms: f64,
    pub landmarks: Option<Vec<Landmark>>,
}

impl LandmarkFrame {
    pub fn hand(timestamp_ms: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks: Some(landmarks),
        }
    }

    pub fn empty(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            landmarks: None,
        }
    }

    /// Landmarks usable by the pipeline: exactly 21, all finite.
    pub fn valid_landmarks(&self) -> Option<&[Landmark]> {
        self.landmarks
            .as_deref()
            .filter(|l| l.len() == LANDMARK_COUNT && l.iter().all(|p| p.is_finite()))
    }
}

/// Which digits are extended, thumb first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digits {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl Digits {
    pub const OPEN: Self = Self {
        thumb: true,
        index: true,
        middle: true,
        ring: true,
        pinky: true,
    };
    pub const FIST: Self = Self {
        thumb: false,
        index: false,
        middle: false,
        ring: false,
        pinky: false,
    };
    pub const VICTORY: Self = Self {
        index: true,
        middle: true,
        ..Self::FIST
    };
    pub const POINT: Self = Self {
        index: true,
        ..Self::FIST
    };
    pub const THUMB_UP: Self = Self {
        thumb: true,
        ..Self::FIST
    };

    pub fn fingers(self) -> [bool; 4] {
        [self.index, self.middle, self.ring, self.pinky]
    }

    pub fn count(self) -> usize {
        usize::from(self.thumb) + self.fingers().iter().filter(|&&e| e).count()
    }
}

/// Build an upright right-hand pose with the given digits extended,
/// wrist at (`cx`, `cy`) in normalized image space.
///
/// Used by the scripted estimator and as a test fixture.
pub fn synthetic_hand(digits: Digits, cx: f32, cy: f32) -> Vec<Landmark> {
    let at = |dx: f32, dy: f32| Landmark::new(cx + dx, cy + dy, 0.0);
    let mut points = vec![Landmark::default(); LANDMARK_COUNT];
    points[WRIST] = at(0.0, 0.0);

    if digits.thumb {
        points[THUMB_CMC] = at(-0.08, -0.05);
        points[THUMB_MCP] = at(-0.14, -0.12);
        points[THUMB_IP] = at(-0.17, -0.20);
        points[THUMB_TIP] = at(-0.19, -0.28);
    } else {
        points[THUMB_CMC] = at(-0.08, -0.05);
        points[THUMB_MCP] = at(-0.10, -0.12);
        points[THUMB_IP] = at(-0.05, -0.14);
        points[THUMB_TIP] = at(0.00, -0.10);
    }

    let offsets = [-0.06, -0.02, 0.02, 0.06];
    for (((mcp, pip, tip), extended), dx) in FINGER_JOINTS
        .iter()
        .zip(digits.fingers())
        .zip(offsets)
    {
        let dip = pip + 1;
        points[*mcp] = at(dx, -0.20);
        if extended {
            points[*pip] = at(dx, -0.30);
            points[dip] = at(dx, -0.35);
            points[*tip] = at(dx, -0.40);
        } else {
            points[*pip] = at(dx, -0.25);
            points[dip] = at(dx, -0.18);
            points[*tip] = at(dx, -0.12);
        }
    }
    points
}
