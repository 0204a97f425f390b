//! Stateless hand-shape classification from one frame of landmarks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    EPSILON, LANDMARK_COUNT, PIP_TO_MCP_RATIO, THUMB_EXTENSION_RATIO, TIP_TO_PIP_RATIO,
};
use crate::landmarks::{Digits, FINGER_JOINTS, Landmark, THUMB_IP, THUMB_MCP, THUMB_TIP, WRIST};

/// Target shape a committed gesture selects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Sphere,
    Ring,
    Star,
    Heart,
    Text,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Sphere,
        ShapeKind::Ring,
        ShapeKind::Star,
        ShapeKind::Heart,
        ShapeKind::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Ring => "ring",
            ShapeKind::Star => "star",
            ShapeKind::Heart => "heart",
            ShapeKind::Text => "text",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShapeKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown shape '{s}'"))
    }
}

fn ratio(num: f32, den: f32) -> f32 {
    num / den.max(EPSILON)
}

/// Which digits are extended in this frame.
///
/// Fingers: the tip must reach well past the PIP joint and the PIP must not be
/// folded back toward the wrist. Thumb: long enough relative to the palm and
/// its tip above both the IP and MCP joints (image y grows downward).
pub fn extended_digits(landmarks: &[Landmark]) -> Option<Digits> {
    if landmarks.len() != LANDMARK_COUNT {
        return None;
    }
    let wrist = landmarks[WRIST];

    let finger = |(mcp, pip, tip): (usize, usize, usize)| {
        let to_tip = wrist.distance(landmarks[tip]);
        let to_pip = wrist.distance(landmarks[pip]);
        let to_mcp = wrist.distance(landmarks[mcp]);
        ratio(to_tip, to_pip) > TIP_TO_PIP_RATIO && ratio(to_pip, to_mcp) > PIP_TO_MCP_RATIO
    };

    let thumb_tip = landmarks[THUMB_TIP];
    let thumb_ip = landmarks[THUMB_IP];
    let thumb_mcp = landmarks[THUMB_MCP];
    let thumb = ratio(thumb_mcp.distance(thumb_tip), wrist.distance(thumb_mcp))
        > THUMB_EXTENSION_RATIO
        && thumb_tip.y < thumb_ip.y
        && thumb_tip.y < thumb_mcp.y;

    let [index, middle, ring, pinky] = FINGER_JOINTS.map(finger);
    Some(Digits {
        thumb,
        index,
        middle,
        ring,
        pinky,
    })
}

/// Label selection in fixed priority order; the first match wins.
pub fn label_for(d: Digits) -> Option<ShapeKind> {
    let others_closed = !d.thumb && !d.ring && !d.pinky;
    if d.index && d.middle && others_closed {
        Some(ShapeKind::Text)
    } else if d.index && !d.middle && others_closed {
        Some(ShapeKind::Star)
    } else if d == Digits::THUMB_UP {
        Some(ShapeKind::Heart)
    } else if d.count() == 5 {
        Some(ShapeKind::Sphere)
    } else if d.count() == 0 {
        Some(ShapeKind::Ring)
    } else {
        None
    }
}

/// Classify one frame. Malformed input yields no label.
pub fn classify(landmarks: &[Landmark]) -> Option<ShapeKind> {
    extended_digits(landmarks).and_then(label_for)
}
