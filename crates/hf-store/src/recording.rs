//! Landmark recordings: one JSON object per line.
//!
//! ```text
//! {"timestampMs":0.0,"landmarks":[{"x":0.5,"y":0.8,"z":0.0}, ...]}
//! {"timestampMs":33.3,"landmarks":null}
//! {"timestampMs":66.6,"multiHandLandmarks":[[{"x":0.5,"y":0.8,"z":0.0}, ...]]}
//! ```
//!
//! `multiHandLandmarks` is the raw estimator output shape; only the first
//! hand is kept. Blank lines are skipped. Timestamps must not decrease.

use std::fs;
use std::io::Write;
use std::path::Path;

use hf_core::{Landmark, LandmarkFrame};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireFrame {
    timestamp_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    landmarks: Option<Vec<Landmark>>,
    #[serde(default, skip_serializing)]
    multi_hand_landmarks: Option<Vec<Vec<Landmark>>>,
}

impl WireFrame {
    fn into_frame(self) -> LandmarkFrame {
        let landmarks = self.landmarks.or_else(|| {
            self.multi_hand_landmarks
                .and_then(|hands| hands.into_iter().next())
        });
        LandmarkFrame {
            timestamp_ms: self.timestamp_ms,
            landmarks,
        }
    }
}

/// Parse a JSONL recording from a string.
pub fn parse_recording(text: &str) -> Result<Vec<LandmarkFrame>> {
    let mut frames: Vec<LandmarkFrame> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let wire: WireFrame = serde_json::from_str(line).map_err(|source| StoreError::Json {
            line: idx + 1,
            source,
        })?;
        if !wire.timestamp_ms.is_finite() {
            return Err(StoreError::InvalidData(format!(
                "line {}: timestamp is not finite",
                idx + 1
            )));
        }
        if let Some(prev) = frames.last()
            && wire.timestamp_ms < prev.timestamp_ms
        {
            return Err(StoreError::InvalidData(format!(
                "line {}: timestamp {} goes backwards from {}",
                idx + 1,
                wire.timestamp_ms,
                prev.timestamp_ms
            )));
        }
        frames.push(wire.into_frame());
    }
    Ok(frames)
}

/// Read a JSONL recording from disk.
pub fn read_recording(path: &Path) -> Result<Vec<LandmarkFrame>> {
    let text = fs::read_to_string(path).map_err(|e| {
        StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
    })?;
    let frames = parse_recording(&text)?;
    let with_hand = frames.iter().filter(|f| f.landmarks.is_some()).count();
    tracing::debug!(
        "read {} frames ({} with a hand) from {}",
        frames.len(),
        with_hand,
        path.display()
    );
    Ok(frames)
}

/// Serialize frames as JSONL, one line per frame.
pub fn render_recording(frames: &[LandmarkFrame]) -> Result<String> {
    let mut out = String::new();
    for frame in frames {
        let wire = WireFrame {
            timestamp_ms: frame.timestamp_ms,
            landmarks: frame.landmarks.clone(),
            multi_hand_landmarks: None,
        };
        let line = serde_json::to_string(&wire)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write frames to `path`, creating parent directories as needed.
pub fn write_recording(path: &Path, frames: &[LandmarkFrame]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let body = render_recording(frames)?;
    let mut file = fs::File::create(path).map_err(|e| {
        StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
    })?;
    file.write_all(body.as_bytes())?;
    tracing::debug!("wrote {} frames to {}", frames.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hf_core::{Digits, synthetic_hand};

    fn point_json(n: usize) -> String {
        let pts: Vec<String> = (0..n)
            .map(|i| format!(r#"{{"x":0.{i:02},"y":0.5,"z":0.0}}"#))
            .collect();
        format!("[{}]", pts.join(","))
    }

    #[test]
    fn test_parse_single_hand_and_empty() {
        let text = format!(
            "{{\"timestampMs\":0,\"landmarks\":{}}}\n\n{{\"timestampMs\":33.5,\"landmarks\":null}}\n",
            point_json(21)
        );
        let frames = parse_recording(&text).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].landmarks.as_ref().unwrap().len(), 21);
        assert!(frames[0].valid_landmarks().is_some());
        assert_eq!(frames[1].timestamp_ms, 33.5);
        assert!(frames[1].landmarks.is_none());
    }

    #[test]
    fn test_multi_hand_keeps_first() {
        let text = format!(
            "{{\"timestampMs\":10,\"multiHandLandmarks\":[{},{}]}}",
            point_json(21),
            point_json(5)
        );
        let frames = parse_recording(&text).unwrap();
        assert_eq!(frames[0].landmarks.as_ref().unwrap().len(), 21);
    }

    #[test]
    fn test_missing_hand_fields_mean_no_hand() {
        let frames = parse_recording(r#"{"timestampMs":5}"#).unwrap();
        assert!(frames[0].landmarks.is_none());
        let frames = parse_recording(r#"{"timestampMs":5,"multiHandLandmarks":[]}"#).unwrap();
        assert!(frames[0].landmarks.is_none());
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let text = "{\"timestampMs\":0}\n{\"timestampMs\":\n";
        match parse_recording(text).unwrap_err() {
            StoreError::Json { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_backwards_timestamp_rejected() {
        let text = "{\"timestampMs\":50}\n{\"timestampMs\":10}\n";
        let err = parse_recording(text).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn test_render_then_parse_preserves_frames() {
        let frames = vec![
            LandmarkFrame::hand(0.0, synthetic_hand(Digits::OPEN, 0.5, 0.8)),
            LandmarkFrame::empty(33.0),
            LandmarkFrame::hand(66.0, synthetic_hand(Digits::FIST, 0.4, 0.7)),
        ];
        let text = render_recording(&frames).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("timestampMs"));
        assert_eq!(parse_recording(&text).unwrap(), frames);
    }
}
