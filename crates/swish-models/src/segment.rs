//! Shot segment boundaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A candidate shot attempt: a frame range plus derived timestamps.
///
/// Invariant: `start_frame <= end_frame` and the timestamps are derived
/// exactly as `frame / fps`. Segments are immutable once emitted by the
/// detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShotSegment {
    /// First frame of the segment (inclusive).
    pub start_frame: u64,
    /// Last frame of the segment (inclusive).
    pub end_frame: u64,
    /// Start time in seconds (`start_frame / fps`).
    pub start_time: f64,
    /// End time in seconds (`end_frame / fps`).
    pub end_time: f64,
    /// Duration in seconds (`(end_frame - start_frame) / fps`).
    pub duration: f64,
}

impl ShotSegment {
    /// Build a segment from frame bounds, deriving timestamps from fps.
    pub fn from_frames(start_frame: u64, end_frame: u64, fps: f64) -> Self {
        Self {
            start_frame,
            end_frame,
            start_time: start_frame as f64 / fps,
            end_time: end_frame as f64 / fps,
            duration: (end_frame - start_frame) as f64 / fps,
        }
    }

    /// Number of frames covered, both endpoints inclusive.
    pub fn frame_count(&self) -> u64 {
        self.end_frame - self.start_frame + 1
    }

    /// Check the segment bounds against the source frame count.
    pub fn is_valid(&self, total_frames: u64) -> bool {
        self.start_frame <= self.end_frame && self.end_frame < total_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_derived_exactly_from_frames() {
        let seg = ShotSegment::from_frames(105, 195, 30.0);
        assert_eq!(seg.start_time, 105.0 / 30.0);
        assert_eq!(seg.end_time, 195.0 / 30.0);
        assert_eq!(seg.duration, 3.0);
        assert_eq!(seg.frame_count(), 91);
    }

    #[test]
    fn validity_requires_end_within_source() {
        let seg = ShotSegment::from_frames(0, 299, 30.0);
        assert!(seg.is_valid(300));
        assert!(!seg.is_valid(299));
    }
}
