//! Tracking records and the final standardization output.
//!
//! A `TrackingRecord` is the structured document persisted per segment:
//! pose, hand and ball trajectories keyed by frame index. `ShotRecord` is
//! the per-shot entry of the pipeline output consumed by the upload
//! service; its field names are the wire contract.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisReport;
use crate::point::PixelPoint;
use crate::segment::ShotSegment;

/// Pose landmarks logged for one frame: both wrists and both shoulders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PoseSample {
    pub left_wrist: PixelPoint,
    pub right_wrist: PixelPoint,
    pub left_shoulder: PixelPoint,
    pub right_shoulder: PixelPoint,
}

/// One entry of the ball trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrajectoryEntry {
    /// Frame index within the source video.
    pub frame: u64,
    /// Tracked position in pixel coordinates.
    pub point: PixelPoint,
}

/// Per-segment trajectory logs, keyed by frame index.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TrackingRecord {
    /// Pose sample per frame where pose landmarks were available.
    pub pose: BTreeMap<u64, PoseSample>,
    /// Palm/wrist position per detected hand, per frame.
    pub hands: BTreeMap<u64, Vec<PixelPoint>>,
    /// Ball trajectory, bounded to the most recent entries by the tracker.
    pub ball: Vec<TrajectoryEntry>,
}

impl TrackingRecord {
    /// True if no trajectory contains any data.
    pub fn is_empty(&self) -> bool {
        self.pose.is_empty() && self.hands.is_empty() && self.ball.is_empty()
    }
}

/// Paths of the key-frame stills saved next to the shot artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct KeyFramePaths {
    pub start: PathBuf,
    pub middle: PathBuf,
    pub end: PathBuf,
}

/// One successfully processed shot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ShotRecord {
    /// Identifier formatted `shot_{index:03}`.
    pub shot_id: String,
    /// The segment this shot was extracted from.
    pub segment_info: ShotSegment,
    /// Path of the annotated shot video.
    pub video_path: PathBuf,
    /// Path of the tracking record JSON document.
    pub tracking_path: PathBuf,
    /// Analysis recomputed over the extracted segment.
    pub analysis: AnalysisReport,
    /// Key-frame stills, when the segment contained frames.
    pub key_frames: Option<KeyFramePaths>,
    /// Creation time of this record.
    pub timestamp: DateTime<Utc>,
}

impl ShotRecord {
    /// Format a shot identifier for the given index (`shot_000`, ...).
    pub fn shot_id_for(index: usize) -> String {
        format!("shot_{index:03}")
    }
}

/// The assembled output for one standardized video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StandardizeReport {
    /// Path of the source video.
    pub original_video: PathBuf,
    /// Number of successfully produced shots.
    pub total_shots: usize,
    /// Ordered shot records. Empty is a legal, non-error outcome.
    pub shots: Vec<ShotRecord>,
    /// Completion time of the run.
    pub timestamp: DateTime<Utc>,
}

impl StandardizeReport {
    /// Assemble a report from an ordered shot list.
    pub fn new(original_video: impl Into<PathBuf>, shots: Vec<ShotRecord>) -> Self {
        Self {
            original_video: original_video.into(),
            total_shots: shots.len(),
            shots,
            timestamp: Utc::now(),
        }
    }

    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_ids_are_zero_padded() {
        assert_eq!(ShotRecord::shot_id_for(0), "shot_000");
        assert_eq!(ShotRecord::shot_id_for(12), "shot_012");
        assert_eq!(ShotRecord::shot_id_for(123), "shot_123");
    }

    #[test]
    fn tracking_record_round_trips_through_json() {
        let mut record = TrackingRecord::default();
        record.hands.insert(7, vec![PixelPoint::new(10.0, 20.0)]);
        record.ball.push(TrajectoryEntry {
            frame: 7,
            point: PixelPoint::new(30.0, 40.0),
        });

        let json = serde_json::to_string(&record).unwrap();
        let parsed: TrackingRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.hands[&7], record.hands[&7]);
        assert_eq!(parsed.ball[0].point.x, 30.0);
        assert!(parsed.pose.is_empty());
    }

    #[test]
    fn report_counts_shots() {
        let report = StandardizeReport::new("video.mp4", Vec::new());
        assert_eq!(report.total_shots, 0);
        assert!(report.shots.is_empty());
    }
}
