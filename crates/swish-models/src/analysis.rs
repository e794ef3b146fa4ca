//! Per-shot analysis report models.
//!
//! The report is recomputed from the extracted segment's own frames, not
//! reused from the whole-video segmentation pass.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Summary statistics over a sequence of per-frame motion scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct MotionStats {
    /// Maximum observed score.
    pub max: f64,
    /// Mean score.
    pub avg: f64,
    /// Population variance of the scores.
    pub variance: f64,
}

impl MotionStats {
    /// Compute stats over a score sequence. Empty input yields all zeros.
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }
        let max = scores.iter().cloned().fold(f64::MIN, f64::max);
        let avg = scores.iter().sum::<f64>() / scores.len() as f64;
        let variance =
            scores.iter().map(|s| (s - avg) * (s - avg)).sum::<f64>() / scores.len() as f64;
        Self { max, avg, variance }
    }
}

/// Analysis of one extracted shot segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Number of frames in the extracted segment.
    pub frame_count: u64,
    /// Duration in seconds (`frame_count / fps`).
    pub duration: f64,
    /// Resolution as `"{width}x{height}"`.
    pub resolution: String,
    /// Frame rate of the segment.
    pub fps: f64,
    /// Motion statistics recomputed over the segment's frames.
    pub motion_analysis: MotionStats,
}
