//! Motion-run shot segmentation.
//!
//! Turns the full motion-score sequence into candidate shot segments:
//! threshold selection, run grouping by gap tolerance, duration filtering,
//! boundary padding, and two fallbacks for degenerate inputs. Emitted
//! segments are ordered by start frame; overlap between padded segments is
//! not prevented.

use swish_models::ShotSegment;
use tracing::{debug, info};

use crate::config::SegmentationConfig;

/// Detects shot segments in a motion-score sequence.
pub struct SegmentDetector {
    config: SegmentationConfig,
}

impl SegmentDetector {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Detect segments over a score sequence index-aligned with frames.
    pub fn detect(&self, scores: &[f64], fps: f64) -> Vec<ShotSegment> {
        let total_frames = scores.len() as u64;
        if total_frames == 0 {
            return Vec::new();
        }

        let mut high = self.select_high_motion(scores, self.config.motion_threshold);

        if high.is_empty() {
            // Fallback A: no clear motion anywhere, treat the whole video
            // as one shot.
            info!("No high-motion frames; emitting whole video as one segment");
            return vec![ShotSegment::from_frames(0, total_frames - 1, fps)];
        }

        if high.len() < self.config.min_high_motion_frames {
            let max_score = scores.iter().cloned().fold(f64::MIN, f64::max);
            let adaptive = max_score * 0.5;
            debug!(
                selected = high.len(),
                adaptive_threshold = adaptive,
                "Too few high-motion frames; re-selecting with adaptive threshold"
            );
            high = self.select_high_motion(scores, adaptive);
        }

        let runs = self.group_runs(&high, fps);
        let kept = self.filter_and_pad(&runs, fps, total_frames);

        if kept.is_empty() {
            // Fallback B: fixed window centered on the strongest frame.
            return vec![self.peak_window(scores, fps, total_frames)];
        }

        debug!(segments = kept.len(), "Segment detection complete");
        kept
    }

    fn select_high_motion(&self, scores: &[f64], threshold: f64) -> Vec<u64> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, &s)| s > threshold)
            .map(|(i, _)| i as u64)
            .collect()
    }

    /// Group sorted high-motion indices into runs. A gap larger than the
    /// tolerance starts a new run.
    fn group_runs(&self, high: &[u64], fps: f64) -> Vec<(u64, u64)> {
        let mut runs = Vec::new();
        let Some(&first) = high.first() else {
            return runs;
        };

        let gap_frames = self.config.gap_tolerance * fps;
        let mut start = first;
        let mut prev = first;

        for &idx in &high[1..] {
            if (idx - prev) as f64 > gap_frames {
                runs.push((start, prev));
                start = idx;
            }
            prev = idx;
        }
        runs.push((start, prev));
        runs
    }

    /// Keep runs whose frame span lies within the duration bounds, then pad
    /// both ends and clamp to the video.
    fn filter_and_pad(&self, runs: &[(u64, u64)], fps: f64, total_frames: u64) -> Vec<ShotSegment> {
        let min_frames = (self.config.min_shot_duration * fps) as u64;
        let max_frames = (self.config.max_shot_duration * fps) as u64;
        let pad = (self.config.padding * fps) as u64;

        runs.iter()
            .filter(|(start, end)| {
                let span = end - start;
                span >= min_frames && span <= max_frames
            })
            .map(|(start, end)| {
                let padded_start = start.saturating_sub(pad);
                let padded_end = (end + pad).min(total_frames - 1);
                ShotSegment::from_frames(padded_start, padded_end, fps)
            })
            .collect()
    }

    /// Fallback B: a fixed 3-second window centered on the frame with the
    /// globally maximum score (first such frame on ties), clamped to the
    /// video bounds.
    fn peak_window(&self, scores: &[f64], fps: f64, total_frames: u64) -> ShotSegment {
        let mut peak = 0usize;
        for (i, &s) in scores.iter().enumerate() {
            if s > scores[peak] {
                peak = i;
            }
        }

        let half = (1.5 * fps) as u64;
        let start = (peak as u64).saturating_sub(half);
        let end = (peak as u64 + half).min(total_frames - 1);
        info!(
            peak_frame = peak,
            start_frame = start,
            end_frame = end,
            "No run passed the duration filter; emitting peak-centered window"
        );
        ShotSegment::from_frames(start, end, fps)
    }
}
