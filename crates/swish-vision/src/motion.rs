//! Blended per-frame motion scoring.
//!
//! Each frame after the first is compared to the previous smoothed frame.
//! Three normalized signals are blended into one scalar:
//! mean absolute difference, standard deviation of the difference, and edge
//! density of the current frame. The first frame always scores 0.

use image::RgbImage;
use tracing::debug;

use crate::error::VisionResult;
use crate::imgops;
use crate::source::FrameSource;

/// Gaussian sigma equivalent to a 21-px smoothing kernel, chosen to
/// suppress sensor noise before differencing.
const BLUR_SIGMA: f32 = 3.5;

/// Blend weights: mean diff, diff std, edge density.
const WEIGHT_MEAN: f64 = 0.4;
const WEIGHT_STD: f64 = 0.4;
const WEIGHT_EDGE: f64 = 0.2;

/// Stateful frame-to-frame motion scorer.
///
/// Feed frames in order; the scorer keeps only the previous smoothed
/// grayscale frame, never whole frame history.
pub struct MotionScorer {
    prev_smoothed: Option<image::GrayImage>,
}

impl MotionScorer {
    pub fn new() -> Self {
        Self { prev_smoothed: None }
    }

    /// Score one frame against its predecessor. Returns 0.0 for the first
    /// frame ingested.
    pub fn ingest(&mut self, frame: &RgbImage) -> f64 {
        let gray = image::imageops::grayscale(frame);
        let smoothed = imageproc::filter::gaussian_blur_f32(&gray, BLUR_SIGMA);

        let score = match &self.prev_smoothed {
            None => 0.0,
            Some(prev) => {
                let stats = imgops::diff_stats(prev, &smoothed);
                let edge = imgops::edge_density(&gray);
                WEIGHT_MEAN * (stats.mean / 255.0)
                    + WEIGHT_STD * (stats.std / 255.0)
                    + WEIGHT_EDGE * edge
            }
        };

        self.prev_smoothed = Some(smoothed);
        score
    }
}

impl Default for MotionScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one full scoring pass over a source, from frame 0 to end of stream.
///
/// Frames are discarded immediately after scoring; only the scalar sequence
/// is retained. The result is index-aligned with frame indices.
pub fn score_video(source: &mut dyn FrameSource) -> VisionResult<Vec<f64>> {
    let frame_count = source.info().frame_count;
    let mut scorer = MotionScorer::new();
    let mut scores = Vec::with_capacity(frame_count as usize);

    source.seek(0)?;
    while let Some(frame) = source.next_frame()? {
        scores.push(scorer.ingest(&frame.pixels));
    }

    debug!(frames = scores.len(), "Motion scoring pass complete");
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use image::Rgb;

    fn flat(level: u8) -> RgbImage {
        RgbImage::from_pixel(32, 32, Rgb([level, level, level]))
    }

    #[test]
    fn first_frame_scores_zero() {
        let mut scorer = MotionScorer::new();
        assert_eq!(scorer.ingest(&flat(200)), 0.0);
    }

    #[test]
    fn identical_frames_score_zero() {
        let mut scorer = MotionScorer::new();
        scorer.ingest(&flat(100));
        assert_eq!(scorer.ingest(&flat(100)), 0.0);
    }

    #[test]
    fn large_change_scores_high_and_bounded() {
        let mut scorer = MotionScorer::new();
        scorer.ingest(&flat(0));
        let score = scorer.ingest(&flat(255));
        // Uniform 255-level shift: mean signal saturates, std and edges stay 0.
        assert!(score >= WEIGHT_MEAN - 1e-6, "score = {score}");
        assert!(score <= 1.0);
    }

    #[test]
    fn score_pass_is_index_aligned_and_nonnegative() {
        let frames = vec![flat(0), flat(0), flat(255), flat(255)];
        let mut source = MemorySource::new(frames, 30.0);
        let scores = score_video(&mut source).unwrap();
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0], 0.0);
        assert!(scores[2] > 0.1);
        assert!(scores.iter().all(|&s| s >= 0.0));
    }

    #[test]
    fn scoring_is_deterministic() {
        let frames: Vec<RgbImage> = (0..10).map(|i| flat((i * 20) as u8)).collect();
        let a = score_video(&mut MemorySource::new(frames.clone(), 30.0)).unwrap();
        let b = score_video(&mut MemorySource::new(frames, 30.0)).unwrap();
        assert_eq!(a, b);
    }
}
