//! Per-segment shot extraction.
//!
//! Drives the landmark estimator and the ball tracker over one segment's
//! frames, builds the trajectory logs, and streams annotated frames into
//! the artifact sink. The tracker session is reset per segment so no state
//! leaks between shots.

use swish_models::{ShotSegment, TrackingRecord};
use tracing::debug;

use crate::ball::BallTracker;
use crate::config::TrackerConfig;
use crate::error::VisionResult;
use crate::landmarks::LandmarkEstimator;
use crate::overlay;
use crate::sink::ArtifactSink;
use crate::source::FrameSource;

/// Extracts one segment at a time, reusing the tracker allocation across
/// segments.
pub struct ShotExtractor {
    tracker: BallTracker,
}

impl ShotExtractor {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracker: BallTracker::new(config),
        }
    }

    /// Process one segment: per frame, estimate landmarks, log pose/hand
    /// positions, step the ball tracker, and write the annotated frame.
    /// Returns the segment's tracking record.
    pub fn extract(
        &mut self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn LandmarkEstimator,
        sink: &mut dyn ArtifactSink,
        segment: &ShotSegment,
    ) -> VisionResult<TrackingRecord> {
        self.tracker.reset();
        let mut record = TrackingRecord::default();

        source.seek(segment.start_frame)?;
        for _ in segment.start_frame..=segment.end_frame {
            // A truncated stream ends the segment early rather than failing.
            let Some(frame) = source.next_frame()? else {
                break;
            };
            let (width, height) = frame.pixels.dimensions();

            let landmarks = estimator.estimate(&frame.pixels)?;
            if let Some(pose) = &landmarks.pose {
                record
                    .pose
                    .insert(frame.index, pose.to_pixels(width, height));
            }
            if !landmarks.hands.is_empty() {
                let palms = landmarks
                    .hands
                    .iter()
                    .map(|h| h.palm.to_pixels(width, height))
                    .collect();
                record.hands.insert(frame.index, palms);
            }

            let hand_points = landmarks.hand_points(width, height);
            self.tracker.track(&frame.pixels, frame.index, &hand_points);

            let mut annotated = frame.pixels.clone();
            overlay::draw_trails(
                &mut annotated,
                &record.pose,
                &record.hands,
                self.tracker.trajectory(),
                frame.index,
            );
            sink.write_frame(&annotated)?;
        }

        record.ball = self.tracker.trajectory().to_vec();
        sink.finish()?;

        debug!(
            start_frame = segment.start_frame,
            end_frame = segment.end_frame,
            pose_frames = record.pose.len(),
            hand_frames = record.hands.len(),
            ball_points = record.ball.len(),
            detections = self.tracker.detection_count(),
            "Segment extracted"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{HandLandmarks, LandmarkFrame, NullEstimator, PoseLandmarks};
    use crate::sink::MemorySink;
    use crate::source::MemorySource;
    use image::{Rgb, RgbImage};
    use imageproc::drawing::draw_filled_circle_mut;
    use swish_models::NormalizedPoint;

    /// Estimator that reports a fixed pose and one hand on every frame.
    struct FixedEstimator;

    impl LandmarkEstimator for FixedEstimator {
        fn estimate(&mut self, _frame: &RgbImage) -> VisionResult<LandmarkFrame> {
            Ok(LandmarkFrame {
                pose: Some(PoseLandmarks {
                    left_wrist: NormalizedPoint::new(0.3, 0.4),
                    right_wrist: NormalizedPoint::new(0.5, 0.4),
                    left_shoulder: NormalizedPoint::new(0.3, 0.2),
                    right_shoulder: NormalizedPoint::new(0.5, 0.2),
                }),
                hands: vec![HandLandmarks {
                    palm: NormalizedPoint::new(0.4, 0.45),
                }],
            })
        }
    }

    fn ball_frames(count: usize) -> Vec<RgbImage> {
        (0..count)
            .map(|i| {
                let mut frame = RgbImage::from_pixel(320, 240, Rgb([20, 20, 20]));
                // Ball rising near the tracked wrists (wrist pixel ~ (96..160, 96)).
                draw_filled_circle_mut(
                    &mut frame,
                    (130 + i as i32, 100),
                    25,
                    Rgb([230, 120, 30]),
                );
                frame
            })
            .collect()
    }

    #[test]
    fn extract_logs_pose_hands_and_ball_per_frame() {
        let mut source = MemorySource::new(ball_frames(20), 30.0);
        let segment = ShotSegment::from_frames(5, 14, 30.0);
        let mut extractor = ShotExtractor::new(TrackerConfig::default());
        let mut sink = MemorySink::new();
        let frames = sink.frames();

        let record = extractor
            .extract(&mut source, &mut FixedEstimator, &mut sink, &segment)
            .unwrap();

        assert_eq!(frames.lock().unwrap().len(), 10);
        assert_eq!(record.pose.len(), 10);
        assert_eq!(record.hands.len(), 10);
        // Logs are keyed by source frame index, not segment offset.
        assert!(record.pose.contains_key(&5));
        assert!(record.pose.contains_key(&14));
        assert!(!record.pose.contains_key(&4));
        // The ball sits within 100px of the wrists, so detections pass
        // validation on every frame.
        assert_eq!(record.ball.len(), 10);
        assert_eq!(record.ball[0].frame, 5);
    }

    #[test]
    fn tracker_state_resets_between_segments() {
        let mut source = MemorySource::new(ball_frames(20), 30.0);
        let mut extractor = ShotExtractor::new(TrackerConfig::default());

        let first = ShotSegment::from_frames(0, 9, 30.0);
        let mut sink = MemorySink::new();
        let record_a = extractor
            .extract(&mut source, &mut NullEstimator, &mut sink, &first)
            .unwrap();

        let second = ShotSegment::from_frames(10, 19, 30.0);
        let mut sink = MemorySink::new();
        let record_b = extractor
            .extract(&mut source, &mut NullEstimator, &mut sink, &second)
            .unwrap();

        // The second record starts fresh: nothing from the first segment.
        assert_eq!(record_a.ball.len(), 10);
        assert_eq!(record_b.ball.len(), 10);
        assert_eq!(record_b.ball[0].frame, 10);
    }

    #[test]
    fn truncated_source_ends_segment_without_error() {
        let mut source = MemorySource::new(ball_frames(8), 30.0);
        let segment = ShotSegment::from_frames(5, 20, 30.0);
        let mut extractor = ShotExtractor::new(TrackerConfig::default());
        let mut sink = MemorySink::new();
        let frames = sink.frames();

        let record = extractor
            .extract(&mut source, &mut NullEstimator, &mut sink, &segment)
            .unwrap();
        assert_eq!(frames.lock().unwrap().len(), 3);
        assert_eq!(record.ball.len(), 3);
    }
}
