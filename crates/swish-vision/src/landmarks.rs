//! Landmark estimator capability interface.
//!
//! The pose/hand landmark model itself is an external collaborator: the
//! pipeline only requires something that maps one RGB frame to named 2D
//! keypoints in normalized coordinates, with no cross-frame memory. Swap
//! implementations without touching the tracker contract.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use swish_models::{NormalizedPoint, PixelPoint, PoseSample};

use crate::error::VisionResult;

/// Pose keypoints relevant to shot mechanics, normalized to [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoseLandmarks {
    pub left_wrist: NormalizedPoint,
    pub right_wrist: NormalizedPoint,
    pub left_shoulder: NormalizedPoint,
    pub right_shoulder: NormalizedPoint,
}

impl PoseLandmarks {
    /// Convert to pixel coordinates for a frame of the given dimensions.
    pub fn to_pixels(&self, width: u32, height: u32) -> PoseSample {
        PoseSample {
            left_wrist: self.left_wrist.to_pixels(width, height),
            right_wrist: self.right_wrist.to_pixels(width, height),
            left_shoulder: self.left_shoulder.to_pixels(width, height),
            right_shoulder: self.right_shoulder.to_pixels(width, height),
        }
    }
}

/// One detected hand: the palm/wrist center point, normalized to [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub palm: NormalizedPoint,
}

/// Estimator output for a single frame.
#[derive(Debug, Clone, Default)]
pub struct LandmarkFrame {
    /// Pose keypoints, when a person was detected.
    pub pose: Option<PoseLandmarks>,
    /// Zero or more detected hands.
    pub hands: Vec<HandLandmarks>,
}

impl LandmarkFrame {
    /// True if the estimator produced nothing at all for this frame.
    pub fn is_empty(&self) -> bool {
        self.pose.is_none() && self.hands.is_empty()
    }

    /// Wrist and palm positions in pixel coordinates of the actual frame,
    /// used to validate ball detections by proximity. Estimator output
    /// outside the normalized range is dropped rather than projected.
    pub fn hand_points(&self, width: u32, height: u32) -> Vec<PixelPoint> {
        let mut points = Vec::new();
        if let Some(pose) = &self.pose {
            for wrist in [pose.left_wrist, pose.right_wrist] {
                if wrist.is_valid() {
                    points.push(wrist.to_pixels(width, height));
                }
            }
        }
        for hand in &self.hands {
            if hand.palm.is_valid() {
                points.push(hand.palm.to_pixels(width, height));
            }
        }
        points
    }
}

/// Capability interface: frame in, named keypoints out.
pub trait LandmarkEstimator {
    fn estimate(&mut self, frame: &RgbImage) -> VisionResult<LandmarkFrame>;
}

/// Estimator that never reports landmarks.
///
/// With no landmarks available, ball detections pass proximity validation
/// unconditionally, so the pipeline stays usable without a pose model.
pub struct NullEstimator;

impl LandmarkEstimator for NullEstimator {
    fn estimate(&mut self, _frame: &RgbImage) -> VisionResult<LandmarkFrame> {
        Ok(LandmarkFrame::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_points_use_actual_frame_dimensions() {
        let frame = LandmarkFrame {
            pose: Some(PoseLandmarks {
                left_wrist: NormalizedPoint::new(0.5, 0.5),
                right_wrist: NormalizedPoint::new(0.25, 0.5),
                left_shoulder: NormalizedPoint::new(0.5, 0.25),
                right_shoulder: NormalizedPoint::new(0.25, 0.25),
            }),
            hands: vec![HandLandmarks {
                palm: NormalizedPoint::new(1.0, 1.0),
            }],
        };

        let points = frame.hand_points(640, 480);
        // Two wrists plus one palm; shoulders are not proximity anchors.
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].x, 320.0);
        assert_eq!(points[0].y, 240.0);
        assert_eq!(points[2].x, 640.0);
        assert_eq!(points[2].y, 480.0);
    }

    #[test]
    fn out_of_range_landmarks_are_not_proximity_anchors() {
        let frame = LandmarkFrame {
            pose: Some(PoseLandmarks {
                left_wrist: NormalizedPoint::new(-0.2, 0.5),
                right_wrist: NormalizedPoint::new(0.25, 0.5),
                left_shoulder: NormalizedPoint::new(0.5, 0.25),
                right_shoulder: NormalizedPoint::new(0.25, 0.25),
            }),
            hands: vec![HandLandmarks {
                palm: NormalizedPoint::new(1.4, 0.5),
            }],
        };

        // The off-frame wrist and palm are dropped; the in-range wrist stays.
        let points = frame.hand_points(640, 480);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].x, 160.0);
        assert_eq!(points[0].y, 240.0);
    }

    #[test]
    fn null_estimator_reports_nothing() {
        let mut estimator = NullEstimator;
        let frame = RgbImage::new(8, 8);
        let result = estimator.estimate(&frame).unwrap();
        assert!(result.is_empty());
        assert!(result.hand_points(8, 8).is_empty());
    }
}
