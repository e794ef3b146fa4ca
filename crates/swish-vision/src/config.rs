//! Configuration for segmentation and ball tracking.
//!
//! These parameters control how aggressively motion runs are promoted to
//! shot segments and how the ball detector scores candidates. The defaults
//! are tuned for handheld basketball footage.

use serde::{Deserialize, Serialize};

/// Configuration for motion-based shot segmentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Motion score threshold for selecting high-motion frames (0.0-1.0).
    ///
    /// - Lower values (0.05): more sensitive, picks up camera shake
    /// - Default (0.1): balanced for typical court footage
    /// - Higher values (0.2+): only strong motion bursts
    pub motion_threshold: f64,

    /// Minimum shot duration in seconds. Shorter runs are discarded.
    pub min_shot_duration: f64,

    /// Maximum shot duration in seconds. Longer runs are discarded.
    pub max_shot_duration: f64,

    /// Gap between high-motion frames that starts a new run, in seconds.
    ///
    /// Frames closer together than this stay in the same run, so brief
    /// lulls (ball at the apex of its arc) do not split a shot.
    pub gap_tolerance: f64,

    /// Time margin added to each side of a kept run, in seconds.
    pub padding: f64,

    /// Minimum number of high-motion frames before the adaptive threshold
    /// (50% of the observed maximum score) replaces the configured one.
    pub min_high_motion_frames: usize,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            motion_threshold: 0.1,
            min_shot_duration: 1.0,
            max_shot_duration: 10.0,
            gap_tolerance: 2.0,
            padding: 0.5,
            min_high_motion_frames: 10,
        }
    }
}

impl SegmentationConfig {
    /// A more sensitive configuration for low-light or distant footage.
    pub fn sensitive() -> Self {
        Self {
            motion_threshold: 0.05,
            padding: 0.3,
            ..Self::default()
        }
    }
}

/// Configuration for the multi-strategy ball tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum trajectory entries retained (oldest dropped on overflow).
    pub max_trajectory_len: usize,

    /// Contour area range accepted by the color/shape strategy, in px^2.
    pub min_contour_area: f64,
    pub max_contour_area: f64,

    /// Radius of the filled-circle template used by the template-match
    /// strategy, in pixels.
    pub template_radius: u32,

    /// Minimum normalized cross-correlation for a template match.
    pub template_min_correlation: f32,

    /// Half-size of the search window around the velocity-predicted
    /// position, in pixels.
    pub search_window: u32,

    /// Radius range of the parametric circle search inside the predicted
    /// window, in pixels.
    pub min_circle_radius: u32,
    pub max_circle_radius: u32,

    /// Canny thresholds for the edge map of the predicted search window.
    ///
    /// Kept well below the motion scorer's edge detector so moderate-contrast
    /// balls still leave a perimeter for the circle search to fit.
    pub search_edge_low: f32,
    pub search_edge_high: f32,

    /// Maximum distance from a detection to the nearest wrist/palm landmark
    /// for the detection to be accepted, in pixels.
    pub hand_proximity_px: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_trajectory_len: 30,
            min_contour_area: 200.0,
            max_contour_area: 5000.0,
            template_radius: 15,
            template_min_correlation: 0.3,
            search_window: 60,
            min_circle_radius: 10,
            max_circle_radius: 50,
            search_edge_low: 10.0,
            search_edge_high: 30.0,
            hand_proximity_px: 100.0,
        }
    }
}

/// Top-level configuration for the standardizer pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardizerConfig {
    pub segmentation: SegmentationConfig,
    pub tracker: TrackerConfig,
}
