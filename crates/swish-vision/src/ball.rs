//! Stateful, per-segment ball tracker.
//!
//! Per-frame detection runs three strategies in strict priority order and
//! the first that returns a position wins:
//!
//! 1. Color/shape scoring over a fixed set of HSV ball-tone masks
//! 2. Normalized cross-correlation against a filled-circle template
//! 3. Parametric circle search around the velocity-predicted position
//!
//! An accepted position must lie near a tracked wrist/palm landmark for the
//! frame, unless the frame produced no landmarks at all. Tracker state is
//! reset at the start of every segment; nothing leaks across segments.

use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::template_matching::MatchTemplateMethod;
use swish_models::{PixelPoint, TrajectoryEntry};
use tracing::trace;

use crate::config::TrackerConfig;
use crate::imgops::{self, HsvRange};

/// HSV ranges covering expected basketball tones, from bright orange down
/// to shadowed leather. OpenCV conventions: H 0-179, S/V 0-255.
const BALL_HSV_RANGES: [HsvRange; 6] = [
    // Bright orange in direct light
    HsvRange { h_lo: 5, h_hi: 18, s_lo: 120, s_hi: 255, v_lo: 120, v_hi: 255 },
    // Saturated red-orange
    HsvRange { h_lo: 0, h_hi: 8, s_lo: 100, s_hi: 255, v_lo: 80, v_hi: 255 },
    // Leather brown
    HsvRange { h_lo: 8, h_hi: 20, s_lo: 80, s_hi: 200, v_lo: 60, v_hi: 180 },
    // Dark brown, indoor lighting
    HsvRange { h_lo: 5, h_hi: 25, s_lo: 60, s_hi: 160, v_lo: 40, v_hi: 120 },
    // Washed-out highlight
    HsvRange { h_lo: 10, h_hi: 25, s_lo: 40, s_hi: 120, v_lo: 150, v_hi: 255 },
    // Shadowed ball drifting toward red
    HsvRange { h_lo: 170, h_hi: 10, s_lo: 80, s_hi: 255, v_lo: 50, v_hi: 150 },
];

/// Kernel size for the morphological close-then-open mask cleanup.
const MORPH_KERNEL: u8 = 2;

/// Multi-strategy ball tracker with per-segment state.
pub struct BallTracker {
    config: TrackerConfig,
    trajectory: Vec<TrajectoryEntry>,
    last_position: Option<PixelPoint>,
    detection_count: u64,
}

impl BallTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            trajectory: Vec::new(),
            last_position: None,
            detection_count: 0,
        }
    }

    /// Clear all state for a new segment.
    pub fn reset(&mut self) {
        self.trajectory.clear();
        self.last_position = None;
        self.detection_count = 0;
    }

    /// Bounded trajectory of confirmed (or held) positions.
    pub fn trajectory(&self) -> &[TrajectoryEntry] {
        &self.trajectory
    }

    /// Last confirmed position, if any.
    pub fn last_position(&self) -> Option<PixelPoint> {
        self.last_position
    }

    /// Number of accepted detections since the last reset.
    pub fn detection_count(&self) -> u64 {
        self.detection_count
    }

    /// Process one frame: detect, validate against the frame's wrist/palm
    /// landmarks, and update state. Returns the accepted position, if any.
    pub fn track(
        &mut self,
        frame: &RgbImage,
        frame_index: u64,
        hand_points: &[PixelPoint],
    ) -> Option<PixelPoint> {
        let detected = self.detect(frame);
        let accepted = detected.filter(|pos| self.validate(pos, hand_points));

        match accepted {
            Some(pos) => {
                self.trajectory.push(TrajectoryEntry {
                    frame: frame_index,
                    point: pos,
                });
                self.last_position = Some(pos);
                self.detection_count += 1;
                self.cap_trajectory();
                Some(pos)
            }
            None => {
                // Hold the last known position through short dropouts, but
                // only once the track has momentum.
                if self.trajectory.len() >= 2 {
                    if let Some(last) = self.last_position {
                        self.trajectory.push(TrajectoryEntry {
                            frame: frame_index,
                            point: last,
                        });
                        self.cap_trajectory();
                    }
                }
                None
            }
        }
    }

    /// A detection is valid if it lies near any wrist/palm landmark of the
    /// frame. Frames with no landmarks at all accept unconditionally.
    fn validate(&self, pos: &PixelPoint, hand_points: &[PixelPoint]) -> bool {
        if hand_points.is_empty() {
            return true;
        }
        hand_points
            .iter()
            .any(|hp| pos.distance_to(hp) <= self.config.hand_proximity_px)
    }

    fn cap_trajectory(&mut self) {
        while self.trajectory.len() > self.config.max_trajectory_len {
            self.trajectory.remove(0);
        }
    }

    /// Run detection strategies in strict priority order.
    fn detect(&self, frame: &RgbImage) -> Option<PixelPoint> {
        self.detect_by_color(frame)
            .or_else(|| self.detect_by_template(frame))
            .or_else(|| self.detect_by_prediction(frame))
    }

    /// Strategy 1: HSV ball-tone masks, morphological cleanup, contour
    /// scoring by `circularity * (area / 1000)`. The strictly highest
    /// scoring contour across all masks wins; ties keep the first found.
    fn detect_by_color(&self, frame: &RgbImage) -> Option<PixelPoint> {
        let mut best: Option<(f64, PixelPoint)> = None;

        for range in &BALL_HSV_RANGES {
            let mask = imgops::hsv_mask(frame, range);
            let cleaned = imageproc::morphology::open(
                &imageproc::morphology::close(&mask, Norm::LInf, MORPH_KERNEL),
                Norm::LInf,
                MORPH_KERNEL,
            );

            for contour in imageproc::contours::find_contours::<u32>(&cleaned) {
                let area = imgops::contour_area(&contour);
                if area < self.config.min_contour_area || area > self.config.max_contour_area {
                    continue;
                }
                let perimeter = imgops::contour_perimeter(&contour);
                if perimeter <= 0.0 {
                    continue;
                }
                let circularity = 4.0 * std::f64::consts::PI * area / (perimeter * perimeter);
                let score = circularity * (area / 1000.0);

                // Strictly greater replaces; equal keeps the first found.
                if best.map_or(true, |(b, _)| score > b) {
                    let (cx, cy) = imgops::contour_centroid(&contour);
                    best = Some((score, PixelPoint::new(cx, cy)));
                }
            }
        }

        best.map(|(score, pos)| {
            trace!(score, x = pos.x, y = pos.y, "Ball found by color/shape");
            pos
        })
    }

    /// Strategy 2: normalized cross-correlation of a filled-circle template
    /// against the grayscale frame.
    fn detect_by_template(&self, frame: &RgbImage) -> Option<PixelPoint> {
        let radius = self.config.template_radius;
        let side = radius * 2 + 1;
        if frame.width() < side || frame.height() < side {
            return None;
        }

        let gray = image::imageops::grayscale(frame);
        let template = circle_template(radius);

        let scores = imageproc::template_matching::match_template(
            &gray,
            &template,
            MatchTemplateMethod::CrossCorrelationNormalized,
        );
        let extremes = imageproc::template_matching::find_extremes(&scores);

        // Flat windows make the normalization degenerate; treat as no match.
        if extremes.max_value.is_finite()
            && extremes.max_value > self.config.template_min_correlation
        {
            let (x, y) = extremes.max_value_location;
            // Match location is the template's top-left corner.
            let pos = PixelPoint::new((x + radius) as f32, (y + radius) as f32);
            trace!(
                correlation = extremes.max_value,
                x = pos.x,
                y = pos.y,
                "Ball found by template match"
            );
            Some(pos)
        } else {
            None
        }
    }

    /// Strategy 3: extrapolate the next position from the last two tracked
    /// points (constant velocity) and run a circle search in a window
    /// around the prediction.
    fn detect_by_prediction(&self, frame: &RgbImage) -> Option<PixelPoint> {
        if self.trajectory.len() < 2 {
            return None;
        }
        let last = self.trajectory[self.trajectory.len() - 1].point;
        let prev = self.trajectory[self.trajectory.len() - 2].point;
        let predicted = PixelPoint::new(last.x + (last.x - prev.x), last.y + (last.y - prev.y));

        let (width, height) = frame.dimensions();
        let win = self.config.search_window as f32;
        let x0 = (predicted.x - win).max(0.0) as u32;
        let y0 = (predicted.y - win).max(0.0) as u32;
        let x1 = ((predicted.x + win) as u32).min(width.saturating_sub(1));
        let y1 = ((predicted.y + win) as u32).min(height.saturating_sub(1));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        let gray = image::imageops::grayscale(frame);
        let window = image::imageops::crop_imm(&gray, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image();
        let edges = imageproc::edges::canny(
            &window,
            self.config.search_edge_low,
            self.config.search_edge_high,
        );

        imgops::find_circle(
            &edges,
            self.config.min_circle_radius,
            self.config.max_circle_radius,
        )
        .map(|(cx, cy, _r)| {
            let pos = PixelPoint::new((x0 + cx) as f32, (y0 + cy) as f32);
            trace!(x = pos.x, y = pos.y, "Ball found by predicted search");
            pos
        })
    }
}

/// Filled-circle template: white disc on black, `(2r+1)` pixels square.
fn circle_template(radius: u32) -> GrayImage {
    let side = radius * 2 + 1;
    let mut template = GrayImage::new(side, side);
    let r2 = (radius * radius) as i64;
    for y in 0..side {
        for x in 0..side {
            let dx = x as i64 - radius as i64;
            let dy = y as i64 - radius as i64;
            if dx * dx + dy * dy <= r2 {
                template.put_pixel(x, y, image::Luma([255]));
            }
        }
    }
    template
}
