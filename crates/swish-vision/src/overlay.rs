//! Trajectory overlay rendering for annotated output frames.
//!
//! Trails are sliding windows over the per-segment logs: pose and hand
//! points from the last 10 frames, ball positions from the last 15
//! trajectory entries.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use swish_models::{PixelPoint, PoseSample, TrajectoryEntry};

use std::collections::BTreeMap;

/// Frames of pose/hand history drawn per output frame.
const POSE_TRAIL_FRAMES: u64 = 10;
/// Ball trajectory entries drawn per output frame.
const BALL_TRAIL_ENTRIES: usize = 15;

const POSE_COLOR: Rgb<u8> = Rgb([0, 220, 90]);
const HAND_COLOR: Rgb<u8> = Rgb([240, 210, 40]);
const BALL_COLOR: Rgb<u8> = Rgb([250, 120, 30]);

/// Draw pose, hand and ball trails onto an output frame.
pub fn draw_trails(
    frame: &mut RgbImage,
    pose_log: &BTreeMap<u64, PoseSample>,
    hand_log: &BTreeMap<u64, Vec<PixelPoint>>,
    ball_trajectory: &[TrajectoryEntry],
    current_frame: u64,
) {
    let window_start = current_frame.saturating_sub(POSE_TRAIL_FRAMES - 1);

    for (_, sample) in pose_log.range(window_start..=current_frame) {
        for point in [
            sample.left_wrist,
            sample.right_wrist,
            sample.left_shoulder,
            sample.right_shoulder,
        ] {
            draw_point(frame, point, 4, POSE_COLOR);
        }
    }

    for (_, points) in hand_log.range(window_start..=current_frame) {
        for point in points {
            draw_point(frame, *point, 4, HAND_COLOR);
        }
    }

    let tail_start = ball_trajectory.len().saturating_sub(BALL_TRAIL_ENTRIES);
    let tail = &ball_trajectory[tail_start..];
    for pair in tail.windows(2) {
        draw_line_segment_mut(
            frame,
            (pair[0].point.x, pair[0].point.y),
            (pair[1].point.x, pair[1].point.y),
            BALL_COLOR,
        );
    }
    for entry in tail {
        draw_point(frame, entry.point, 5, BALL_COLOR);
    }
}

fn draw_point(frame: &mut RgbImage, point: PixelPoint, radius: i32, color: Rgb<u8>) {
    draw_filled_circle_mut(
        frame,
        (point.x.round() as i32, point.y.round() as i32),
        radius,
        color,
    );
}
