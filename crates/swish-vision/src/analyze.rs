//! Per-shot motion analysis.
//!
//! Statistics are recomputed over the extracted segment's own frames with a
//! plain mean-absolute-difference (no smoothing), independently of the
//! whole-video scoring pass. Only the three key frames are retained.

use std::path::Path;

use image::RgbImage;
use swish_models::{AnalysisReport, KeyFramePaths, MotionStats};
use tracing::debug;

use crate::error::VisionResult;
use crate::imgops;
use crate::source::FrameSource;
use swish_models::ShotSegment;

/// The retained key frames of a segment.
#[derive(Debug, Clone)]
pub struct KeyFrames {
    pub start: RgbImage,
    pub middle: RgbImage,
    pub end: RgbImage,
}

impl KeyFrames {
    /// Save the key frames as PNG stills named after the shot id.
    pub fn save_stills(&self, dir: &Path, shot_id: &str) -> VisionResult<KeyFramePaths> {
        let paths = KeyFramePaths {
            start: dir.join(format!("{shot_id}_start.png")),
            middle: dir.join(format!("{shot_id}_middle.png")),
            end: dir.join(format!("{shot_id}_end.png")),
        };
        self.start
            .save(&paths.start)
            .map_err(|e| crate::error::VisionError::encode_failed(e.to_string()))?;
        self.middle
            .save(&paths.middle)
            .map_err(|e| crate::error::VisionError::encode_failed(e.to_string()))?;
        self.end
            .save(&paths.end)
            .map_err(|e| crate::error::VisionError::encode_failed(e.to_string()))?;
        Ok(paths)
    }
}

/// Result of analyzing one extracted segment.
#[derive(Debug, Clone)]
pub struct ShotAnalysis {
    /// The serializable report for the shot record.
    pub report: AnalysisReport,
    /// Key frames, present when the segment contained at least one frame.
    pub key_frames: Option<KeyFrames>,
}

/// Analyze a segment by re-reading its frames from the source.
pub fn analyze_shot(source: &mut dyn FrameSource, segment: &ShotSegment) -> VisionResult<ShotAnalysis> {
    let info = source.info().clone();
    let middle_offset = segment.frame_count() / 2;

    let mut scores: Vec<f64> = Vec::new();
    let mut prev: Option<image::GrayImage> = None;
    let mut start_frame: Option<RgbImage> = None;
    let mut middle_frame: Option<RgbImage> = None;
    let mut last_frame: Option<RgbImage> = None;

    source.seek(segment.start_frame)?;
    for offset in 0..segment.frame_count() {
        let Some(frame) = source.next_frame()? else {
            break;
        };

        let gray = image::imageops::grayscale(&frame.pixels);
        let score = match &prev {
            None => 0.0,
            Some(p) => imgops::diff_stats(p, &gray).mean,
        };
        scores.push(score);
        prev = Some(gray);

        if offset == 0 {
            start_frame = Some(frame.pixels.clone());
        }
        if offset == middle_offset {
            middle_frame = Some(frame.pixels.clone());
        }
        last_frame = Some(frame.pixels);
    }

    let frame_count = scores.len() as u64;
    let key_frames = match (start_frame, last_frame) {
        (Some(start), Some(end)) => Some(KeyFrames {
            middle: middle_frame.unwrap_or_else(|| end.clone()),
            start,
            end,
        }),
        _ => None,
    };

    let report = AnalysisReport {
        frame_count,
        duration: frame_count as f64 / info.fps,
        resolution: info.resolution(),
        fps: info.fps,
        motion_analysis: MotionStats::from_scores(&scores),
    };

    debug!(
        frames = frame_count,
        max = report.motion_analysis.max,
        avg = report.motion_analysis.avg,
        "Shot analysis complete"
    );

    Ok(ShotAnalysis { report, key_frames })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use image::Rgb;

    fn flat(level: u8) -> RgbImage {
        RgbImage::from_pixel(16, 16, Rgb([level, level, level]))
    }

    #[test]
    fn analysis_recomputes_plain_motion() {
        // Levels step by 10 each frame: plain MAD is exactly 10 after the
        // first frame.
        let frames: Vec<RgbImage> = (0..10u8).map(|i| flat(i * 10)).collect();
        let mut source = MemorySource::new(frames, 30.0);
        let segment = ShotSegment::from_frames(0, 9, 30.0);

        let analysis = analyze_shot(&mut source, &segment).unwrap();
        let report = &analysis.report;
        assert_eq!(report.frame_count, 10);
        assert!((report.duration - 10.0 / 30.0).abs() < 1e-9);
        assert_eq!(report.resolution, "16x16");
        assert_eq!(report.motion_analysis.max, 10.0);
        // 9 of 10 scores are 10.0, the first is 0.
        assert!((report.motion_analysis.avg - 9.0).abs() < 1e-9);
    }

    #[test]
    fn key_frames_are_start_middle_end() {
        let frames: Vec<RgbImage> = (0..9u8).map(|i| flat(i * 20)).collect();
        let mut source = MemorySource::new(frames, 30.0);
        let segment = ShotSegment::from_frames(0, 8, 30.0);

        let analysis = analyze_shot(&mut source, &segment).unwrap();
        let key = analysis.key_frames.expect("key frames present");
        assert_eq!(key.start.get_pixel(0, 0)[0], 0);
        // frame_count 9 -> middle offset 4.
        assert_eq!(key.middle.get_pixel(0, 0)[0], 80);
        assert_eq!(key.end.get_pixel(0, 0)[0], 160);
    }

    #[test]
    fn stills_are_saved_to_disk() {
        let frames: Vec<RgbImage> = (0..3u8).map(|i| flat(i * 50)).collect();
        let mut source = MemorySource::new(frames, 30.0);
        let segment = ShotSegment::from_frames(0, 2, 30.0);
        let analysis = analyze_shot(&mut source, &segment).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let paths = analysis
            .key_frames
            .unwrap()
            .save_stills(dir.path(), "shot_000")
            .unwrap();
        assert!(paths.start.exists());
        assert!(paths.middle.exists());
        assert!(paths.end.exists());
    }
}
