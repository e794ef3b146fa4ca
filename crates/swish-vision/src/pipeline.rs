//! The standardization orchestrator.
//!
//! Two sequential passes over the source: one scoring pass retaining only
//! scalars, then one re-read per accepted segment for extraction, tracking
//! and analysis. A failure in one segment is logged and that shot skipped;
//! only fatal errors (missing tools, unusable source) abort the run.

use std::path::{Path, PathBuf};

use chrono::Utc;
use swish_models::{ShotRecord, ShotSegment, StandardizeReport};
use tracing::{info, warn};

use crate::analyze;
use crate::config::StandardizerConfig;
use crate::error::VisionResult;
use crate::extract::ShotExtractor;
use crate::landmarks::LandmarkEstimator;
use crate::motion;
use crate::probe::VideoInfo;
use crate::segmenter::SegmentDetector;
use crate::sink::{self, ArtifactSink, FfmpegArtifactSink, MemorySink};
use crate::source::{FfmpegFrameSource, FrameSource};

/// Creates one artifact sink per shot.
pub trait ShotSinkFactory {
    fn create(&mut self, info: &VideoInfo, artifact_path: &Path) -> VisionResult<Box<dyn ArtifactSink>>;
}

/// Factory producing ffmpeg-backed encoders at the source geometry.
pub struct FfmpegSinkFactory;

impl ShotSinkFactory for FfmpegSinkFactory {
    fn create(&mut self, info: &VideoInfo, artifact_path: &Path) -> VisionResult<Box<dyn ArtifactSink>> {
        Ok(Box::new(FfmpegArtifactSink::create(
            artifact_path,
            info.width,
            info.height,
            info.fps,
        )?))
    }
}

/// Factory producing in-memory sinks, keeping a handle per shot so the
/// collected frames stay inspectable.
#[derive(Default)]
pub struct MemorySinkFactory {
    pub shots: Vec<std::sync::Arc<std::sync::Mutex<Vec<image::RgbImage>>>>,
}

impl ShotSinkFactory for MemorySinkFactory {
    fn create(&mut self, _info: &VideoInfo, _artifact_path: &Path) -> VisionResult<Box<dyn ArtifactSink>> {
        let sink = MemorySink::new();
        self.shots.push(sink.frames());
        Ok(Box::new(sink))
    }
}

/// Sequences scoring, segmentation, extraction and analysis over one video.
///
/// Instances hold only configuration and the output directory; run one
/// standardizer per video when processing in parallel, each with a distinct
/// output directory.
pub struct VideoStandardizer {
    config: StandardizerConfig,
    output_dir: PathBuf,
}

impl VideoStandardizer {
    pub fn new(config: StandardizerConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
        }
    }

    /// Standardize a video file: decode and encode through ffmpeg.
    pub fn standardize_video(
        &self,
        video_path: &Path,
        estimator: &mut dyn LandmarkEstimator,
    ) -> VisionResult<StandardizeReport> {
        let mut source = FfmpegFrameSource::open(video_path)?;
        self.standardize(&mut source, estimator, video_path, &mut FfmpegSinkFactory)
    }

    /// Standardize an already-opened source, writing artifacts through the
    /// given sink factory.
    pub fn standardize(
        &self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn LandmarkEstimator,
        original: &Path,
        sinks: &mut dyn ShotSinkFactory,
    ) -> VisionResult<StandardizeReport> {
        std::fs::create_dir_all(&self.output_dir)?;
        let info = source.info().clone();
        info!(
            video = %original.display(),
            resolution = %info.resolution(),
            fps = info.fps,
            duration = info.duration,
            "Starting video standardization"
        );

        let scores = motion::score_video(source)?;
        let detector = SegmentDetector::new(self.config.segmentation.clone());
        let segments = detector.detect(&scores, info.fps);
        info!(segments = segments.len(), "Shot segments detected");

        let mut extractor = ShotExtractor::new(self.config.tracker.clone());
        let mut shots = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            info!(
                shot = index + 1,
                total = segments.len(),
                start_time = segment.start_time,
                end_time = segment.end_time,
                "Processing shot"
            );
            match self.process_segment(source, estimator, sinks, &mut extractor, &info, segment, index)
            {
                Ok(record) => shots.push(record),
                Err(e) if e.is_fatal() => return Err(e),
                // One bad segment never aborts the batch.
                Err(e) => warn!(shot = index, error = %e, "Shot processing failed, skipping"),
            }
        }

        let report = StandardizeReport::new(original, shots);
        info!(total_shots = report.total_shots, "Standardization complete");
        Ok(report)
    }

    #[allow(clippy::too_many_arguments)]
    fn process_segment(
        &self,
        source: &mut dyn FrameSource,
        estimator: &mut dyn LandmarkEstimator,
        sinks: &mut dyn ShotSinkFactory,
        extractor: &mut ShotExtractor,
        info: &VideoInfo,
        segment: &ShotSegment,
        index: usize,
    ) -> VisionResult<ShotRecord> {
        let shot_id = ShotRecord::shot_id_for(index);
        let artifact_path = self.output_dir.join(format!("{shot_id}.mp4"));
        let tracking_path = self.output_dir.join(format!("{shot_id}_tracking.json"));

        let mut sink = sinks.create(info, &artifact_path)?;
        let record = extractor.extract(source, estimator, sink.as_mut(), segment)?;
        sink::write_tracking_record(&record, &tracking_path)?;

        let analysis = analyze::analyze_shot(source, segment)?;
        let key_frames = match &analysis.key_frames {
            Some(frames) => Some(frames.save_stills(&self.output_dir, &shot_id)?),
            None => None,
        };

        Ok(ShotRecord {
            shot_id,
            segment_info: segment.clone(),
            video_path: artifact_path,
            tracking_path,
            analysis: analysis.report,
            key_frames,
            timestamp: Utc::now(),
        })
    }
}
