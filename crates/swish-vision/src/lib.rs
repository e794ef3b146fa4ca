#![deny(unreachable_patterns)]
//! Basketball video standardization pipeline.
//!
//! This crate provides:
//! - FFmpeg/ffprobe-backed frame sources, probing and artifact encoding
//! - Motion scoring (blended frame difference, variance and edge density)
//! - Motion-run shot segmentation with duration filtering and fallbacks
//! - Multi-strategy basketball tracking (color, template, prediction)
//! - Per-shot extraction, trajectory overlays and motion analysis
//! - The `VideoStandardizer` orchestrator tying the passes together

pub mod analyze;
pub mod ball;
pub mod config;
pub mod error;
pub mod extract;
pub mod imgops;
pub mod landmarks;
pub mod motion;
pub mod overlay;
pub mod pipeline;
pub mod probe;
pub mod segmenter;
pub mod sink;
pub mod source;

pub use analyze::{analyze_shot, KeyFrames, ShotAnalysis};
pub use ball::BallTracker;
pub use config::{SegmentationConfig, StandardizerConfig, TrackerConfig};
pub use error::{VisionError, VisionResult};
pub use extract::ShotExtractor;
pub use landmarks::{
    HandLandmarks, LandmarkEstimator, LandmarkFrame, NullEstimator, PoseLandmarks,
};
pub use motion::MotionScorer;
pub use pipeline::{FfmpegSinkFactory, MemorySinkFactory, ShotSinkFactory, VideoStandardizer};
pub use probe::{probe_video, VideoInfo};
pub use segmenter::SegmentDetector;
pub use sink::{ArtifactSink, FfmpegArtifactSink, MemorySink};
pub use source::{FfmpegFrameSource, Frame, FrameSource, MemorySource};
