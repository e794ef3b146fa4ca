//! Shared data models for the SwishScan shot pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Shot segments (frame ranges with derived timestamps)
//! - Pixel and normalized landmark coordinates
//! - Per-segment tracking records (pose, hand, ball trajectories)
//! - Shot analysis reports and the final standardization output

pub mod analysis;
pub mod point;
pub mod record;
pub mod segment;

// Re-export common types
pub use analysis::{AnalysisReport, MotionStats};
pub use point::{NormalizedPoint, PixelPoint};
pub use record::{
    KeyFramePaths, PoseSample, ShotRecord, StandardizeReport, TrackingRecord, TrajectoryEntry,
};
pub use segment::ShotSegment;
