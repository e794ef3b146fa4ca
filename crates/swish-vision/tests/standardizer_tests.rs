//! End-to-end standardization tests over synthetic in-memory videos.

use std::path::Path;

use image::{Rgb, RgbImage};
use swish_vision::{
    MemorySinkFactory, MemorySource, NullEstimator, StandardizerConfig, VideoStandardizer,
};

/// A 10-second 30fps clip: uniform dim frames, with a flickering burst at
/// t = 4..6 that registers as high motion on every frame of the burst.
fn burst_video() -> Vec<RgbImage> {
    (0..300usize)
        .map(|i| {
            let level = if (121..180).contains(&i) && i % 2 == 1 {
                200
            } else {
                40
            };
            RgbImage::from_pixel(64, 48, Rgb([level, level, level]))
        })
        .collect()
}

fn run(output_dir: &Path) -> (swish_models::StandardizeReport, MemorySinkFactory) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let standardizer = VideoStandardizer::new(StandardizerConfig::default(), output_dir);
    let mut source = MemorySource::new(burst_video(), 30.0);
    let mut sinks = MemorySinkFactory::default();
    let report = standardizer
        .standardize(
            &mut source,
            &mut NullEstimator,
            Path::new("burst.mp4"),
            &mut sinks,
        )
        .unwrap();
    (report, sinks)
}

#[test]
fn burst_video_yields_one_padded_shot() {
    let dir = tempfile::tempdir().unwrap();
    let (report, sinks) = run(dir.path());

    assert_eq!(report.total_shots, 1);
    let shot = &report.shots[0];
    assert_eq!(shot.shot_id, "shot_000");

    // High-motion frames 121..=180, padded by 0.5s on each side.
    assert_eq!(shot.segment_info.start_frame, 106);
    assert_eq!(shot.segment_info.end_frame, 195);
    assert!((shot.segment_info.end_time - 6.5).abs() < 1e-9);

    // One annotated frame per segment frame reached the sink.
    assert_eq!(sinks.shots.len(), 1);
    assert_eq!(sinks.shots[0].lock().unwrap().len(), 90);

    // Analysis re-reads the same span.
    assert_eq!(shot.analysis.frame_count, 90);
    assert_eq!(shot.analysis.resolution, "64x48");
    assert!(shot.analysis.motion_analysis.max > 0.0);
}

#[test]
fn artifacts_are_written_to_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let (report, _) = run(dir.path());
    let shot = &report.shots[0];

    assert!(shot.tracking_path.exists());
    let tracking: swish_models::TrackingRecord =
        serde_json::from_str(&std::fs::read_to_string(&shot.tracking_path).unwrap()).unwrap();
    // NullEstimator yields no landmarks and uniform frames hide no ball.
    assert!(tracking.pose.is_empty());
    assert!(tracking.ball.is_empty());

    let key_frames = shot.key_frames.as_ref().expect("key frames saved");
    assert!(key_frames.start.exists());
    assert!(key_frames.middle.exists());
    assert!(key_frames.end.exists());

    let report_path = dir.path().join("report.json");
    report.save_json(&report_path).unwrap();
    let parsed: swish_models::StandardizeReport =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(parsed.total_shots, 1);
    assert_eq!(parsed.shots[0].shot_id, "shot_000");
}

#[test]
fn standardization_is_deterministic() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let (report_a, _) = run(dir_a.path());
    let (report_b, _) = run(dir_b.path());

    assert_eq!(report_a.total_shots, report_b.total_shots);
    for (a, b) in report_a.shots.iter().zip(&report_b.shots) {
        assert_eq!(a.segment_info.start_frame, b.segment_info.start_frame);
        assert_eq!(a.segment_info.end_frame, b.segment_info.end_frame);
        assert_eq!(a.analysis.motion_analysis.max, b.analysis.motion_analysis.max);
        assert_eq!(a.analysis.motion_analysis.avg, b.analysis.motion_analysis.avg);
    }
}
