//! Artifact sinks: annotated frame streams and tracking-record documents.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::{Arc, Mutex};

use image::RgbImage;
use swish_models::TrackingRecord;
use tracing::debug;

use crate::error::{VisionError, VisionResult};

/// Accepts an ordered stream of annotated frames and encodes them into a
/// video artifact.
pub trait ArtifactSink {
    /// Append one frame to the stream.
    fn write_frame(&mut self, frame: &RgbImage) -> VisionResult<()>;

    /// Flush and close the artifact. Must be called exactly once.
    fn finish(&mut self) -> VisionResult<()>;
}

/// Sink that pipes raw RGB frames into an ffmpeg encoder process.
pub struct FfmpegArtifactSink {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl FfmpegArtifactSink {
    /// Start an encoder writing to `path` at the given geometry and rate.
    pub fn create(path: impl AsRef<Path>, width: u32, height: u32, fps: f64) -> VisionResult<Self> {
        let path = path.as_ref().to_path_buf();
        which::which("ffmpeg").map_err(|_| VisionError::FfmpegNotFound)?;

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-y", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{width}x{height}"))
            .arg("-r")
            .arg(format!("{fps}"))
            .args(["-i", "-", "-c:v", "libx264", "-pix_fmt", "yuv420p"])
            .arg(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child.stdin.take();
        Ok(Self {
            path,
            width,
            height,
            child: Some(child),
            stdin,
            frames_written: 0,
        })
    }
}

impl ArtifactSink for FfmpegArtifactSink {
    fn write_frame(&mut self, frame: &RgbImage) -> VisionResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(VisionError::encode_failed(format!(
                "frame is {}x{}, sink expects {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| VisionError::encode_failed("sink already finished"))?;
        stdin.write_all(frame.as_raw())?;
        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> VisionResult<()> {
        // Closing stdin signals end of stream to the encoder.
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(VisionError::encode_failed(format!(
                    "ffmpeg encoder exited with {status} for {}",
                    self.path.display()
                )));
            }
        }
        debug!(
            path = %self.path.display(),
            frames = self.frames_written,
            "Artifact encoded"
        );
        Ok(())
    }
}

impl Drop for FfmpegArtifactSink {
    fn drop(&mut self) {
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// In-memory sink for tests and embedding; frames are shared so callers
/// can inspect them after the sink is consumed.
#[derive(Default)]
pub struct MemorySink {
    frames: Arc<Mutex<Vec<RgbImage>>>,
    finished: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the collected frames.
    pub fn frames(&self) -> Arc<Mutex<Vec<RgbImage>>> {
        Arc::clone(&self.frames)
    }
}

impl ArtifactSink for MemorySink {
    fn write_frame(&mut self, frame: &RgbImage) -> VisionResult<()> {
        if self.finished {
            return Err(VisionError::encode_failed("sink already finished"));
        }
        self.frames.lock().expect("sink lock").push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> VisionResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Serialize a tracking record as pretty JSON keyed by frame index.
pub fn write_tracking_record(record: &TrackingRecord, path: &Path) -> VisionResult<()> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    debug!(path = %path.display(), "Tracking record written");
    Ok(())
}
