//! Frame sources: sequential/random-seek access to decoded video frames.
//!
//! The pipeline reads frames through the [`FrameSource`] trait so the decode
//! backend can be swapped. [`FfmpegFrameSource`] decodes through an ffmpeg
//! rawvideo pipe; [`MemorySource`] serves pre-built frames for tests and
//! embedding.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};

use image::RgbImage;
use tracing::debug;

use crate::error::{VisionError, VisionResult};
use crate::probe::{probe_video, VideoInfo};

/// One decoded frame. Ephemeral: dropped as soon as the consuming step is
/// done with it.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame index within the source video.
    pub index: u64,
    /// Timestamp in seconds (`index / fps`).
    pub timestamp: f64,
    /// Decoded RGB pixels.
    pub pixels: RgbImage,
}

/// Capability interface for decoding frames from a video.
pub trait FrameSource {
    /// Source properties (fps, frame count, dimensions).
    fn info(&self) -> &VideoInfo;

    /// Position the source so the next decoded frame has the given index.
    fn seek(&mut self, frame_index: u64) -> VisionResult<()>;

    /// Decode the next frame, or `None` at end of stream.
    fn next_frame(&mut self) -> VisionResult<Option<Frame>>;
}

/// Frame source backed by an ffmpeg CLI rawvideo pipe.
///
/// Seeking restarts the decoder process with an accurate `-ss`; sequential
/// reads then pull raw RGB24 frames off its stdout.
pub struct FfmpegFrameSource {
    path: PathBuf,
    info: VideoInfo,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    next_index: u64,
}

impl FfmpegFrameSource {
    /// Open a video file. Fails with `SourceUnavailable` if the file cannot
    /// be probed.
    pub fn open(path: impl AsRef<Path>) -> VisionResult<Self> {
        let path = path.as_ref();
        which::which("ffmpeg").map_err(|_| VisionError::FfmpegNotFound)?;
        let info = probe_video(path)?;

        debug!(
            path = %path.display(),
            fps = info.fps,
            frames = info.frame_count,
            resolution = %info.resolution(),
            "Opened video source"
        );

        Ok(Self {
            path: path.to_path_buf(),
            info,
            child: None,
            stdout: None,
            next_index: 0,
        })
    }

    fn spawn_decoder(&mut self, start_frame: u64) -> VisionResult<()> {
        self.stop_decoder();

        let start_time = start_frame as f64 / self.info.fps;
        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-accurate_seek", "-ss"])
            .arg(format!("{start_time:.6}"))
            .arg("-i")
            .arg(&self.path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        self.stdout = child.stdout.take();
        self.child = Some(child);
        self.next_index = start_frame;
        Ok(())
    }

    fn stop_decoder(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn seek(&mut self, frame_index: u64) -> VisionResult<()> {
        self.spawn_decoder(frame_index)
    }

    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        if self.stdout.is_none() {
            self.spawn_decoder(self.next_index)?;
        }
        let stdout = self.stdout.as_mut().expect("decoder just spawned");

        let frame_bytes = self.info.width as usize * self.info.height as usize * 3;
        let mut buf = vec![0u8; frame_bytes];
        let mut read = 0usize;
        while read < frame_bytes {
            match stdout.read(&mut buf[read..]) {
                Ok(0) => break,
                Ok(n) => read += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if read == 0 {
            self.stop_decoder();
            return Ok(None);
        }
        if read < frame_bytes {
            return Err(VisionError::decode_failed(format!(
                "truncated frame: got {read} of {frame_bytes} bytes"
            )));
        }

        let pixels = RgbImage::from_raw(self.info.width, self.info.height, buf)
            .ok_or_else(|| VisionError::decode_failed("frame buffer size mismatch"))?;

        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(Frame {
            index,
            timestamp: index as f64 / self.info.fps,
            pixels,
        }))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        self.stop_decoder();
    }
}

/// In-memory frame source for tests and embedding.
pub struct MemorySource {
    info: VideoInfo,
    frames: Vec<RgbImage>,
    next_index: u64,
}

impl MemorySource {
    /// Build a source from pre-decoded frames. All frames must share the
    /// dimensions of the first.
    pub fn new(frames: Vec<RgbImage>, fps: f64) -> Self {
        let (width, height) = frames
            .first()
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0));
        let frame_count = frames.len() as u64;
        Self {
            info: VideoInfo {
                duration: frame_count as f64 / fps,
                width,
                height,
                fps,
                frame_count,
                codec: "rawvideo".to_string(),
            },
            frames,
            next_index: 0,
        }
    }
}

impl FrameSource for MemorySource {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn seek(&mut self, frame_index: u64) -> VisionResult<()> {
        self.next_index = frame_index;
        Ok(())
    }

    fn next_frame(&mut self) -> VisionResult<Option<Frame>> {
        let Some(pixels) = self.frames.get(self.next_index as usize) else {
            return Ok(None);
        };
        let index = self.next_index;
        self.next_index += 1;
        Ok(Some(Frame {
            index,
            timestamp: index as f64 / self.info.fps,
            pixels: pixels.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_frame(level: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([level, level, level]))
    }

    #[test]
    fn memory_source_reports_properties() {
        let source = MemorySource::new(vec![gray_frame(0); 60], 30.0);
        assert_eq!(source.info().frame_count, 60);
        assert_eq!(source.info().fps, 30.0);
        assert!((source.info().duration - 2.0).abs() < 1e-9);
    }

    #[test]
    fn memory_source_seeks_and_terminates() {
        let mut source = MemorySource::new(vec![gray_frame(0); 10], 30.0);
        source.seek(8).unwrap();
        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.index, 8);
        assert!((frame.timestamp - 8.0 / 30.0).abs() < 1e-9);
        assert!(source.next_frame().unwrap().is_some());
        assert!(source.next_frame().unwrap().is_none());
    }
}
