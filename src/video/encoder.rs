use std::ffi::OsString;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::{RenderError, Result};
use crate::video::types::{Frame, VideoParams};

/// Destination for rendered frames
pub trait FrameSink {
    /// Append one frame to the output
    fn write_frame(&mut self, frame: &Frame) -> Result<()>;

    /// Flush and close the output. No frames may be written afterwards.
    fn finish(&mut self) -> Result<()>;
}

/// Encodes frames by piping raw RGB into an `ffmpeg` child process.
///
/// The output file only survives a successful [`finish`](FrameSink::finish);
/// on any failure, or if the encoder is dropped early, the process is killed
/// and the incomplete file removed.
pub struct FfmpegEncoder {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    output_path: PathBuf,
    frame_size: usize,
    frames_written: usize,
}

impl FfmpegEncoder {
    pub fn is_available(binary: &str) -> bool {
        Command::new(binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Command line for encoding raw RGB24 frames from stdin into `output_path`
    pub fn build_args(params: &VideoParams, output_path: &Path) -> Vec<OsString> {
        let (width, height) = params.resolution;
        let size = format!("{}x{}", width, height);
        let fps = params.fps.to_string();
        let crf = params.crf.to_string();
        let threads = params.threads.to_string();

        let mut args: Vec<OsString> = [
            "-hide_banner", "-loglevel", "error", "-y",
            "-f", "rawvideo",
            "-pix_fmt", "rgb24",
            "-s:v", size.as_str(),
            "-r", fps.as_str(),
            "-i", "-",
            "-an",
            "-c:v", params.codec.as_str(),
            "-preset", params.preset.as_str(),
            "-crf", crf.as_str(),
            "-pix_fmt", "yuv420p",
            "-threads", threads.as_str(),
            // Same input, same bytes
            "-fflags", "+bitexact",
            "-flags:v", "+bitexact",
            "-map_metadata", "-1",
        ]
        .iter()
        .map(OsString::from)
        .collect();

        let extension = output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if matches!(extension.as_str(), "mp4" | "mov" | "m4v") {
            args.push("-movflags".into());
            args.push("+faststart".into());
        }

        args.push(output_path.as_os_str().to_owned());
        args
    }

    pub fn spawn<P: AsRef<Path>>(binary: &str, params: &VideoParams, output_path: P) -> Result<Self> {
        let output_path = output_path.as_ref().to_path_buf();
        let (width, height) = params.resolution;

        if width % 2 != 0 || height % 2 != 0 {
            return Err(RenderError::InvalidParameters {
                details: format!("yuv420p needs even dimensions, got {}x{}", width, height),
            }
            .into());
        }

        let args = Self::build_args(params, &output_path);
        debug!("Spawning {} {:?}", binary, args);

        let mut child = Command::new(binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    RenderError::EncoderUnavailable { binary: binary.to_string() }
                } else {
                    RenderError::EncodingFailed { reason: format!("failed to spawn {}: {}", binary, e) }
                }
            })?;

        let stdin = match child.stdin.take() {
            Some(stdin) => stdin,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RenderError::EncodingFailed {
                    reason: "failed to capture encoder stdin".to_string(),
                }
                .into());
            }
        };

        info!("Encoding {}x{} @ {} fps with {} ({})",
              width, height, params.fps, params.codec, params.preset);

        Ok(Self {
            child: Some(child),
            stdin: Some(stdin),
            output_path,
            frame_size: width as usize * height as usize * 3,
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    fn abort(&mut self) {
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            self.discard_output();
        }
    }

    fn discard_output(&self) {
        if !self.output_path.exists() {
            return;
        }

        match std::fs::remove_file(&self.output_path) {
            Ok(()) => debug!("Removed incomplete output {:?}", self.output_path),
            Err(e) => warn!("Failed to remove incomplete output {:?}: {}", self.output_path, e),
        }
    }
}

impl FrameSink for FfmpegEncoder {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let bytes = frame.as_rgb_bytes();
        if bytes.len() != self.frame_size {
            return Err(RenderError::InvalidParameters {
                details: format!("frame is {} bytes, encoder expects {}", bytes.len(), self.frame_size),
            }
            .into());
        }

        let stdin = self.stdin.as_mut().ok_or_else(|| RenderError::EncodingFailed {
            reason: "encoder already finished".to_string(),
        })?;

        stdin.write_all(bytes).map_err(|e| RenderError::EncodingFailed {
            reason: format!("encoder stopped accepting frames after {}: {}", self.frames_written, e),
        })?;

        self.frames_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin.flush().map_err(|e| RenderError::EncodingFailed {
                reason: format!("failed to flush encoder input: {}", e),
            })?;
        }

        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        let status = match child.wait() {
            Ok(status) => status,
            Err(e) => {
                self.discard_output();
                return Err(RenderError::EncodingFailed {
                    reason: format!("failed waiting for encoder: {}", e),
                }
                .into());
            }
        };

        if !status.success() {
            self.discard_output();
            return Err(RenderError::EncodingFailed {
                reason: format!("encoder exited with {}", status),
            }
            .into());
        }

        debug!("Encoder finished after {} frames", self.frames_written);
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        self.abort();
    }
}

/// Keeps every frame in memory
#[cfg(test)]
#[derive(Default)]
pub(crate) struct CollectingSink {
    pub frames: Vec<Frame>,
    pub finished: bool,
}

#[cfg(test)]
impl FrameSink for CollectingSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        assert!(!self.finished, "frame written after finish");
        self.frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
