use std::path::PathBuf;

use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::{config::RenderConfig, images::VideoFormat};

/// Represents a single video frame
///
/// This is a simple wrapper around an RGB image buffer; every frame handed to
/// the encoder has the canvas resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with black
    pub fn new_black(width: u32, height: u32) -> Self {
        let buffer = ImageBuffer::new(width, height);
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Packed RGB24 bytes, row by row
    pub fn as_rgb_bytes(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    /// Linear blend towards `other`: `alpha` 0.0 yields `self`, 1.0 yields `other`.
    ///
    /// Both frames must have the same dimensions.
    pub fn blend(&self, other: &Frame, alpha: f32) -> Frame {
        debug_assert_eq!(self.dimensions(), other.dimensions());

        let alpha = alpha.clamp(0.0, 1.0);
        let keep = 1.0 - alpha;
        let data: Vec<u8> = self
            .buffer
            .as_raw()
            .iter()
            .zip(other.buffer.as_raw())
            .map(|(&a, &b)| (a as f32 * keep + b as f32 * alpha).round() as u8)
            .collect();

        let (width, height) = self.dimensions();
        // Same length as the source buffer, so from_raw cannot fail
        Frame::new(ImageBuffer::from_raw(width, height, data).unwrap_or_else(|| RgbImage::new(width, height)))
    }

    /// Scale every channel by `brightness`; 0.0 is black, 1.0 is unchanged
    pub fn fade(&self, brightness: f32) -> Frame {
        let brightness = brightness.clamp(0.0, 1.0);
        let mut buffer = self.buffer.clone();
        for value in buffer.iter_mut() {
            *value = (*value as f32 * brightness).round() as u8;
        }
        Frame::new(buffer)
    }
}

/// Encoder parameters for one output video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoParams {
    /// Output frame rate
    pub fps: f64,

    /// Output resolution (width, height)
    pub resolution: (u32, u32),

    /// Video codec to use for output
    pub codec: String,

    /// Encoder preset
    pub preset: String,

    /// Constant rate factor
    pub crf: u8,

    /// Encoder threads
    pub threads: usize,
}

impl VideoParams {
    pub fn from_render_config(render: &RenderConfig, format: VideoFormat) -> Self {
        Self {
            fps: render.fps,
            resolution: format.resolution(render.short_side),
            codec: render.codec.clone(),
            preset: render.preset.clone(),
            crf: render.crf,
            threads: render.threads,
        }
    }

    /// Seconds between two frames
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.fps
    }
}

impl Default for VideoParams {
    fn default() -> Self {
        Self::from_render_config(&RenderConfig::default(), VideoFormat::Horizontal)
    }
}

/// Summary of a finished render
#[derive(Debug, Clone)]
pub struct RenderedVideo {
    pub path: PathBuf,
    /// Seconds of video
    pub duration: f64,
    pub frame_count: usize,
    pub clip_count: usize,
    /// Bytes on disk, zero when nothing was written to a file
    pub file_size: u64,
}
