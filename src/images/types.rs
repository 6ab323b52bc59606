use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Where images come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Bundled fixture images, no network access
    Test,
    /// Live image search
    Production,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Test => write!(f, "test"),
            Mode::Production => write!(f, "production"),
        }
    }
}

/// Output orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    /// 16:9
    Horizontal,
    /// 9:16
    Vertical,
}

impl VideoFormat {
    /// Canvas size for this orientation given the length of the short side.
    ///
    /// The long side is rounded down to an even number so the result is
    /// always valid for 4:2:0 chroma subsampling.
    pub fn resolution(&self, short_side: u32) -> (u32, u32) {
        let long_side = (short_side as u64 * 16 / 9) as u32 & !1;
        match self {
            VideoFormat::Horizontal => (long_side, short_side),
            VideoFormat::Vertical => (short_side, long_side),
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoFormat::Horizontal => write!(f, "horizontal (16:9)"),
            VideoFormat::Vertical => write!(f, "vertical (9:16)"),
        }
    }
}

/// Raw image data as handed over by a provider
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on disk
    File(PathBuf),
    /// Encoded image downloaded into memory
    Bytes(Vec<u8>),
}

/// A single image in the order it was fetched
///
/// The order index is assigned by the provider and never changes afterwards;
/// clips are laid out on the timeline in this order.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub source: ImageSource,
    pub order_index: usize,
    /// File name or URL, used in log messages
    pub label: String,
}

impl ImageAsset {
    pub fn from_file<P: Into<PathBuf>>(path: P, order_index: usize) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Self {
            source: ImageSource::File(path),
            order_index,
            label,
        }
    }

    pub fn from_bytes<S: Into<String>>(bytes: Vec<u8>, order_index: usize, label: S) -> Self {
        Self {
            source: ImageSource::Bytes(bytes),
            order_index,
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_hd_resolutions() {
        assert_eq!(VideoFormat::Horizontal.resolution(1080), (1920, 1080));
        assert_eq!(VideoFormat::Vertical.resolution(1080), (1080, 1920));
        assert_eq!(VideoFormat::Horizontal.resolution(720), (1280, 720));
    }

    #[test]
    fn test_long_side_is_even() {
        let (width, height) = VideoFormat::Horizontal.resolution(100);
        assert_eq!(width % 2, 0);
        assert_eq!(height, 100);
        assert_eq!(width, 176);
    }

    #[test]
    fn test_asset_label_from_file_name() {
        let asset = ImageAsset::from_file("/tmp/fixtures/02_castle.png", 1);
        assert_eq!(asset.label, "02_castle.png");
        assert_eq!(asset.order_index, 1);
        assert!(matches!(asset.source, ImageSource::File(_)));
    }
}
