use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    images::{Mode, VideoFormat},
    video::TransitionStyle,
};

pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const GOOGLE_CX_VAR: &str = "GOOGLE_CX";

/// Parameters of a single run, built once from the command line
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub mode: Mode,
    pub format: VideoFormat,
    pub keywords: String,
    pub max_images: usize,
    pub output_path: PathBuf,
    /// Seconds each image stays on screen, transitions included
    pub image_duration: f64,
    /// Seconds adjacent images overlap while crossfading
    pub transition_duration: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Test,
            format: VideoFormat::Horizontal,
            keywords: "wizard of oz".to_string(),
            max_images: 5,
            output_path: PathBuf::from("output.mp4"),
            image_duration: 2.0,
            transition_duration: 1.0,
        }
    }
}

impl RunConfig {
    /// Validate the run parameters.
    ///
    /// A transition that is as long as the image duration is accepted here;
    /// the timeline clamps it.
    pub fn validate(&self) -> Result<()> {
        if self.max_images == 0 {
            return Err(invalid("max_images", self.max_images));
        }

        if !self.image_duration.is_finite() || self.image_duration <= 0.0 {
            return Err(invalid("duration", self.image_duration));
        }

        if !self.transition_duration.is_finite() || self.transition_duration < 0.0 {
            return Err(invalid("transition", self.transition_duration));
        }

        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey { key: "output".to_string() }.into());
        }

        Ok(())
    }
}

/// Credentials for the image search API
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub api_key: String,
    /// Custom search engine id
    pub cx: String,
}

impl std::fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("api_key", &"<redacted>")
            .field("cx", &self.cx)
            .finish()
    }
}

impl SearchCredentials {
    pub fn new<K: Into<String>, C: Into<String>>(api_key: K, cx: C) -> Self {
        Self {
            api_key: api_key.into(),
            cx: cx.into(),
        }
    }

    /// Read `GOOGLE_API_KEY` and `GOOGLE_CX` from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from any key/value source. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Result<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::MissingKey { key: key.to_string() }.into())
        };

        Ok(Self {
            api_key: read(GOOGLE_API_KEY_VAR)?,
            cx: read(GOOGLE_CX_VAR)?,
        })
    }
}

/// File-backed settings shared by every run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Encoder settings
    pub render: RenderConfig,

    /// Ken Burns motion settings
    pub motion: MotionConfig,

    /// Image source settings
    pub sources: SourceConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound { path: path.display().to_string() })?;

        let config: Config = toml::from_str(&content)
            .map_err(|_| ConfigError::ParseFailed { path: path.display().to_string() })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::InvalidValue {
                key: "config".to_string(),
                value: e.to_string()
            })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.motion.validate()?;
        self.sources.validate()?;
        Ok(())
    }
}

/// Encoder configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output frame rate
    pub fps: f64,

    /// FFmpeg video codec name
    pub codec: String,

    /// Encoder speed/quality preset
    pub preset: String,

    /// Constant rate factor (0-51, lower is better)
    pub crf: u8,

    /// Encoder threads
    pub threads: usize,

    /// Length of the shorter canvas side in pixels
    pub short_side: u32,

    /// FFmpeg executable name or path
    pub ffmpeg_binary: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 24.0,
            codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            threads: num_cpus::get().min(4),
            short_side: 1080,
            ffmpeg_binary: "ffmpeg".to_string(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<()> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(invalid("render.fps", self.fps));
        }

        if self.crf > 51 {
            return Err(invalid("render.crf", self.crf));
        }

        if self.threads == 0 {
            return Err(invalid("render.threads", self.threads));
        }

        if self.short_side < 16 || self.short_side % 2 != 0 {
            return Err(invalid("render.short_side", self.short_side));
        }

        if self.codec.trim().is_empty() {
            return Err(invalid("render.codec", &self.codec));
        }

        Ok(())
    }
}

/// Ken Burns zoom, pan and the look of transitions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Scale at the start of each clip
    pub zoom_start: f32,

    /// Scale at the end of each clip
    pub zoom_end: f32,

    /// Drift across the zoom headroom while zooming
    pub pan: bool,

    /// How one image hands over to the next
    pub transition_style: TransitionStyle,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            zoom_start: 1.0,
            zoom_end: 1.05,
            pan: true,
            transition_style: TransitionStyle::Crossfade,
        }
    }
}

impl MotionConfig {
    fn validate(&self) -> Result<()> {
        // Zooming below 1.0 would show the canvas edge
        for (key, value) in [("motion.zoom_start", self.zoom_start), ("motion.zoom_end", self.zoom_end)] {
            if !value.is_finite() || !(1.0..=4.0).contains(&value) {
                return Err(invalid(key, value));
            }
        }
        Ok(())
    }
}

/// Where the image providers read from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory of bundled images for test mode
    pub fixtures_dir: PathBuf,

    /// Image search endpoint
    pub search_endpoint: String,

    /// Safe search level passed to the search API
    pub safe_search: String,

    /// Image size filter passed to the search API
    pub image_size: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from("fixtures"),
            search_endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            safe_search: "medium".to_string(),
            image_size: "large".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl SourceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(invalid("sources.request_timeout_secs", self.request_timeout_secs));
        }

        if !self.search_endpoint.starts_with("http://") && !self.search_endpoint.starts_with("https://") {
            return Err(invalid("sources.search_endpoint", &self.search_endpoint));
        }

        Ok(())
    }
}

fn invalid<V: std::fmt::Display>(key: &str, value: V) -> crate::error::GeneratorError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
    .into()
}
