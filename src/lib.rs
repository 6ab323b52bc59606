//! # Image-Reel
//!
//! Turn a keyword query into a slideshow video of matching images, with a slow
//! zoom-and-pan on every image and a transition between each pair.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use image_reel::{
//!     config::{Config, RunConfig},
//!     images::provider_for,
//!     config::SearchCredentials,
//!     VideoGenerator,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let run = RunConfig::default();
//! let config = Config::default();
//! let provider = provider_for(run.mode, &config.sources, SearchCredentials::from_env)?;
//!
//! let generator = VideoGenerator::new(run, config, provider)?;
//! let video = generator.run().await?;
//! println!("{} frames written to {:?}", video.frame_count, video.path);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`images`] - Image sources and normalization to the output canvas
//! - [`video`] - Timeline, motion effect and encoding
//! - [`generator`] - The end-to-end pipeline
//! - [`extensions`] - Optional script, voiceover and upload stages
//! - [`config`] - Configuration management
//!
//! ## Custom Image Sources
//!
//! Any type implementing [`ImageProvider`](images::ImageProvider) can feed the
//! generator:
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use image_reel::{images::{ImageAsset, ImageProvider}, Result};
//!
//! struct SingleImage;
//!
//! #[async_trait]
//! impl ImageProvider for SingleImage {
//!     fn name(&self) -> &str {
//!         "single"
//!     }
//!
//!     async fn fetch(&self, _keywords: &str, _max_images: usize) -> Result<Vec<ImageAsset>> {
//!         Ok(vec![ImageAsset::from_file("poster.jpg", 0)])
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod extensions;
pub mod generator;
pub mod images;
pub mod video;

// Re-export commonly used types for convenience
pub use crate::{
    config::{Config, RunConfig},
    error::{GeneratorError, Result},
    generator::VideoGenerator,
    images::ImageProvider,
};
