//! # Image Sourcing Module
//!
//! Retrieves the still images a video is built from and fits them onto the
//! output canvas.
//!
//! ## Core Features
//!
//! - **Providers**: bundled fixtures for offline runs, Google Custom Search for real ones
//! - **Normalization**: uniform cover-scaling and center cropping to 16:9 or 9:16
//!
//! ## Usage
//!
//! ```rust,no_run
//! use image_reel::images::{FixtureProvider, ImageNormalizer, ImageProvider, VideoFormat};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let provider = FixtureProvider::new("fixtures");
//! let assets = provider.fetch("ignored in test mode", 3).await?;
//!
//! let normalizer = ImageNormalizer::new(VideoFormat::Horizontal.resolution(1080));
//! for asset in &assets {
//!     let frame = normalizer.normalize(asset)?;
//!     println!("{} -> {}x{}", asset.label, frame.width(), frame.height());
//! }
//! # Ok(())
//! # }
//! ```

pub mod fixture;
pub mod normalizer;
pub mod provider;
pub mod search;
pub mod types;

pub use fixture::FixtureProvider;
pub use normalizer::ImageNormalizer;
pub use provider::{provider_for, ImageProvider};
pub use search::GoogleImageSearch;
pub use types::{ImageAsset, ImageSource, Mode, VideoFormat};
