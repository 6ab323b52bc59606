use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::{
    error::{ConfigError, FetchError, Result},
    images::{ImageAsset, ImageProvider},
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];

/// Test-mode provider that reads a fixed directory of images.
///
/// Files are returned sorted by name so every run sees the same order.
/// Keywords are ignored.
pub struct FixtureProvider {
    dir: PathBuf,
}

impl FixtureProvider {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn is_image_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    async fn list_images(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.is_dir() {
            return Err(ConfigError::FileNotFound {
                path: self.dir.display().to_string(),
            }
            .into());
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut paths = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::is_image_file(&path) {
                paths.push(path);
            } else {
                debug!("Ignoring non-image fixture entry: {:?}", path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

#[async_trait]
impl ImageProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixtures"
    }

    async fn fetch(&self, _keywords: &str, max_images: usize) -> Result<Vec<ImageAsset>> {
        info!("Using test mode with bundled images from {:?}", self.dir);

        let paths = self.list_images().await?;
        if paths.is_empty() {
            return Err(FetchError::EmptyResult {
                query: self.dir.display().to_string(),
            }
            .into());
        }

        if paths.len() < max_images {
            warn!(
                "Requested {} images but only {} fixtures are available, using all of them",
                max_images,
                paths.len()
            );
        }

        let assets: Vec<ImageAsset> = paths
            .into_iter()
            .take(max_images)
            .enumerate()
            .map(|(index, path)| ImageAsset::from_file(path, index))
            .collect();

        for asset in &assets {
            debug!("   {}. {}", asset.order_index + 1, asset.label);
        }
        info!("Loaded {} test images", assets.len());

        Ok(assets)
    }
}
