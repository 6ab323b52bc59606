use async_trait::async_trait;

use crate::{
    config::{SearchCredentials, SourceConfig},
    error::Result,
    images::{FixtureProvider, GoogleImageSearch, ImageAsset, Mode},
};

/// Source of the images that end up in the video
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Fetch up to `max_images` images for `keywords`.
    ///
    /// The returned assets are ordered by `order_index` and never longer than
    /// `max_images`. An empty result is reported as an error, never as an
    /// empty vector.
    async fn fetch(&self, keywords: &str, max_images: usize) -> Result<Vec<ImageAsset>>;
}

/// Build the provider for `mode`.
///
/// Production mode needs credentials; they are resolved by `credentials`
/// only when that mode is selected, so test runs never touch the environment.
pub fn provider_for<F>(mode: Mode, sources: &SourceConfig, credentials: F) -> Result<Box<dyn ImageProvider>>
where
    F: FnOnce() -> Result<SearchCredentials>,
{
    match mode {
        Mode::Test => Ok(Box::new(FixtureProvider::new(&sources.fixtures_dir))),
        Mode::Production => {
            let credentials = credentials()?;
            Ok(Box::new(GoogleImageSearch::new(credentials, sources)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, GeneratorError};

    #[test]
    fn test_test_mode_does_not_resolve_credentials() {
        let provider = provider_for(Mode::Test, &SourceConfig::default(), || {
            panic!("credentials must not be read in test mode")
        })
        .unwrap();
        assert_eq!(provider.name(), "fixtures");
    }

    #[test]
    fn test_production_mode_requires_credentials() {
        let result = provider_for(Mode::Production, &SourceConfig::default(), || {
            Err(ConfigError::MissingKey { key: "GOOGLE_API_KEY".to_string() }.into())
        });
        assert!(matches!(
            result,
            Err(GeneratorError::Config(ConfigError::MissingKey { .. }))
        ));
    }

    #[test]
    fn test_production_mode_with_credentials() {
        let provider = provider_for(Mode::Production, &SourceConfig::default(), || {
            Ok(SearchCredentials::new("key", "cx"))
        })
        .unwrap();
        assert_eq!(provider.name(), "google-image-search");
    }
}
