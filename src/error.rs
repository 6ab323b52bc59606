use thiserror::Error;

/// Main error type for the image-reel library
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Image fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Image processing error: {0}")]
    Image(#[from] ImageError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic error: {0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration file: {path}")]
    ParseFailed { path: String },

    #[error("Invalid configuration value: {key} = {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

/// Errors raised while retrieving images from a provider
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Image search rejected the credentials: {reason}")]
    Authentication { reason: String },

    #[error("Image search request failed: {reason}")]
    Network { reason: String },

    #[error("No usable images for '{query}'")]
    EmptyResult { query: String },

    #[error("Image search returned an unreadable response: {reason}")]
    InvalidResponse { reason: String },
}

/// Per-image errors
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Unsupported or corrupt image '{source_name}': {reason}")]
    UnsupportedFormat { source_name: String, reason: String },
}

/// Encoder and assembly errors
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Encoder binary not found: {binary}")]
    EncoderUnavailable { binary: String },

    #[error("Video encoding failed: {reason}")]
    EncodingFailed { reason: String },

    #[error("Nothing to render: no frames were supplied")]
    NoFrames,

    #[error("Invalid render parameters: {details}")]
    InvalidParameters { details: String },
}

/// Convenience type alias for Results using GeneratorError
pub type Result<T> = std::result::Result<T, GeneratorError>;

impl GeneratorError {
    /// Create a generic error with a custom message
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Check if the pipeline can continue past this error.
    ///
    /// Only a single undecodable image is recoverable: the asset is skipped
    /// and the remaining images are still rendered.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Image(ImageError::UnsupportedFormat { .. }))
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(ConfigError::MissingKey { key }) => {
                format!("Missing required setting '{}'. Set it in the environment or a .env file.", key)
            }
            Self::Config(ConfigError::FileNotFound { path }) => {
                format!("'{}' not found.", path)
            }
            Self::Fetch(FetchError::Authentication { .. }) => {
                "The image search API rejected the request. Check GOOGLE_API_KEY and GOOGLE_CX.".to_string()
            }
            Self::Fetch(FetchError::EmptyResult { query }) => {
                format!("No usable images found for '{}'. Try different keywords.", query)
            }
            Self::Render(RenderError::EncoderUnavailable { binary }) => {
                format!("Could not run '{}'. Please install FFmpeg and make sure it is on PATH.", binary)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unsupported_images_are_recoverable() {
        let skip: GeneratorError = ImageError::UnsupportedFormat {
            source_name: "broken.png".to_string(),
            reason: "bad header".to_string(),
        }
        .into();
        assert!(skip.is_recoverable());

        let fatal: Vec<GeneratorError> = vec![
            FetchError::Network { reason: "timeout".to_string() }.into(),
            FetchError::Authentication { reason: "403".to_string() }.into(),
            FetchError::EmptyResult { query: "cats".to_string() }.into(),
            RenderError::NoFrames.into(),
            ConfigError::MissingKey { key: "GOOGLE_CX".to_string() }.into(),
        ];
        for error in fatal {
            assert!(!error.is_recoverable(), "{error} should be fatal");
        }
    }

    #[test]
    fn test_user_messages() {
        let missing: GeneratorError = ConfigError::MissingKey { key: "GOOGLE_API_KEY".to_string() }.into();
        assert!(missing.user_message().contains("GOOGLE_API_KEY"));

        let encoder: GeneratorError = RenderError::EncoderUnavailable { binary: "ffmpeg".to_string() }.into();
        assert!(encoder.user_message().contains("install FFmpeg"));

        let generic = GeneratorError::generic("boom");
        assert_eq!(generic.user_message(), "Generic error: boom");
    }
}
