use std::path::PathBuf;

use async_trait::async_trait;

use crate::{error::Result, video::RenderedVideo};

/// Writes narration for a video
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce a script for `prompt`, or `None` when scripting is switched off
    async fn generate_script(&self, prompt: &str) -> Result<Option<String>>;
}

/// Turns a script into an audio file
#[async_trait]
pub trait VoiceoverGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Synthesize `script`, returning the audio file, or `None` when disabled
    async fn generate_voiceover(&self, script: &str) -> Result<Option<PathBuf>>;
}

/// Publishes a finished video
#[async_trait]
pub trait VideoUploader: Send + Sync {
    fn name(&self) -> &str;

    /// Upload `video`, returning where it can be found, or `None` when disabled
    async fn upload_video(&self, video: &RenderedVideo) -> Result<Option<String>>;
}
