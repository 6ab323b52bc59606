use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::Result,
    extensions::{ScriptGenerator, VideoUploader, VoiceoverGenerator},
    video::RenderedVideo,
};

/// Scripting backend that never produces a script
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledScript;

#[async_trait]
impl ScriptGenerator for DisabledScript {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate_script(&self, _prompt: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Voiceover backend that never produces audio
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledVoiceover;

#[async_trait]
impl VoiceoverGenerator for DisabledVoiceover {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate_voiceover(&self, _script: &str) -> Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Upload backend that keeps the video local
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledUpload;

#[async_trait]
impl VideoUploader for DisabledUpload {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn upload_video(&self, _video: &RenderedVideo) -> Result<Option<String>> {
        Ok(None)
    }
}
