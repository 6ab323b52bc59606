//! # Pipeline Extensions
//!
//! Optional stages around the slideshow: script writing, voiceover and
//! publishing. Each stage is a capability trait so a backend can be plugged
//! into [`VideoGenerator`](crate::generator::VideoGenerator) without touching
//! the pipeline itself. Only the disabled backends ship with the crate.

pub mod disabled;
pub mod traits;

pub use disabled::{DisabledScript, DisabledUpload, DisabledVoiceover};
pub use traits::{ScriptGenerator, VideoUploader, VoiceoverGenerator};

/// The set of extension backends a generator runs with
pub struct Extensions {
    pub script: Box<dyn ScriptGenerator>,
    pub voiceover: Box<dyn VoiceoverGenerator>,
    pub uploader: Box<dyn VideoUploader>,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            script: Box::new(DisabledScript),
            voiceover: Box::new(DisabledVoiceover),
            uploader: Box::new(DisabledUpload),
        }
    }
}
