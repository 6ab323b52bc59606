//! # Video Assembly Module
//!
//! Lays normalized images out on a timeline, animates them and encodes the
//! result.

pub mod assembler;
pub mod effects;
pub mod encoder;
pub mod timeline;
pub mod types;

pub use assembler::{RenderSummary, Slide, VideoAssembler};
pub use effects::{KenBurns, PanPath, TransitionStyle};
pub use encoder::{FfmpegEncoder, FrameSink};
pub use timeline::{Clip, FrameSample, Timeline};
pub use types::{Frame, RenderedVideo, VideoParams};
