//! # Video Generator
//!
//! The generator drives one run end to end: it fetches images from a
//! provider, normalizes them to the canvas and hands them to the assembler.

pub mod engine;

// Re-exports for convenience
pub use engine::VideoGenerator;
