//! Clip encoding and final assembly.
//!
//! All media work is delegated to a [`engine::MediaEngine`]; the shipped implementation drives
//! the system `ffmpeg`/`ffprobe` binaries.

/// Concatenation of segment clips into the final output.
pub mod assemble;
/// Per-segment still-image clips with fades.
pub mod clip;
/// Media engine contract.
pub mod engine;
/// `ffmpeg`/`ffprobe` process backend.
pub mod ffmpeg;
