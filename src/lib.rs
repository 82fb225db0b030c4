//! storyreel turns an ordered list of story segments into one narrated video.
//!
//! Each segment is a visual description plus a line of narration. For every segment the
//! pipeline:
//!
//! - generates an image and composes a 1280x720 frame with the narration burned in
//! - synthesizes the narration audio
//! - encodes a clip that lasts exactly as long as the audio, with fades
//!
//! and then concatenates the clips losslessly into `output/output.mp4` inside a per-job
//! workspace. Start from [`StoryPipeline`] or the `storyreel` binary.
#![forbid(unsafe_code)]

/// Caption layout and frame rendering.
pub mod compose;
/// Clip encoding and assembly.
pub mod encode;
/// Errors, configuration and shared primitives.
pub mod foundation;
/// Collaborators for images, speech and story text.
pub mod generate;
/// Job identity and workspace layout.
pub mod job;
/// End-to-end render orchestration.
pub mod pipeline;
/// Story segments and script files.
pub mod story;

pub use crate::compose::frame::{FrameComposer, FrameCompositor};
pub use crate::encode::engine::MediaEngine;
pub use crate::encode::ffmpeg::FfmpegEngine;
pub use crate::foundation::config::PipelineConfig;
pub use crate::foundation::core::{Canvas, Rgba8};
pub use crate::foundation::error::{StoryError, StoryResult};
pub use crate::generate::collab::{
    ImageFetcher, ImageGenerator, ImageReference, ImageSize, SpeechSynthesizer, StoryWriter,
};
pub use crate::generate::media::Collaborators;
pub use crate::generate::openai::OpenAiClient;
pub use crate::job::workspace::{Job, JobId, JobManager, Workspace};
pub use crate::pipeline::{RenderReport, StoryPipeline};
pub use crate::story::model::{Segment, SegmentInput};
pub use crate::story::script::Script;
