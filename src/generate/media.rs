use std::{path::PathBuf, sync::Arc};

use crate::{
    compose::frame::FrameComposer,
    foundation::{
        config::OpenAiConfig,
        error::{StoryError, StoryResult},
    },
    generate::{
        collab::{ImageFetcher, ImageGenerator, ImageSize, SpeechSynthesizer},
        openai::OpenAiClient,
        retry::RetryPolicy,
    },
    job::workspace::Workspace,
    story::model::Segment,
};

/// External services used to produce a segment's image and narration.
#[derive(Clone)]
pub struct Collaborators {
    pub images: Arc<dyn ImageGenerator>,
    pub fetcher: Arc<dyn ImageFetcher>,
    pub speech: Arc<dyn SpeechSynthesizer>,
}

impl Collaborators {
    /// Every role served by one OpenAI-compatible client.
    pub fn openai(client: Arc<OpenAiClient>) -> Self {
        Self {
            images: client.clone(),
            fetcher: client.clone(),
            speech: client,
        }
    }
}

/// Per-request generation parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaOptions {
    pub image_size: ImageSize,
    pub voice: String,
    pub style_instruction: String,
}

impl MediaOptions {
    pub fn from_config(cfg: &OpenAiConfig) -> Self {
        Self {
            image_size: cfg.image_size,
            voice: cfg.voice.clone(),
            style_instruction: cfg.style_instruction.clone(),
        }
    }
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self::from_config(&OpenAiConfig::default())
    }
}

/// Image and audio side of one segment, as persisted in the workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentArtifacts {
    pub index: u32,
    pub frame_path: PathBuf,
    pub audio_path: PathBuf,
}

/// Prompt sent to the image generator for a segment's visual description.
pub fn image_prompt(visual: &str, style_instruction: &str) -> String {
    format!("Context: {visual} | Instructions: {style_instruction}. DO NOT INCLUDE TEXT IN THE IMAGE")
}

/// Generates, composes and persists the frame and narration of each segment.
pub struct SegmentMediaGenerator {
    collab: Collaborators,
    composer: Box<dyn FrameComposer>,
    retry: RetryPolicy,
    options: MediaOptions,
}

impl SegmentMediaGenerator {
    pub fn new(
        collab: Collaborators,
        composer: Box<dyn FrameComposer>,
        retry: RetryPolicy,
        options: MediaOptions,
    ) -> Self {
        Self {
            collab,
            composer,
            retry,
            options,
        }
    }

    pub fn options(&self) -> &MediaOptions {
        &self.options
    }

    /// Writes `frames/<index>.png` then `audio/<index>.mp3`.
    ///
    /// The image is requested, fetched and composed before speech is requested. Errors are
    /// tagged with the segment index.
    #[tracing::instrument(skip_all, fields(segment = segment.index()))]
    pub fn generate(
        &mut self,
        segment: &Segment,
        workspace: &Workspace,
    ) -> StoryResult<SegmentArtifacts> {
        self.generate_inner(segment, workspace)
            .map_err(|e| e.at_segment(segment.index()))
    }

    fn generate_inner(
        &mut self,
        segment: &Segment,
        workspace: &Workspace,
    ) -> StoryResult<SegmentArtifacts> {
        let index = segment.index();
        let prompt = image_prompt(segment.visual_prompt(), &self.options.style_instruction);

        let images = &self.collab.images;
        let size = self.options.image_size;
        let reference = self
            .retry
            .run("image generation", || images.generate(&prompt, size))?
            .ok_or_else(|| StoryError::generation("image generator returned no image"))?;

        let fetcher = &self.collab.fetcher;
        let image_bytes = self
            .retry
            .run("image fetch", || fetcher.fetch(&reference))?;
        if image_bytes.is_empty() {
            return Err(StoryError::generation("fetched image is empty"));
        }

        let frame = self
            .composer
            .compose_frame(&image_bytes, segment.narration_text())?;
        let frame_path = workspace.frame_path(index);
        write_artifact(&frame_path, &frame)?;

        let speech = &self.collab.speech;
        let voice = self.options.voice.as_str();
        let audio = self.retry.run("speech synthesis", || {
            speech.synthesize(segment.narration_text(), voice)
        })?;
        if audio.is_empty() {
            return Err(StoryError::generation("speech synthesizer returned no audio"));
        }
        let audio_path = workspace.audio_path(index);
        write_artifact(&audio_path, &audio)?;

        tracing::info!(
            frame = %frame_path.display(),
            audio = %audio_path.display(),
            "segment media ready"
        );
        Ok(SegmentArtifacts {
            index,
            frame_path,
            audio_path,
        })
    }
}

fn write_artifact(path: &std::path::Path, bytes: &[u8]) -> StoryResult<()> {
    std::fs::write(path, bytes)
        .map_err(|e| StoryError::workspace(format!("write '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/generate/media.rs"]
mod tests;
