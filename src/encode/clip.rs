use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    encode::engine::{FadeSpec, MediaEngine, StillClipRequest},
    foundation::error::{StoryError, StoryResult},
    job::workspace::Workspace,
};

/// One encoded segment clip, ready for assembly.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentClip {
    pub index: u32,
    pub path: PathBuf,
    /// Probed narration duration; the clip is capped to exactly this length.
    pub duration_sec: f64,
}

/// Turns a segment's frame and narration into `output/segment_<index>.mp4`.
#[derive(Clone)]
pub struct ClipEncoder {
    engine: Arc<dyn MediaEngine>,
    fade_sec: f64,
}

impl std::fmt::Debug for ClipEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipEncoder")
            .field("fade_sec", &self.fade_sec)
            .finish_non_exhaustive()
    }
}

impl ClipEncoder {
    pub fn new(engine: Arc<dyn MediaEngine>, fade_sec: f64) -> Self {
        Self { engine, fade_sec }
    }

    pub fn fade_sec(&self) -> f64 {
        self.fade_sec
    }

    /// Encode the clip for segment `index` from the frame and audio already in `workspace`.
    ///
    /// Errors are tagged with the segment index.
    #[tracing::instrument(skip(self, workspace), fields(root = %workspace.root().display()))]
    pub fn encode(&self, workspace: &Workspace, index: u32) -> StoryResult<SegmentClip> {
        self.encode_inner(workspace, index)
            .map_err(|e| e.at_segment(index))
    }

    fn encode_inner(&self, workspace: &Workspace, index: u32) -> StoryResult<SegmentClip> {
        let image = workspace.frame_path(index);
        let audio = workspace.audio_path(index);
        require_file(&image, "frame")?;
        require_file(&audio, "narration audio")?;

        let duration_sec = self.engine.probe_duration(&audio)?;
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(StoryError::probe(format!(
                "duration must be positive and finite, got {duration_sec}"
            )));
        }

        let req = StillClipRequest {
            image,
            audio,
            output: workspace.clip_path(index),
            fade: FadeSpec::for_clip(duration_sec, self.fade_sec),
            duration_sec,
        };
        self.engine.render_still_clip(&req)?;

        if !req.output.is_file() {
            return Err(StoryError::encode(format!(
                "encoder reported success but '{}' was not written",
                req.output.display()
            )));
        }

        tracing::info!(duration_sec, clip = %req.output.display(), "segment clip encoded");
        Ok(SegmentClip {
            index,
            path: req.output,
            duration_sec,
        })
    }
}

fn require_file(path: &Path, what: &str) -> StoryResult<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(StoryError::encode(format!(
            "{what} '{}' does not exist",
            path.display()
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/clip.rs"]
mod tests;
