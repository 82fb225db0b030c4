use std::path::{Path, PathBuf};

use crate::foundation::error::StoryResult;

/// Fade timing shared by the video and audio streams of one clip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FadeSpec {
    /// Length of the fade-in (starting at 0) and of the fade-out.
    pub duration_sec: f64,
    /// Where the fade-out begins. Never negative.
    pub fade_out_start_sec: f64,
}

impl FadeSpec {
    /// Fades for a clip of `clip_duration_sec`; the fade-out start is clamped to 0 when the
    /// clip is shorter than one fade.
    pub fn for_clip(clip_duration_sec: f64, fade_sec: f64) -> Self {
        Self {
            duration_sec: fade_sec,
            fade_out_start_sec: (clip_duration_sec - fade_sec).max(0.0),
        }
    }

    /// `ffmpeg` filter graph producing `[v]` and `[a]` from inputs 0 (image) and 1 (audio).
    pub fn filter_graph(&self) -> String {
        let d = fmt_secs(self.duration_sec);
        let st = fmt_secs(self.fade_out_start_sec);
        format!(
            "[0:v]fade=t=in:st=0:d={d},fade=t=out:st={st}:d={d}[v];\
             [1:a]afade=t=in:st=0:d={d},afade=t=out:st={st}:d={d}[a]"
        )
    }
}

/// Seconds formatted for ffmpeg option values.
pub fn fmt_secs(v: f64) -> String {
    format!("{v:.6}")
}

/// Everything needed to turn one still frame and one narration track into a clip.
#[derive(Clone, Debug, PartialEq)]
pub struct StillClipRequest {
    pub image: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub fade: FadeSpec,
    /// Hard cap on the output duration; equal to the probed audio duration.
    pub duration_sec: f64,
}

/// Probing, still-clip rendering and lossless concatenation.
///
/// Calls block until the underlying work finishes.
pub trait MediaEngine: Send + Sync {
    /// Duration of an audio file in seconds.
    fn probe_duration(&self, audio: &Path) -> StoryResult<f64>;

    /// Loop `req.image` over `req.audio` with fades, capped at `req.duration_sec`.
    fn render_still_clip(&self, req: &StillClipRequest) -> StoryResult<()>;

    /// Stream-copy every clip listed in a concat manifest into `output`.
    fn concat(&self, manifest: &Path, output: &Path) -> StoryResult<()>;
}

#[cfg(test)]
#[path = "../../tests/unit/encode/engine.rs"]
mod tests;
