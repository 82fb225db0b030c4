use std::{io::Write as _, path::PathBuf, sync::Arc};

use anyhow::Context as _;

use crate::{
    encode::{clip::SegmentClip, engine::MediaEngine},
    foundation::error::{StoryError, StoryResult},
    job::workspace::Workspace,
};

/// Concatenates segment clips into `output/output.mp4` and removes the temporaries.
#[derive(Clone)]
pub struct VideoAssembler {
    engine: Arc<dyn MediaEngine>,
}

impl std::fmt::Debug for VideoAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoAssembler").finish_non_exhaustive()
    }
}

impl VideoAssembler {
    pub fn new(engine: Arc<dyn MediaEngine>) -> Self {
        Self { engine }
    }

    /// Writes the concat manifest, stream-copies every clip into the final output and, only
    /// once that succeeded, deletes the clips and the manifest.
    ///
    /// `clips` must be numbered `1..=n` (in any order); they are always joined by index.
    #[tracing::instrument(skip(self, workspace, clips), fields(clips = clips.len()))]
    pub fn assemble(&self, workspace: &Workspace, clips: &[SegmentClip]) -> StoryResult<PathBuf> {
        let ordered = ordered_clips(clips)?;
        for clip in &ordered {
            if !clip.path.is_file() {
                return Err(StoryError::assembly(format!(
                    "clip for segment {} is missing at '{}'",
                    clip.index,
                    clip.path.display()
                )));
            }
        }

        let manifest = workspace.manifest_path();
        write_manifest(&manifest, &ordered)
            .map_err(|e| StoryError::assembly(format!("{e:#}")))?;

        let output = workspace.output_path();
        self.engine.concat(&manifest, &output).map_err(|e| match e {
            e @ StoryError::Assembly(_) => e,
            other => StoryError::assembly(other.to_string()),
        })?;
        if !output.is_file() {
            return Err(StoryError::assembly(format!(
                "concat reported success but '{}' was not written",
                output.display()
            )));
        }

        for clip in &ordered {
            std::fs::remove_file(&clip.path).map_err(|e| {
                StoryError::assembly(format!(
                    "remove clip '{}': {e}",
                    clip.path.display()
                ))
            })?;
        }
        std::fs::remove_file(&manifest).map_err(|e| {
            StoryError::assembly(format!("remove manifest '{}': {e}", manifest.display()))
        })?;

        tracing::info!(output = %output.display(), "video assembled");
        Ok(output)
    }
}

/// One concat-demuxer line, single-quote escaped.
pub fn manifest_line(file_name: &str) -> String {
    format!("file '{}'", file_name.replace('\'', r"'\''"))
}

fn ordered_clips(clips: &[SegmentClip]) -> StoryResult<Vec<&SegmentClip>> {
    if clips.is_empty() {
        return Err(StoryError::assembly("no clips to assemble"));
    }
    let mut ordered: Vec<&SegmentClip> = clips.iter().collect();
    ordered.sort_by_key(|c| c.index);
    for (expected, clip) in (1u32..).zip(&ordered) {
        if clip.index != expected {
            return Err(StoryError::assembly(format!(
                "clip indices must be contiguous from 1; expected {expected}, found {}",
                clip.index
            )));
        }
    }
    Ok(ordered)
}

fn write_manifest(path: &std::path::Path, clips: &[&SegmentClip]) -> anyhow::Result<()> {
    let mut body = String::new();
    for clip in clips {
        let name = clip
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("clip path '{}' has no file name", clip.path.display()))?;
        body.push_str(&manifest_line(name));
        body.push('\n');
    }

    let mut f = std::fs::File::create(path)
        .with_context(|| format!("create manifest '{}'", path.display()))?;
    f.write_all(body.as_bytes())
        .with_context(|| format!("write manifest '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/assemble.rs"]
mod tests;
