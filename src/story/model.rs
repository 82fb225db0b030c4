use serde::{Deserialize, Serialize};

use crate::foundation::error::{StoryError, StoryResult};

/// Longest accepted visual description, in characters.
pub const MAX_VISUAL_CHARS: usize = 120;
/// Longest accepted narration, in characters.
pub const MAX_NARRATION_CHARS: usize = 200;
/// Accepted length of a story idea, in characters.
pub const IDEA_CHARS: std::ops::RangeInclusive<usize> = 10..=200;

/// One visual + narration pair as submitted by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentInput {
    /// Description of the still image to generate.
    pub visual: String,
    /// Text spoken over the image and burned in as the caption.
    pub narration: String,
}

impl SegmentInput {
    pub fn new(visual: impl Into<String>, narration: impl Into<String>) -> Self {
        Self {
            visual: visual.into(),
            narration: narration.into(),
        }
    }
}

/// A validated segment with its 1-based render position.
///
/// Fields are private so a `Segment` can only come out of [`segments_from_inputs`], which
/// guarantees contiguous indices starting at 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    index: u32,
    visual_prompt: String,
    narration_text: String,
}

impl Segment {
    /// 1-based position in render and playback order.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn visual_prompt(&self) -> &str {
        &self.visual_prompt
    }

    pub fn narration_text(&self) -> &str {
        &self.narration_text
    }
}

/// Validate caller input and number it.
///
/// Rejects an empty list, blank fields and fields longer than the character bounds.
pub fn segments_from_inputs(inputs: &[SegmentInput]) -> StoryResult<Vec<Segment>> {
    if inputs.is_empty() {
        return Err(StoryError::malformed("segment list must not be empty"));
    }

    let mut out = Vec::with_capacity(inputs.len());
    for (i, input) in inputs.iter().enumerate() {
        let index = u32::try_from(i + 1)
            .map_err(|_| StoryError::malformed("too many segments"))?;
        check_field("visual", &input.visual, MAX_VISUAL_CHARS)
            .map_err(|e| e.at_segment(index))?;
        check_field("narration", &input.narration, MAX_NARRATION_CHARS)
            .map_err(|e| e.at_segment(index))?;
        out.push(Segment {
            index,
            visual_prompt: input.visual.clone(),
            narration_text: input.narration.clone(),
        });
    }
    Ok(out)
}

fn check_field(name: &str, value: &str, max_chars: usize) -> StoryResult<()> {
    if value.trim().is_empty() {
        return Err(StoryError::malformed(format!("{name} must not be blank")));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(StoryError::malformed(format!(
            "{name} is {len} characters, limit is {max_chars}"
        )));
    }
    Ok(())
}

/// Trim a story idea and check it against [`IDEA_CHARS`].
pub fn validate_idea(idea: &str) -> StoryResult<&str> {
    let idea = idea.trim();
    let len = idea.chars().count();
    if !IDEA_CHARS.contains(&len) {
        return Err(StoryError::malformed(format!(
            "idea is {len} characters, expected {} to {}",
            IDEA_CHARS.start(),
            IDEA_CHARS.end()
        )));
    }
    Ok(idea)
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
