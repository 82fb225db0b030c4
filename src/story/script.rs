use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StoryError, StoryResult};
use crate::story::model::{Segment, SegmentInput, segments_from_inputs};

/// JSON form of a story script: an ordered array of `{ "visual", "narration" }` objects.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Script {
    pub segments: Vec<SegmentInput>,
}

impl Script {
    /// Parse a script from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StoryError::malformed(format!("parse script JSON: {e}")))
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::malformed(format!("open script JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate and number the segments.
    pub fn validate(&self) -> StoryResult<Vec<Segment>> {
        segments_from_inputs(&self.segments)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/script.rs"]
mod tests;
