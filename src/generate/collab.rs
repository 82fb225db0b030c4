use std::str::FromStr;

use base64::Engine as _;

use crate::foundation::error::{StoryError, StoryResult};

/// Output size requested from the image generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Square256,
    #[serde(rename = "512x512")]
    Square512,
    #[default]
    #[serde(rename = "1024x1024")]
    Square1024,
    #[serde(rename = "1792x1024")]
    Landscape1792,
    #[serde(rename = "1024x1792")]
    Portrait1792,
}

impl ImageSize {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square256 => "256x256",
            Self::Square512 => "512x512",
            Self::Square1024 => "1024x1024",
            Self::Landscape1792 => "1792x1024",
            Self::Portrait1792 => "1024x1792",
        }
    }
}

impl FromStr for ImageSize {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Square256,
            Self::Square512,
            Self::Square1024,
            Self::Landscape1792,
            Self::Portrait1792,
        ]
        .into_iter()
        .find(|size| size.as_str() == s)
        .ok_or_else(|| StoryError::malformed(format!("unsupported image size '{s}'")))
    }
}

/// Where a generated image can be obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageReference {
    Url(String),
    /// Standard base64 encoded image file bytes.
    Base64(String),
}

impl ImageReference {
    /// Decodes inline data; `None` for URLs.
    pub fn decode_inline(&self) -> Option<StoryResult<Vec<u8>>> {
        match self {
            Self::Url(_) => None,
            Self::Base64(data) => Some(
                base64::engine::general_purpose::STANDARD
                    .decode(data.trim())
                    .map_err(|e| StoryError::generation(format!("invalid inline image data: {e}"))),
            ),
        }
    }
}

/// Text-to-image service.
pub trait ImageGenerator: Send + Sync {
    /// `Ok(None)` means the service answered without an image.
    fn generate(&self, prompt: &str, size: ImageSize) -> StoryResult<Option<ImageReference>>;
}

/// Resolves an [`ImageReference`] to encoded image bytes.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, reference: &ImageReference) -> StoryResult<Vec<u8>>;
}

/// Text-to-speech service returning encoded (mp3) audio.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, voice: &str) -> StoryResult<Vec<u8>>;
}

/// Writes a short story from a one-line idea.
pub trait StoryWriter: Send + Sync {
    fn write_story(&self, idea: &str) -> StoryResult<String>;
}

#[cfg(test)]
#[path = "../../tests/unit/generate/collab.rs"]
mod tests;
