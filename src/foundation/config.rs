//! Pipeline configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) yields a working
//! configuration as long as an API key and a caption font can be found.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{StoryError, StoryResult};
use crate::generate::collab::ImageSize;

/// Environment variable overriding [`PipelineConfig::workspace_root`].
pub const ENV_WORKSPACE: &str = "STORYREEL_WORKSPACE";
/// Environment variable overriding [`FrameConfig::font_path`].
pub const ENV_FONT: &str = "STORYREEL_FONT";

/// Workspace base used when neither the config file nor the environment names one.
pub const DEFAULT_WORKSPACE_ROOT: &str = "storyreel-jobs";

/// Top-level configuration for a render pipeline.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory under which each job gets its own `<job_id>/` workspace.
    pub workspace_root: PathBuf,
    pub frame: FrameConfig,
    pub encode: EncodeConfig,
    pub openai: OpenAiConfig,
    pub retry: RetryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            frame: FrameConfig::default(),
            encode: EncodeConfig::default(),
            openai: OpenAiConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Caption and canvas styling for the frame compositor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    pub canvas: Canvas,
    /// TTF/OTF used for captions. When unset, well-known system font directories are searched.
    pub font_path: Option<PathBuf>,
    pub font_size_px: f32,
    /// Line advance as a multiple of `font_size_px`.
    pub line_height_ratio: f32,
    /// Gap between the last caption line's block and the bottom edge.
    pub bottom_margin_px: f32,
    /// Maximum caption line width as a fraction of the canvas width.
    pub max_text_width_ratio: f32,
    pub stroke_width_px: f32,
    pub fill: Rgba8,
    pub stroke: Rgba8,
    /// Color behind the scaled image; only visible where the source image is translucent.
    pub background: Rgba8,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::HD_720,
            font_path: None,
            font_size_px: 45.0,
            line_height_ratio: 1.2,
            bottom_margin_px: 30.0,
            max_text_width_ratio: 0.8,
            stroke_width_px: 4.0,
            fill: Rgba8::WHITE,
            stroke: Rgba8::BLACK,
            background: Rgba8::BLACK,
        }
    }
}

impl FrameConfig {
    pub fn line_height_px(&self) -> f32 {
        self.font_size_px * self.line_height_ratio
    }

    pub fn max_text_width_px(&self) -> f32 {
        self.canvas.width as f32 * self.max_text_width_ratio
    }
}

/// `ffmpeg`/`ffprobe` invocation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeConfig {
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    /// Length of every video and audio fade, in seconds.
    pub fade_sec: f64,
    pub video_codec: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Kill an `ffmpeg`/`ffprobe` child that runs longer than this.
    pub timeout_sec: Option<u64>,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            fade_sec: 0.5,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            timeout_sec: None,
        }
    }
}

/// OpenAI-compatible HTTP endpoints used for images, speech and story text.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiConfig {
    pub base_url: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    pub image_model: String,
    pub image_size: ImageSize,
    pub speech_model: String,
    pub voice: String,
    pub chat_model: String,
    pub request_timeout_sec: u64,
    /// Appended to every image prompt after the segment's visual description.
    pub style_instruction: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: ImageSize::Square1024,
            speech_model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            request_timeout_sec: 120,
            style_instruction: "for a kids story".to_string(),
        }
    }
}

/// Backoff policy for collaborator calls. One attempt means no retry.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 500,
            multiplier: 2.0,
            max_backoff_ms: 8_000,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StoryResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StoryError::malformed(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StoryResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StoryError::malformed(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Load from `path` when given, otherwise defaults; then apply environment overrides and
    /// validate.
    pub fn load(path: Option<&Path>) -> StoryResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_path(p)?,
            None => Self::default(),
        };
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `STORYREEL_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = std::env::var_os(ENV_WORKSPACE) {
            self.workspace_root = PathBuf::from(dir);
        }
        if let Some(font) = std::env::var_os(ENV_FONT) {
            self.frame.font_path = Some(PathBuf::from(font));
        }
    }

    /// Reject configurations the pipeline cannot honor.
    pub fn validate(&self) -> StoryResult<()> {
        let f = &self.frame;
        if f.canvas.width == 0 || f.canvas.height == 0 {
            return Err(StoryError::malformed("canvas width/height must be non-zero"));
        }
        if !f.canvas.width.is_multiple_of(2) || !f.canvas.height.is_multiple_of(2) {
            return Err(StoryError::malformed(
                "canvas width/height must be even (required for yuv420p mp4 output)",
            ));
        }
        if f.canvas.width > u32::from(u16::MAX) || f.canvas.height > u32::from(u16::MAX) {
            return Err(StoryError::malformed("canvas width/height must fit in u16"));
        }
        if f.background.0[3] != u8::MAX {
            return Err(StoryError::malformed("background must be fully opaque"));
        }
        if !f.font_size_px.is_finite() || f.font_size_px <= 0.0 {
            return Err(StoryError::malformed("font_size_px must be finite and > 0"));
        }
        if !f.line_height_ratio.is_finite() || f.line_height_ratio <= 0.0 {
            return Err(StoryError::malformed(
                "line_height_ratio must be finite and > 0",
            ));
        }
        if !(f.max_text_width_ratio > 0.0 && f.max_text_width_ratio <= 1.0) {
            return Err(StoryError::malformed(
                "max_text_width_ratio must be in (0, 1]",
            ));
        }
        if !f.stroke_width_px.is_finite() || f.stroke_width_px < 0.0 {
            return Err(StoryError::malformed(
                "stroke_width_px must be finite and >= 0",
            ));
        }
        if !self.encode.fade_sec.is_finite() || self.encode.fade_sec < 0.0 {
            return Err(StoryError::malformed("fade_sec must be finite and >= 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(StoryError::malformed("retry.max_attempts must be >= 1"));
        }
        if !self.retry.multiplier.is_finite() || self.retry.multiplier < 1.0 {
            return Err(StoryError::malformed("retry.multiplier must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
