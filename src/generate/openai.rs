use std::time::Duration;

use anyhow::Context as _;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::{
    foundation::{
        config::OpenAiConfig,
        error::{StoryError, StoryResult},
    },
    generate::collab::{
        ImageFetcher, ImageGenerator, ImageReference, ImageSize, SpeechSynthesizer, StoryWriter,
    },
    story::model::validate_idea,
};

const STORY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that writes children's stories as paragraphs.";
const STORY_MAX_TOKENS: u32 = 200;

/// Blocking client for OpenAI-compatible image, speech and chat endpoints.
///
/// One value implements every collaborator trait; share it behind an `Arc`.
pub struct OpenAiClient {
    http: Client,
    cfg: OpenAiConfig,
    api_key: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.cfg.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// Reads the bearer token from the environment variable named by `cfg.api_key_env`.
    pub fn from_config(cfg: &OpenAiConfig) -> StoryResult<Self> {
        let api_key = std::env::var(&cfg.api_key_env).map_err(|_| {
            StoryError::Other(anyhow::anyhow!(
                "{} is not set (needed for image, speech and story generation)",
                cfg.api_key_env
            ))
        })?;
        Self::new(cfg.clone(), api_key)
    }

    pub fn new(cfg: OpenAiConfig, api_key: impl Into<String>) -> StoryResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_sec))
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            cfg,
            api_key: api_key.into(),
        })
    }

    pub fn config(&self) -> &OpenAiConfig {
        &self.cfg
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.cfg.base_url.trim_end_matches('/'))
    }

    fn post_json(&self, what: &str, path: &str, body: &serde_json::Value) -> StoryResult<Response> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "{what} request");
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .map_err(|e| StoryError::generation(format!("{what} request failed: {e}")))?;
        ensure_success(what, res)
    }
}

fn ensure_success(what: &str, res: Response) -> StoryResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().unwrap_or_default();
    Err(StoryError::generation(format!(
        "{what} failed: {status}: {}",
        text.trim()
    )))
}

impl ImageGenerator for OpenAiClient {
    #[tracing::instrument(level = "debug", skip(self, prompt))]
    fn generate(&self, prompt: &str, size: ImageSize) -> StoryResult<Option<ImageReference>> {
        let body = json!({
            "model": self.cfg.image_model,
            "prompt": prompt,
            "n": 1,
            "size": size.as_str(),
        });
        let res = self.post_json("image generation", "images/generations", &body)?;
        let raw = res
            .bytes()
            .map_err(|e| StoryError::generation(format!("read image response: {e}")))?;
        parse_image_response(&raw)
    }
}

impl ImageFetcher for OpenAiClient {
    fn fetch(&self, reference: &ImageReference) -> StoryResult<Vec<u8>> {
        if let Some(decoded) = reference.decode_inline() {
            return decoded;
        }
        let ImageReference::Url(url) = reference else {
            return Err(StoryError::generation("unsupported image reference"));
        };

        let res = self
            .http
            .get(url)
            .send()
            .map_err(|e| StoryError::generation(format!("image download failed: {e}")))?;
        let bytes = ensure_success("image download", res)?
            .bytes()
            .map_err(|e| StoryError::generation(format!("read image download: {e}")))?;
        if bytes.is_empty() {
            return Err(StoryError::generation("image download returned no bytes"));
        }
        Ok(bytes.to_vec())
    }
}

impl SpeechSynthesizer for OpenAiClient {
    #[tracing::instrument(level = "debug", skip(self, text), fields(chars = text.chars().count()))]
    fn synthesize(&self, text: &str, voice: &str) -> StoryResult<Vec<u8>> {
        let body = json!({
            "model": self.cfg.speech_model,
            "input": text,
            "voice": voice,
            "response_format": "mp3",
        });
        let bytes = self
            .post_json("speech synthesis", "audio/speech", &body)?
            .bytes()
            .map_err(|e| StoryError::generation(format!("read speech response: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl StoryWriter for OpenAiClient {
    #[tracing::instrument(level = "debug", skip(self, idea))]
    fn write_story(&self, idea: &str) -> StoryResult<String> {
        let idea = validate_idea(idea)?;
        let body = json!({
            "model": self.cfg.chat_model,
            "messages": [
                { "role": "system", "content": STORY_SYSTEM_PROMPT },
                { "role": "user", "content": story_user_prompt(idea) },
            ],
            "max_tokens": STORY_MAX_TOKENS,
        });
        let raw = self
            .post_json("story completion", "chat/completions", &body)?
            .bytes()
            .map_err(|e| StoryError::generation(format!("read story response: {e}")))?;
        parse_chat_response(&raw)
    }
}

/// User message sent to the chat model for a story idea.
pub fn story_user_prompt(idea: &str) -> String {
    format!("Write a children's story for a 30 seconds video based on the following idea: {idea}")
}

/// First image of an `images/generations` response; `None` when the service returned none.
pub fn parse_image_response(raw: &[u8]) -> StoryResult<Option<ImageReference>> {
    #[derive(Deserialize)]
    struct Item {
        url: Option<String>,
        b64_json: Option<String>,
    }
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        data: Vec<Item>,
    }

    let body: Body = serde_json::from_slice(raw)
        .map_err(|e| StoryError::generation(format!("image response parse failed: {e}")))?;
    Ok(body.data.into_iter().next().and_then(|item| {
        match (item.url, item.b64_json) {
            (Some(url), _) if !url.is_empty() => Some(ImageReference::Url(url)),
            (_, Some(data)) if !data.is_empty() => Some(ImageReference::Base64(data)),
            _ => None,
        }
    }))
}

/// Trimmed content of the first choice of a `chat/completions` response.
pub fn parse_chat_response(raw: &[u8]) -> StoryResult<String> {
    #[derive(Deserialize)]
    struct Message {
        content: Option<String>,
    }
    #[derive(Deserialize)]
    struct Choice {
        message: Message,
    }
    #[derive(Deserialize)]
    struct Body {
        #[serde(default)]
        choices: Vec<Choice>,
    }

    let body: Body = serde_json::from_slice(raw)
        .map_err(|e| StoryError::generation(format!("chat response parse failed: {e}")))?;
    let story = body
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|s| s.trim().to_owned())
        .unwrap_or_default();
    if story.is_empty() {
        return Err(StoryError::generation("story completion was empty"));
    }
    Ok(story)
}

#[cfg(test)]
#[path = "../../tests/unit/generate/openai.rs"]
mod tests;
