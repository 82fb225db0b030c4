//! Image, speech and story generation.

/// Collaborator contracts consumed by the pipeline.
pub mod collab;
/// Per-segment frame and narration generation.
pub mod media;
/// OpenAI-compatible HTTP adapter.
pub mod openai;
/// Exponential backoff around collaborator calls.
pub mod retry;
