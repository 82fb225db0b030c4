//! Job identity and the per-job workspace.

/// Job allocation and workspace layout.
pub mod workspace;
