//! Frame composition: cover-scaled background image plus a burned-in caption.

/// Captioned frame rendering.
pub mod frame;
/// Raster decode/encode helpers.
pub mod raster;
/// Font loading, measurement and glyph layout for captions.
pub mod text;
/// Greedy pixel-width word wrapping.
pub mod wrap;
