use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::compose::wrap::TextMeasure;
use crate::foundation::error::{StoryError, StoryResult};

/// Directories searched when no caption font is configured.
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

/// Preferred faces, checked before falling back to any TTF/OTF found.
const PREFERRED_FONT_FILES: &[&str] = &[
    "DejaVuSans-Bold.ttf",
    "DejaVuSans.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Bold.ttf",
    "NotoSans-Regular.ttf",
    "Arial Bold.ttf",
    "Arial.ttf",
    "arialbd.ttf",
    "arial.ttf",
];

/// Resolve the caption font: the configured path if any, otherwise the first match in the
/// system font directories.
pub fn resolve_font_path(configured: Option<&Path>) -> StoryResult<PathBuf> {
    if let Some(p) = configured {
        if p.is_file() {
            return Ok(p.to_path_buf());
        }
        return Err(StoryError::malformed(format!(
            "caption font '{}' does not exist",
            p.display()
        )));
    }

    let mut candidates = Vec::new();
    for dir in SYSTEM_FONT_DIRS {
        collect_font_files(Path::new(dir), 3, &mut candidates);
    }
    for preferred in PREFERRED_FONT_FILES {
        if let Some(hit) = candidates
            .iter()
            .find(|p| p.file_name().and_then(|n| n.to_str()) == Some(*preferred))
        {
            return Ok(hit.clone());
        }
    }
    candidates.sort();
    candidates.into_iter().next().ok_or_else(|| {
        StoryError::malformed(
            "no caption font configured and none found in system font directories",
        )
    })
}

fn collect_font_files(dir: &Path, depth: u32, out: &mut Vec<PathBuf>) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if depth > 0 {
                collect_font_files(&path, depth - 1, out);
            }
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" {
            continue;
        }
        out.push(path);
    }
}

/// One font at one size, ready to measure and lay out caption lines.
///
/// Wraps Parley shaping contexts plus the raw font data handed to the rasterizer.
pub struct CaptionFont {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
    size_px: f32,
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family_name", &self.family_name)
            .field("size_px", &self.size_px)
            .finish()
    }
}

impl CaptionFont {
    /// Load a font file from disk.
    pub fn from_path(path: &Path, size_px: f32) -> StoryResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read caption font '{}'", path.display()))?;
        Self::from_bytes(bytes, size_px)
    }

    /// Register raw TTF/OTF bytes.
    pub fn from_bytes(font_bytes: Vec<u8>, size_px: f32) -> StoryResult<Self> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StoryError::malformed(
                "caption size_px must be finite and > 0",
            ));
        }

        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.clone()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StoryError::malformed("no font families registered from caption font bytes")
        })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StoryError::malformed("registered caption font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(font_bytes), 0);
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
            size_px,
        })
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub(crate) fn font_data(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Shape `text` as a single unbroken line.
    pub fn layout_line(&mut self, text: &str) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(self.size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

impl TextMeasure for CaptionFont {
    fn measure(&mut self, text: &str) -> f32 {
        self.layout_line(text).width()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/text.rs"]
mod tests;
