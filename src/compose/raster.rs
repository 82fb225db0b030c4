use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use vello_cpu::Pixmap;
use vello_cpu::peniko::color::PremulRgba8;

use crate::foundation::error::{StoryError, StoryResult};

/// Decoded source image, held as a premultiplied pixmap ready to paint.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixmap: Arc<Pixmap>,
}

impl DecodedImage {
    /// Image paint that samples this raster in its own pixel space.
    pub(crate) fn paint(&self) -> vello_cpu::Image {
        vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(self.pixmap.clone()),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, WebP, ...) into a premultiplied pixmap.
pub fn decode_image(bytes: &[u8]) -> StoryResult<DecodedImage> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(StoryError::generation("decoded image has zero size"));
    }
    let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
        return Err(StoryError::generation(format!(
            "image {width}x{height} exceeds the renderable size"
        )));
    };

    let pixels: Vec<PremulRgba8> = rgba.pixels().map(|px| premultiply(px.0)).collect();
    let opaque = pixels.iter().all(|px| px.a == u8::MAX);
    Ok(DecodedImage {
        width,
        height,
        pixmap: Arc::new(Pixmap::from_parts_with_opacity(pixels, w, h, !opaque)),
    })
}

/// Straight-alpha pixel to premultiplied, rounding to nearest.
fn premultiply([r, g, b, a]: [u8; 4]) -> PremulRgba8 {
    let scale = |c: u8| ((u16::from(c) * u16::from(a) + 127) / 255) as u8;
    PremulRgba8 {
        r: scale(r),
        g: scale(g),
        b: scale(b),
        a,
    }
}

/// Encode straight-alpha RGBA8 as PNG.
pub fn encode_png(rgba: Vec<u8>, width: u32, height: u32) -> StoryResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow::anyhow!("rgba buffer does not match {width}x{height}"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Encode a rendered pixmap as PNG, undoing premultiplication.
pub(crate) fn pixmap_png(pixmap: Pixmap) -> StoryResult<Vec<u8>> {
    let (width, height) = (u32::from(pixmap.width()), u32::from(pixmap.height()));
    let rgba: Vec<u8> = pixmap
        .take_unpremultiplied()
        .into_iter()
        .flat_map(|px| px.to_u8_array())
        .collect();
    encode_png(rgba, width, height)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/raster.rs"]
mod tests;
