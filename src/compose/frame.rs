use crate::compose::raster::{decode_image, pixmap_png};
use crate::compose::text::{CaptionFont, resolve_font_path};
use crate::compose::wrap::wrap_lines;
use crate::foundation::config::FrameConfig;
use crate::foundation::core::{Affine, Canvas, Rect, Vec2};
use crate::foundation::error::{StoryError, StoryResult};

/// Where a source image lands on the canvas after cover scaling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverPlacement {
    pub scale: f64,
    /// Scaled image bounds in canvas coordinates. `x0`/`y0` may be negative (cropped).
    pub rect: Rect,
}

impl CoverPlacement {
    pub fn transform(&self) -> Affine {
        Affine::translate(Vec2::new(self.rect.x0, self.rect.y0)) * Affine::scale(self.scale)
    }
}

/// Scale an image so it covers the whole canvas, then center it; overflow is cropped.
pub fn cover_placement(canvas: Canvas, image_width: u32, image_height: u32) -> CoverPlacement {
    let scale = f64::max(
        canvas.width_f64() / f64::from(image_width),
        canvas.height_f64() / f64::from(image_height),
    );
    let scaled_w = f64::from(image_width) * scale;
    let scaled_h = f64::from(image_height) * scale;
    let x = (canvas.width_f64() - scaled_w) / 2.0;
    let y = (canvas.height_f64() - scaled_h) / 2.0;
    CoverPlacement {
        scale,
        rect: Rect::new(x, y, x + scaled_w, y + scaled_h),
    }
}

/// Baseline y of each caption line; the block is anchored to the bottom edge.
pub fn caption_baselines(
    canvas_height: u32,
    line_count: usize,
    line_height_px: f32,
    bottom_margin_px: f32,
) -> Vec<f32> {
    let first = canvas_height as f32 - line_count as f32 * line_height_px - bottom_margin_px;
    (0..line_count)
        .map(|i| first + i as f32 * line_height_px)
        .collect()
}

/// Produces the PNG frame for one segment from generated image bytes and its caption.
pub trait FrameComposer: Send {
    fn compose_frame(&mut self, image_bytes: &[u8], caption: &str) -> StoryResult<Vec<u8>>;
}

/// Renders one captioned frame per segment.
#[derive(Debug)]
pub struct FrameCompositor {
    cfg: FrameConfig,
    font: CaptionFont,
}

impl FrameCompositor {
    /// Build a compositor, resolving the caption font from config or the system.
    pub fn new(cfg: FrameConfig) -> StoryResult<Self> {
        let path = resolve_font_path(cfg.font_path.as_deref())?;
        tracing::debug!(font = %path.display(), "caption font");
        let font = CaptionFont::from_path(&path, cfg.font_size_px)?;
        Ok(Self { cfg, font })
    }

    /// Build a compositor around an already-loaded font.
    pub fn with_font(cfg: FrameConfig, font: CaptionFont) -> Self {
        Self { cfg, font }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.cfg
    }

    /// Caption lines as they will be drawn.
    pub fn caption_lines(&mut self, caption: &str) -> Vec<String> {
        let max = self.cfg.max_text_width_px();
        wrap_lines(caption, max, &mut self.font)
    }

    /// Compose `image_bytes` (any format the `image` crate decodes) with `caption` into an
    /// opaque PNG of the configured canvas size.
    pub fn compose(&mut self, image_bytes: &[u8], caption: &str) -> StoryResult<Vec<u8>> {
        let img = decode_image(image_bytes).map_err(|e| {
            StoryError::generation(format!("generated image is not a decodable raster: {e}"))
        })?;
        let canvas = self.cfg.canvas;
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| StoryError::malformed("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| StoryError::malformed("canvas height exceeds u16"))?;

        let placement = cover_placement(canvas, img.width, img.height);
        let paint = img.paint();
        let lines = self.caption_lines(caption);
        let baselines = caption_baselines(
            canvas.height,
            lines.len(),
            self.cfg.line_height_px(),
            self.cfg.bottom_margin_px,
        );

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, canvas.width_f64(), canvas.height_f64());
        ctx.set_paint(self.cfg.background.to_cpu_color());
        ctx.fill_rect(&full);

        ctx.set_transform(affine_to_cpu(placement.transform()));
        ctx.set_paint(paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));

        for (line, baseline) in lines.iter().zip(&baselines) {
            self.draw_caption_line(&mut ctx, line, *baseline);
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        pixmap_png(pixmap)
    }

    /// Stroke pass, then fill pass, horizontally centered with its baseline at `baseline_y`.
    fn draw_caption_line(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        line: &str,
        baseline_y: f32,
    ) {
        let layout = self.font.layout_line(line);
        let Some(first) = layout.lines().next() else {
            return;
        };
        let x = (self.cfg.canvas.width as f32 - layout.width()) / 2.0;
        let y = baseline_y - first.metrics().baseline;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((f64::from(x), f64::from(y))));

        let passes = [
            (CaptionPass::Stroke, self.cfg.stroke),
            (CaptionPass::Fill, self.cfg.fill),
        ];
        for (pass, color) in passes {
            if pass == CaptionPass::Stroke && self.cfg.stroke_width_px <= 0.0 {
                continue;
            }
            ctx.set_paint(color.to_cpu_color());
            if pass == CaptionPass::Stroke {
                ctx.set_stroke(vello_cpu::kurbo::Stroke::new(f64::from(
                    self.cfg.stroke_width_px,
                )));
            }
            for layout_line in layout.lines() {
                for item in layout_line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    let builder = ctx
                        .glyph_run(self.font.font_data())
                        .font_size(run.run().font_size());
                    match pass {
                        CaptionPass::Stroke => builder.stroke_glyphs(glyphs),
                        CaptionPass::Fill => builder.fill_glyphs(glyphs),
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CaptionPass {
    Stroke,
    Fill,
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

impl FrameComposer for FrameCompositor {
    fn compose_frame(&mut self, image_bytes: &[u8], caption: &str) -> StoryResult<Vec<u8>> {
        self.compose(image_bytes, caption)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/frame.rs"]
mod tests;
