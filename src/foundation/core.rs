pub use kurbo::{Affine, Rect, Vec2};

/// Output raster size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    /// The 720p frame every segment is composed onto.
    pub const HD_720: Canvas = Canvas {
        width: 1280,
        height: 720,
    };

    pub fn width_f64(self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(self) -> f64 {
        f64::from(self.height)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::HD_720
    }
}

/// Straight-alpha RGBA8 color as written in config files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8([255, 255, 255, 255]);
    pub const BLACK: Rgba8 = Rgba8([0, 0, 0, 255]);

    pub fn to_cpu_color(self) -> vello_cpu::peniko::Color {
        let [r, g, b, a] = self.0;
        vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
    }
}
