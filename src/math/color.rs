use bytemuck::{Pod, Zeroable};

/// Linear RGBA color, each component in `0.0..=1.0`.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Unpacks a `0x00RRGGBB` pixel as an opaque color.
    pub fn from_pixel(pixel: u32) -> Self {
        Self::from_rgba(
            ((pixel >> 16) & 0xFF) as u8,
            ((pixel >> 8) & 0xFF) as u8,
            (pixel & 0xFF) as u8,
            255,
        )
    }

    /// Components scaled to bytes; out of range values saturate.
    pub fn to_bytes(&self) -> [u8; 4] {
        [
            (self.r * 255.0) as u8,
            (self.g * 255.0) as u8,
            (self.b * 255.0) as u8,
            (self.a * 255.0) as u8,
        ]
    }

    /// Packs the color into the `0x00RRGGBB` layout softbuffer presents.
    /// Alpha is dropped.
    pub fn to_pixel(&self) -> u32 {
        let [r, g, b, _] = self.to_bytes();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Source-over composite of `self` onto an opaque `dst`.
    pub fn blend_over(&self, dst: Color) -> Color {
        let a = self.a.clamp(0.0, 1.0);
        let inv = 1.0 - a;

        Color::new(
            self.r * a + dst.r * inv,
            self.g * a + dst.g * inv,
            self.b * a + dst.b * inv,
            1.0,
        )
    }

    pub const BLACK: Color = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Self::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Self::new(1.0, 0.0, 0.0, 1.0);
    pub const BLUE: Color = Self::new(0.0, 0.0, 1.0, 1.0);
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.r == other.r && self.g == other.g && self.b == other.b && self.a == other.a
    }
}
