use bytemuck::{Pod, Zeroable};

use super::{Color, Vector2};

/// A colored point in window pixel space.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vector2,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Vector2, color: Color) -> Self {
        Self { position, color }
    }
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vector2::ZERO,
            color: Color::WHITE,
        }
    }
}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position && self.color == other.color
    }
}

impl From<(Vector2, Color)> for Vertex {
    fn from(data: (Vector2, Color)) -> Self {
        Self {
            position: data.0,
            color: data.1,
        }
    }
}
