use num_traits::ToPrimitive;
use winit::dpi::{PhysicalPosition, PhysicalSize};

use super::Vector2;

/// Integer pixel coordinate or size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point2 {
    pub x: i32,
    pub y: i32,
}

impl Point2 {
    pub fn new<T: ToPrimitive>(x: T, y: T) -> Self {
        Self {
            x: x.to_i32().unwrap_or(0),
            y: y.to_i32().unwrap_or(0),
        }
    }

    /// Number of pixels in a `x` by `y` area; negative sides count as empty.
    pub fn area(&self) -> usize {
        self.x.max(0) as usize * self.y.max(0) as usize
    }

    pub const ZERO: Self = Self { x: 0, y: 0 };
}

impl Default for Point2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<PhysicalSize<u32>> for Point2 {
    fn from(size: PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

impl From<PhysicalPosition<f64>> for Point2 {
    fn from(pos: PhysicalPosition<f64>) -> Self {
        Self::new(pos.x.floor(), pos.y.floor())
    }
}

impl From<Point2> for PhysicalSize<u32> {
    fn from(point: Point2) -> Self {
        PhysicalSize::new(point.x.max(0) as u32, point.y.max(0) as u32)
    }
}

impl From<(i32, i32)> for Point2 {
    fn from(tuple: (i32, i32)) -> Self {
        Self {
            x: tuple.0,
            y: tuple.1,
        }
    }
}

impl From<Vector2> for Point2 {
    fn from(vector: Vector2) -> Self {
        Self {
            x: vector.x.floor() as i32,
            y: vector.y.floor() as i32,
        }
    }
}

impl From<Point2> for Vector2 {
    fn from(point: Point2) -> Self {
        Vector2::new(point.x, point.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_conversion_floors() {
        assert_eq!(Point2::from(Vector2::new(3.9, -0.1)), Point2::new(3, -1));
        assert_eq!(Point2::from(PhysicalPosition::new(10.7, 4.2)), Point2::new(10, 4));
    }

    #[test]
    fn area_ignores_negative_sides() {
        assert_eq!(Point2::new(800, 600).area(), 480_000);
        assert_eq!(Point2::new(-5, 600).area(), 0);
    }
}
