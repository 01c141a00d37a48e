use crate::math::{Color, Point2, Vector2};

/// CPU frame in the `0x00RRGGBB` layout softbuffer expects.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: i32,
    height: i32,
    pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(size: Point2) -> Self {
        Self {
            width: size.x.max(0),
            height: size.y.max(0),
            pixels: vec![0; size.area()],
        }
    }

    pub fn size(&self) -> Point2 {
        Point2::new(self.width, self.height)
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Reallocates the frame; contents are cleared to black.
    pub fn resize(&mut self, size: Point2) {
        self.width = size.x.max(0);
        self.height = size.y.max(0);
        self.pixels.clear();
        self.pixels.resize(size.area(), 0);
    }

    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_pixel());
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }

        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Composites `color` over the pixel at `(x, y)` using its alpha.
    /// Coordinates outside the frame are ignored.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: Color) {
        let Some(i) = self.index(x, y) else {
            return;
        };

        if color.a >= 1.0 {
            self.pixels[i] = color.to_pixel();
            return;
        }

        if color.a <= 0.0 {
            return;
        }

        let dst = Color::from_pixel(self.pixels[i]);
        self.pixels[i] = color.blend_over(dst).to_pixel();
    }

    /// Plots a one pixel point at `position`, rounded down to the containing pixel.
    pub fn draw_point(&mut self, position: Vector2, color: Color) {
        let p = Point2::from(position);
        self.blend_pixel(p.x, p.y, color);
    }

    /// Draws an 8-bit coverage mask tinted with `color`, top-left at `position`.
    /// Each coverage value scales the alpha of `color`.
    pub fn draw_coverage(
        &mut self,
        coverage: &[u8],
        mask_size: Point2,
        position: Point2,
        color: Color,
    ) {
        let mask_w = mask_size.x.max(0) as usize;
        if mask_w == 0 {
            return;
        }

        for (row, line) in coverage.chunks(mask_w).enumerate().take(mask_size.y.max(0) as usize) {
            let y = position.y + row as i32;
            if y < 0 || y >= self.height {
                continue;
            }

            for (col, value) in line.iter().enumerate() {
                if *value == 0 {
                    continue;
                }

                let alpha = color.a * (*value as f32 / 255.0);
                self.blend_pixel(position.x + col as i32, y, color.with_alpha(alpha));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_and_resize() {
        let mut canvas = Canvas::new(Point2::new(4, 3));
        assert_eq!(canvas.pixels().len(), 12);

        canvas.clear(Color::RED);
        assert!(canvas.pixels().iter().all(|p| *p == 0x00FF_0000));

        canvas.resize(Point2::new(2, 2));
        assert_eq!(canvas.size(), Point2::new(2, 2));
        assert_eq!(canvas.pixels(), &[0, 0, 0, 0]);
    }

    #[test]
    fn out_of_bounds_points_are_skipped() {
        let mut canvas = Canvas::new(Point2::new(2, 2));
        canvas.draw_point(Vector2::new(-0.5, 0.0), Color::WHITE);
        canvas.draw_point(Vector2::new(2.0, 1.0), Color::WHITE);
        canvas.draw_point(Vector2::new(1.0, 5.0), Color::WHITE);

        assert!(canvas.pixels().iter().all(|p| *p == 0));
    }

    #[test]
    fn points_blend_with_their_alpha() {
        let mut canvas = Canvas::new(Point2::new(2, 1));
        canvas.clear(Color::BLACK);

        canvas.draw_point(Vector2::new(1.7, 0.2), Color::WHITE.with_alpha(0.5));
        canvas.draw_point(Vector2::new(0.0, 0.0), Color::WHITE.with_alpha(0.0));

        assert_eq!(canvas.get_pixel(0, 0), Some(0));
        assert_eq!(canvas.get_pixel(1, 0), Some(0x007F_7F7F));
    }

    #[test]
    fn coverage_mask_is_clipped_and_tinted() {
        let mut canvas = Canvas::new(Point2::new(3, 3));
        let mask = [255u8, 0, 255, 255];

        canvas.draw_coverage(&mask, Point2::new(2, 2), Point2::new(2, -1), Color::BLUE);

        // Only the bottom-left mask texel lands inside the frame at (2, 0).
        assert_eq!(canvas.get_pixel(2, 0), Some(0x0000_00FF));
        assert_eq!(canvas.get_pixel(2, 1), Some(0));
        assert_eq!(canvas.pixels().iter().filter(|p| **p != 0).count(), 1);
    }
}
