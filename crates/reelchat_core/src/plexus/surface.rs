/// Drawable area in surface units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `[0, 1]`.
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }
}

/// Host drawing target the particle field paints on.
pub trait Surface {
    /// Matches the backing store to the viewport; implies a clear.
    fn resize(&mut self, viewport: Viewport);
    fn clear(&mut self);
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
    /// Strokes a straight line whose colour runs linearly from `start` to `end`.
    fn stroke_gradient_line(&mut self, from: Point, to: Point, start: Rgba, end: Rgba, width: f64);
}
