use rand::Rng;

use super::surface::{Point, Viewport};

/// Viewport area (in square units) that earns one particle.
pub const AREA_PER_PARTICLE: u64 = 11_000;
pub const MIN_PARTICLES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed_x: f64,
    pub speed_y: f64,
}

impl Particle {
    /// Uniform position inside the viewport, radius in `[1, 2.5)`, speed in `[-1, 1)` per axis.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        Self {
            x: rng.gen::<f64>() * f64::from(viewport.width),
            y: rng.gen::<f64>() * f64::from(viewport.height),
            size: rng.gen::<f64>() * 1.5 + 1.0,
            speed_x: rng.gen::<f64>() * 2.0 - 1.0,
            speed_y: rng.gen::<f64>() * 2.0 - 1.0,
        }
    }

    /// Advances one frame, reflecting off the viewport edges first.
    pub fn step(self, viewport: Viewport) -> Self {
        let (x, speed_x) = bounce(self.x, self.speed_x, f64::from(viewport.width));
        let (y, speed_y) = bounce(self.y, self.speed_y, f64::from(viewport.height));
        Self {
            x,
            y,
            speed_x,
            speed_y,
            ..self
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }
}

/// `max(20, floor(area / 11000))`.
pub fn particle_count(viewport: Viewport) -> usize {
    let by_area = usize::try_from(viewport.area() / AREA_PER_PARTICLE).unwrap_or(usize::MAX);
    by_area.max(MIN_PARTICLES)
}

fn bounce(position: f64, speed: f64, extent: f64) -> (f64, f64) {
    let next = position + speed;
    let leaving = (next > extent && speed > 0.0) || (next < 0.0 && speed < 0.0);
    let speed = if leaving { -speed } else { speed };
    // Clamp covers zero-extent axes, where both directions leave.
    ((position + speed).clamp(0.0, extent), speed)
}
