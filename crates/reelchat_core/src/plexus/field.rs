use rand::Rng;

use super::particle::{particle_count, Particle};
use super::surface::{Point, Rgba, Surface, Viewport};

/// Particles closer than this are joined by a line.
pub const CONNECT_DISTANCE: f64 = 120.0;
pub const CONNECT_DISTANCE_SQ: f64 = CONNECT_DISTANCE * CONNECT_DISTANCE;

pub const PARTICLE_FILL: Rgba = Rgba::new(234, 232, 255, 0.8);
pub const LINK_START: Rgba = Rgba::new(192, 57, 168, 1.0);
pub const LINK_END: Rgba = Rgba::new(91, 35, 164, 1.0);
pub const LINK_WIDTH: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub from: Point,
    pub to: Point,
    pub opacity: f64,
}

/// Linear falloff: 1 at distance zero, 0 at the threshold and beyond.
pub fn connection_opacity(dist_sq: f64) -> f64 {
    (1.0 - dist_sq / CONNECT_DISTANCE_SQ).max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    viewport: Viewport,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport) -> Self {
        let mut field = Self {
            viewport,
            particles: Vec::new(),
        };
        field.regenerate(rng, viewport);
        field
    }

    /// Builds a field from explicit particles; used for deterministic scenes.
    pub fn from_particles(viewport: Viewport, particles: Vec<Particle>) -> Self {
        Self {
            viewport,
            particles,
        }
    }

    /// Discards every particle and repopulates for the new viewport.
    pub fn regenerate<R: Rng + ?Sized>(&mut self, rng: &mut R, viewport: Viewport) {
        self.viewport = viewport;
        let count = particle_count(viewport);
        self.particles = (0..count).map(|_| Particle::random(rng, viewport)).collect();
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn advance(&mut self) {
        let viewport = self.viewport;
        for particle in &mut self.particles {
            *particle = particle.step(viewport);
        }
    }

    /// Every unordered pair closer than [`CONNECT_DISTANCE`]. O(n²).
    pub fn connections(&self) -> impl Iterator<Item = Connection> + '_ {
        self.particles.iter().enumerate().flat_map(move |(i, a)| {
            self.particles[i + 1..].iter().filter_map(move |b| {
                let dx = a.x - b.x;
                let dy = a.y - b.y;
                let dist_sq = dx * dx + dy * dy;
                (dist_sq < CONNECT_DISTANCE_SQ).then(|| Connection {
                    from: a.center(),
                    to: b.center(),
                    opacity: connection_opacity(dist_sq),
                })
            })
        })
    }

    /// Clears, advances and paints each particle, then strokes the connections.
    pub fn render_frame(&mut self, surface: &mut dyn Surface) {
        surface.clear();
        self.advance();
        for particle in &self.particles {
            surface.fill_circle(particle.center(), particle.size, PARTICLE_FILL);
        }
        for link in self.connections() {
            surface.stroke_gradient_line(
                link.from,
                link.to,
                LINK_START.with_alpha(link.opacity),
                LINK_END.with_alpha(link.opacity),
                LINK_WIDTH,
            );
        }
    }
}
