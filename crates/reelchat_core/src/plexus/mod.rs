//! Decorative particle background: a bouncing point cloud with proximity links.
//!
//! [`Plexus`] owns the lifecycle (mount, resize, visibility, unmount) and
//! answers host events with [`PlexusEffect`]s, the same way [`crate::update`]
//! answers chat messages with effects. The host owns the actual frame timer
//! and event subscriptions and only executes what it is told.
mod field;
mod particle;
mod surface;

use rand::Rng;

pub use field::{
    connection_opacity, Connection, ParticleField, CONNECT_DISTANCE, CONNECT_DISTANCE_SQ,
    LINK_END, LINK_START, LINK_WIDTH, PARTICLE_FILL,
};
pub use particle::{particle_count, Particle, AREA_PER_PARTICLE, MIN_PARTICLES};
pub use surface::{Point, Rgba, Surface, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlexusEvent {
    Mount(Viewport),
    Resize(Viewport),
    VisibilityChanged { hidden: bool },
    /// A previously requested frame is due.
    Frame,
    Unmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlexusEffect {
    /// Start delivering resize and visibility events.
    SubscribeHostEvents,
    /// Deliver one [`PlexusEvent::Frame`] at the next display refresh.
    RequestFrame,
    /// Drop the outstanding frame request.
    CancelFrame,
    UnsubscribeHostEvents,
}

pub struct Plexus<R> {
    rng: R,
    field: Option<ParticleField>,
    frame_requested: bool,
    subscribed: bool,
}

impl<R: Rng> Plexus<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            field: None,
            frame_requested: false,
            subscribed: false,
        }
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.field.is_some()
    }

    /// True while a frame request is outstanding.
    pub fn is_running(&self) -> bool {
        self.frame_requested
    }

    pub fn handle(&mut self, event: PlexusEvent, surface: &mut dyn Surface) -> Vec<PlexusEffect> {
        match event {
            PlexusEvent::Mount(viewport) => {
                let mut effects = Vec::with_capacity(2);
                // Subscriptions are paired once per lifetime, even if mounted again.
                if !self.subscribed {
                    self.subscribed = true;
                    effects.push(PlexusEffect::SubscribeHostEvents);
                }
                surface.resize(viewport);
                self.field = Some(ParticleField::new(&mut self.rng, viewport));
                effects.extend(self.start(surface));
                effects
            }
            PlexusEvent::Resize(viewport) => {
                if let Some(field) = self.field.as_mut() {
                    surface.resize(viewport);
                    field.regenerate(&mut self.rng, viewport);
                }
                Vec::new()
            }
            PlexusEvent::VisibilityChanged { hidden: true } => self.stop(),
            PlexusEvent::VisibilityChanged { hidden: false } => self.start(surface),
            PlexusEvent::Frame => {
                // A frame that raced a cancellation is dropped.
                if !self.frame_requested {
                    return Vec::new();
                }
                self.frame_requested = false;
                self.start(surface)
            }
            PlexusEvent::Unmount => {
                let mut effects = self.stop();
                if std::mem::take(&mut self.subscribed) {
                    effects.push(PlexusEffect::UnsubscribeHostEvents);
                }
                self.field = None;
                effects
            }
        }
    }

    fn start(&mut self, surface: &mut dyn Surface) -> Vec<PlexusEffect> {
        if self.frame_requested {
            return Vec::new();
        }
        let Some(field) = self.field.as_mut() else {
            return Vec::new();
        };
        field.render_frame(surface);
        self.frame_requested = true;
        vec![PlexusEffect::RequestFrame]
    }

    fn stop(&mut self) -> Vec<PlexusEffect> {
        if std::mem::take(&mut self.frame_requested) {
            vec![PlexusEffect::CancelFrame]
        } else {
            Vec::new()
        }
    }
}
