//! Notifications produced by the core for effects, audio and HUD consumers.
//! Nothing in the core reads them back.

use glam::Vec3;
use hecs::Entity;

use crate::components::MovementState;
use crate::config::SurfaceType;

/// Emitted by the physics world when a body goes from airborne to grounded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandingEvent {
    pub entity: Entity,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Vertical speed absorbed by the ground.
    pub impact_force: f32,
    pub surface: SurfaceType,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SimEvent {
    StateChanged { entity: Entity, previous: MovementState, new: MovementState },
    Landed(LandingEvent),
    Jumped { entity: Entity, position: Vec3, velocity: Vec3 },
    SkiStarted { entity: Entity, position: Vec3, velocity: Vec3, degraded: bool },
    JetpackStarted { entity: Entity, position: Vec3, velocity: Vec3 },
}

/// Where the core pushes its notifications.
pub trait EventSink {
    fn emit(&mut self, event: SimEvent);
}

impl EventSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}
