use glam::Vec3;
use hecs::Entity;
use thiserror::Error;

use crate::components::MovementState;

/// Failures the simulation surfaces to its caller.
///
/// Declined player actions are not errors; see [`crate::movement::ActionOutcome`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimError {
    #[error("body mass must be positive and finite, got {mass}")]
    InvalidMass { mass: f32 },

    #[error("no handler registered for movement state {0:?}")]
    MissingHandler(MovementState),

    #[error("more than one handler registered for movement state {0:?}")]
    DuplicateHandler(MovementState),

    #[error("entity {0:?} is not registered with the physics world")]
    UnknownEntity(Entity),

    #[error("non-finite {quantity} on entity {entity:?}: {value}")]
    NonFinite { entity: Entity, quantity: &'static str, value: Vec3 },
}

pub type SimResult<T> = Result<T, SimError>;
