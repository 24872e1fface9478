use glam::Vec3;
use hecs::Entity;

use crate::config::SurfaceType;

/// Forward direction used to seed momentum bookkeeping.
pub const FORWARD: Vec3 = Vec3::NEG_Z;

/// Surface response of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Friction coefficient in [0, 1]. 0.0 = ice, 1.0 = rubber.
    pub friction: f32,
    /// Restitution (bounciness) in [0, 1]. 0.0 = no bounce, 1.0 = perfect bounce.
    pub restitution: f32,
    pub density: f32,
    pub surface: Option<SurfaceType>,
}

impl Default for Material {
    fn default() -> Self {
        Self { friction: 0.5, restitution: 0.3, density: 1.0, surface: None }
    }
}

/// Slope under a grounded body, derived from the ground normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeData {
    /// Radians between the ground normal and world up.
    pub angle: f32,
    /// Horizontal unit vector pointing downhill (zero on flat ground).
    pub downhill: Vec3,
    /// `angle / 45°`, capped at 1.
    pub steepness: f32,
}

/// Momentum bookkeeping carried between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentumState {
    pub magnitude: f32,
    pub direction: Vec3,
    pub last_move_direction: Vec3,
    /// Share of the previous velocity blended into the current tick, in [0, 1].
    pub factor: f32,
    /// Physics clock (seconds) at the last movement-state change.
    pub last_state_change: f64,
}

impl Default for MomentumState {
    fn default() -> Self {
        Self {
            magnitude: 0.0,
            direction: FORWARD,
            last_move_direction: FORWARD,
            factor: 0.0,
            last_state_change: 0.0,
        }
    }
}

/// What a caller supplies to register a body.
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Kilograms; must be positive.
    pub mass: f32,
    pub material: Material,
}

impl BodyDesc {
    pub fn new(position: Vec3, mass: f32) -> Self {
        Self { position, velocity: Vec3::ZERO, mass, material: Material::default() }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Per-entity record owned by the physics world.
#[derive(Clone, Debug)]
pub struct PhysicsState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Last integrated acceleration (ΣF / m).
    pub acceleration: Vec3,
    pub mass: f32,
    pub material: Material,
    pub grounded: bool,
    pub ground_normal: Vec3,
    /// Surface type under the body (default while airborne).
    pub surface: SurfaceType,
    pub slope: Option<SlopeData>,
    pub momentum: MomentumState,
}

impl PhysicsState {
    pub fn from_desc(desc: &BodyDesc) -> Self {
        Self {
            position: desc.position,
            velocity: desc.velocity,
            acceleration: Vec3::ZERO,
            mass: desc.mass,
            material: desc.material,
            grounded: false,
            ground_normal: Vec3::Y,
            surface: desc.material.surface.unwrap_or_default(),
            slope: None,
            momentum: MomentumState::default(),
        }
    }

    pub fn inverse_mass(&self) -> f32 {
        1.0 / self.mass
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        Vec3::new(self.velocity.x, 0.0, self.velocity.z)
    }
}

/// Turn bookkeeping for a skiing body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SkiingState {
    pub is_skiing: bool,
    /// Signed edge angle (radians); the sign picks the turn direction.
    pub edge_angle: f32,
    pub turn_radius: f32,
    pub speed: f32,
    pub slope_angle: f32,
    /// Skiing below the minimum ski angle, at a friction penalty.
    pub degraded: bool,
}

/// Opt-in sphere collider with group filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBody {
    pub radius: f32,
    /// Bit identifying this body's group.
    pub group: u32,
    /// Groups this body accepts contacts from.
    pub mask: u32,
}

impl CollisionBody {
    pub fn sphere(radius: f32) -> Self {
        Self { radius, group: 1, mask: u32::MAX }
    }

    pub fn collides_with_group(&self, group: u32) -> bool {
        self.mask & group != 0
    }

    /// Both sides must accept each other.
    pub fn accepts(&self, other: &CollisionBody) -> bool {
        self.collides_with_group(other.group) && other.collides_with_group(self.group)
    }
}

/// Collision contact produced by the detection phase.
#[derive(Clone, Copy, Debug)]
pub struct CollisionEvent {
    pub entity_a: Entity,
    pub entity_b: Entity,
    pub point: Vec3,
    /// Points from `entity_a` toward `entity_b`.
    pub contact_normal: Vec3,
    pub penetration_depth: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_filter_needs_both_sides() {
        let a = CollisionBody { radius: 1.0, group: 0b01, mask: 0b10 };
        let b = CollisionBody { radius: 1.0, group: 0b10, mask: 0b01 };
        let c = CollisionBody { radius: 1.0, group: 0b10, mask: 0b10 };
        assert!(a.accepts(&b));
        assert!(!a.accepts(&c));
    }

    #[test]
    fn registration_seeds_momentum_to_zero_forward() {
        let state = PhysicsState::from_desc(&BodyDesc::new(Vec3::ZERO, 80.0));
        assert_eq!(state.momentum.magnitude, 0.0);
        assert_eq!(state.momentum.direction, FORWARD);
        assert!(!state.grounded);
    }
}
