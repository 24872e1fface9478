use glam::Vec3;
use hecs::Entity;

use crate::components::{BodyDesc, CollisionBody, Material};
use crate::config::{MovementConfig, SurfaceType};
use crate::error::SimResult;
use crate::simulation::Simulation;

/// Collision group for rolling props; players use the default group.
pub const PROP_GROUP: u32 = 1 << 1;

/// Spawn a movement-controlled player.
pub fn spawn_player(
    sim: &mut Simulation,
    pos: Vec3,
    config: MovementConfig,
) -> SimResult<Entity> {
    sim.add_controller(pos, config)
}

/// Spawn a dynamic sphere with no controller. Heavy and grippy, so it mostly
/// stays where it lands.
pub fn spawn_boulder(
    sim: &mut Simulation,
    pos: Vec3,
    radius: f32,
    initial_vel: Vec3,
) -> SimResult<Entity> {
    let material = Material {
        friction: 0.9,
        restitution: 0.2,
        density: 2.6,
        surface: Some(SurfaceType::Rock),
    };
    // Mass from volume, as if solid rock.
    let mass = material.density * 4.0 / 3.0 * std::f32::consts::PI * radius.powi(3) * 100.0;

    let physics = sim.physics_mut();
    let desc = BodyDesc::new(pos, mass).with_material(material).with_velocity(initial_vel);
    let entity = physics.add_entity(desc)?;
    physics.attach_collider(entity, CollisionBody { radius, group: PROP_GROUP, mask: u32::MAX })?;
    Ok(entity)
}
