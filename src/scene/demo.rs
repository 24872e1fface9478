use glam::Vec3;
use hecs::Entity;

use crate::config::{MovementConfig, PhysicsConfig, SurfaceType};
use crate::error::SimResult;
use crate::scene::prefabs::{spawn_boulder, spawn_player};
use crate::simulation::Simulation;
use crate::systems::PhysicsWorld;
use crate::terrain::SlopeTerrain;

/// Knobs for [`build_demo`].
#[derive(Clone, Debug)]
pub struct DemoOptions {
    /// Incline in degrees.
    pub slope_deg: f32,
    pub slope_length: f32,
    pub surface: SurfaceType,
    pub boulders: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self { slope_deg: 18.0, slope_length: 120.0, surface: SurfaceType::Snow, boulders: 3 }
    }
}

/// Build the demo: a slope with a flat run-out, a player near the top and a
/// few boulders off to the side of the fall line.
/// Returns the simulation and the player entity.
pub fn build_demo(options: &DemoOptions) -> SimResult<(Simulation, Entity)> {
    let mut terrain =
        SlopeTerrain::new(options.slope_deg.to_radians(), options.slope_length, options.surface);
    terrain.runout_surface = SurfaceType::Grass;
    let top = terrain.top_height;
    let fall = terrain.angle.tan();

    let physics = PhysicsWorld::new(PhysicsConfig::default(), Box::new(terrain));
    let mut sim = Simulation::new(physics);

    // Boulders scattered down the slope, clear of the player's line
    for i in 0..options.boulders {
        let x = options.slope_length * (0.25 + 0.2 * i as f32);
        let z = if i % 2 == 0 { 6.0 } else { -6.0 };
        let radius = 0.6 + 0.2 * i as f32;
        let ground = top - x * fall;
        spawn_boulder(&mut sim, Vec3::new(x, ground + radius + 1.0, z), radius, Vec3::ZERO)?;
    }

    let start = Vec3::new(4.0, top - 4.0 * fall, 0.0);
    let player = spawn_player(&mut sim, start, MovementConfig::default())?;
    Ok((sim, player))
}
