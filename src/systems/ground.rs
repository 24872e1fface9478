use glam::Vec3;

use crate::components::{PhysicsState, SlopeData};
use crate::config::{PhysicsConfig, SurfaceType};
use crate::terrain::TerrainSample;

/// Derive slope angle, downhill direction and steepness from a ground normal.
///
/// Downhill is the horizontal projection of the normal: on a surface that
/// falls toward +X the normal leans toward +X.
pub fn slope_from_normal(normal: Vec3) -> SlopeData {
    let n = normal.normalize_or_zero();
    let angle = if n == Vec3::ZERO { 0.0 } else { n.dot(Vec3::Y).clamp(-1.0, 1.0).acos() };
    SlopeData {
        angle,
        downhill: Vec3::new(n.x, 0.0, n.z).normalize_or_zero(),
        steepness: (angle / std::f32::consts::FRAC_PI_4).min(1.0),
    }
}

/// Height-threshold ground probe.
///
/// Sets `grounded`, snaps the body onto the ground, zeroes downward velocity
/// and refreshes the ground normal, surface and slope data. Returns the
/// vertical speed absorbed by the snap (the landing impact).
pub fn settle(body: &mut PhysicsState, sample: TerrainSample, cfg: &PhysicsConfig) -> f32 {
    let height_above = body.position.y - sample.height;
    // Measured off the surface so following an uphill slope is not a launch.
    let launching = body.velocity.dot(sample.normal) > cfg.liftoff_speed;

    if height_above <= cfg.ground_snap_distance && !launching {
        let impact = (-body.velocity.y).max(0.0);
        body.grounded = true;
        body.position.y = sample.height;
        if body.velocity.y < 0.0 {
            body.velocity.y = 0.0;
        }
        body.ground_normal = sample.normal;
        body.surface = sample.surface;
        body.slope = Some(slope_from_normal(sample.normal));
        impact
    } else {
        body.grounded = false;
        body.ground_normal = Vec3::Y;
        body.surface = body.material.surface.unwrap_or(SurfaceType::Default);
        body.slope = None;
        0.0
    }
}

/// Keep horizontal velocity and set the vertical component so the motion
/// runs along the ground plane with normal `normal`.
pub fn follow_surface(velocity: Vec3, normal: Vec3) -> Vec3 {
    if normal.y <= f32::EPSILON {
        return velocity;
    }
    let vy = -(normal.x * velocity.x + normal.z * velocity.z) / normal.y;
    Vec3::new(velocity.x, vy, velocity.z)
}
