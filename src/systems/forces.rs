use glam::Vec3;

use crate::components::{PhysicsState, SkiingState};
use crate::config::PhysicsConfig;

pub fn gravity(body: &PhysicsState, cfg: &PhysicsConfig) -> Vec3 {
    Vec3::NEG_Y * body.mass * cfg.gravity
}

/// Friction coefficient between the body and the ground it stands on.
pub fn ground_friction(
    body: &PhysicsState,
    skiing: Option<&SkiingState>,
    cfg: &PhysicsConfig,
) -> f32 {
    let surface = cfg.surfaces.get(body.surface).friction;
    match skiing {
        Some(ski) if ski.is_skiing => {
            let mu = cfg.ski_friction * surface;
            if ski.degraded {
                mu * cfg.degraded_ski_friction
            } else {
                mu
            }
        }
        _ => body.material.friction * surface,
    }
}

/// Normal force `m·g·cos(angle)` along the ground normal plus Coulomb friction
/// against horizontal velocity. Friction never reverses the sliding direction
/// within one step.
pub fn ground_reaction(body: &PhysicsState, mu: f32, cfg: &PhysicsConfig, dt: f32) -> Vec3 {
    if !body.grounded {
        return Vec3::ZERO;
    }
    let angle = body.slope.map_or(0.0, |s| s.angle);
    let normal_force = body.mass * cfg.gravity * angle.cos();
    let mut force = body.ground_normal * normal_force;

    let h = body.horizontal_velocity();
    let speed = h.length();
    if speed > 1e-4 && dt > 0.0 {
        let magnitude = (mu * normal_force).min(speed * body.mass / dt);
        force -= h / speed * magnitude;
    }
    force
}

/// Downhill pull and carving force for a skiing body.
///
/// Zero unless skiing on a slope of at least `min_ski_angle`. Updates the
/// skiing state's turn radius as a side effect.
pub fn skiing_force(body: &PhysicsState, ski: &mut SkiingState, cfg: &PhysicsConfig) -> Vec3 {
    let Some(slope) = body.slope.filter(|_| body.grounded) else {
        return Vec3::ZERO;
    };
    if !ski.is_skiing || slope.angle < cfg.min_ski_angle {
        return Vec3::ZERO;
    }

    let slope_factor = cfg.surfaces.get(body.surface).slope_factor;
    let mut force = slope.downhill * body.mass * cfg.gravity * slope.angle.sin() * slope_factor;

    let h = body.horizontal_velocity();
    let speed = h.length();
    if ski.edge_angle != 0.0 && speed > 1e-3 {
        let speed_factor = (speed / cfg.turn_reference_speed).max(0.1);
        let radius = cfg.turn_base_radius / (speed_factor * ski.edge_angle.sin().abs());
        ski.turn_radius = radius;
        let centripetal = body.mass * speed * speed / radius;
        let inward = (h / speed).cross(Vec3::Y) * ski.edge_angle.signum();
        force += inward * centripetal;
    } else {
        ski.turn_radius = f32::INFINITY;
    }
    force
}

/// Quadratic isotropic drag `½·ρ·Cd·A·v²` against the velocity.
pub fn drag(body: &PhysicsState, cfg: &PhysicsConfig) -> Vec3 {
    let speed = body.velocity.length();
    if speed < 1e-6 {
        return Vec3::ZERO;
    }
    let magnitude =
        0.5 * cfg.air_density * cfg.drag_coefficient * cfg.cross_section_area * speed * speed;
    -body.velocity / speed * magnitude
}

/// Sum of every force acting on the body this tick.
pub fn accumulate(
    body: &PhysicsState,
    mut skiing: Option<&mut SkiingState>,
    cfg: &PhysicsConfig,
    dt: f32,
) -> Vec3 {
    let mu = ground_friction(body, skiing.as_deref(), cfg);
    let mut total = gravity(body, cfg) + ground_reaction(body, mu, cfg, dt) + drag(body, cfg);
    if let Some(ski) = skiing.as_deref_mut() {
        total += skiing_force(body, ski, cfg);
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BodyDesc;
    use crate::systems::ground::slope_from_normal;

    fn grounded_on(angle_deg: f32, velocity: Vec3) -> PhysicsState {
        let a = angle_deg.to_radians();
        let normal = Vec3::new(a.sin(), a.cos(), 0.0);
        let mut body =
            PhysicsState::from_desc(&BodyDesc::new(Vec3::ZERO, 80.0).with_velocity(velocity));
        body.grounded = true;
        body.ground_normal = normal;
        body.slope = Some(slope_from_normal(normal));
        body
    }

    #[test]
    fn resting_on_flat_ground_cancels_gravity() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(0.0, Vec3::ZERO);
        let total = accumulate(&body, None, &cfg, cfg.fixed_dt);
        assert!(total.length() < 1e-3, "net force {total}");
    }

    #[test]
    fn friction_opposes_horizontal_motion() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(0.0, Vec3::new(5.0, 0.0, 0.0));
        let f = ground_reaction(&body, 0.5, &cfg, cfg.fixed_dt);
        assert!(f.x < 0.0);
    }

    #[test]
    fn friction_cannot_reverse_motion_in_one_step() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(0.0, Vec3::new(0.01, 0.0, 0.0));
        let f = ground_reaction(&body, 1.0, &cfg, cfg.fixed_dt);
        let dv = f.x / body.mass * cfg.fixed_dt;
        assert!(0.01 + dv >= -1e-6);
    }

    #[test]
    fn skiing_force_points_downhill() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(20.0, Vec3::ZERO);
        let mut ski = SkiingState { is_skiing: true, ..Default::default() };
        let f = skiing_force(&body, &mut ski, &cfg);
        let expected = body.mass * cfg.gravity * 20.0_f32.to_radians().sin();
        assert!((f.x - expected).abs() < 1e-2);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn no_skiing_force_below_min_angle() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(2.0, Vec3::ZERO);
        let mut ski = SkiingState { is_skiing: true, ..Default::default() };
        assert_eq!(skiing_force(&body, &mut ski, &cfg), Vec3::ZERO);
    }

    #[test]
    fn edge_angle_bends_toward_its_sign() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(20.0, Vec3::new(10.0, 0.0, 0.0));
        let mut right = SkiingState { is_skiing: true, edge_angle: 0.4, ..Default::default() };
        let mut left = SkiingState { is_skiing: true, edge_angle: -0.4, ..Default::default() };
        let fr = skiing_force(&body, &mut right, &cfg);
        let fl = skiing_force(&body, &mut left, &cfg);
        assert!(fr.z > 0.0 && fl.z < 0.0);
        assert!(right.turn_radius.is_finite());
        let expected = cfg.turn_base_radius / (1.0 * 0.4_f32.sin());
        assert!((right.turn_radius - expected).abs() < 1e-3);
    }

    #[test]
    fn degraded_skiing_has_more_friction() {
        let cfg = PhysicsConfig::default();
        let body = grounded_on(0.0, Vec3::ZERO);
        let normal = SkiingState { is_skiing: true, ..Default::default() };
        let degraded = SkiingState { is_skiing: true, degraded: true, ..Default::default() };
        assert!(
            ground_friction(&body, Some(&degraded), &cfg)
                > ground_friction(&body, Some(&normal), &cfg)
        );
    }

    #[test]
    fn drag_grows_with_square_of_speed() {
        let cfg = PhysicsConfig::default();
        let mut body = grounded_on(0.0, Vec3::new(10.0, 0.0, 0.0));
        let slow = drag(&body, &cfg).length();
        body.velocity = Vec3::new(20.0, 0.0, 0.0);
        let fast = drag(&body, &cfg).length();
        assert!((fast / slow - 4.0).abs() < 1e-3);
    }
}
