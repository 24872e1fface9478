//! Momentum conservation and bookkeeping.
//!
//! Raw force integration alone makes speed feel "sticky": every state change
//! or turn starts from whatever the forces produced this tick. On top of it,
//! a share of the previous tick's horizontal velocity is blended back in,
//! scaled by how much the entity has been accelerating (the running momentum
//! factor), the surface, the slope direction and how sharply it turned.

use glam::Vec3;

use crate::components::{
    clamp_horizontal, horizontal, MomentumState, MovementState, PhysicsState,
};
use crate::config::PhysicsConfig;

/// Composite factor applied to the previous horizontal velocity, or `None`
/// when both ticks are below the minimum momentum speed.
pub fn conservation_factor(
    prev_velocity: Vec3,
    velocity: Vec3,
    body: &PhysicsState,
    cfg: &PhysicsConfig,
) -> Option<f32> {
    let prev_h = horizontal(prev_velocity);
    let curr_h = horizontal(velocity);
    if prev_h.length() < cfg.min_momentum_speed && curr_h.length() < cfg.min_momentum_speed {
        return None;
    }

    let prev_dir = prev_h.normalize_or_zero();
    let curr_dir = curr_h.normalize_or_zero();
    let penalty =
        ((1.0 - prev_dir.dot(curr_dir)) * 0.5 * cfg.direction_change_penalty).clamp(0.0, 1.0);

    let mut surface = cfg.surfaces.get(body.surface).momentum;
    if let Some(slope) = body.slope.filter(|_| body.grounded) {
        let along = curr_dir.dot(slope.downhill);
        if along > 0.2 {
            surface *= cfg.downhill_boost;
        } else if along < -0.2 {
            surface *= cfg.uphill_retention;
        }
    }

    Some(body.momentum.factor * surface * (1.0 - penalty))
}

/// Blend the previous tick's horizontal velocity into `velocity` and clamp
/// the horizontal speed to `max_speed`. The vertical component is untouched.
pub fn conserve(
    prev_velocity: Vec3,
    velocity: Vec3,
    body: &PhysicsState,
    cfg: &PhysicsConfig,
    dt: f32,
) -> Vec3 {
    let Some(factor) = conservation_factor(prev_velocity, velocity, body, cfg) else {
        return velocity;
    };
    let carried = horizontal(prev_velocity) * factor * dt;
    clamp_horizontal(velocity + carried, cfg.max_speed)
}

/// Ramp the running momentum factor and refresh magnitude/direction.
///
/// The factor decays while the body slows down and grows otherwise, always
/// staying in [0, 1].
pub fn track(
    momentum: &mut MomentumState,
    prev_speed: f32,
    velocity: Vec3,
    mass: f32,
    cfg: &PhysicsConfig,
    dt: f32,
) {
    let speed = velocity.length();
    momentum.factor = if speed < prev_speed {
        (momentum.factor - cfg.momentum_decay_rate * dt).max(0.0)
    } else {
        (momentum.factor + cfg.momentum_growth_rate * dt).min(1.0)
    };

    momentum.magnitude = mass * speed;
    if speed > 1e-4 {
        momentum.direction = velocity / speed;
    }
    let h = horizontal(velocity);
    if h.length() > 1e-3 {
        momentum.last_move_direction = h.normalize();
    }
}

/// Scale momentum for a movement-state change. Landings additionally rebuild
/// the velocity from its horizontal part with a small upward lift.
pub fn apply_transition(
    body: &mut PhysicsState,
    from: MovementState,
    to: MovementState,
    cfg: &PhysicsConfig,
    clock: f64,
) {
    let factor = cfg.transitions.get(from, to);
    body.momentum.factor = (body.momentum.factor * factor).clamp(0.0, 1.0);
    body.momentum.last_state_change = clock;

    if from.is_airborne() && to.is_ground_state() {
        let h = horizontal(body.velocity) * factor;
        body.velocity = Vec3::new(h.x, cfg.landing_lift, h.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::BodyDesc;
    use crate::config::SurfaceType;
    use crate::systems::ground::slope_from_normal;

    fn body(factor: f32, surface: SurfaceType) -> PhysicsState {
        let mut b = PhysicsState::from_desc(&BodyDesc::new(Vec3::ZERO, 80.0));
        b.momentum.factor = factor;
        b.surface = surface;
        b
    }

    #[test]
    fn slow_motion_skips_conservation() {
        let cfg = PhysicsConfig::default();
        let b = body(1.0, SurfaceType::Ice);
        let v = Vec3::new(1.0, 0.0, 0.0);
        assert_eq!(conserve(v, v, &b, &cfg, cfg.fixed_dt), v);
    }

    #[test]
    fn straight_line_carries_previous_velocity() {
        let cfg = PhysicsConfig::default();
        let b = body(1.0, SurfaceType::Ice);
        let v = Vec3::new(10.0, 0.0, 0.0);
        let out = conserve(v, v, &b, &cfg, 0.1);
        let expected = 10.0 + 10.0 * 0.99 * 0.1;
        assert!((out.x - expected).abs() < 1e-4);
    }

    #[test]
    fn reversal_cancels_carry() {
        let cfg = PhysicsConfig::default();
        let b = body(1.0, SurfaceType::Ice);
        let prev = Vec3::new(10.0, 0.0, 0.0);
        let curr = Vec3::new(-10.0, 0.0, 0.0);
        assert_eq!(conservation_factor(prev, curr, &b, &cfg), Some(0.0));
    }

    #[test]
    fn ice_keeps_more_than_rock() {
        let cfg = PhysicsConfig::default();
        let v = Vec3::new(10.0, 0.0, 0.0);
        let ice = conservation_factor(v, v, &body(1.0, SurfaceType::Ice), &cfg).unwrap();
        let rock = conservation_factor(v, v, &body(1.0, SurfaceType::Rock), &cfg).unwrap();
        assert!(ice > rock);
    }

    #[test]
    fn downhill_boosts_and_uphill_retains() {
        let cfg = PhysicsConfig::default();
        let a = 20.0_f32.to_radians();
        let mut b = body(1.0, SurfaceType::Snow);
        b.grounded = true;
        b.slope = Some(slope_from_normal(Vec3::new(a.sin(), a.cos(), 0.0)));
        let down = Vec3::new(10.0, 0.0, 0.0);
        let up = Vec3::new(-10.0, 0.0, 0.0);
        let flat = cfg.surfaces.get(SurfaceType::Snow).momentum;
        let fd = conservation_factor(down, down, &b, &cfg).unwrap();
        let fu = conservation_factor(up, up, &b, &cfg).unwrap();
        assert!((fd - flat * cfg.downhill_boost).abs() < 1e-5);
        assert!((fu - flat * cfg.uphill_retention).abs() < 1e-5);
    }

    #[test]
    fn conserved_speed_respects_max() {
        let cfg = PhysicsConfig::default();
        let b = body(1.0, SurfaceType::Ice);
        let v = Vec3::new(cfg.max_speed, -3.0, 0.0);
        let out = conserve(v, v, &b, &cfg, 0.05);
        assert!(horizontal(out).length() <= cfg.max_speed + 1e-3);
        assert_eq!(out.y, -3.0);
    }

    #[test]
    fn factor_monotonic_and_bounded() {
        let cfg = PhysicsConfig::default();
        let mut m = MomentumState::default();
        let dt = cfg.fixed_dt;

        // Accelerating: non-decreasing, capped at 1.
        let mut speed = 0.0;
        for _ in 0..1_000 {
            let before = m.factor;
            track(&mut m, speed, Vec3::new(speed + 0.1, 0.0, 0.0), 80.0, &cfg, dt);
            speed += 0.1;
            assert!(m.factor >= before);
            assert!((0.0..=1.0).contains(&m.factor));
        }
        assert_eq!(m.factor, 1.0);

        // Braking: non-increasing, floored at 0.
        for _ in 0..1_000 {
            let before = m.factor;
            let next = (speed - 0.05).max(0.0);
            track(&mut m, speed, Vec3::new(next, 0.0, 0.0), 80.0, &cfg, dt);
            if next < speed {
                assert!(m.factor <= before);
            }
            speed = next;
            assert!((0.0..=1.0).contains(&m.factor));
        }
    }

    #[test]
    fn landing_rebuilds_velocity_with_lift() {
        let cfg = PhysicsConfig::default();
        let mut b = body(0.8, SurfaceType::Snow);
        b.velocity = Vec3::new(6.0, -9.0, 2.0);
        apply_transition(&mut b, MovementState::Flying, MovementState::Running, &cfg, 3.0);
        assert_eq!(b.velocity, Vec3::new(6.0, cfg.landing_lift, 2.0));
        assert_eq!(b.momentum.last_state_change, 3.0);
    }

    #[test]
    fn transition_scales_momentum_factor() {
        let cfg = PhysicsConfig::default();
        let mut b = body(1.0, SurfaceType::Snow);
        apply_transition(&mut b, MovementState::Skiing, MovementState::Running, &cfg, 0.0);
        assert!((b.momentum.factor - 0.8).abs() < 1e-6);
    }
}
