use glam::Vec3;

use super::StateHandler;
use crate::components::{
    clamp_horizontal, horizontal, MovementState, MovementStateContext, StateDelta,
};
use crate::config::{HandlerTuning, SurfaceTable};
use crate::movement::transitions::{airborne, flat_slope_stop, releases_ski, wants_jetpack};

/// Sliding on skis: gravity pulls along the fall line, lateral input steers,
/// and friction is low.
pub struct SkiingHandler {
    tuning: HandlerTuning,
    surfaces: SurfaceTable,
}

impl SkiingHandler {
    pub fn new(tuning: HandlerTuning, surfaces: SurfaceTable) -> Self {
        Self { tuning, surfaces }
    }

    fn grounded_update(&self, ctx: &MovementStateContext, dt: f32) -> Vec3 {
        let t = &self.tuning;
        let (angle, downhill, steepness, friction) = ctx
            .terrain
            .map_or((0.0, Vec3::ZERO, 0.0, 1.0), |g| {
                (g.slope_angle, g.downhill, g.steepness(), g.friction)
            });
        let mut v = ctx.velocity;

        v += downhill * (angle.sin() * ctx.gravity * dt);

        // Steering gets weaker on steep terrain.
        let steer = (1.0 - 0.8 * angle.sin()).max(0.1);
        let across = downhill
            .cross(Vec3::Y)
            .try_normalize()
            .unwrap_or_else(|| ctx.input.right_dir());
        let (_, lateral) = ctx.input.axes();
        v += across * (lateral * t.steer_acceleration * steer * dt);

        let momentum = self.surfaces.get(ctx.surface()).momentum;
        let mut mu = t.ski_friction * friction * (1.0 - 0.5 * steepness) * (1.0 - 0.5 * momentum);
        if angle < ctx.min_ski_angle {
            mu *= t.flat_ski_penalty;
        }
        let h = horizontal(v);
        let speed = h.length();
        if speed > 1e-4 {
            let drop = (mu * ctx.gravity * dt).min(speed);
            let h = h * ((speed - drop) / speed);
            v = Vec3::new(h.x, v.y, h.z);
        }
        v
    }

    fn airborne_update(&self, ctx: &MovementStateContext, dt: f32) -> Vec3 {
        let mut v = ctx.velocity;
        v.y -= ctx.gravity * dt;
        let nudge = ctx.input.wish_dir() * ctx.input.strength() * ctx.run_speed * ctx.air_control;
        v + nudge * dt
    }
}

impl StateHandler for SkiingHandler {
    fn state(&self) -> MovementState {
        MovementState::Skiing
    }

    fn update(&self, ctx: &MovementStateContext, dt: f32) -> StateDelta {
        let v = if ctx.grounded {
            self.grounded_update(ctx, dt)
        } else {
            self.airborne_update(ctx, dt)
        };
        StateDelta::with_velocity(ctx, clamp_horizontal(v, ctx.max_speed))
    }

    fn enter(&self, ctx: &MovementStateContext, previous: MovementState) -> StateDelta {
        let mut v = ctx.velocity;
        let downhill = ctx.terrain.map_or(Vec3::ZERO, |t| t.downhill);
        if previous.is_airborne() {
            v.y = 0.0;
            if ctx.on_ski_slope() {
                v += downhill * (self.tuning.ski_landing_boost * ctx.slope_angle().sin());
            }
        } else if previous == MovementState::Running && ctx.on_ski_slope() {
            v += downhill * self.tuning.ski_entry_push;
        }
        StateDelta::with_velocity(ctx, clamp_horizontal(v, ctx.max_speed))
    }

    fn check_transition(&self, ctx: &MovementStateContext) -> Option<MovementState> {
        let t = &self.tuning;
        if airborne(ctx) {
            Some(MovementState::Flying)
        } else if wants_jetpack(ctx) {
            Some(MovementState::Jetpacking)
        } else if releases_ski(ctx) {
            Some(MovementState::Running)
        } else if flat_slope_stop(ctx, t.flat_exit_speed, t.flat_exit_time) {
            Some(MovementState::Running)
        } else {
            None
        }
    }
}
