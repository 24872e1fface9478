use glam::Vec3;

use super::StateHandler;
use crate::components::{clamp_horizontal, MovementState, MovementStateContext, StateDelta};
use crate::config::{HandlerTuning, SurfaceTable};
use crate::movement::transitions::{airborne, wants_jetpack, wants_ski};

/// Ground locomotion: exponential approach toward the input velocity.
pub struct RunningHandler {
    tuning: HandlerTuning,
    surfaces: SurfaceTable,
}

impl RunningHandler {
    pub fn new(tuning: HandlerTuning, surfaces: SurfaceTable) -> Self {
        Self { tuning, surfaces }
    }

    /// Approach rate toward the desired velocity. Doubled with no input so
    /// the runner brakes actively; with input, slippery surfaces keep more
    /// of the current speed.
    fn approach_rate(&self, ctx: &MovementStateContext) -> f32 {
        let friction = ctx.terrain.map_or(1.0, |t| t.friction);
        let base = self.tuning.ground_acceleration * friction;
        if ctx.input.has_direction() {
            base * (1.5 - self.surfaces.get(ctx.surface()).retention)
        } else {
            base * 2.0
        }
    }
}

impl StateHandler for RunningHandler {
    fn state(&self) -> MovementState {
        MovementState::Running
    }

    fn update(&self, ctx: &MovementStateContext, dt: f32) -> StateDelta {
        let desired = ctx.input.wish_dir() * ctx.input.strength() * ctx.run_speed;
        let blend = 1.0 - (-self.approach_rate(ctx) * dt).exp();
        let h = ctx.horizontal_velocity().lerp(desired, blend);

        let mut vy = ctx.velocity.y;
        if !ctx.grounded {
            vy -= ctx.gravity * dt;
        }
        let velocity = clamp_horizontal(Vec3::new(h.x, vy, h.z), ctx.max_speed);

        let mut energy = ctx.energy;
        if ctx.regen_cooldown <= 0.0 {
            energy += ctx.energy_regen_rate * dt;
        }
        StateDelta { velocity, energy }
    }

    fn enter(&self, ctx: &MovementStateContext, previous: MovementState) -> StateDelta {
        if previous.is_airborne() {
            // Landing absorbs the fall; horizontal speed carries through.
            let v = ctx.velocity;
            return StateDelta::with_velocity(ctx, Vec3::new(v.x, 0.0, v.z));
        }
        StateDelta::unchanged(ctx)
    }

    fn check_transition(&self, ctx: &MovementStateContext) -> Option<MovementState> {
        if airborne(ctx) {
            Some(MovementState::Flying)
        } else if wants_jetpack(ctx) {
            Some(MovementState::Jetpacking)
        } else if wants_ski(ctx) {
            Some(MovementState::Skiing)
        } else {
            None
        }
    }
}
