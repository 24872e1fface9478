use glam::Vec3;

use super::StateHandler;
use crate::components::{
    clamp_horizontal, horizontal, MovementState, MovementStateContext, StateDelta,
};
use crate::config::HandlerTuning;
use crate::movement::transitions::{lands_running, lands_skiing, wants_jetpack};

/// Ballistic flight with a little air control.
pub struct FlyingHandler {
    tuning: HandlerTuning,
}

impl FlyingHandler {
    pub fn new(tuning: HandlerTuning) -> Self {
        Self { tuning }
    }
}

impl StateHandler for FlyingHandler {
    fn state(&self) -> MovementState {
        MovementState::Flying
    }

    fn update(&self, ctx: &MovementStateContext, dt: f32) -> StateDelta {
        let t = &self.tuning;
        let mut v = ctx.velocity;
        v.y -= ctx.gravity * dt;

        if ctx.input.has_direction() {
            let h = horizontal(v);
            let target = ctx.input.wish_dir() * h.length().max(ctx.run_speed * ctx.air_control);
            // Most of the current heading is retained, so mid-air turns are slow.
            let blend = (ctx.air_control * (1.0 - t.air_momentum_retention) * t.air_steer_rate * dt)
                .clamp(0.0, 1.0);
            let h = h.lerp(target, blend);
            v = Vec3::new(h.x, v.y, h.z);
        }

        v *= (1.0 - t.air_resistance * dt).max(0.0);
        StateDelta::with_velocity(ctx, clamp_horizontal(v, ctx.max_speed))
    }

    fn enter(&self, ctx: &MovementStateContext, previous: MovementState) -> StateDelta {
        if previous.is_ground_state() && ctx.jumping {
            let mut v = ctx.velocity;
            v.y = ctx.jump_force;
            return StateDelta::with_velocity(ctx, v);
        }
        StateDelta::unchanged(ctx)
    }

    fn check_transition(&self, ctx: &MovementStateContext) -> Option<MovementState> {
        if lands_running(ctx) {
            Some(MovementState::Running)
        } else if wants_jetpack(ctx) {
            Some(MovementState::Jetpacking)
        } else if lands_skiing(ctx) {
            Some(MovementState::Skiing)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MovementInput;
    use crate::config::MovementConfig;

    fn airborne(velocity: Vec3) -> MovementStateContext {
        let mut ctx = MovementStateContext::new(&MovementConfig::default());
        ctx.velocity = velocity;
        ctx
    }

    #[test]
    fn gravity_and_air_resistance() {
        let ctx = airborne(Vec3::new(10.0, 0.0, 0.0));
        let v = FlyingHandler::new(HandlerTuning::default()).update(&ctx, 0.1).velocity;
        assert!(v.y < 0.0);
        assert!(v.x < 10.0 && v.x > 9.9);
    }

    #[test]
    fn air_control_turns_slowly() {
        let mut ctx = airborne(Vec3::new(10.0, 0.0, 0.0));
        let yaw = std::f32::consts::FRAC_PI_2;
        ctx.input = MovementInput { forward: 1.0, yaw, ..Default::default() };
        let v = FlyingHandler::new(HandlerTuning::default()).update(&ctx, 1.0 / 60.0).velocity;
        assert!(v.z > 0.0);
        assert!(v.z < 0.1 * v.x, "turned too fast: {v}");
    }

    #[test]
    fn jump_entry_sets_vertical_speed() {
        let handler = FlyingHandler::new(HandlerTuning::default());
        let mut ctx = airborne(Vec3::new(4.0, 0.0, 0.0));
        ctx.jumping = true;
        let v = handler.enter(&ctx, MovementState::Running).velocity;
        assert_eq!(v, Vec3::new(4.0, ctx.jump_force, 0.0));

        // Walking off a ledge is not a jump.
        ctx.jumping = false;
        assert_eq!(handler.enter(&ctx, MovementState::Running).velocity, ctx.velocity);
    }
}
