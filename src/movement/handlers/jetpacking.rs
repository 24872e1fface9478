use glam::Vec3;

use super::StateHandler;
use crate::components::{clamp_horizontal, MovementState, MovementStateContext, StateDelta};
use crate::config::HandlerTuning;
use crate::movement::transitions::{jetpack_cutoff, lands_running, lands_skiing};

/// Powered flight. Burns energy; the table drops out of it when the tank is
/// empty or the button is released.
pub struct JetpackingHandler {
    tuning: HandlerTuning,
}

impl JetpackingHandler {
    pub fn new(tuning: HandlerTuning) -> Self {
        Self { tuning }
    }

    /// Thrust leans from straight up toward the input direction.
    pub fn thrust_dir(&self, ctx: &MovementStateContext) -> Vec3 {
        let wish = ctx.input.wish_dir() * ctx.input.strength();
        Vec3::Y.lerp(wish, self.tuning.jetpack_blend).normalize_or(Vec3::Y)
    }

    /// Horizontal limit; inherited speed is allowed for a short window after
    /// entry.
    pub fn speed_limit(&self, ctx: &MovementStateContext) -> f32 {
        if ctx.time_in_state < self.tuning.momentum_boost_window {
            ctx.max_speed * self.tuning.max_momentum_boost
        } else {
            ctx.max_speed
        }
    }
}

impl StateHandler for JetpackingHandler {
    fn state(&self) -> MovementState {
        MovementState::Jetpacking
    }

    fn update(&self, ctx: &MovementStateContext, dt: f32) -> StateDelta {
        let mut v = ctx.velocity;
        v += self.thrust_dir(ctx) * (ctx.jetpack_force * dt);
        v.y -= ctx.gravity * 0.5 * dt;
        v *= (1.0 - self.tuning.air_resistance * dt).max(0.0);

        StateDelta {
            velocity: clamp_horizontal(v, self.speed_limit(ctx)),
            energy: ctx.energy - ctx.energy_use_rate * dt,
        }
    }

    fn enter(&self, ctx: &MovementStateContext, _previous: MovementState) -> StateDelta {
        let t = &self.tuning;
        let mut v = ctx.velocity;
        if v.y < 0.0 {
            v.y = ctx.jetpack_force * t.jetpack_fall_kick;
        } else {
            v.y += ctx.jetpack_force * t.jetpack_rise_kick;
        }
        StateDelta::with_velocity(ctx, v)
    }

    fn exit(&self, ctx: &MovementStateContext, next: MovementState) -> StateDelta {
        if next == MovementState::Flying {
            let mut v = ctx.velocity;
            v.y += ctx.jetpack_force * self.tuning.jetpack_exit_kick;
            return StateDelta::with_velocity(ctx, v);
        }
        StateDelta::unchanged(ctx)
    }

    fn check_transition(&self, ctx: &MovementStateContext) -> Option<MovementState> {
        if lands_running(ctx) {
            Some(MovementState::Running)
        } else if jetpack_cutoff(ctx) {
            Some(MovementState::Flying)
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
    use crate::components::{horizontal, MovementInput};
    use crate::config::MovementConfig;

    fn thrusting() -> MovementStateContext {
        let mut ctx = MovementStateContext::new(&MovementConfig::default());
        ctx.input = MovementInput { jetpack: true, ..Default::default() };
        ctx
    }

    #[test]
    fn thrust_climbs_and_burns_energy() {
        let ctx = thrusting();
        let delta = JetpackingHandler::new(HandlerTuning::default()).update(&ctx, 0.1);
        assert!(delta.velocity.y > 0.0);
        assert!((delta.energy - (ctx.energy - ctx.energy_use_rate * 0.1)).abs() < 1e-4);
    }

    #[test]
    fn input_leans_the_thrust() {
        let handler = JetpackingHandler::new(HandlerTuning::default());
        let mut ctx = thrusting();
        ctx.input.forward = 1.0;
        let dir = handler.thrust_dir(&ctx);
        assert!(dir.x > 0.0 && dir.y > dir.x);
        assert!((dir.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn entry_kicks() {
        let handler = JetpackingHandler::new(HandlerTuning::default());
        let mut ctx = thrusting();
        ctx.velocity = Vec3::new(0.0, -12.0, 0.0);
        assert_eq!(handler.enter(&ctx, MovementState::Flying).velocity.y, 0.2 * ctx.jetpack_force);
        ctx.velocity = Vec3::new(0.0, 3.0, 0.0);
        let rising = handler.enter(&ctx, MovementState::Flying).velocity.y;
        assert!((rising - (3.0 + 0.1 * ctx.jetpack_force)).abs() < 1e-5);
    }

    #[test]
    fn exit_to_flying_keeps_a_little_lift() {
        let handler = JetpackingHandler::new(HandlerTuning::default());
        let ctx = thrusting();
        assert!(handler.exit(&ctx, MovementState::Flying).velocity.y > 0.0);
        assert_eq!(handler.exit(&ctx, MovementState::Running).velocity.y, 0.0);
    }

    #[test]
    fn inherited_speed_survives_the_boost_window() {
        let handler = JetpackingHandler::new(HandlerTuning::default());
        let mut ctx = thrusting();
        ctx.velocity = Vec3::new(ctx.max_speed * 1.3, 0.0, 0.0);
        ctx.time_in_state = 0.1;
        let early = horizontal(handler.update(&ctx, 1.0 / 60.0).velocity).length();
        assert!(early > ctx.max_speed);
        ctx.time_in_state = 0.6;
        let late = horizontal(handler.update(&ctx, 1.0 / 60.0).velocity).length();
        assert!(late <= ctx.max_speed + 1e-3);
    }
}
