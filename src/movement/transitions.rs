//! Transition predicates and the default transition table.
//!
//! Priorities: 3 for involuntary/physical changes, 2 for player-initiated
//! ones, 1 for passive decay. Within a priority the earlier row wins, so the
//! row order below is part of the behaviour.

use crate::components::{MovementState, MovementStateContext};
use crate::config::HandlerTuning;
use crate::fsm::Transition;

use MovementState::{Flying, Jetpacking, Running, Skiing};

pub const PRIORITY_PHYSICAL: i32 = 3;
pub const PRIORITY_PLAYER: i32 = 2;
pub const PRIORITY_DECAY: i32 = 1;

pub type MovementTransition = Transition<MovementState, MovementStateContext>;

pub fn airborne(ctx: &MovementStateContext) -> bool {
    !ctx.grounded
}

pub fn wants_jetpack(ctx: &MovementStateContext) -> bool {
    ctx.input.jetpack && ctx.energy > 0.0
}

pub fn wants_ski(ctx: &MovementStateContext) -> bool {
    ctx.input.ski && ctx.grounded
}

pub fn releases_ski(ctx: &MovementStateContext) -> bool {
    !ctx.input.ski && ctx.grounded
}

pub fn lands_running(ctx: &MovementStateContext) -> bool {
    ctx.grounded && !ctx.input.ski
}

pub fn lands_skiing(ctx: &MovementStateContext) -> bool {
    ctx.grounded && ctx.input.ski
}

pub fn jetpack_cutoff(ctx: &MovementStateContext) -> bool {
    !ctx.input.jetpack || ctx.energy <= 0.0
}

/// Sustained low angle, low speed and enough time skiing. All three must hold.
pub fn flat_slope_stop(ctx: &MovementStateContext, exit_speed: f32, exit_time: f32) -> bool {
    ctx.slope_angle() < ctx.min_ski_angle
        && ctx.speed() < exit_speed
        && ctx.time_in_state > exit_time
}

/// The built-in table, in arbitration order.
pub fn default_transitions(tuning: &HandlerTuning) -> Vec<MovementTransition> {
    let (exit_speed, exit_time) = (tuning.flat_exit_speed, tuning.flat_exit_time);
    vec![
        // Physical
        Transition::new(Running, Flying, PRIORITY_PHYSICAL, "left ground", airborne),
        Transition::new(Skiing, Flying, PRIORITY_PHYSICAL, "left ground", airborne),
        Transition::new(Flying, Running, PRIORITY_PHYSICAL, "landed", lands_running),
        Transition::new(Jetpacking, Running, PRIORITY_PHYSICAL, "landed", lands_running),
        Transition::new(Jetpacking, Flying, PRIORITY_PHYSICAL, "jetpack cut off", jetpack_cutoff),
        // Player
        Transition::new(Running, Jetpacking, PRIORITY_PLAYER, "jetpack", wants_jetpack),
        Transition::new(Skiing, Jetpacking, PRIORITY_PLAYER, "jetpack", wants_jetpack),
        Transition::new(Flying, Jetpacking, PRIORITY_PLAYER, "jetpack", wants_jetpack),
        Transition::new(Running, Skiing, PRIORITY_PLAYER, "ski", wants_ski),
        Transition::new(Skiing, Running, PRIORITY_PLAYER, "ski released", releases_ski),
        Transition::new(Flying, Skiing, PRIORITY_PLAYER, "landed skiing", lands_skiing),
        Transition::new(Jetpacking, Skiing, PRIORITY_PLAYER, "landed skiing", lands_skiing),
        // Decay
        Transition::new(Skiing, Running, PRIORITY_DECAY, "ran out of slope", move |ctx| {
            flat_slope_stop(ctx, exit_speed, exit_time)
        }),
    ]
}
