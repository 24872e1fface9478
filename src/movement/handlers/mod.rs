//! Per-state velocity shaping.
//!
//! Handlers are pure: they read a context snapshot and return the next
//! velocity and energy as a [`StateDelta`]. The state machine applies it.

mod flying;
mod jetpacking;
mod running;
mod skiing;

pub use flying::FlyingHandler;
pub use jetpacking::JetpackingHandler;
pub use running::RunningHandler;
pub use skiing::SkiingHandler;

use crate::components::{MovementState, MovementStateContext, StateDelta};
use crate::config::{HandlerTuning, SurfaceTable};

pub trait StateHandler {
    /// The state this handler drives.
    fn state(&self) -> MovementState;

    fn state_name(&self) -> &'static str {
        self.state().name()
    }

    fn update(&self, ctx: &MovementStateContext, dt: f32) -> StateDelta;

    fn enter(&self, ctx: &MovementStateContext, _previous: MovementState) -> StateDelta {
        StateDelta::unchanged(ctx)
    }

    fn exit(&self, ctx: &MovementStateContext, _next: MovementState) -> StateDelta {
        StateDelta::unchanged(ctx)
    }

    /// Where the transition table would send this state for `ctx`, if
    /// anywhere. Used for direct queries; the table stays authoritative.
    fn check_transition(&self, ctx: &MovementStateContext) -> Option<MovementState>;
}

/// One handler per state, built from the same tuning.
pub fn default_handlers(
    tuning: &HandlerTuning,
    surfaces: &SurfaceTable,
) -> Vec<Box<dyn StateHandler>> {
    vec![
        Box::new(RunningHandler::new(tuning.clone(), surfaces.clone())),
        Box::new(SkiingHandler::new(tuning.clone(), surfaces.clone())),
        Box::new(FlyingHandler::new(tuning.clone())),
        Box::new(JetpackingHandler::new(tuning.clone())),
    ]
}
