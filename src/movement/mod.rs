mod controller;
pub mod handlers;
mod jump;
mod machine;
pub mod transitions;

pub use controller::MovementController;
pub use handlers::StateHandler;
pub use jump::JumpGate;
pub use machine::{MovementStateMachine, StateChange};

use crate::components::MovementState;

/// Result of a discrete player action. Declines are normal gameplay, not
/// errors, and leave every piece of state untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ActionOutcome {
    Performed,
    Declined(DeclineReason),
}

impl ActionOutcome {
    pub fn performed(self) -> bool {
        self == ActionOutcome::Performed
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DeclineReason {
    Airborne,
    WrongState(MovementState),
    Cooldown { remaining: f32 },
    InsufficientEnergy { energy: f32, required: f32 },
    AlreadyActive,
}
