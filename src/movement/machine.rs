use tracing::debug;

use super::handlers::{default_handlers, StateHandler};
use super::transitions::{default_transitions, MovementTransition};
use crate::components::{MovementState, MovementStateContext};
use crate::config::{MovementConfig, SurfaceTable};
use crate::error::{SimError, SimResult};
use crate::fsm::StateMachine;

/// Published to observers on every state change.
#[derive(Clone, Debug, PartialEq)]
pub struct StateChange {
    pub previous: MovementState,
    pub new: MovementState,
    pub reason: String,
}

type Observer = Box<dyn FnMut(&StateChange)>;

/// Movement FSM: the generic transition table plus one handler per state.
///
/// Per tick the current handler shapes the velocity, then at most one
/// transition fires. Enter/exit hooks run inside [`transition_to`], which is
/// also the entry point for the controller's imperative actions.
///
/// [`transition_to`]: MovementStateMachine::transition_to
pub struct MovementStateMachine {
    fsm: StateMachine<MovementState, MovementStateContext>,
    handlers: [Box<dyn StateHandler>; MovementState::COUNT],
    observers: Vec<Observer>,
}

impl MovementStateMachine {
    /// Build a machine starting in `Running` with an empty transition table.
    ///
    /// Every state needs exactly one handler.
    pub fn new(handlers: Vec<Box<dyn StateHandler>>) -> SimResult<Self> {
        let mut slots: [Option<Box<dyn StateHandler>>; MovementState::COUNT] = Default::default();
        for handler in handlers {
            let state = handler.state();
            let slot = &mut slots[state.index()];
            if slot.is_some() {
                return Err(SimError::DuplicateHandler(state));
            }
            *slot = Some(handler);
        }

        let [running, skiing, flying, jetpacking] = slots;
        let take = |slot: Option<Box<dyn StateHandler>>, state| {
            slot.ok_or(SimError::MissingHandler(state))
        };
        let handlers = [
            take(running, MovementState::Running)?,
            take(skiing, MovementState::Skiing)?,
            take(flying, MovementState::Flying)?,
            take(jetpacking, MovementState::Jetpacking)?,
        ];

        Ok(Self {
            fsm: StateMachine::new(MovementState::Running),
            handlers,
            observers: Vec::new(),
        })
    }

    /// The stock handlers and transition table for `config`.
    pub fn with_default_transitions(
        config: &MovementConfig,
        surfaces: &SurfaceTable,
    ) -> SimResult<Self> {
        let mut machine = Self::new(default_handlers(&config.tuning, surfaces))?;
        for transition in default_transitions(&config.tuning) {
            machine.add_transition(transition);
        }
        Ok(machine)
    }

    pub fn current_state(&self) -> MovementState {
        self.fsm.state
    }

    pub fn previous_state(&self) -> MovementState {
        self.fsm.previous
    }

    pub fn handler(&self, state: MovementState) -> &dyn StateHandler {
        &*self.handlers[state.index()]
    }

    /// Extend the table at runtime. Ties go to rows added earlier.
    pub fn add_transition(&mut self, transition: MovementTransition) {
        self.fsm.add_transition(transition);
    }

    pub fn transitions(&self) -> &[MovementTransition] {
        self.fsm.transitions()
    }

    /// Register a callback for every state change.
    pub fn subscribe(&mut self, observer: impl FnMut(&StateChange) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Where the table would go from `from` for this context.
    pub fn select_from(
        &self,
        from: MovementState,
        ctx: &MovementStateContext,
    ) -> Option<MovementState> {
        self.fsm.select_from(from, ctx).map(|t| t.to)
    }

    /// Run the current handler, then evaluate transitions.
    pub fn update(&mut self, ctx: &mut MovementStateContext, dt: f32) -> Option<StateChange> {
        self.fsm.tick(dt);
        ctx.time_in_state += dt;
        let delta = self.handler(self.fsm.state).update(ctx, dt);
        ctx.apply(delta);
        self.check_transitions(ctx)
    }

    /// Fire the best matching transition out of the current state, if any.
    pub fn check_transitions(&mut self, ctx: &mut MovementStateContext) -> Option<StateChange> {
        let (to, reason) = self.fsm.select(ctx).map(|t| (t.to, t.name.clone()))?;
        self.transition_to(ctx, to, &reason)
    }

    /// Exit the current state, enter `new` and notify observers. A no-op when
    /// already in `new`.
    pub fn transition_to(
        &mut self,
        ctx: &mut MovementStateContext,
        new: MovementState,
        reason: &str,
    ) -> Option<StateChange> {
        let previous = self.fsm.state;
        if previous == new {
            return None;
        }

        let delta = self.handler(previous).exit(ctx, new);
        ctx.apply(delta);
        self.fsm.go(new);
        let delta = self.handler(new).enter(ctx, previous);
        ctx.apply(delta);
        ctx.time_in_state = 0.0;

        debug!(from = previous.name(), to = new.name(), reason, "movement state change");
        let change = StateChange { previous, new, reason: reason.to_owned() };
        for observer in &mut self.observers {
            observer(&change);
        }
        Some(change)
    }
}
