/// Finite-state-machine container with a prioritized transition table.
///
/// `S` is the state type (usually a fieldless enum) and `C` the context the
/// transition predicates read. The machine tracks the current state, the
/// previous state and how long it has been in the current state. What happens
/// on enter/exit is left to the owner; the machine only decides *which*
/// transition fires.
///
/// # Arbitration
///
/// Each call to [`StateMachine::select`] considers the transitions whose
/// `from` is the current state and whose condition holds. The highest
/// `priority` wins. Among equal priorities the entry added first wins, so
/// table order is the tie-break. At most one transition is returned.
///
/// # Usage
/// ```
/// # use slipstream::fsm::{StateMachine, Transition};
/// #[derive(Clone, Copy, PartialEq, Debug)]
/// enum Door { Open, Closed }
/// let mut fsm = StateMachine::new(Door::Closed);
/// let push = Transition::new(Door::Closed, Door::Open, 1, "push", |pushed: &bool| *pushed);
/// fsm.add_transition(push);
/// if let Some(next) = fsm.select(&true).map(|t| t.to) { fsm.go(next); }
/// assert_eq!(fsm.state, Door::Open);
/// ```
pub struct StateMachine<S, C> {
    pub state: S,
    pub previous: S,
    /// Seconds spent in the current state. Reset to 0.0 on each transition.
    pub elapsed: f32,
    entered_this_frame: bool,
    transitions: Vec<Transition<S, C>>,
}

/// One row of the transition table.
pub struct Transition<S, C> {
    pub from: S,
    pub to: S,
    pub priority: i32,
    pub name: String,
    condition: Box<dyn Fn(&C) -> bool>,
}

impl<S, C> Transition<S, C> {
    pub fn new(
        from: S,
        to: S,
        priority: i32,
        name: impl Into<String>,
        condition: impl Fn(&C) -> bool + 'static,
    ) -> Self {
        Self { from, to, priority, name: name.into(), condition: Box::new(condition) }
    }

    pub fn holds(&self, ctx: &C) -> bool {
        (self.condition)(ctx)
    }
}

impl<S: Copy + PartialEq, C> StateMachine<S, C> {
    /// Create a new machine starting in `initial` with an empty table.
    /// `just_entered()` returns `true` until the first tick.
    pub fn new(initial: S) -> Self {
        Self {
            previous: initial,
            state: initial,
            elapsed: 0.0,
            entered_this_frame: true,
            transitions: Vec::new(),
        }
    }

    /// Append a transition. Later entries lose ties against earlier ones.
    pub fn add_transition(&mut self, transition: Transition<S, C>) {
        self.transitions.push(transition);
    }

    pub fn transitions(&self) -> &[Transition<S, C>] {
        &self.transitions
    }

    /// The transition that should fire from the current state, if any.
    pub fn select(&self, ctx: &C) -> Option<&Transition<S, C>> {
        self.select_from(self.state, ctx)
    }

    /// Same arbitration as [`select`](Self::select) for an arbitrary source state.
    pub fn select_from(&self, from: S, ctx: &C) -> Option<&Transition<S, C>> {
        let mut best: Option<&Transition<S, C>> = None;
        for t in self.transitions.iter().filter(|t| t.from == from) {
            if best.is_some_and(|b| b.priority >= t.priority) {
                continue;
            }
            if t.holds(ctx) {
                best = Some(t);
            }
        }
        best
    }

    /// Move to `next` if it differs from the current state.
    /// Resets `elapsed` and sets `just_entered()` for one tick.
    /// Returns whether a transition happened.
    pub fn go(&mut self, next: S) -> bool {
        if self.state == next {
            return false;
        }
        self.previous = std::mem::replace(&mut self.state, next);
        self.elapsed = 0.0;
        self.entered_this_frame = true;
        true
    }

    /// Advance the elapsed-in-state timer by `dt` seconds and clear the
    /// `just_entered` flag. Call once per tick **before** processing transitions.
    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt;
        self.entered_this_frame = false;
    }

    /// Returns `true` only on the tick a state was entered.
    pub fn just_entered(&self) -> bool {
        self.entered_this_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Light {
        Red,
        Green,
        Amber,
    }

    struct Ctx {
        a: bool,
        b: bool,
    }

    fn machine() -> StateMachine<Light, Ctx> {
        let mut fsm = StateMachine::new(Light::Red);
        fsm.add_transition(Transition::new(Light::Red, Light::Green, 1, "a", |c: &Ctx| c.a));
        fsm.add_transition(Transition::new(Light::Red, Light::Amber, 2, "b", |c: &Ctx| c.b));
        fsm
    }

    #[test]
    fn higher_priority_wins() {
        let fsm = machine();
        let t = fsm.select(&Ctx { a: true, b: true }).unwrap();
        assert_eq!(t.to, Light::Amber);
    }

    #[test]
    fn ties_go_to_the_earlier_entry() {
        let mut fsm = StateMachine::new(Light::Red);
        fsm.add_transition(Transition::new(Light::Red, Light::Green, 2, "first", |_: &Ctx| true));
        fsm.add_transition(Transition::new(Light::Red, Light::Amber, 2, "second", |_: &Ctx| true));
        assert_eq!(fsm.select(&Ctx { a: false, b: false }).unwrap().name, "first");
    }

    #[test]
    fn no_match_keeps_state() {
        let fsm = machine();
        assert!(fsm.select(&Ctx { a: false, b: false }).is_none());
    }

    #[test]
    fn only_rows_from_current_state_are_considered() {
        let mut fsm = machine();
        fsm.go(Light::Green);
        assert!(fsm.select(&Ctx { a: true, b: true }).is_none());
    }

    #[test]
    fn go_to_same_state_is_a_noop() {
        let mut fsm = machine();
        fsm.tick(0.5);
        assert!(!fsm.go(Light::Red));
        assert_eq!(fsm.elapsed, 0.5);
        assert!(fsm.go(Light::Green));
        assert_eq!(fsm.previous, Light::Red);
        assert_eq!(fsm.elapsed, 0.0);
        assert!(fsm.just_entered());
    }
}
