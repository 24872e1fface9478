use crate::components::MovementInput;

/// Current and previous input snapshot for one controlled entity.
///
/// Held buttons drive the per-tick transition predicates; a jump press
/// (released last tick, held this tick) drives the one-shot jump.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub current: MovementInput,
    previous: MovementInput,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current snapshot. The previous one is kept until
    /// [`latch`](Self::latch).
    pub fn update(&mut self, input: MovementInput) {
        self.current = input;
    }

    /// End of tick: the current snapshot becomes the previous one.
    pub fn latch(&mut self) {
        self.previous = self.current;
    }

    pub fn jump_pressed(&self) -> bool {
        self.current.jump && !self.previous.jump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_fires_once_while_held() {
        let mut input = InputState::new();
        let held = MovementInput { jump: true, ..Default::default() };

        input.update(held);
        assert!(input.jump_pressed());
        input.latch();

        input.update(held);
        assert!(!input.jump_pressed());
        input.latch();

        input.update(MovementInput::default());
        input.latch();
        input.update(held);
        assert!(input.jump_pressed());
    }
}
