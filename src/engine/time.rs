use crate::config::PhysicsConfig;

/// Clamp a frame delta to `[0, max_step]` so a hitch never integrates more
/// than a few fixed steps at once.
pub fn clamp_step(dt: f32, config: &PhysicsConfig) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, config.max_step())
}

/// Fixed-timestep accumulator.
///
/// Frame time goes in, a whole number of physics ticks comes out. The
/// leftover fraction carries over to the next frame.
pub struct FixedStep {
    pub step: f32,
    accumulator: f32,
    /// Upper bound on ticks per frame; the remainder is dropped.
    max_ticks: u32,
}

impl FixedStep {
    pub fn new(step: f32, max_ticks: u32) -> Self {
        Self { step, accumulator: 0.0, max_ticks: max_ticks.max(1) }
    }

    pub fn from_config(config: &PhysicsConfig) -> Self {
        Self::new(config.fixed_dt, config.max_step_multiplier.ceil() as u32)
    }

    /// Feed one frame's delta and return how many fixed ticks to run.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if ticks == self.max_ticks && self.accumulator >= self.step {
            // Spiral of death guard.
            self.accumulator %= self.step;
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_step_caps_hitches() {
        let cfg = PhysicsConfig::default();
        assert_eq!(clamp_step(0.01, &cfg), 0.01);
        assert!((clamp_step(0.5, &cfg) - 0.05).abs() < 1e-6);
        assert_eq!(clamp_step(-1.0, &cfg), 0.0);
        assert_eq!(clamp_step(f32::NAN, &cfg), 0.0);
    }

    #[test]
    fn accumulates_partial_frames() {
        let mut fixed = FixedStep::new(0.01, 3);
        assert_eq!(fixed.advance(0.004), 0);
        assert_eq!(fixed.advance(0.004), 0);
        assert_eq!(fixed.advance(0.004), 1);
        // 0.002 left over plus 0.009 makes one more step.
        assert_eq!(fixed.advance(0.009), 1);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut fixed = FixedStep::new(0.01, 3);
        assert_eq!(fixed.advance(1.0), 3);
        // The backlog is dropped rather than replayed.
        assert_eq!(fixed.advance(0.0), 0);
    }
}
