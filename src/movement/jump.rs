/// Cooldown between successful jumps.
#[derive(Clone, Copy, Debug)]
pub struct JumpGate {
    pub cooldown: f32,
    last_jump: Option<f64>,
}

impl JumpGate {
    pub fn new(cooldown: f32) -> Self {
        Self { cooldown, last_jump: None }
    }

    /// Seconds until the next jump is allowed at `now`; zero when ready.
    pub fn remaining(&self, now: f64) -> f32 {
        match self.last_jump {
            Some(t) => (f64::from(self.cooldown) - (now - t)).max(0.0) as f32,
            None => 0.0,
        }
    }

    pub fn ready(&self, now: f64) -> bool {
        self.remaining(now) <= 0.0
    }

    pub fn record(&mut self, now: f64) {
        self.last_jump = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_jump_inside_cooldown_is_refused() {
        let mut gate = JumpGate::new(0.2);
        assert!(gate.ready(0.0));
        gate.record(0.0);

        assert!(!gate.ready(0.1));
        assert!((gate.remaining(0.1) - 0.1).abs() < 1e-6);

        assert!(gate.ready(0.25));
    }
}
