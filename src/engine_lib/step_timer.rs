// src/engine_lib/step_timer.rs

/// Longest real frame time accounted for; anything above is dropped.
pub const MAX_FRAME_DELTA: f64 = 0.1;

/// Splits real elapsed time into simulation steps.
#[derive(Debug, Clone)]
pub struct StepTimer {
    fixed_step: Option<f64>,
    accumulator: f64,
    frame_count: u64,
}

impl StepTimer {
    pub fn new(fixed_step: Option<f64>) -> Self {
        Self {
            fixed_step: fixed_step.filter(|s| *s > 0.0),
            accumulator: 0.0,
            frame_count: 0,
        }
    }

    /// Feeds `elapsed` seconds of wall time and calls `step(dt)` for every step due.
    /// Returns how many steps ran.
    pub fn tick(&mut self, elapsed: f64, mut step: impl FnMut(f64)) -> u32 {
        let elapsed = elapsed.clamp(0.0, MAX_FRAME_DELTA);
        match self.fixed_step {
            Some(fixed) => {
                self.accumulator += elapsed;
                let mut steps = 0;
                while self.accumulator >= fixed {
                    self.accumulator -= fixed;
                    self.frame_count += 1;
                    steps += 1;
                    step(fixed);
                }
                steps
            }
            None => {
                self.frame_count += 1;
                step(elapsed);
                1
            }
        }
    }

    /// Steps completed so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}
