use std::time::Duration;

/// Default simulation rate.
pub const DEFAULT_TICK_RATE: u32 = 120;

/// Fixed-timestep accumulator.
///
/// Real time is fed in with [`FixedStep::advance`]; it returns how many
/// whole steps are due. The remainder carries over to the next call.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: Duration,
    accumulator: Duration,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::with_rate(DEFAULT_TICK_RATE)
    }
}

impl FixedStep {
    /// Steps of `1 / rate` seconds. A rate of zero is treated as one.
    pub fn with_rate(rate: u32) -> Self {
        Self::new(Duration::from_secs(1) / rate.max(1))
    }

    pub fn new(step: Duration) -> Self {
        Self {
            step: step.max(Duration::from_nanos(1)),
            accumulator: Duration::ZERO,
        }
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    /// Adds `dt` and consumes every complete step.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.accumulator += dt;
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }

    /// Fraction of a step left in the accumulator, in `0.0..1.0`.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_frames_accumulate() {
        let mut s = FixedStep::new(Duration::from_millis(10));
        assert_eq!(s.advance(Duration::from_millis(4)), 0);
        assert_eq!(s.advance(Duration::from_millis(4)), 0);
        assert_eq!(s.advance(Duration::from_millis(4)), 1);
        approx::assert_abs_diff_eq!(s.alpha(), 0.2, epsilon = 1e-4);
    }

    #[test]
    fn long_frame_catches_up() {
        let mut s = FixedStep::new(Duration::from_millis(10));
        assert_eq!(s.advance(Duration::from_millis(35)), 3);
        assert_eq!(s.advance(Duration::from_millis(5)), 1);
    }

    #[test]
    fn default_runs_at_120_hz() {
        let mut s = FixedStep::default();
        assert_eq!(s.advance(Duration::from_secs(1)), 120);
    }

    #[test]
    fn zero_rate_does_not_divide_by_zero() {
        assert_eq!(FixedStep::with_rate(0).step(), Duration::from_secs(1));
    }
}
