use std::time::{Duration, Instant};

/// Frames-per-second over a rolling one-second window.
///
/// The reported value only changes when a window completes, so it stays
/// readable in a title bar.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    last: Instant,
    frames: u32,
    elapsed: Duration,
    period: Duration,
    fps: f64,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            elapsed: Duration::ZERO,
            period: Duration::from_secs(1),
            fps: 0.0,
        }
    }

    /// Counts one presented frame.
    pub fn frame(&mut self) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.record(dt);
    }

    /// Counts one frame that took `dt`.
    pub fn record(&mut self, dt: Duration) {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.fps = f64::from(self.frames) / self.elapsed.as_secs_f64();
            self.frames = 0;
            self.elapsed = Duration::ZERO;
        }
    }

    /// Last completed measurement; zero before the first window closes.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}
