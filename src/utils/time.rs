use std::time::{Duration, Instant};

/// Frame deltas above this are clamped (window hidden, debugger pause).
pub const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Per-frame driver clock.
///
/// `elapsed` is the sum of the (clamped) frame deltas, so it increases
/// monotonically and never jumps ahead of what transitions and clips saw.
#[derive(Debug, Clone)]
pub struct Timer {
    last_tick: Option<Instant>,
    max_delta: Duration,
    /// Time since last tick
    pub delta: Duration,
    /// Accumulated frame time
    pub elapsed: Duration,
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_tick: None,
            max_delta: MAX_FRAME_DELTA,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    #[must_use]
    pub fn with_max_delta(mut self, max_delta: Duration) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Samples the wall clock; call once per displayed frame. The first tick
    /// has a zero delta.
    pub fn tick(&mut self) {
        let now = Instant::now();
        let step = self.last_tick.map_or(Duration::ZERO, |last| now - last);
        self.last_tick = Some(now);
        self.advance(step);
    }

    /// Advances by a fixed step instead of the wall clock (offline playback, tests).
    pub fn advance(&mut self, step: Duration) {
        self.delta = step.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
