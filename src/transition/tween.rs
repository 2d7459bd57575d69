use crate::animation::Interpolatable;
use crate::transition::easing::Easing;

/// Explicit interpolation record advanced once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween<T> {
    pub start: T,
    pub target: T,
    pub elapsed: f32,
    pub duration: f32,
    pub easing: Easing,
}

impl<T: Interpolatable> Tween<T> {
    #[must_use]
    pub fn new(start: T, target: T, duration: f32, easing: Easing) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            duration,
            easing,
        }
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased value; exactly `target` once finished.
    #[must_use]
    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.target;
        }
        T::interpolate_linear(self.start, self.target, self.easing.apply(self.progress()))
    }

    /// Advances by `dt` and returns the new value.
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed += dt.max(0.0);
        self.value()
    }
}
