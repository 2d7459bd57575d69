use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    #[default]
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor scans linearly before falling back to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval so sequential playback samples in O(1).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// Parallel time / value sequences for one animated property.
///
/// For `CubicSpline`, `values` holds `[in_tangent, value, out_tangent]`
/// triplets, so its length is `times.len() * 3`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn linear(times: Vec<f32>, values: Vec<T>) -> Self {
        Self::new(times, values, InterpolationMode::Linear)
    }

    /// Time of the last keyframe (0 for an empty track).
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether `values` holds exactly one entry per keyframe (three for
    /// `CubicSpline`). Sampling a malformed track panics.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        let stride = match self.interpolation {
            InterpolationMode::CubicSpline => 3,
            _ => 1,
        };
        self.values.len() == self.times.len() * stride
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns a track with the same timing and every value passed through `f`.
    ///
    /// Tangents of cubic tracks are mapped too, which is only meaningful for
    /// linear maps such as uniform scaling.
    #[must_use]
    pub fn map_values(&self, f: impl FnMut(T) -> T) -> Self {
        Self {
            times: self.times.clone(),
            values: self.values.iter().copied().map(f).collect(),
            interpolation: self.interpolation,
        }
    }

    /// Stateless sampling via binary search. `None` for an empty track.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.times.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Cursor-assisted sampling. `None` for an empty track.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        match len {
            0 => return None,
            1 => return Some(self.value_at(0)),
            _ => {}
        }

        let i = cursor.last_index.min(len - 1);
        let local = if time >= self.times[i] {
            // Forward: find the interval [idx, idx+1) containing time.
            (0..=MAX_SCAN_OFFSET)
                .map(|offset| i + offset)
                .find_map(|idx| {
                    if idx >= len - 1 {
                        Some(Some(len - 1).filter(|_| time >= self.times[len - 1]))
                    } else if time < self.times[idx + 1] {
                        Some(Some(idx))
                    } else {
                        None
                    }
                })
                .flatten()
        } else {
            // Backward: scan left until the interval start is at or before time.
            (0..=MAX_SCAN_OFFSET)
                .take_while(|&offset| offset <= i)
                .map(|offset| i - offset)
                .find(|&idx| time >= self.times[idx])
        };

        let index = local.unwrap_or_else(|| {
            self.times
                .partition_point(|&t| t <= time)
                .saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    /// Keyframe value at `index`, skipping cubic tangents.
    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let dt = self.times[next_idx] - t0;
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 }.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i_prev = index * 3;
                let i_next = next_idx * 3;
                T::interpolate_cubic(
                    self.values[i_prev + 1],
                    self.values[i_prev + 2],
                    self.values[i_next],
                    self.values[i_next + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
