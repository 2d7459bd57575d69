use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Blink oscillator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkSettings {
    /// When false the blink channel is left to the caller.
    pub enabled: bool,
    /// Oscillator frequency (half-cycles per second).
    pub frequency: f32,
    /// Number of oscillator cycles per blink; all but one are silent.
    pub period: u32,
}

impl Default for BlinkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: 3.0,
            period: 10,
        }
    }
}

/// Blink weight at time `t`.
///
/// The continuous oscillator `1 - |sin(t·f·π)|` only passes while
/// `round(t·f)` is a multiple of `period`; everywhere else the weight is 0,
/// which turns the flutter into discrete blinks.
#[must_use]
pub fn blink_weight(t: f32, settings: &BlinkSettings) -> f32 {
    if !t.is_finite() || t < 0.0 || settings.frequency <= 0.0 {
        return 0.0;
    }

    let phase = t * settings.frequency;
    let cycle = phase.round() as u64;
    if cycle % u64::from(settings.period.max(1)) != 0 {
        return 0.0;
    }

    (1.0 - (phase * PI).sin().abs()).clamp(0.0, 1.0)
}
