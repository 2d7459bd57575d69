use std::f32::consts::PI;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::humanoid::HumanBone;

/// Idle sway parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwaySettings {
    pub enabled: bool,
    /// Multiplier on every oscillator amplitude.
    pub amplitude_scale: f32,
}

impl Default for SwaySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            amplitude_scale: 1.0,
        }
    }
}

/// What an oscillator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwayChannel {
    /// Rotation about the bone's local Y axis (radians).
    Yaw,
    /// Translation along an axis (meters).
    Offset(Axis),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// `amplitude · sin(angular_frequency · t + phase)` on one bone channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwayOscillator {
    pub bone: HumanBone,
    pub channel: SwayChannel,
    pub amplitude: f32,
    pub angular_frequency: f32,
    pub phase: f32,
}

impl SwayOscillator {
    #[inline]
    #[must_use]
    pub fn value(&self, t: f32, amplitude_scale: f32) -> f32 {
        self.amplitude * amplitude_scale * (self.angular_frequency * t + self.phase).sin()
    }
}

/// Breathing-like idle motion: slow neck and chest yaw, spine bob.
pub const IDLE_SWAY: [SwayOscillator; 4] = [
    SwayOscillator {
        bone: HumanBone::Neck,
        channel: SwayChannel::Yaw,
        amplitude: PI / 100.0,
        angular_frequency: PI / 4.0,
        phase: 0.0,
    },
    SwayOscillator {
        bone: HumanBone::UpperChest,
        channel: SwayChannel::Yaw,
        amplitude: PI / 600.0,
        angular_frequency: PI / 8.0,
        phase: 0.0,
    },
    SwayOscillator {
        bone: HumanBone::Spine,
        channel: SwayChannel::Offset(Axis::Y),
        amplitude: PI / 400.0,
        angular_frequency: PI / 2.0,
        phase: 0.0,
    },
    SwayOscillator {
        bone: HumanBone::Spine,
        channel: SwayChannel::Offset(Axis::Z),
        amplitude: PI / 600.0,
        angular_frequency: PI / 2.0,
        phase: 0.0,
    },
];

/// A single evaluated sway contribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwayOffset {
    Rotation(HumanBone, Quat),
    Translation(HumanBone, Vec3),
}

/// Evaluates `oscillators` at time `t`.
pub fn evaluate_sway<'a>(
    oscillators: &'a [SwayOscillator],
    t: f32,
    settings: &SwaySettings,
) -> impl Iterator<Item = SwayOffset> + 'a {
    let scale = settings.amplitude_scale;
    let enabled = settings.enabled;
    oscillators
        .iter()
        .filter(move |_| enabled)
        .map(move |osc| {
            let value = osc.value(t, scale);
            match osc.channel {
                SwayChannel::Yaw => SwayOffset::Rotation(osc.bone, Quat::from_rotation_y(value)),
                SwayChannel::Offset(axis) => SwayOffset::Translation(osc.bone, axis.unit() * value),
            }
        })
}
