//! Stage Settings
//!
//! Configuration for the avatar stage, loadable from JSON.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use avatar::settings::StageSettings;
//! use avatar::stage::AvatarStage;
//!
//! let settings = StageSettings::from_json_str(r#"{ "blink": { "period": 6 } }"#)?;
//! let stage = AvatarStage::new().with_settings(settings);
//! ```
//!
//! Every field has a default, so partial documents are accepted.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::animation::LoopMode;
use crate::errors::Result;
use crate::procedural::{BlinkSettings, SwaySettings};
use crate::transition::{CameraFollowSettings, Easing};

/// Reorientation transitions (outfit change, drag).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionSettings {
    /// Seconds per transition.
    pub duration: f32,
    pub easing: Easing,
    /// Avatar yaw (radians) per unit of horizontal drag in normalized device coordinates.
    pub drag_sensitivity: f32,
    /// Platform rotation (radians about Y) played on outfit change.
    pub outfit_turn: f32,
}

impl Default for TransitionSettings {
    fn default() -> Self {
        Self {
            duration: 1.0,
            easing: Easing::CubicInOut,
            drag_sensitivity: PI,
            outfit_turn: 2.0 * PI,
        }
    }
}

/// Where the avatar root stands and which way it initially faces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AvatarPlacement {
    pub position: Vec3,
    /// Initial yaw of the avatar root (radians). Rigs face +Z, the camera looks from -Z.
    pub facing_yaw: f32,
}

impl Default for AvatarPlacement {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.5, -0.4),
            facing_yaw: PI,
        }
    }
}

/// Top-level stage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    pub blink: BlinkSettings,
    pub sway: SwaySettings,
    pub transition: TransitionSettings,
    pub camera: CameraFollowSettings,
    pub placement: AvatarPlacement,
    pub loop_mode: LoopMode,
    /// Clip picked from a loaded motion asset (first clip when absent).
    pub motion_clip: String,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            blink: BlinkSettings::default(),
            sway: SwaySettings::default(),
            transition: TransitionSettings::default(),
            camera: CameraFollowSettings::default(),
            placement: AvatarPlacement::default(),
            loop_mode: LoopMode::Loop,
            motion_clip: "mixamo.com".to_string(),
        }
    }
}

impl StageSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let settings = StageSettings::from_json_str(
            r#"{ "blink": { "period": 6 }, "loop_mode": "PingPong" }"#,
        )
        .unwrap();
        assert_eq!(settings.blink.period, 6);
        assert!((settings.blink.frequency - 3.0).abs() < f32::EPSILON);
        assert_eq!(settings.loop_mode, LoopMode::PingPong);
        assert_eq!(settings.motion_clip, "mixamo.com");
    }

    #[test]
    fn round_trips_through_json() {
        let settings = StageSettings::default();
        let json = settings.to_json_string().unwrap();
        assert_eq!(StageSettings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let err = StageSettings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::errors::AvatarError::Config(_)));
    }
}
