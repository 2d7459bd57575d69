//! Procedural Motion Layer
//!
//! Secondary motion computed fresh every frame from the elapsed time and the
//! caller's parameters. Nothing here keeps state between frames, so the same
//! `(t, params)` always yields the same [`PoseDelta`].
//!
//! Composition order on top of the base (clip or rest) pose is fixed:
//!
//! 1. additive idle sway
//! 2. manual bone overrides (direct Euler component assignment)
//! 3. expression weights, a separate channel pushed to an [`ExpressionSink`]

pub mod blink;
pub mod expression;
pub mod sway;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::humanoid::{HumanBone, HumanoidPose};

pub use blink::{BlinkSettings, blink_weight};
pub use expression::{Expression, ExpressionSink, ExpressionWeights};
pub use sway::{Axis, IDLE_SWAY, SwayChannel, SwayOffset, SwayOscillator, SwaySettings, evaluate_sway};

/// Caller-driven bone angles (radians). `None` leaves the bone to the clip.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualOverrides {
    /// Head rotation about Y.
    pub head_yaw: Option<f32>,
    /// Left upper arm rotation about Z.
    pub left_arm_roll: Option<f32>,
    /// Right upper arm rotation about Z.
    pub right_arm_roll: Option<f32>,
}

impl ManualOverrides {
    fn bone_overrides(&self) -> impl Iterator<Item = BoneOverride> {
        [
            (HumanBone::Head, Axis::Y, self.head_yaw),
            (HumanBone::LeftUpperArm, Axis::Z, self.left_arm_roll),
            (HumanBone::RightUpperArm, Axis::Z, self.right_arm_roll),
        ]
        .into_iter()
        .filter_map(|(bone, axis, angle)| angle.map(|angle| BoneOverride { bone, axis, angle }))
    }
}

/// Per-frame external inputs to the procedural layer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProceduralParams {
    pub blink: BlinkSettings,
    pub sway: SwaySettings,
    pub overrides: ManualOverrides,
    /// Expression weights as set by the caller this frame (last value wins).
    pub expressions: ExpressionWeights,
}

/// Assigns one Euler (XYZ) component of a bone's local rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneOverride {
    pub bone: HumanBone,
    pub axis: Axis,
    pub angle: f32,
}

impl BoneOverride {
    #[must_use]
    pub fn apply(&self, rotation: Quat) -> Quat {
        let (x, y, z) = rotation.to_euler(EulerRot::XYZ);
        let (x, y, z) = match self.axis {
            Axis::X => (self.angle, y, z),
            Axis::Y => (x, self.angle, z),
            Axis::Z => (x, y, self.angle),
        };
        Quat::from_euler(EulerRot::XYZ, x, y, z)
    }
}

/// Procedural contribution for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PoseDelta {
    pub rotations: SmallVec<[(HumanBone, Quat); 4]>,
    pub translations: SmallVec<[(HumanBone, Vec3); 4]>,
    pub overrides: SmallVec<[BoneOverride; 4]>,
    pub expressions: ExpressionWeights,
}

impl PoseDelta {
    /// Layers sway and then overrides onto `pose`.
    pub fn apply(&self, pose: &mut HumanoidPose) {
        for &(bone, offset) in &self.rotations {
            pose.rotate_local(bone, offset);
        }
        for &(bone, offset) in &self.translations {
            pose.translate(bone, offset);
        }
        for o in &self.overrides {
            pose.set_rotation(o.bone, o.apply(pose.rotation(o.bone)));
        }
    }
}

/// Evaluates the procedural layer at time `t`.
#[must_use]
pub fn evaluate(t: f32, params: &ProceduralParams) -> PoseDelta {
    let mut delta = PoseDelta {
        expressions: params.expressions,
        ..Default::default()
    };

    for offset in evaluate_sway(&IDLE_SWAY, t, &params.sway) {
        match offset {
            SwayOffset::Rotation(bone, q) => delta.rotations.push((bone, q)),
            SwayOffset::Translation(bone, v) => delta.translations.push((bone, v)),
        }
    }

    delta.overrides.extend(params.overrides.bone_overrides());

    if params.blink.enabled {
        delta
            .expressions
            .set_weight(Expression::Blink, blink_weight(t, &params.blink));
    }

    delta
}

/// Base pose plus the procedural layer at time `t`.
#[must_use]
pub fn compose(base: &HumanoidPose, t: f32, params: &ProceduralParams) -> (HumanoidPose, ExpressionWeights) {
    let delta = evaluate(t, params);
    let mut pose = base.clone();
    delta.apply(&mut pose);
    (pose, delta.expressions)
}
