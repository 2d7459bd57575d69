use glam::{Quat, Vec3};

use crate::humanoid::bone::HumanBone;
use crate::humanoid::skeleton::HumanoidSkeleton;

/// Local transform of one normalized bone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePose {
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Default for BonePose {
    fn default() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }
}

/// Normalized-space pose of the canonical skeleton.
///
/// Rotations are local to the normalized parent (identity = rest), and
/// translations are offsets from the normalized parent. Bones a skeleton does
/// not bind are carried but ignored when the pose is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct HumanoidPose {
    bones: [BonePose; HumanBone::COUNT],
}

impl HumanoidPose {
    /// All rotations identity and all translations zero.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            bones: [BonePose::default(); HumanBone::COUNT],
        }
    }

    /// The skeleton's rest pose in normalized space.
    #[must_use]
    pub fn rest(skeleton: &HumanoidSkeleton) -> Self {
        let mut pose = Self::identity();
        for normalized in skeleton.normalized_bones() {
            pose.bones[normalized.bone.index()].translation = normalized.rest_position;
        }
        pose
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bone: HumanBone) -> &BonePose {
        &self.bones[bone.index()]
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self, bone: HumanBone) -> Quat {
        self.bones[bone.index()].rotation
    }

    #[inline]
    #[must_use]
    pub fn translation(&self, bone: HumanBone) -> Vec3 {
        self.bones[bone.index()].translation
    }

    #[inline]
    pub fn set_rotation(&mut self, bone: HumanBone, rotation: Quat) {
        self.bones[bone.index()].rotation = rotation;
    }

    #[inline]
    pub fn set_translation(&mut self, bone: HumanBone, translation: Vec3) {
        self.bones[bone.index()].translation = translation;
    }

    /// Applies `offset` after the current rotation, in the bone's local frame.
    pub fn rotate_local(&mut self, bone: HumanBone, offset: Quat) {
        let pose = &mut self.bones[bone.index()];
        pose.rotation = (pose.rotation * offset).normalize();
    }

    pub fn translate(&mut self, bone: HumanBone, offset: Vec3) {
        self.bones[bone.index()].translation += offset;
    }

    pub fn iter(&self) -> impl Iterator<Item = (HumanBone, &BonePose)> {
        HumanBone::ALL.iter().copied().zip(self.bones.iter())
    }
}

impl Default for HumanoidPose {
    fn default() -> Self {
        Self::identity()
    }
}
