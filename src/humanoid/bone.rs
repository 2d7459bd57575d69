//! Canonical humanoid bones.
//!
//! The bone set and hierarchy follow the VRM humanoid convention: a hips-rooted
//! torso chain, optional eyes/jaw, shoulders through hands, five fingers per
//! hand and legs through toes.

macro_rules! human_bones {
    ($($variant:ident => $name:literal, parent: $parent:expr;)+) => {
        /// A standardized joint, independent of any rig's native naming.
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum HumanBone {
            $($variant,)+
        }

        impl HumanBone {
            /// Every canonical bone, parents before children.
            pub const ALL: &'static [HumanBone] = &[$(HumanBone::$variant,)+];

            /// Canonical (camelCase) name.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(HumanBone::$variant => $name,)+
                }
            }

            /// Parent in the canonical hierarchy. `None` only for `Hips`.
            #[must_use]
            pub const fn parent(self) -> Option<HumanBone> {
                match self {
                    $(HumanBone::$variant => $parent,)+
                }
            }

            /// Parses a canonical name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<HumanBone> {
                match name {
                    $($name => Some(HumanBone::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

use HumanBone as B;

human_bones! {
    Hips => "hips", parent: None;
    Spine => "spine", parent: Some(B::Hips);
    Chest => "chest", parent: Some(B::Spine);
    UpperChest => "upperChest", parent: Some(B::Chest);
    Neck => "neck", parent: Some(B::UpperChest);
    Head => "head", parent: Some(B::Neck);
    LeftEye => "leftEye", parent: Some(B::Head);
    RightEye => "rightEye", parent: Some(B::Head);
    Jaw => "jaw", parent: Some(B::Head);

    LeftUpperLeg => "leftUpperLeg", parent: Some(B::Hips);
    LeftLowerLeg => "leftLowerLeg", parent: Some(B::LeftUpperLeg);
    LeftFoot => "leftFoot", parent: Some(B::LeftLowerLeg);
    LeftToes => "leftToes", parent: Some(B::LeftFoot);
    RightUpperLeg => "rightUpperLeg", parent: Some(B::Hips);
    RightLowerLeg => "rightLowerLeg", parent: Some(B::RightUpperLeg);
    RightFoot => "rightFoot", parent: Some(B::RightLowerLeg);
    RightToes => "rightToes", parent: Some(B::RightFoot);

    LeftShoulder => "leftShoulder", parent: Some(B::UpperChest);
    LeftUpperArm => "leftUpperArm", parent: Some(B::LeftShoulder);
    LeftLowerArm => "leftLowerArm", parent: Some(B::LeftUpperArm);
    LeftHand => "leftHand", parent: Some(B::LeftLowerArm);
    RightShoulder => "rightShoulder", parent: Some(B::UpperChest);
    RightUpperArm => "rightUpperArm", parent: Some(B::RightShoulder);
    RightLowerArm => "rightLowerArm", parent: Some(B::RightUpperArm);
    RightHand => "rightHand", parent: Some(B::RightLowerArm);

    LeftThumbMetacarpal => "leftThumbMetacarpal", parent: Some(B::LeftHand);
    LeftThumbProximal => "leftThumbProximal", parent: Some(B::LeftThumbMetacarpal);
    LeftThumbDistal => "leftThumbDistal", parent: Some(B::LeftThumbProximal);
    LeftIndexProximal => "leftIndexProximal", parent: Some(B::LeftHand);
    LeftIndexIntermediate => "leftIndexIntermediate", parent: Some(B::LeftIndexProximal);
    LeftIndexDistal => "leftIndexDistal", parent: Some(B::LeftIndexIntermediate);
    LeftMiddleProximal => "leftMiddleProximal", parent: Some(B::LeftHand);
    LeftMiddleIntermediate => "leftMiddleIntermediate", parent: Some(B::LeftMiddleProximal);
    LeftMiddleDistal => "leftMiddleDistal", parent: Some(B::LeftMiddleIntermediate);
    LeftRingProximal => "leftRingProximal", parent: Some(B::LeftHand);
    LeftRingIntermediate => "leftRingIntermediate", parent: Some(B::LeftRingProximal);
    LeftRingDistal => "leftRingDistal", parent: Some(B::LeftRingIntermediate);
    LeftLittleProximal => "leftLittleProximal", parent: Some(B::LeftHand);
    LeftLittleIntermediate => "leftLittleIntermediate", parent: Some(B::LeftLittleProximal);
    LeftLittleDistal => "leftLittleDistal", parent: Some(B::LeftLittleIntermediate);

    RightThumbMetacarpal => "rightThumbMetacarpal", parent: Some(B::RightHand);
    RightThumbProximal => "rightThumbProximal", parent: Some(B::RightThumbMetacarpal);
    RightThumbDistal => "rightThumbDistal", parent: Some(B::RightThumbProximal);
    RightIndexProximal => "rightIndexProximal", parent: Some(B::RightHand);
    RightIndexIntermediate => "rightIndexIntermediate", parent: Some(B::RightIndexProximal);
    RightIndexDistal => "rightIndexDistal", parent: Some(B::RightIndexIntermediate);
    RightMiddleProximal => "rightMiddleProximal", parent: Some(B::RightHand);
    RightMiddleIntermediate => "rightMiddleIntermediate", parent: Some(B::RightMiddleProximal);
    RightMiddleDistal => "rightMiddleDistal", parent: Some(B::RightMiddleIntermediate);
    RightRingProximal => "rightRingProximal", parent: Some(B::RightHand);
    RightRingIntermediate => "rightRingIntermediate", parent: Some(B::RightRingProximal);
    RightRingDistal => "rightRingDistal", parent: Some(B::RightRingIntermediate);
    RightLittleProximal => "rightLittleProximal", parent: Some(B::RightHand);
    RightLittleIntermediate => "rightLittleIntermediate", parent: Some(B::RightLittleProximal);
    RightLittleDistal => "rightLittleDistal", parent: Some(B::RightLittleIntermediate);
}

impl HumanBone {
    /// Number of canonical bones.
    pub const COUNT: usize = Self::ALL.len();

    /// Bones a skeleton must bind before it can be animated.
    pub const MANDATORY: &'static [HumanBone] = &[HumanBone::Hips];

    /// Dense index, usable for per-bone arrays.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for HumanBone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
