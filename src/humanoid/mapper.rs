//! Source-rig bone name → canonical humanoid bone.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::humanoid::bone::HumanBone;

/// The complete `mixamorig*` vocabulary.
const MIXAMO_RIG: &[(&str, HumanBone)] = &[
    ("mixamorigHips", HumanBone::Hips),
    ("mixamorigSpine", HumanBone::Spine),
    ("mixamorigSpine1", HumanBone::Chest),
    ("mixamorigSpine2", HumanBone::UpperChest),
    ("mixamorigNeck", HumanBone::Neck),
    ("mixamorigHead", HumanBone::Head),
    ("mixamorigLeftShoulder", HumanBone::LeftShoulder),
    ("mixamorigLeftArm", HumanBone::LeftUpperArm),
    ("mixamorigLeftForeArm", HumanBone::LeftLowerArm),
    ("mixamorigLeftHand", HumanBone::LeftHand),
    ("mixamorigLeftHandThumb1", HumanBone::LeftThumbMetacarpal),
    ("mixamorigLeftHandThumb2", HumanBone::LeftThumbProximal),
    ("mixamorigLeftHandThumb3", HumanBone::LeftThumbDistal),
    ("mixamorigLeftHandIndex1", HumanBone::LeftIndexProximal),
    ("mixamorigLeftHandIndex2", HumanBone::LeftIndexIntermediate),
    ("mixamorigLeftHandIndex3", HumanBone::LeftIndexDistal),
    ("mixamorigLeftHandMiddle1", HumanBone::LeftMiddleProximal),
    ("mixamorigLeftHandMiddle2", HumanBone::LeftMiddleIntermediate),
    ("mixamorigLeftHandMiddle3", HumanBone::LeftMiddleDistal),
    ("mixamorigLeftHandRing1", HumanBone::LeftRingProximal),
    ("mixamorigLeftHandRing2", HumanBone::LeftRingIntermediate),
    ("mixamorigLeftHandRing3", HumanBone::LeftRingDistal),
    ("mixamorigLeftHandPinky1", HumanBone::LeftLittleProximal),
    ("mixamorigLeftHandPinky2", HumanBone::LeftLittleIntermediate),
    ("mixamorigLeftHandPinky3", HumanBone::LeftLittleDistal),
    ("mixamorigRightShoulder", HumanBone::RightShoulder),
    ("mixamorigRightArm", HumanBone::RightUpperArm),
    ("mixamorigRightForeArm", HumanBone::RightLowerArm),
    ("mixamorigRightHand", HumanBone::RightHand),
    ("mixamorigRightHandPinky1", HumanBone::RightLittleProximal),
    ("mixamorigRightHandPinky2", HumanBone::RightLittleIntermediate),
    ("mixamorigRightHandPinky3", HumanBone::RightLittleDistal),
    ("mixamorigRightHandRing1", HumanBone::RightRingProximal),
    ("mixamorigRightHandRing2", HumanBone::RightRingIntermediate),
    ("mixamorigRightHandRing3", HumanBone::RightRingDistal),
    ("mixamorigRightHandMiddle1", HumanBone::RightMiddleProximal),
    ("mixamorigRightHandMiddle2", HumanBone::RightMiddleIntermediate),
    ("mixamorigRightHandMiddle3", HumanBone::RightMiddleDistal),
    ("mixamorigRightHandIndex1", HumanBone::RightIndexProximal),
    ("mixamorigRightHandIndex2", HumanBone::RightIndexIntermediate),
    ("mixamorigRightHandIndex3", HumanBone::RightIndexDistal),
    ("mixamorigRightHandThumb1", HumanBone::RightThumbMetacarpal),
    ("mixamorigRightHandThumb2", HumanBone::RightThumbProximal),
    ("mixamorigRightHandThumb3", HumanBone::RightThumbDistal),
    ("mixamorigLeftUpLeg", HumanBone::LeftUpperLeg),
    ("mixamorigLeftLeg", HumanBone::LeftLowerLeg),
    ("mixamorigLeftFoot", HumanBone::LeftFoot),
    ("mixamorigLeftToeBase", HumanBone::LeftToes),
    ("mixamorigRightUpLeg", HumanBone::RightUpperLeg),
    ("mixamorigRightLeg", HumanBone::RightLowerLeg),
    ("mixamorigRightFoot", HumanBone::RightFoot),
    ("mixamorigRightToeBase", HumanBone::RightToes),
];

static MIXAMO: LazyLock<BoneNameMap> = LazyLock::new(|| BoneNameMap::from_pairs(MIXAMO_RIG.iter().copied()));

/// Immutable source bone name → [`HumanBone`] table.
///
/// Names outside the table map to `None`; callers drop the corresponding
/// tracks rather than treating them as errors.
#[derive(Debug, Clone, Default)]
pub struct BoneNameMap {
    entries: FxHashMap<String, HumanBone>,
}

impl BoneNameMap {
    /// Builds a table from `(source name, canonical bone)` pairs. Later
    /// duplicates of a source name are ignored.
    pub fn from_pairs<S: Into<String>>(pairs: impl IntoIterator<Item = (S, HumanBone)>) -> Self {
        let mut entries = FxHashMap::default();
        for (name, bone) in pairs {
            entries.entry(name.into()).or_insert(bone);
        }
        Self { entries }
    }

    /// The shared Mixamo table.
    #[must_use]
    pub fn mixamo() -> &'static BoneNameMap {
        &MIXAMO
    }

    /// Maps a source bone name.
    ///
    /// Exporters that keep the namespace separator (`mixamorig:Hips`) are
    /// accepted as well.
    #[must_use]
    pub fn map_bone(&self, source: &str) -> Option<HumanBone> {
        if let Some(bone) = self.entries.get(source) {
            return Some(*bone);
        }
        if source.contains(':') {
            return self.entries.get(&source.replace(':', "")).copied();
        }
        None
    }

    /// Source name bound to `bone`, if any.
    #[must_use]
    pub fn source_name(&self, bone: HumanBone) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, b)| **b == bone)
            .map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps a Mixamo bone name using the shared table.
#[must_use]
pub fn map_bone(source: &str) -> Option<HumanBone> {
    MIXAMO.map_bone(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixamo_table_is_complete_and_injective() {
        let map = BoneNameMap::mixamo();
        assert_eq!(map.len(), 52);

        let mut seen = rustc_hash::FxHashSet::default();
        for (_, bone) in MIXAMO_RIG {
            assert!(seen.insert(*bone), "{bone} mapped twice");
        }
    }

    #[test]
    fn unknown_names_map_to_none() {
        assert_eq!(map_bone("mixamorigHips"), Some(HumanBone::Hips));
        assert_eq!(map_bone("mixamorig:LeftForeArm"), Some(HumanBone::LeftLowerArm));
        assert_eq!(map_bone("mixamorigHeadTop_End"), None);
        assert_eq!(map_bone(""), None);
    }
}
