//! Humanoid Module
//!
//! The canonical humanoid rig that motion is retargeted onto:
//!
//! - [`HumanBone`]: canonical bone ids and hierarchy
//! - [`BoneNameMap`]: source-rig bone name → canonical bone
//! - [`HumanoidSkeleton`]: raw and normalized views over an authored bone graph
//! - [`HumanoidPose`]: normalized-space pose, resolved into raw transforms

pub mod bone;
pub mod mapper;
pub mod pose;
pub mod skeleton;

pub use bone::HumanBone;
pub use mapper::{BoneNameMap, map_bone};
pub use pose::{BonePose, HumanoidPose};
pub use skeleton::{HumanoidSkeleton, NormalizedBone, ResolvedPose};
