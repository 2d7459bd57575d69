//! Playback Coordinator
//!
//! Joins asynchronously loaded avatars and motion clips, retargets the clip
//! once both are present, and drives the per-frame composition of clip pose,
//! procedural layer and rotation transitions.

pub mod context;
pub mod loading;

pub use context::{AvatarFrame, AvatarStage, FrameOutput, SkeletonInstance, StageObject};
pub use loading::{
    AvatarLoad, Generation, HumanoidLoader, LoadCompletion, LoadPayload, LoadStatus, MotionAsset, MotionLoad,
    MotionLoader,
};
