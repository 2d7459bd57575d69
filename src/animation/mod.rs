//! Animation Module
//!
//! Keyframe data, clip playback and retargeting:
//!
//! - [`KeyframeTrack`]: time/value sequences with cursor-assisted sampling
//! - [`AnimationClip`]: tagged rotation/position tracks keyed by bone
//! - [`AnimationAction`]: playback time and loop handling for a retargeted clip
//! - [`Retargeter`]: source-rig clip → canonical humanoid clip

pub mod action;
pub mod clip;
pub mod retarget;
pub mod tracks;
pub mod values;

pub use action::{AnimationAction, LoopMode};
pub use clip::{
    AnimationClip, RetargetedClip, SourceAnimationClip, Track, TrackBinding, TrackData,
    TrackProperty,
};
pub use retarget::{RETARGETED_CLIP_NAME, Retargeter, retarget};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
