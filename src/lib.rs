#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod errors;
pub mod humanoid;
pub mod procedural;
pub mod scene;
pub mod settings;
pub mod stage;
pub mod transition;
pub mod utils;

pub use animation::{AnimationAction, AnimationClip, LoopMode, RetargetedClip, Retargeter, SourceAnimationClip, retarget};
pub use errors::{AvatarError, Result};
pub use humanoid::{BoneNameMap, HumanBone, HumanoidPose, HumanoidSkeleton, map_bone};
pub use procedural::{Expression, ExpressionSink, ExpressionWeights, PoseDelta, ProceduralParams};
pub use scene::{BoneKey, SkeletonGraph, Transform};
pub use settings::StageSettings;
pub use stage::{AvatarStage, FrameOutput, HumanoidLoader, MotionAsset, MotionLoader};
pub use transition::{Easing, RotationTransitions, TransitionController};
pub use utils::Timer;
