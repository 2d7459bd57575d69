//! Transition Module
//!
//! Discrete, interruptible transitions advanced by the frame driver:
//!
//! - [`Tween`]: start/target/elapsed/duration/easing record
//! - [`TransitionController`]: `Idle` ↔ `Transitioning` state machine with a
//!   last-trigger-wins interruption policy
//! - [`RotationTransitions`]: per-owner reorientation (outfit change, drag)
//! - [`PointerFollowCamera`]: camera offset following the pointer, with
//!   springback after an idle timeout

pub mod controller;
pub mod easing;
pub mod pointer_follow;
pub mod tween;

pub use controller::{CompletionCallback, RotationTransitions, TransitionController, TransitionState};
pub use easing::Easing;
pub use pointer_follow::{CameraFollowSettings, FollowPhase, PointerFollowCamera};
pub use tween::Tween;
