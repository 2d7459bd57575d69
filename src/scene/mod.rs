//! Scene Module
//!
//! Minimal spatial building blocks shared by skeletons and stage objects:
//!
//! - [`Transform`]: TRS transform with Euler helpers
//! - [`SkeletonGraph`]: arena-backed bone hierarchy with cached world rest transforms

pub mod graph;
pub mod transform;

pub use graph::{BoneKey, BoneNode, SkeletonGraph};
pub use transform::Transform;
