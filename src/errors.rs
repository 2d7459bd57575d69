//! Error Types
//!
//! This module defines the error types used throughout the avatar runtime.
//!
//! # Overview
//!
//! The main error type [`AvatarError`] covers:
//! - Asset loading failures reported by external loaders
//! - Whole-clip retargeting failures (missing root track, incompatible rigs)
//! - Superseded asynchronous loads
//! - Configuration parsing errors
//!
//! Per-track problems (an unmapped source bone, a track whose node is absent
//! from the source graph) are not errors: the track is dropped and
//! retargeting continues.
//!
//! # Usage
//!
//! ```rust,ignore
//! use avatar::errors::{AvatarError, Result};
//!
//! fn load_motion() -> Result<()> {
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the avatar runtime.
#[derive(Error, Debug)]
pub enum AvatarError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// An external loader failed to fetch or parse an asset.
    #[error("Failed to load {asset}: {reason}")]
    LoadError {
        /// Asset source identifier (path or URL)
        asset: String,
        /// Loader-provided failure description
        reason: String,
    },

    /// A load result arrived after a newer request for the same slot was issued.
    #[error("Stale load result discarded (generation {generation}, current {current})")]
    StaleResultDiscarded {
        /// Generation carried by the late result
        generation: u64,
        /// Generation of the request currently awaited
        current: u64,
    },

    // ========================================================================
    // Retargeting Errors
    // ========================================================================
    /// The source clip has no track bound to the hips bone.
    #[error("Clip '{clip}' has no track bound to the hips bone")]
    MissingRootBone {
        /// Name of the offending clip
        clip: String,
    },

    /// One of the skeletons cannot take part in retargeting.
    #[error("Incompatible skeleton: {0}")]
    IncompatibleSkeleton(String),

    /// A bone name was not found in a skeleton graph.
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl AvatarError {
    /// Shorthand for [`AvatarError::LoadError`].
    pub fn load(asset: impl Into<String>, reason: impl ToString) -> Self {
        AvatarError::LoadError {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias for `Result<T, AvatarError>`.
pub type Result<T> = std::result::Result<T, AvatarError>;
