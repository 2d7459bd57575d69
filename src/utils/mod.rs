//! Utility Module
//!
//! - [`Timer`]: frame clock supplying elapsed time and (clamped) frame delta

pub mod time;

pub use time::{MAX_FRAME_DELTA, Timer};
