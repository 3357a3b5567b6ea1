//! Brink Animation
//!
//! Timed transitions for scroll-container properties.
//!
//! # Features
//!
//! - **Easing**: cubic ease-in, ease-out, and ease-in-out curves
//! - **Tweens**: fixed-duration interpolation that never overshoots
//! - **Scheduler**: frame-driven, single-threaded driver with deferred
//!   completion callbacks

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{
    AnimationScheduler, CompletionCallback, SchedulerHandle, TransitionId, UpdateCallback,
};
pub use tween::Tween;
