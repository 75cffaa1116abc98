//! Core systems for Veneer.
//!
//! This crate provides the foundational pieces shared by every other Veneer
//! crate:
//!
//! - **Window handles**: an opaque [`WindowHandle`] naming a native window
//! - **Signal/Slot System**: type-safe, direct-connection notifications
//! - **Animation**: the [`AnimationEngine`] capability interface, storyboards
//!   and transitions, plus the built-in [`TimelineEngine`]
//! - **Logging**: `tracing` target names used throughout the workspace
//!
//! # Animation Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use veneer_core::animation::{
//!     AnimationEngine, ManualClock, Rounding, TimelineEngine, TransitionSpec, VariableBounds,
//! };
//!
//! let clock = Arc::new(ManualClock::new());
//! let engine = TimelineEngine::new(clock.clone());
//!
//! let var = engine
//!     .create_variable(0.0, VariableBounds::new(0.0, 255.0), Rounding::Nearest)
//!     .unwrap();
//!
//! let mut storyboard = engine.create_storyboard().unwrap();
//! storyboard
//!     .add_transition(var, TransitionSpec::eased(Duration::from_millis(100), 255.0))
//!     .unwrap();
//! engine.schedule(storyboard, engine.now()).unwrap();
//!
//! clock.advance(Duration::from_millis(100));
//! assert_eq!(engine.value(var).unwrap(), 255.0);
//! ```

pub mod animation;
mod error;
pub mod logging;
pub mod signal;
mod window;

pub use animation::{
    AnimationEngine, Clock, ManualClock, Rounding, Storyboard, StoryboardId, StoryboardStatus,
    StoryboardTag, SystemClock, TagChannel, TimelineEngine, TransitionSpec, VariableBounds,
    VariableId,
};
pub use error::{AnimationError, AnimationResult};
pub use signal::{ConnectionId, Signal};
pub use window::WindowHandle;
