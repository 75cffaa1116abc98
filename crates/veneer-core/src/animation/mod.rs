//! Animation support for Veneer.
//!
//! Widgets animate by owning bounded scalar variables inside an
//! [`AnimationEngine`] and scheduling [`Storyboard`]s of transitions on them.
//! Completion is polled: the widget's invalidate timer asks the engine
//! whether a storyboard carrying its [`StoryboardTag`] is still active.
//!
//! # Easing Functions
//!
//! Visual-state transitions use an accelerate-decelerate profile, speed
//! driven transitions (smooth scrolling) move linearly. See [`ease`].
//!
//! # Engines
//!
//! [`TimelineEngine`] is the built-in engine. It reads time from a
//! [`Clock`], either a real [`SystemClock`] or a [`ManualClock`] that only
//! advances when told to.

mod clock;
mod easing;
mod engine;
mod timeline;

pub use clock::{Clock, ManualClock, SystemClock};
pub use easing::{Easing, ease, lerp_eased};
pub use engine::{
    AnimationEngine, Rounding, Storyboard, StoryboardId, StoryboardStatus, StoryboardTag,
    TagChannel, TransitionSpec, VariableBounds, VariableId,
};
pub use timeline::TimelineEngine;
