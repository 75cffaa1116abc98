//! The animation engine capability interface.
//!
//! Widgets never interpolate values themselves. They own bounded scalar
//! variables inside an [`AnimationEngine`], describe transitions on a
//! [`Storyboard`], hand it to the engine for scheduling, and sample the
//! variables while painting. Completion is detected by polling: a widget
//! looks its storyboard up by [`StoryboardTag`] and checks its
//! [`StoryboardStatus`].

use std::time::Duration;

use slotmap::new_key_type;

use super::easing::Easing;
use crate::error::{AnimationError, AnimationResult};

new_key_type! {
    /// Handle to an animation variable owned by an engine.
    pub struct VariableId;

    /// Handle to a scheduled storyboard.
    pub struct StoryboardId;
}

/// Inclusive range a variable's value is confined to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableBounds {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl VariableBounds {
    /// Bounds for an 8-bit color channel.
    pub const COLOR_CHANNEL: Self = Self::new(0.0, 255.0);
    /// Bounds for an opacity.
    pub const UNIT: Self = Self::new(0.0, 1.0);

    /// Create a new bounds range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check that the range is finite and not inverted.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Clamp a value into the range.
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// How a variable's value is rounded when read as an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Round half away from zero.
    #[default]
    Nearest,
    /// Round towards negative infinity.
    Floor,
    /// Round towards positive infinity.
    Ceiling,
}

impl Rounding {
    /// Apply the rounding mode.
    pub fn apply(self, value: f64) -> i64 {
        let rounded = match self {
            Rounding::Nearest => value.round(),
            Rounding::Floor => value.floor(),
            Rounding::Ceiling => value.ceil(),
        };
        rounded as i64
    }
}

/// A single transition of one variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionSpec {
    /// Jump to `final_value` with no interpolation.
    Instantaneous {
        /// Value after the transition.
        final_value: f64,
    },
    /// Accelerate, cruise, then decelerate to `final_value` over `duration`.
    AccelerateDecelerate {
        /// Transition length.
        duration: Duration,
        /// Value after the transition.
        final_value: f64,
        /// Fraction of `duration` spent accelerating.
        acceleration_ratio: f64,
        /// Fraction of `duration` spent decelerating.
        deceleration_ratio: f64,
    },
    /// Move linearly at `speed` units per second until `final_value`.
    LinearFromSpeed {
        /// Units per second. Must be positive.
        speed: f64,
        /// Value after the transition.
        final_value: f64,
    },
}

impl TransitionSpec {
    /// Accelerate-decelerate transition spending half the time on each ramp.
    pub fn eased(duration: Duration, final_value: f64) -> Self {
        Self::AccelerateDecelerate {
            duration,
            final_value,
            acceleration_ratio: 0.5,
            deceleration_ratio: 0.5,
        }
    }

    /// The value the variable holds once the transition completes.
    pub fn final_value(&self) -> f64 {
        match *self {
            TransitionSpec::Instantaneous { final_value }
            | TransitionSpec::AccelerateDecelerate { final_value, .. }
            | TransitionSpec::LinearFromSpeed { final_value, .. } => final_value,
        }
    }

    /// The easing curve the transition follows.
    pub fn easing(&self) -> Easing {
        match *self {
            TransitionSpec::AccelerateDecelerate {
                acceleration_ratio,
                deceleration_ratio,
                ..
            } => Easing::AccelerateDecelerate {
                acceleration: acceleration_ratio,
                deceleration: deceleration_ratio,
            },
            _ => Easing::Linear,
        }
    }

    /// How long the transition lasts when it starts at `from`.
    pub fn duration_from(&self, from: f64) -> f64 {
        match *self {
            TransitionSpec::Instantaneous { .. } => 0.0,
            TransitionSpec::AccelerateDecelerate { duration, .. } => duration.as_secs_f64(),
            TransitionSpec::LinearFromSpeed { speed, final_value } => {
                (final_value - from).abs() / speed
            }
        }
    }

    /// Reject non-finite targets, non-positive speeds and invalid ramps.
    pub fn validate(&self) -> AnimationResult<()> {
        if !self.final_value().is_finite() {
            return Err(AnimationError::InvalidTransition(format!(
                "final value {} is not finite",
                self.final_value()
            )));
        }
        match *self {
            TransitionSpec::LinearFromSpeed { speed, .. } if !(speed.is_finite() && speed > 0.0) => {
                Err(AnimationError::InvalidTransition(format!(
                    "speed {speed} must be positive"
                )))
            }
            TransitionSpec::AccelerateDecelerate { .. } if !self.easing().is_valid() => Err(
                AnimationError::InvalidTransition("acceleration ratios out of range".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// Which family of storyboards a tag tracks for a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagChannel {
    /// Visual-state (color and opacity) transitions.
    Visual,
    /// Smooth-scroll position transitions.
    Scroll,
}

/// Lookup key stamped on a storyboard.
///
/// The most recently scheduled storyboard carrying a tag is the one
/// [`AnimationEngine::find_storyboard`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoryboardTag {
    /// The owning control's ID.
    pub id: i32,
    /// The storyboard family.
    pub channel: TagChannel,
}

impl StoryboardTag {
    /// Tag for a control's visual-state storyboards.
    pub const fn visual(id: i32) -> Self {
        Self {
            id,
            channel: TagChannel::Visual,
        }
    }

    /// Tag for a control's smooth-scroll storyboards.
    pub const fn scroll(id: i32) -> Self {
        Self {
            id,
            channel: TagChannel::Scroll,
        }
    }
}

/// Progress of a scheduled storyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryboardStatus {
    /// Scheduled to start in the future.
    Scheduled,
    /// At least one of its transitions is in progress.
    Playing,
    /// All transitions completed or were superseded.
    Finished,
}

/// A batch of transitions built up before scheduling.
///
/// Several transitions on the same variable play back to back, in the order
/// they were added.
#[derive(Debug, Clone, Default)]
pub struct Storyboard {
    tag: Option<StoryboardTag>,
    transitions: Vec<(VariableId, TransitionSpec)>,
}

impl Storyboard {
    /// Create an empty storyboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transition for `variable`.
    pub fn add_transition(
        &mut self,
        variable: VariableId,
        transition: TransitionSpec,
    ) -> AnimationResult<()> {
        transition.validate()?;
        self.transitions.push((variable, transition));
        Ok(())
    }

    /// Stamp the storyboard with a lookup tag.
    pub fn set_tag(&mut self, tag: StoryboardTag) {
        self.tag = Some(tag);
    }

    /// The lookup tag, if any.
    pub fn tag(&self) -> Option<StoryboardTag> {
        self.tag
    }

    /// The transitions in insertion order.
    pub fn transitions(&self) -> &[(VariableId, TransitionSpec)] {
        &self.transitions
    }

    /// Whether no transition was added.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

/// Capability interface over an animation timing engine.
pub trait AnimationEngine: Send + Sync {
    /// Create a bounded variable starting at `initial`.
    fn create_variable(
        &self,
        initial: f64,
        bounds: VariableBounds,
        rounding: Rounding,
    ) -> AnimationResult<VariableId>;

    /// Release a variable. Pending transitions on it are dropped.
    fn release_variable(&self, variable: VariableId) -> AnimationResult<()>;

    /// Current value of a variable.
    fn value(&self, variable: VariableId) -> AnimationResult<f64>;

    /// Current value of a variable, rounded with its rounding mode.
    fn integer_value(&self, variable: VariableId) -> AnimationResult<i64>;

    /// Start a new, empty storyboard.
    fn create_storyboard(&self) -> AnimationResult<Storyboard>;

    /// Schedule a storyboard to start at `at` (engine seconds).
    ///
    /// Transitions supersede whatever older storyboards had pending on the
    /// same variables; each variable continues from its value at `at`.
    fn schedule(&self, storyboard: Storyboard, at: f64) -> AnimationResult<StoryboardId>;

    /// Current engine time in seconds.
    fn now(&self) -> f64;

    /// The latest storyboard scheduled with `tag`, if it is still known.
    fn find_storyboard(&self, tag: StoryboardTag) -> Option<StoryboardId>;

    /// Progress of a storyboard. Unknown storyboards report `Finished`.
    fn status(&self, storyboard: StoryboardId) -> StoryboardStatus;

    /// Whether a storyboard carrying `tag` is still scheduled or playing.
    fn is_tag_active(&self, tag: StoryboardTag) -> bool {
        self.find_storyboard(tag)
            .is_some_and(|id| self.status(id) != StoryboardStatus::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_modes() {
        assert_eq!(Rounding::Nearest.apply(2.5), 3);
        assert_eq!(Rounding::Nearest.apply(2.4), 2);
        assert_eq!(Rounding::Floor.apply(2.9), 2);
        assert_eq!(Rounding::Ceiling.apply(2.1), 3);
    }

    #[test]
    fn test_transition_validation() {
        assert!(TransitionSpec::eased(Duration::from_millis(100), 1.0).validate().is_ok());
        assert!(
            TransitionSpec::LinearFromSpeed {
                speed: 0.0,
                final_value: 10.0
            }
            .validate()
            .is_err()
        );
        assert!(
            TransitionSpec::Instantaneous {
                final_value: f64::NAN
            }
            .validate()
            .is_err()
        );
        assert!(
            TransitionSpec::AccelerateDecelerate {
                duration: Duration::from_millis(100),
                final_value: 1.0,
                acceleration_ratio: 0.8,
                deceleration_ratio: 0.8,
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn test_speed_duration() {
        let spec = TransitionSpec::LinearFromSpeed {
            speed: 1000.0,
            final_value: 500.0,
        };
        assert_eq!(spec.duration_from(0.0), 0.5);
        assert_eq!(spec.duration_from(1000.0), 0.5);
    }

    #[test]
    fn test_storyboard_rejects_invalid_transition() {
        let mut storyboard = Storyboard::new();
        let var = VariableId::default();
        let err = storyboard
            .add_transition(
                var,
                TransitionSpec::LinearFromSpeed {
                    speed: -1.0,
                    final_value: 0.0,
                },
            )
            .unwrap_err();
        assert!(matches!(err, AnimationError::InvalidTransition(_)));
        assert!(storyboard.is_empty());
    }

    #[test]
    fn test_tags_are_distinct_per_channel() {
        assert_ne!(StoryboardTag::visual(7), StoryboardTag::scroll(7));
        assert_eq!(StoryboardTag::visual(7).id, 7);
    }
}
