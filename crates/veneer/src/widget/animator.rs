//! The generic visual state machine.
//!
//! Every animated widget owns an [`Animator`] over its own closed state
//! enumeration. The animator owns the widget's animation variables (three
//! 0..255 channels per animated color, plus an optional 0..1 focus-ring
//! opacity) and moves them towards a [`StateTarget`] whenever the widget
//! changes state.
//!
//! A transition runs as one pipeline:
//!
//! 1. create a storyboard
//! 2. add an eased transition per variable the target names
//! 3. tag the storyboard with the control's visual tag
//! 4. schedule it at the engine's current time
//! 5. arm the animation invalidate timer
//!
//! Only when all five steps succeed does the current state change. While the
//! timer runs, each tick repaints the window and polls the engine; the timer
//! stops itself once no storyboard the animator scheduled is still active.
//! A short focus storyboard may finish before an earlier color storyboard,
//! so every scheduled storyboard is tracked, not just the latest one.

use std::fmt;
use std::sync::Arc;

use veneer_core::logging::targets;
use veneer_core::{
    AnimationEngine, AnimationError, AnimationResult, Rounding, Storyboard, StoryboardId,
    StoryboardStatus, StoryboardTag, TransitionSpec, VariableBounds, VariableId, WindowHandle,
};
use veneer_render::Color;

use crate::config::AnimationSkip;
use crate::error::WidgetResult;
use crate::system::Providers;
use crate::widget::timer::{self, ANIMATION_TIMER};

/// Families of visual states sharing a duration and a skip flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Default,
    Hover,
    Active,
    Focus,
    Selected,
}

/// A widget's closed set of visual states.
pub trait VisualState: Copy + Eq + fmt::Debug + Send + 'static {
    /// The phase whose duration and skip flag apply to this state.
    fn phase(self) -> Phase;
}

/// Three animation variables holding the channels of one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimatedColor {
    channels: [VariableId; 3],
}

impl AnimatedColor {
    fn create(engine: &dyn AnimationEngine, initial: Color) -> AnimationResult<Self> {
        let [r, g, b] = initial.to_channels();
        let mut created = Vec::with_capacity(3);
        for value in [r, g, b] {
            match engine.create_variable(value, VariableBounds::COLOR_CHANNEL, Rounding::Nearest) {
                Ok(id) => created.push(id),
                Err(err) => {
                    for id in created {
                        let _ = engine.release_variable(id);
                    }
                    return Err(err);
                }
            }
        }
        Ok(Self {
            channels: [created[0], created[1], created[2]],
        })
    }

    /// Current color.
    pub fn sample(&self, engine: &dyn AnimationEngine) -> AnimationResult<Color> {
        let [r, g, b] = self.channels;
        Ok(Color::from_channels(
            engine.value(r)?,
            engine.value(g)?,
            engine.value(b)?,
        ))
    }

    fn add_transitions(
        &self,
        storyboard: &mut Storyboard,
        target: Color,
        spec: impl Fn(f64) -> TransitionSpec,
    ) -> AnimationResult<()> {
        for (variable, value) in self.channels.iter().zip(target.to_channels()) {
            storyboard.add_transition(*variable, spec(value))?;
        }
        Ok(())
    }

    fn release(&self, engine: &dyn AnimationEngine) {
        for variable in self.channels {
            if let Err(err) = engine.release_variable(variable) {
                tracing::trace!(target: targets::ANIMATION, error = %err, "variable already released");
            }
        }
    }
}

/// Where a state transition moves the animation variables.
///
/// `None` entries keep their variable where it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateTarget {
    /// One entry per animated color slot.
    pub colors: Vec<Option<Color>>,
    pub focus_opacity: Option<f64>,
}

impl StateTarget {
    /// Move every color slot, in slot order.
    pub fn colors(colors: impl IntoIterator<Item = Color>) -> Self {
        Self {
            colors: colors.into_iter().map(Some).collect(),
            focus_opacity: None,
        }
    }

    /// Move only the focus-ring opacity.
    pub fn focus(opacity: f64) -> Self {
        Self {
            colors: Vec::new(),
            focus_opacity: Some(opacity),
        }
    }
}

/// Visual state machine of one widget.
pub struct Animator<S: VisualState> {
    engine: Arc<dyn AnimationEngine>,
    tag: StoryboardTag,
    colors: Vec<AnimatedColor>,
    focus: Option<VariableId>,
    state: S,
    /// Storyboards scheduled since the animation timer last stopped.
    live: Vec<StoryboardId>,
}

impl<S: VisualState> Animator<S> {
    /// Create the variables for `initial_colors` (one slot each) and, if
    /// `with_focus`, a focus-ring opacity starting at 0.
    ///
    /// Variables created before a failure are released again.
    pub fn new(
        engine: Arc<dyn AnimationEngine>,
        tag: StoryboardTag,
        initial_state: S,
        initial_colors: &[Color],
        with_focus: bool,
    ) -> AnimationResult<Self> {
        let mut animator = Self {
            engine,
            tag,
            colors: Vec::with_capacity(initial_colors.len()),
            focus: None,
            state: initial_state,
            live: Vec::new(),
        };
        for &color in initial_colors {
            let animated = AnimatedColor::create(animator.engine.as_ref(), color)?;
            animator.colors.push(animated);
        }
        if with_focus {
            animator.focus = Some(animator.engine.create_variable(
                0.0,
                VariableBounds::UNIT,
                Rounding::Nearest,
            )?);
        }
        Ok(animator)
    }

    /// The current state.
    pub fn state(&self) -> S {
        self.state
    }

    pub fn tag(&self) -> StoryboardTag {
        self.tag
    }

    /// Current color of slot `slot`.
    pub fn color(&self, slot: usize) -> AnimationResult<Color> {
        self.colors
            .get(slot)
            .ok_or_else(|| AnimationError::Engine(format!("no animated color in slot {slot}")))?
            .sample(self.engine.as_ref())
    }

    /// Current color of every slot.
    pub fn colors(&self) -> AnimationResult<Vec<Color>> {
        self.colors
            .iter()
            .map(|color| color.sample(self.engine.as_ref()))
            .collect()
    }

    /// Current focus-ring opacity; 0 without a focus variable.
    pub fn focus_opacity(&self) -> AnimationResult<f64> {
        match self.focus {
            Some(variable) => self.engine.value(variable),
            None => Ok(0.0),
        }
    }

    /// Whether a storyboard of this animator is still running.
    pub fn is_animating(&self) -> bool {
        self.live
            .iter()
            .any(|&id| self.engine.status(id) != StoryboardStatus::Finished)
    }

    /// Transition to `state`, moving the variables to `target`.
    ///
    /// On failure the current state is unchanged.
    pub fn start(
        &mut self,
        providers: &Providers,
        window: WindowHandle,
        skip: &AnimationSkip,
        state: S,
        target: &StateTarget,
    ) -> WidgetResult<()> {
        match self.run_pipeline(providers, window, skip, state, target) {
            Ok(storyboard) => {
                tracing::trace!(target: targets::ANIMATION, %window, from = ?self.state, to = ?state, "transition started");
                self.live.push(storyboard);
                self.state = state;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    target: targets::ANIMATION,
                    %window,
                    from = ?self.state,
                    to = ?state,
                    error = %err,
                    "transition aborted"
                );
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        providers: &Providers,
        window: WindowHandle,
        skip: &AnimationSkip,
        state: S,
        target: &StateTarget,
    ) -> WidgetResult<StoryboardId> {
        let phase = state.phase();
        let duration = providers.settings.durations.for_phase(phase);
        let instant = skip.skips(phase) || duration.is_zero();
        let spec = |final_value: f64| {
            if instant {
                TransitionSpec::Instantaneous { final_value }
            } else {
                TransitionSpec::eased(duration, final_value)
            }
        };

        let engine = self.engine.as_ref();
        let mut storyboard = engine.create_storyboard()?;
        for (color, wanted) in self.colors.iter().zip(&target.colors) {
            if let Some(wanted) = *wanted {
                color.add_transitions(&mut storyboard, wanted, spec)?;
            }
        }
        if let (Some(variable), Some(opacity)) = (self.focus, target.focus_opacity) {
            storyboard.add_transition(variable, spec(opacity.clamp(0.0, 1.0)))?;
        }
        storyboard.set_tag(self.tag);
        let id = engine.schedule(storyboard, engine.now())?;
        timer::start_widget_timer(providers.host.as_ref(), window, ANIMATION_TIMER, &providers.settings)?;
        Ok(id)
    }

    /// Handle an animation timer tick: repaint, then stop the timer once
    /// every scheduled storyboard is done.
    ///
    /// # Returns
    ///
    /// `true` while the timer stays armed.
    pub fn on_timer(&mut self, providers: &Providers, window: WindowHandle) -> bool {
        providers.host.invalidate(window);
        let engine = self.engine.as_ref();
        self.live
            .retain(|&id| engine.status(id) != StoryboardStatus::Finished);
        if self.live.is_empty() {
            timer::stop_widget_timer(providers.host.as_ref(), window, ANIMATION_TIMER);
            false
        } else {
            true
        }
    }
}

impl<S: VisualState> Drop for Animator<S> {
    fn drop(&mut self) {
        let engine = self.engine.as_ref();
        for color in &self.colors {
            color.release(engine);
        }
        if let Some(variable) = self.focus {
            let _ = engine.release_variable(variable);
        }
    }
}

impl<S: VisualState> fmt::Debug for Animator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animator")
            .field("tag", &self.tag)
            .field("state", &self.state)
            .field("colors", &self.colors.len())
            .field("focus", &self.focus.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veneer_core::{ManualClock, TimelineEngine};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Lamp {
        Off,
        On,
    }

    impl VisualState for Lamp {
        fn phase(self) -> Phase {
            match self {
                Lamp::Off => Phase::Default,
                Lamp::On => Phase::Hover,
            }
        }
    }

    fn setup() -> (Arc<ManualClock>, Arc<TimelineEngine>) {
        let clock = Arc::new(ManualClock::new());
        let engine = Arc::new(TimelineEngine::new(clock.clone()));
        (clock, engine)
    }

    #[test]
    fn test_creates_and_releases_variables() {
        let (_clock, engine) = setup();
        {
            let animator = Animator::new(
                engine.clone(),
                StoryboardTag::visual(7),
                Lamp::Off,
                &[Color::BLACK, Color::WHITE],
                true,
            )
            .unwrap();
            assert_eq!(engine.variable_count(), 7);
            assert_eq!(animator.color(1).unwrap(), Color::WHITE);
            assert_eq!(animator.focus_opacity().unwrap(), 0.0);
            assert!(animator.color(2).is_err());
            assert!(!animator.is_animating());
        }
        assert_eq!(engine.variable_count(), 0);
    }

    #[test]
    fn test_state_target_constructors() {
        let target = StateTarget::colors([Color::BLACK, Color::WHITE]);
        assert_eq!(target.colors, vec![Some(Color::BLACK), Some(Color::WHITE)]);
        assert_eq!(target.focus_opacity, None);

        let target = StateTarget::focus(1.0);
        assert!(target.colors.is_empty());
        assert_eq!(target.focus_opacity, Some(1.0));
    }

    #[test]
    fn test_phases() {
        assert_eq!(Lamp::Off.phase(), Phase::Default);
        assert_eq!(Lamp::On.phase(), Phase::Hover);
    }
}
