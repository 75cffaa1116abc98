//! A self-contained animation engine driven by a [`Clock`].
//!
//! Values are evaluated lazily: nothing runs in the background, a variable is
//! computed from its timeline whenever it is read.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::SlotMap;

use super::clock::Clock;
use super::easing::{Easing, lerp_eased};
use super::engine::{
    AnimationEngine, Rounding, Storyboard, StoryboardId, StoryboardStatus, StoryboardTag,
    VariableBounds, VariableId,
};
use crate::error::{AnimationError, AnimationResult};
use crate::logging::targets;

/// One interpolation step on a variable's timeline.
#[derive(Debug, Clone, Copy)]
struct Segment {
    start: f64,
    end: f64,
    from: f64,
    to: f64,
    easing: Easing,
}

impl Segment {
    fn sample(&self, at: f64) -> f64 {
        if at >= self.end {
            return self.to;
        }
        let span = self.end - self.start;
        if span <= 0.0 {
            return self.to;
        }
        lerp_eased(self.easing, self.from, self.to, (at - self.start) / span)
    }
}

#[derive(Debug)]
struct Variable {
    base: f64,
    bounds: VariableBounds,
    rounding: Rounding,
    segments: Vec<Segment>,
}

impl Variable {
    fn sample(&self, at: f64) -> f64 {
        let mut value = self.base;
        for segment in &self.segments {
            if at < segment.start {
                break;
            }
            value = segment.sample(at);
        }
        value
    }

    /// Fold completed segments into the base value.
    fn settle(&mut self, at: f64) {
        let done = self.segments.iter().take_while(|s| s.end <= at).count();
        if done > 0 {
            self.base = self.segments[done - 1].to;
            self.segments.drain(..done);
        }
    }
}

#[derive(Debug)]
struct Scheduled {
    tag: Option<StoryboardTag>,
    start: f64,
    end: f64,
    variables: Vec<VariableId>,
}

impl Scheduled {
    fn status(&self, now: f64) -> StoryboardStatus {
        if self.variables.is_empty() || now >= self.end {
            StoryboardStatus::Finished
        } else if now < self.start {
            StoryboardStatus::Scheduled
        } else {
            StoryboardStatus::Playing
        }
    }
}

#[derive(Default)]
struct Timeline {
    variables: SlotMap<VariableId, Variable>,
    storyboards: SlotMap<StoryboardId, Scheduled>,
    tags: HashMap<StoryboardTag, StoryboardId>,
}

impl Timeline {
    fn collect_finished(&mut self, now: f64) {
        let finished: Vec<StoryboardId> = self
            .storyboards
            .iter()
            .filter(|(_, s)| s.status(now) == StoryboardStatus::Finished)
            .map(|(id, _)| id)
            .collect();

        for id in finished {
            if let Some(scheduled) = self.storyboards.remove(id)
                && let Some(tag) = scheduled.tag
                && self.tags.get(&tag) == Some(&id)
            {
                self.tags.remove(&tag);
            }
        }
    }
}

/// The built-in [`AnimationEngine`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use veneer_core::animation::*;
///
/// let clock = Arc::new(ManualClock::new());
/// let engine = TimelineEngine::new(clock.clone());
/// let pos = engine.create_variable(0.0, VariableBounds::new(0.0, 1000.0), Rounding::Floor).unwrap();
///
/// let mut storyboard = engine.create_storyboard().unwrap();
/// storyboard.add_transition(pos, TransitionSpec::LinearFromSpeed { speed: 1000.0, final_value: 500.0 }).unwrap();
/// storyboard.set_tag(StoryboardTag::scroll(3));
/// engine.schedule(storyboard, engine.now()).unwrap();
///
/// clock.advance(Duration::from_millis(250));
/// assert_eq!(engine.integer_value(pos).unwrap(), 250);
/// assert!(engine.is_tag_active(StoryboardTag::scroll(3)));
///
/// clock.advance(Duration::from_millis(250));
/// assert!(!engine.is_tag_active(StoryboardTag::scroll(3)));
/// ```
pub struct TimelineEngine {
    clock: Arc<dyn Clock>,
    timeline: Mutex<Timeline>,
}

impl TimelineEngine {
    /// Create an engine reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            timeline: Mutex::new(Timeline::default()),
        }
    }

    /// Number of storyboards that have not finished yet.
    pub fn scheduled_count(&self) -> usize {
        let now = self.now();
        let mut timeline = self.timeline.lock();
        timeline.collect_finished(now);
        timeline.storyboards.len()
    }

    /// Number of live variables.
    pub fn variable_count(&self) -> usize {
        self.timeline.lock().variables.len()
    }
}

impl AnimationEngine for TimelineEngine {
    fn create_variable(
        &self,
        initial: f64,
        bounds: VariableBounds,
        rounding: Rounding,
    ) -> AnimationResult<VariableId> {
        if !bounds.is_valid() {
            return Err(AnimationError::InvalidBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        if !initial.is_finite() {
            return Err(AnimationError::Engine(format!(
                "initial value {initial} is not finite"
            )));
        }

        let id = self.timeline.lock().variables.insert(Variable {
            base: bounds.clamp(initial),
            bounds,
            rounding,
            segments: Vec::new(),
        });
        tracing::trace!(target: targets::ANIMATION, ?id, initial, "variable created");
        Ok(id)
    }

    fn release_variable(&self, variable: VariableId) -> AnimationResult<()> {
        let mut timeline = self.timeline.lock();
        timeline
            .variables
            .remove(variable)
            .ok_or(AnimationError::UnknownVariable(variable))?;
        for (_, scheduled) in timeline.storyboards.iter_mut() {
            scheduled.variables.retain(|v| *v != variable);
        }
        Ok(())
    }

    fn value(&self, variable: VariableId) -> AnimationResult<f64> {
        let now = self.now();
        let mut timeline = self.timeline.lock();
        let var = timeline
            .variables
            .get_mut(variable)
            .ok_or(AnimationError::UnknownVariable(variable))?;
        var.settle(now);
        Ok(var.sample(now))
    }

    fn integer_value(&self, variable: VariableId) -> AnimationResult<i64> {
        let value = self.value(variable)?;
        let rounding = self
            .timeline
            .lock()
            .variables
            .get(variable)
            .map(|v| v.rounding)
            .ok_or(AnimationError::UnknownVariable(variable))?;
        Ok(rounding.apply(value))
    }

    fn create_storyboard(&self) -> AnimationResult<Storyboard> {
        Ok(Storyboard::new())
    }

    fn schedule(&self, storyboard: Storyboard, at: f64) -> AnimationResult<StoryboardId> {
        if !at.is_finite() {
            return Err(AnimationError::Engine(format!(
                "schedule time {at} is not finite"
            )));
        }

        let now = self.now();
        let mut timeline = self.timeline.lock();
        timeline.collect_finished(now);

        // Validate every variable before touching any timeline.
        for (variable, _) in storyboard.transitions() {
            if !timeline.variables.contains_key(*variable) {
                return Err(AnimationError::UnknownVariable(*variable));
            }
        }

        let id = timeline.storyboards.insert(Scheduled {
            tag: storyboard.tag(),
            start: at,
            end: at,
            variables: Vec::new(),
        });

        let mut touched: Vec<VariableId> = Vec::new();
        let mut end = at;

        for (variable, transition) in storyboard.transitions() {
            let Some(var) = timeline.variables.get_mut(*variable) else {
                continue;
            };

            let (start, from) = if touched.contains(variable) {
                // Chain after this storyboard's previous transition.
                var.segments
                    .last()
                    .map_or((at, var.base), |last| (last.end, last.to))
            } else {
                let from = var.sample(at);
                var.base = from;
                var.segments.clear();
                touched.push(*variable);
                (at, from)
            };

            let to = var.bounds.clamp(transition.final_value());
            let seg_end = start + transition.duration_from(from);
            var.segments.push(Segment {
                start,
                end: seg_end,
                from,
                to,
                easing: transition.easing(),
            });
            end = end.max(seg_end);
        }

        // Older storyboards lose the variables this one took over.
        for (other, scheduled) in timeline.storyboards.iter_mut() {
            if other != id {
                scheduled.variables.retain(|v| !touched.contains(v));
            }
        }

        if let Some(scheduled) = timeline.storyboards.get_mut(id) {
            scheduled.end = end;
            scheduled.variables = touched;
        }
        if let Some(tag) = storyboard.tag() {
            timeline.tags.insert(tag, id);
        }

        tracing::trace!(
            target: targets::ANIMATION,
            ?id,
            tag = ?storyboard.tag(),
            start = at,
            end,
            transitions = storyboard.transitions().len(),
            "storyboard scheduled"
        );
        Ok(id)
    }

    fn now(&self) -> f64 {
        self.clock.now()
    }

    fn find_storyboard(&self, tag: StoryboardTag) -> Option<StoryboardId> {
        let now = self.now();
        let mut timeline = self.timeline.lock();
        timeline.collect_finished(now);
        timeline.tags.get(&tag).copied()
    }

    fn status(&self, storyboard: StoryboardId) -> StoryboardStatus {
        let now = self.now();
        self.timeline
            .lock()
            .storyboards
            .get(storyboard)
            .map_or(StoryboardStatus::Finished, |s| s.status(now))
    }
}

static_assertions::assert_impl_all!(TimelineEngine: Send, Sync);
