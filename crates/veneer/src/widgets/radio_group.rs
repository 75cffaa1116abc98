//! Mutual exclusion among radio buttons.
//!
//! A [`RadioGroup`] is a non-visual coordinator. Radio buttons join it by
//! window handle and are keyed by their control ID; at most one member is
//! selected at a time, and ID 0 means "none".
//!
//! # Example
//!
//! ```ignore
//! let group = RadioGroup::new();
//! group.add_radio_button(&system, small)?;
//! group.add_radio_button(&system, large)?;
//!
//! group.selection_changed.connect(|&id| println!("option {id} selected"));
//! group.select(SMALL_ID)?;
//! assert_eq!(group.get_radio_state(), SMALL_ID);
//! ```
//!
//! # Locking
//!
//! The group never holds its own lock while it locks a member, and
//! `selection_changed` is emitted with no group lock held. A member that is
//! being activated is locked by its own message handler, so the group never
//! locks the member it is selecting on that member's behalf. Slots connected
//! to `selection_changed` must not lock the radio button that was clicked.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use veneer_core::logging::targets;
use veneer_core::{Signal, WindowHandle};

use crate::error::{WidgetError, WidgetResult};
use crate::system::SubclassSystem;
use crate::widget::SubclassWidget;
use crate::widgets::RadioButtonWidget;

#[derive(Clone)]
struct Member {
    window: WindowHandle,
    widget: Weak<Mutex<RadioButtonWidget>>,
}

#[derive(Default)]
struct GroupState {
    members: BTreeMap<i32, Member>,
    /// Control ID of the selected member, or 0.
    selected: i32,
}

/// A set of radio buttons with exactly one or no member selected.
pub struct RadioGroup {
    state: Mutex<GroupState>,
    this: Weak<RadioGroup>,

    /// Emitted with the newly selected control ID (0 for none) whenever the
    /// selection changes.
    pub selection_changed: Signal<i32>,
}

impl RadioGroup {
    /// Create an empty group.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: Mutex::new(GroupState::default()),
            this: this.clone(),
            selection_changed: Signal::new(),
        })
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add the radio button subclassing `window`.
    ///
    /// # Errors
    ///
    /// - [`WidgetError::NotRadioButton`] if no radio button widget subclasses
    ///   `window`
    /// - [`WidgetError::AlreadyGrouped`] if the button belongs to a group
    /// - [`WidgetError::DuplicateId`] if a member has the same control ID
    pub fn add_radio_button(&self, system: &SubclassSystem, window: WindowHandle) -> WidgetResult<()> {
        let widget = system
            .subclass_as::<RadioButtonWidget>(window)
            .ok_or(WidgetError::NotRadioButton(window))?;
        let mut radio = widget.lock();
        let id = radio.control_id();
        if radio.has_group() {
            return Err(WidgetError::AlreadyGrouped(id));
        }
        {
            let mut state = self.state.lock();
            if state.members.contains_key(&id) {
                tracing::warn!(target: targets::RADIO, id, "duplicate radio button id");
                return Err(WidgetError::DuplicateId(id));
            }
            state.members.insert(
                id,
                Member {
                    window,
                    widget: Arc::downgrade(&widget),
                },
            );
        }
        radio.join_group(self.this.clone());
        let selected = radio.is_selected();
        drop(radio);
        tracing::debug!(target: targets::RADIO, id, %window, "radio button joined group");

        if selected {
            self.update_radio_state(id)?;
        }
        Ok(())
    }

    /// Remove the radio button subclassing `window`: deselect it, unlink it
    /// and clear the selection if it was selected.
    pub fn remove_radio_button(&self, system: &SubclassSystem, window: WindowHandle) -> WidgetResult<()> {
        let widget = system
            .subclass_as::<RadioButtonWidget>(window)
            .ok_or(WidgetError::NotRadioButton(window))?;
        let id = widget.lock().control_id();
        let was_selected = {
            let mut state = self.state.lock();
            if state.members.remove(&id).is_none() {
                return Err(WidgetError::UnknownId(id));
            }
            let was_selected = state.selected == id;
            if was_selected {
                state.selected = 0;
            }
            was_selected
        };

        let result = {
            let mut radio = widget.lock();
            radio.leave_group();
            radio.update_selection_state(false)
        };
        tracing::debug!(target: targets::RADIO, id, %window, "radio button left group");
        if was_selected {
            self.selection_changed.emit(0);
        }
        result
    }

    /// Drop a member whose widget is going away. Does not lock it.
    pub(crate) fn forget(&self, id: i32) {
        let was_selected = {
            let mut state = self.state.lock();
            if state.members.remove(&id).is_none() {
                return;
            }
            let was_selected = state.selected == id;
            if was_selected {
                state.selected = 0;
            }
            was_selected
        };
        if was_selected {
            self.selection_changed.emit(0);
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().members.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.state.lock().members.contains_key(&id)
    }

    /// Member control IDs, in ascending order.
    pub fn ids(&self) -> Vec<i32> {
        self.state.lock().members.keys().copied().collect()
    }

    /// Window of the member with control ID `id`.
    pub fn window_of(&self, id: i32) -> Option<WindowHandle> {
        self.state.lock().members.get(&id).map(|m| m.window)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Record `id` as selected and deselect every other member.
    ///
    /// The member `id` itself is not touched; it is either the button being
    /// activated or was selected by [`select`](Self::select). Calling this
    /// again with the same ID changes nothing.
    pub fn update_radio_state(&self, id: i32) -> WidgetResult<()> {
        let (changed, others) = {
            let mut state = self.state.lock();
            if !state.members.contains_key(&id) {
                tracing::warn!(target: targets::RADIO, id, "not a member of this group");
                return Err(WidgetError::UnknownId(id));
            }
            let changed = state.selected != id;
            state.selected = id;
            let others: Vec<Member> = state
                .members
                .iter()
                .filter(|&(&member, _)| member != id)
                .map(|(_, m)| m.clone())
                .collect();
            (changed, others)
        };

        let result = deselect_all(&others);
        if changed {
            tracing::debug!(target: targets::RADIO, id, "selection moved");
            self.selection_changed.emit(id);
        }
        result
    }

    /// Select member `id` programmatically.
    ///
    /// Must not be called while that member is locked.
    pub fn select(&self, id: i32) -> WidgetResult<()> {
        let member = self
            .state
            .lock()
            .members
            .get(&id)
            .cloned()
            .ok_or(WidgetError::UnknownId(id))?;
        if let Some(widget) = member.widget.upgrade() {
            widget.lock().update_selection_state(true)?;
        }
        self.update_radio_state(id)
    }

    /// Control ID of the selected member, or 0.
    pub fn get_radio_state(&self) -> i32 {
        self.state.lock().selected
    }

    /// Deselect and unlink every member, leaving the group empty.
    pub fn reset_radio_group(&self) -> WidgetResult<()> {
        let (members, had_selection) = {
            let mut state = self.state.lock();
            let members: Vec<Member> = std::mem::take(&mut state.members).into_values().collect();
            let had_selection = std::mem::take(&mut state.selected) != 0;
            (members, had_selection)
        };
        let mut first_error = None;
        for member in &members {
            if let Some(widget) = member.widget.upgrade() {
                let mut radio = widget.lock();
                radio.leave_group();
                if let Err(err) = radio.update_selection_state(false) {
                    first_error.get_or_insert(err);
                }
            }
        }
        tracing::debug!(target: targets::RADIO, count = members.len(), "radio group reset");
        if had_selection {
            self.selection_changed.emit(0);
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn deselect_all(members: &[Member]) -> WidgetResult<()> {
    let mut first_error = None;
    for member in members {
        let Some(widget) = member.widget.upgrade() else {
            continue;
        };
        if let Err(err) = widget.lock().update_selection_state(false) {
            tracing::warn!(target: targets::RADIO, window = %member.window, error = %err, "deselect failed");
            first_error.get_or_insert(err);
        }
    }
    first_error.map_or(Ok(()), Err)
}

static_assertions::assert_impl_all!(RadioGroup: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubclassConfig;
    use crate::message::Message;
    use crate::test_support::Harness;
    use std::sync::atomic::{AtomicI32, Ordering};
    use veneer_render::Point;

    fn radio(h: &Harness, id: i32) -> (Arc<Mutex<RadioButtonWidget>>, WindowHandle) {
        let window = h.host.add_radio_button(id, "Option");
        let widget = RadioButtonWidget::new(&h.system).unwrap();
        widget
            .lock()
            .set_window(window, SubclassConfig::default())
            .unwrap();
        (widget, window)
    }

    #[test]
    fn test_add_rejects_duplicates_and_strangers() {
        let h = Harness::new();
        let (_a, a) = radio(&h, 1);
        let (_twin, twin) = radio(&h, 1);
        let group = RadioGroup::new();

        group.add_radio_button(&h.system, a).unwrap();
        assert_eq!(
            group.add_radio_button(&h.system, a),
            Err(WidgetError::AlreadyGrouped(1))
        );
        assert_eq!(
            group.add_radio_button(&h.system, twin),
            Err(WidgetError::DuplicateId(1))
        );
        let button = h.host.add_push_button(9, "OK");
        assert_eq!(
            group.add_radio_button(&h.system, button),
            Err(WidgetError::NotRadioButton(button))
        );
        assert_eq!(group.len(), 1);
        assert_eq!(group.window_of(1), Some(a));
    }

    #[test]
    fn test_update_radio_state_is_exclusive_and_idempotent() {
        let h = Harness::new();
        let radios: Vec<_> = (1..=3).map(|id| radio(&h, id)).collect();
        let group = RadioGroup::new();
        for (_, window) in &radios {
            group.add_radio_button(&h.system, *window).unwrap();
        }
        for (widget, _) in &radios {
            widget.lock().update_selection_state(true).unwrap();
        }

        group.update_radio_state(2).unwrap();
        assert_eq!(group.get_radio_state(), 2);
        assert!(!radios[0].0.lock().is_selected());
        assert!(!radios[2].0.lock().is_selected());

        let scheduled = h.engine.scheduled();
        group.update_radio_state(2).unwrap();
        assert_eq!(group.get_radio_state(), 2);
        assert_eq!(h.engine.scheduled(), scheduled);

        assert_eq!(group.update_radio_state(7), Err(WidgetError::UnknownId(7)));
        assert_eq!(group.get_radio_state(), 2);
    }

    #[test]
    fn test_clicks_move_selection() {
        let h = Harness::new();
        let (a, a_window) = radio(&h, 1);
        let (b, b_window) = radio(&h, 2);
        let group = RadioGroup::new();
        group.add_radio_button(&h.system, a_window).unwrap();
        group.add_radio_button(&h.system, b_window).unwrap();

        let last = Arc::new(AtomicI32::new(-1));
        let seen = last.clone();
        group.selection_changed.connect(move |&id| seen.store(id, Ordering::SeqCst));

        let at = Point::new(2.0, 2.0);
        for window in [a_window, b_window] {
            h.send(window, Message::MouseMove(at));
            h.send(window, Message::LeftButtonDown(at));
            h.send(window, Message::LeftButtonUp(at));
            h.send(window, Message::MouseLeave);
            if window == a_window {
                assert_eq!(group.get_radio_state(), 1);
                assert!(a.lock().is_selected());
                assert!(!b.lock().is_selected());
            }
        }
        assert_eq!(group.get_radio_state(), 2);
        assert!(!a.lock().is_selected());
        assert!(b.lock().is_selected());
        assert_eq!(last.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_select_and_remove() {
        let h = Harness::new();
        let (a, a_window) = radio(&h, 1);
        let (_b, b_window) = radio(&h, 2);
        let group = RadioGroup::new();
        group.add_radio_button(&h.system, a_window).unwrap();
        group.add_radio_button(&h.system, b_window).unwrap();

        group.select(1).unwrap();
        assert!(a.lock().is_selected());

        group.remove_radio_button(&h.system, a_window).unwrap();
        assert_eq!(group.get_radio_state(), 0);
        assert!(!a.lock().is_selected());
        assert!(a.lock().group().is_none());
        assert_eq!(group.ids(), vec![2]);
        assert_eq!(
            group.remove_radio_button(&h.system, a_window),
            Err(WidgetError::UnknownId(1))
        );
    }

    #[test]
    fn test_reset_keeps_widgets() {
        let h = Harness::new();
        let (a, a_window) = radio(&h, 1);
        let group = RadioGroup::new();
        group.add_radio_button(&h.system, a_window).unwrap();
        group.select(1).unwrap();

        group.reset_radio_group().unwrap();
        assert!(group.is_empty());
        assert_eq!(group.get_radio_state(), 0);
        assert!(!a.lock().is_selected());
        assert!(a.lock().is_associated());
        assert!(!group.contains(1));

        // The button may join another group afterwards.
        let other = RadioGroup::new();
        other.add_radio_button(&h.system, a_window).unwrap();
    }

    #[test]
    fn test_selected_button_brings_selection_along() {
        let h = Harness::new();
        let (a, a_window) = radio(&h, 5);
        a.lock().update_selection_state(true).unwrap();
        let group = RadioGroup::new();
        group.add_radio_button(&h.system, a_window).unwrap();
        assert_eq!(group.get_radio_state(), 5);
    }
}
