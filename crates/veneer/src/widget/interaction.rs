//! Hover, press and focus handling shared by interactive widgets.
//!
//! Buttons, image buttons, radio buttons and drop-downs react to input the
//! same way; only the states they enter differ. A widget implements
//! [`Interactive`] to say which state each situation maps to (through a
//! [`StateMap`]) and what activation does, and routes input messages through
//! [`drive`].
//!
//! | input                         | effect                                        |
//! |-------------------------------|-----------------------------------------------|
//! | first move over the control   | hovered; leave tracking armed; `hover` state, `pressed` during a key press |
//! | pointer leaves                | hover and press cleared; `rest` state         |
//! | button down while hovered     | pressed; focus requested; `pressed` state     |
//! | button up while pressed       | if hovered: activate, then `hover`; else `rest` |
//! | Space/Enter down and up       | same as button down and up, always activating |
//! | Tab                           | `rest` state, focus moves to next tab stop    |
//! | focus gained / lost           | `focus` / `focus_lost` state                  |

use veneer_core::WindowHandle;

use crate::error::WidgetResult;
use crate::host::WindowHost;
use crate::message::{Key, Message};
use crate::widget::VisualState;

/// Pointer and keyboard flags orthogonal to the visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerState {
    pub hovered: bool,
    pub pressed: bool,
}

/// The state a widget enters in each input situation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMap<S> {
    pub rest: S,
    pub hover: S,
    pub pressed: S,
    pub focus: S,
    pub focus_lost: S,
}

/// A widget driven by [`drive`].
pub trait Interactive {
    type State: VisualState;

    /// The window input arrives on.
    fn input_window(&self) -> WindowHandle;

    fn pointer(&mut self) -> &mut PointerState;

    /// The current state mapping. Consulted after activation, so it may
    /// depend on what activation changed.
    fn state_map(&self) -> StateMap<Self::State>;

    /// Start a transition to `state`.
    fn transition(&mut self, state: Self::State) -> WidgetResult<()>;

    /// The control was clicked or activated from the keyboard.
    fn on_activate(&mut self) -> WidgetResult<()>;
}

fn is_activation_key(key: Key) -> bool {
    matches!(key, Key::Space | Key::Enter)
}

/// Apply an input message to `widget`.
///
/// # Returns
///
/// `None` if the message is not input this module handles, otherwise the
/// outcome of the transitions and activation it caused. When activation
/// fails the follow-up transition still runs and the activation error is
/// returned.
pub fn drive<W: Interactive>(
    widget: &mut W,
    host: &dyn WindowHost,
    message: &Message,
) -> Option<WidgetResult<()>> {
    let window = widget.input_window();
    let result = match *message {
        // Entering while Space or Enter is still held keeps the pressed
        // look rather than hover.
        Message::MouseMove(_) => {
            let pointer = widget.pointer();
            if pointer.hovered {
                Ok(())
            } else {
                pointer.hovered = true;
                let pressed = pointer.pressed;
                host.track_mouse_leave(window);
                let map = widget.state_map();
                widget.transition(if pressed { map.pressed } else { map.hover })
            }
        }
        Message::MouseLeave => {
            *widget.pointer() = PointerState::default();
            let rest = widget.state_map().rest;
            widget.transition(rest)
        }
        Message::LeftButtonDown(_) => {
            let pointer = widget.pointer();
            if pointer.hovered && !pointer.pressed {
                pointer.pressed = true;
                host.set_focus(window);
                let pressed = widget.state_map().pressed;
                widget.transition(pressed)
            } else {
                Ok(())
            }
        }
        Message::LeftButtonUp(_) => {
            let pointer = widget.pointer();
            if pointer.pressed {
                pointer.pressed = false;
                if pointer.hovered {
                    release(widget)
                } else {
                    let rest = widget.state_map().rest;
                    widget.transition(rest)
                }
            } else {
                Ok(())
            }
        }
        Message::KeyDown(key) if is_activation_key(key) => {
            let pointer = widget.pointer();
            if pointer.pressed {
                // Auto-repeat.
                Ok(())
            } else {
                pointer.pressed = true;
                let pressed = widget.state_map().pressed;
                widget.transition(pressed)
            }
        }
        Message::KeyUp(key) if is_activation_key(key) => {
            let pointer = widget.pointer();
            if pointer.pressed {
                pointer.pressed = false;
                release(widget)
            } else {
                Ok(())
            }
        }
        Message::KeyDown(Key::Tab) => {
            widget.pointer().pressed = false;
            let rest = widget.state_map().rest;
            let result = widget.transition(rest);
            if let Some(next) = host.next_tab_stop(window, false) {
                host.set_focus(next);
            }
            result
        }
        Message::SetFocus => {
            let focus = widget.state_map().focus;
            widget.transition(focus)
        }
        Message::KillFocus => {
            widget.pointer().pressed = false;
            let focus_lost = widget.state_map().focus_lost;
            widget.transition(focus_lost)
        }
        _ => return None,
    };
    Some(result)
}

/// Activate, then settle into the hover or rest state.
fn release<W: Interactive>(widget: &mut W) -> WidgetResult<()> {
    let activated = widget.on_activate();
    let hovered = widget.pointer().hovered;
    let map = widget.state_map();
    let settled = widget.transition(if hovered { map.hover } else { map.rest });
    activated.and(settled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeWindowHost;
    use crate::widget::Phase;
    use veneer_render::Point;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Look {
        Rest,
        Hover,
        Pressed,
        Focus,
        Blur,
    }

    impl VisualState for Look {
        fn phase(self) -> Phase {
            match self {
                Look::Rest => Phase::Default,
                Look::Hover => Phase::Hover,
                Look::Pressed => Phase::Active,
                Look::Focus | Look::Blur => Phase::Focus,
            }
        }
    }

    struct Recorder {
        window: WindowHandle,
        pointer: PointerState,
        states: Vec<Look>,
        activations: u32,
    }

    impl Interactive for Recorder {
        type State = Look;

        fn input_window(&self) -> WindowHandle {
            self.window
        }

        fn pointer(&mut self) -> &mut PointerState {
            &mut self.pointer
        }

        fn state_map(&self) -> StateMap<Look> {
            StateMap {
                rest: Look::Rest,
                hover: Look::Hover,
                pressed: Look::Pressed,
                focus: Look::Focus,
                focus_lost: Look::Blur,
            }
        }

        fn transition(&mut self, state: Look) -> WidgetResult<()> {
            self.states.push(state);
            Ok(())
        }

        fn on_activate(&mut self) -> WidgetResult<()> {
            self.activations += 1;
            Ok(())
        }
    }

    fn setup() -> (FakeWindowHost, Recorder) {
        let host = FakeWindowHost::new();
        let window = host.add_push_button(100, "OK");
        let recorder = Recorder {
            window,
            pointer: PointerState::default(),
            states: Vec::new(),
            activations: 0,
        };
        (host, recorder)
    }

    #[test]
    fn test_click_sequence() {
        let (host, mut recorder) = setup();
        let at = Point::new(5.0, 5.0);
        for message in [
            Message::MouseMove(at),
            Message::MouseMove(at),
            Message::LeftButtonDown(at),
            Message::LeftButtonUp(at),
        ] {
            drive(&mut recorder, &host, &message).unwrap().unwrap();
        }
        assert_eq!(recorder.states, vec![Look::Hover, Look::Pressed, Look::Hover]);
        assert_eq!(recorder.activations, 1);
        assert!(host.is_tracking_leave(recorder.window));
        assert_eq!(host.focused(), Some(recorder.window));
    }

    #[test]
    fn test_release_outside_does_not_activate() {
        let (host, mut recorder) = setup();
        let at = Point::new(5.0, 5.0);
        drive(&mut recorder, &host, &Message::MouseMove(at));
        drive(&mut recorder, &host, &Message::LeftButtonDown(at));
        drive(&mut recorder, &host, &Message::MouseLeave);
        drive(&mut recorder, &host, &Message::LeftButtonUp(at));
        assert_eq!(recorder.activations, 0);
        assert_eq!(recorder.states.last(), Some(&Look::Rest));
    }

    #[test]
    fn test_keyboard_activation() {
        let (host, mut recorder) = setup();
        drive(&mut recorder, &host, &Message::KeyDown(Key::Space));
        drive(&mut recorder, &host, &Message::KeyDown(Key::Space));
        drive(&mut recorder, &host, &Message::KeyUp(Key::Space));
        assert_eq!(recorder.states, vec![Look::Pressed, Look::Rest]);
        assert_eq!(recorder.activations, 1);
    }

    #[test]
    fn test_pointer_entering_during_key_press_stays_pressed() {
        let (host, mut recorder) = setup();
        let at = Point::new(5.0, 5.0);
        drive(&mut recorder, &host, &Message::KeyDown(Key::Enter));
        drive(&mut recorder, &host, &Message::MouseMove(at));
        drive(&mut recorder, &host, &Message::KeyUp(Key::Enter));
        assert_eq!(
            recorder.states,
            vec![Look::Pressed, Look::Pressed, Look::Hover]
        );
        assert_eq!(recorder.activations, 1);
    }

    #[test]
    fn test_tab_moves_focus() {
        let (host, mut recorder) = setup();
        let next = host.add_push_button(101, "Cancel");
        drive(&mut recorder, &host, &Message::KeyDown(Key::Tab));
        assert_eq!(recorder.states, vec![Look::Rest]);
        assert_eq!(host.focused(), Some(next));
    }

    #[test]
    fn test_focus_messages() {
        let (host, mut recorder) = setup();
        drive(&mut recorder, &host, &Message::SetFocus);
        drive(&mut recorder, &host, &Message::KillFocus);
        assert_eq!(recorder.states, vec![Look::Focus, Look::Blur]);
    }

    #[test]
    fn test_other_messages_pass_through() {
        let (host, mut recorder) = setup();
        assert!(drive(&mut recorder, &host, &Message::Paint).is_none());
        assert!(drive(&mut recorder, &host, &Message::KeyDown(Key::Escape)).is_none());
    }
}
