use crossterm::event::{Event, KeyEvent, KeyEventKind};

use super::keybindings::{Action, KeyBindings};

#[derive(Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Quit,
    Action(Action),
    Resize(u16, u16),
}

pub fn handle_input(event: Event, bindings: &KeyBindings) -> InputResult {
    match event {
        Event::Key(key_event) => handle_key(key_event, bindings),
        Event::Resize(width, height) => InputResult::Resize(width, height),
        _ => InputResult::Continue,
    }
}

fn handle_key(key: KeyEvent, bindings: &KeyBindings) -> InputResult {
    // Some terminals report releases too
    if key.kind != KeyEventKind::Press {
        return InputResult::Continue;
    }

    match bindings.get(&key) {
        Some(Action::Quit) => InputResult::Quit,
        Some(action) => InputResult::Action(action),
        None => InputResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_key_press_maps_to_action() {
        let bindings = KeyBindings::default();
        let event = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(
            handle_input(event, &bindings),
            InputResult::Action(Action::Open)
        );

        let quit = Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        assert_eq!(handle_input(quit, &bindings), InputResult::Quit);
    }

    #[test]
    fn test_release_and_resize() {
        let bindings = KeyBindings::default();
        let release = Event::Key(KeyEvent::new_with_kind_and_state(
            KeyCode::Char('j'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));
        assert_eq!(handle_input(release, &bindings), InputResult::Continue);
        assert_eq!(
            handle_input(Event::Resize(80, 24), &bindings),
            InputResult::Resize(80, 24)
        );
    }
}
