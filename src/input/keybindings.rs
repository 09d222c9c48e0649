use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Top,
    Bottom,
    PageUp,
    PageDown,
    /// Cycle focus between folder tree, message list and reader
    FocusNext,
    FocusPrev,
    /// Open the selected folder or message
    Open,
    /// Collapse or expand the selected folder
    ToggleFolder,
    /// Open the highlighted attachment and move to the next one
    OpenAttachment,
    Back,
    Quit,
}

/// Vim keys and arrow keys, both active at once
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();

        map.insert(key('j'), Action::Down);
        map.insert(key('k'), Action::Up);
        map.insert(key('g'), Action::Top);
        map.insert(shift_key('G'), Action::Bottom);
        map.insert(ctrl_key('d'), Action::PageDown);
        map.insert(ctrl_key('u'), Action::PageUp);

        map.insert(key_code(KeyCode::Down), Action::Down);
        map.insert(key_code(KeyCode::Up), Action::Up);
        map.insert(key_code(KeyCode::Home), Action::Top);
        map.insert(key_code(KeyCode::End), Action::Bottom);
        map.insert(key_code(KeyCode::PageDown), Action::PageDown);
        map.insert(key_code(KeyCode::PageUp), Action::PageUp);

        map.insert(key_code(KeyCode::Tab), Action::FocusNext);
        map.insert(shift_key_code(KeyCode::BackTab), Action::FocusPrev);
        map.insert(key_code(KeyCode::Enter), Action::Open);
        map.insert(key(' '), Action::ToggleFolder);
        map.insert(key('o'), Action::OpenAttachment);
        map.insert(key_code(KeyCode::Esc), Action::Back);
        map.insert(key('q'), Action::Quit);
        map.insert(ctrl_key('c'), Action::Quit);

        Self { bindings: map }
    }
}

impl KeyBindings {
    pub fn get(&self, event: &KeyEvent) -> Option<Action> {
        self.bindings.get(event).copied()
    }
}

/// Short key reference for the status bar
pub fn help_hint() -> &'static str {
    "j/k move  Tab focus  Enter open  Space fold  o attachment  q quit"
}

fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
}

fn shift_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
}

fn ctrl_key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn shift_key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::SHIFT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vim_and_arrow_keys_agree() {
        let bindings = KeyBindings::default();

        assert_eq!(bindings.get(&key('j')), Some(Action::Down));
        assert_eq!(bindings.get(&key_code(KeyCode::Down)), Some(Action::Down));
        assert_eq!(bindings.get(&key('k')), bindings.get(&key_code(KeyCode::Up)));
        assert_eq!(bindings.get(&ctrl_key('c')), Some(Action::Quit));
        assert_eq!(bindings.get(&key('x')), None);
    }
}
