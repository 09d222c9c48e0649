//! Action handlers for user input
//!
//! - `navigation`: selection, scrolling and focus
//! - `folder`: opening and folding folders
//! - `email`: opening messages and receiving their content
//! - `attachment`: opening attachments in the system viewer

mod attachment;
mod email;
mod folder;
mod navigation;

use crate::input::Action;

use super::App;
use super::state::Focus;

impl App {
    pub(crate) fn handle_action(&mut self, action: Action) {
        match action {
            Action::Up => self.move_by(-1),
            Action::Down => self.move_by(1),
            Action::Top => self.move_to_edge(false),
            Action::Bottom => self.move_to_edge(true),
            Action::PageUp => self.move_page(-1),
            Action::PageDown => self.move_page(1),
            Action::FocusNext => self.cycle_focus(true),
            Action::FocusPrev => self.cycle_focus(false),

            Action::Open => match self.state.focus {
                Focus::Folders => self.open_selected_folder(),
                Focus::List => self.open_selected_message(),
                Focus::Reader => self.open_attachment(),
            },
            Action::ToggleFolder => {
                if self.state.focus == Focus::Folders {
                    self.toggle_selected_folder();
                }
            }
            Action::OpenAttachment => self.open_attachment(),
            Action::Back => self.go_back(),
            Action::Quit => {} // Handled in event loop
        }
    }
}
