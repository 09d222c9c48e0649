mod folders;
mod message_list;
mod reader;
mod status_bar;
pub mod theme;
pub mod widgets;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Borders},
};

use crate::app::state::AppState;
use crate::constants::FOLDER_SIDEBAR_WIDTH;
use theme::Theme;

/// Screen areas of the three panes and the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panes {
    pub folders: Rect,
    pub list: Rect,
    pub reader: Rect,
    pub status: Rect,
}

impl Panes {
    /// Rows available to list entries inside the border
    pub fn list_viewport(&self) -> u32 {
        u32::from(self.list.height.saturating_sub(2))
    }

    /// Columns available to message text inside the border
    pub fn reader_width(&self) -> usize {
        usize::from(self.reader.width.saturating_sub(2))
    }

    pub fn reader_height(&self) -> u16 {
        self.reader.height.saturating_sub(2)
    }
}

pub fn layout(area: Rect, split_ratio: u16) -> Panes {
    let [main, status] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
    let [folders, rest] = Layout::horizontal([
        Constraint::Length(FOLDER_SIDEBAR_WIDTH),
        Constraint::Min(0),
    ])
    .areas(main);
    let [list, reader] = Layout::horizontal([
        Constraint::Percentage(split_ratio),
        Constraint::Percentage(100 - split_ratio),
    ])
    .areas(rest);

    Panes {
        folders,
        list,
        reader,
        status,
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let panes = layout(frame.area(), state.split_ratio);
    folders::render(frame, panes.folders, state);
    message_list::render(frame, panes.list, state);
    reader::render(frame, panes.reader, state);
    status_bar::render(frame, panes.status, &state.status);
}

fn pane(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border(focused))
        .title(title)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_right_side_by_ratio() {
        let panes = layout(Rect::new(0, 0, 124, 40), 40);
        assert_eq!(panes.folders.width, FOLDER_SIDEBAR_WIDTH);
        assert_eq!(panes.list.width, 40);
        assert_eq!(panes.reader.width, 60);
        assert_eq!(panes.status.height, 1);
        assert_eq!(panes.list_viewport(), 37);
        assert_eq!(panes.reader_width(), 58);
    }
}
