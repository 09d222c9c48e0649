use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::pane;
use super::theme::{Theme, symbols};
use super::widgets::truncate_string;
use crate::app::state::{AppState, FolderRow, Focus};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let tree = &state.folders;
    let block = pane(" Folders ".to_string(), state.focus == Focus::Folders);
    let height = usize::from(area.height.saturating_sub(2));
    let width = usize::from(area.width.saturating_sub(2));

    // Keep the selection on screen
    let offset = (tree.selected + 1).saturating_sub(height);

    let lines: Vec<Line> = tree
        .rows
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, row)| {
            let current = tree.current.as_deref() == Some(row.path.as_str());
            folder_line(row, i == tree.selected, current, width)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn folder_line(row: &FolderRow, selected: bool, current: bool, width: usize) -> Line<'static> {
    let marker = match (row.has_children, row.expanded) {
        (false, _) => " ",
        (true, true) => symbols::EXPANDED,
        (true, false) => symbols::COLLAPSED,
    };
    let count = if row.unread > 0 {
        format!(" ({})", row.unread)
    } else {
        String::new()
    };
    let indent = "  ".repeat(row.depth);
    let name_width = width.saturating_sub(indent.len() + 2 + count.len());
    let text = format!(
        "{}{} {}",
        indent,
        marker,
        truncate_string(&row.name, name_width)
    );

    let style = if selected {
        Theme::selected()
    } else if current {
        Theme::text_accent()
    } else if row.unread > 0 {
        Theme::text_unread()
    } else {
        Theme::text()
    };

    Line::from(vec![
        Span::styled(text, style),
        Span::styled(count, style.patch(Theme::text_muted())),
    ])
}
