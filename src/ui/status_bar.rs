use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use super::theme::Theme;
use super::widgets::truncate_string;
use crate::app::state::StatusState;
use crate::input::help_hint;

pub fn render(frame: &mut Frame, area: Rect, status: &StatusState) {
    if let Some(error) = &status.error {
        let text = truncate_string(&format!(" Error: {} ", error), usize::from(area.width));
        frame.render_widget(Paragraph::new(text).style(Theme::error_bar()), area);
        return;
    }
    status_bar(frame, area, &status.message, help_hint());
}

/// Status line with left and right aligned text
fn status_bar(frame: &mut Frame, area: Rect, left: &str, right: &str) {
    let style = Theme::status_bar();
    let width = usize::from(area.width);

    // The hint gives way to the message when space runs out
    let left = truncate_string(left, width.saturating_sub(2));
    let right = if left.width() + right.width() + 4 <= width {
        right
    } else {
        ""
    };
    let padding = width.saturating_sub(left.width() + right.width() + 4);

    let line = Line::from(vec![
        Span::styled(format!(" {} ", left), style),
        Span::styled(" ".repeat(padding), style),
        Span::styled(format!(" {} ", right), style),
    ]);
    frame.render_widget(Paragraph::new(line).style(style), area);
}
