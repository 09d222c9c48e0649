use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

use super::pane;
use super::theme::{Theme, symbols};
use super::widgets::{format_list_date, sanitize_text, truncate_string};
use crate::app::state::{AppState, Focus, ListRow};
use crate::lazylist::ListStatus;
use crate::mail::MessageSummary;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let list = &state.list;
    let folder = state.folders.current.as_deref().unwrap_or("No folder");
    let status = match &list.status {
        ListStatus::Idle => String::new(),
        ListStatus::Loading => " loading...".to_string(),
        ListStatus::Failed(_) => " load failed".to_string(),
    };
    let title = format!(" {} ({}){} ", folder, list.length, status);
    let block = pane(title, state.focus == Focus::List);
    let width = usize::from(area.width.saturating_sub(2));
    let item_height = list.item_height.max(1) as usize;

    let mut lines = Vec::with_capacity(list.rows.len() * item_height);
    for row in &list.rows {
        let style = if row.index == list.selected {
            Theme::selected()
        } else {
            Style::default()
        };
        lines.extend(entry_lines(row, item_height, width, style));
    }

    // The first visible entry may be partly scrolled off the top
    let offset = list
        .rows
        .first()
        .map(|row| list.scroll_top.saturating_sub((row.index * item_height) as u64))
        .unwrap_or(0);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

fn entry_lines(row: &ListRow, height: usize, width: usize, style: Style) -> Vec<Line<'static>> {
    let mut lines = match &row.summary {
        Some(summary) if height == 1 => vec![headline(summary, width, true, style)],
        Some(summary) => vec![
            headline(summary, width, false, style),
            subject_line(summary, width, style),
        ],
        None => vec![Line::styled(
            format!("{:<width$}", "  ...", width = width),
            style.patch(Theme::text_muted()),
        )],
    };
    while lines.len() < height {
        lines.push(Line::styled(" ".repeat(width), style));
    }
    lines.truncate(height);
    lines
}

/// Unread marker, sender (and subject on single-row entries), date on the right.
fn headline(summary: &MessageSummary, width: usize, with_subject: bool, style: Style) -> Line<'static> {
    let marker = if summary.unread { symbols::UNREAD } else { " " };
    let date = format_list_date(summary.date);
    let sender = sanitize_text(summary.from.display_name());
    let text = if with_subject {
        format!("{}: {}", sender, sanitize_text(summary.display_subject()))
    } else {
        sender
    };

    let available = width.saturating_sub(date.width() + 4);
    let text = truncate_string(&text, available);
    let padding = available.saturating_sub(text.width());

    let text_style = if summary.unread {
        style.patch(Theme::text_unread())
    } else {
        style.patch(Theme::text())
    };

    Line::from(vec![
        Span::styled(format!("{} ", marker), style.patch(Theme::text_accent())),
        Span::styled(text, text_style),
        Span::styled(" ".repeat(padding + 1), style),
        Span::styled(format!("{} ", date), style.patch(Theme::text_muted())),
    ])
}

fn subject_line(summary: &MessageSummary, width: usize, style: Style) -> Line<'static> {
    let mut flags = String::new();
    if summary.flagged {
        flags.push_str(symbols::FLAGGED);
    }
    if summary.has_attachment {
        flags.push_str(symbols::ATTACHMENT);
    }
    if !flags.is_empty() {
        flags.push(' ');
    }

    let available = width.saturating_sub(2 + flags.width());
    let subject = truncate_string(&sanitize_text(summary.display_subject()), available);
    let padding = available.saturating_sub(subject.width());

    Line::from(vec![
        Span::styled("  ".to_string(), style),
        Span::styled(flags, style.patch(Theme::flag())),
        Span::styled(subject, style.patch(Theme::text_muted())),
        Span::styled(" ".repeat(padding), style),
    ])
}
