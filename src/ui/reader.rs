use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::pane;
use super::theme::Theme;
use super::widgets::{format_full_date, sanitize_text};
use crate::app::state::{AppState, Focus, ReaderState};
use crate::mail::types::join_addresses;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = pane(" Message ".to_string(), state.focus == Focus::Reader);

    let Some(reader) = &state.reader else {
        let placeholder = Paragraph::new(Line::styled("No message selected", Theme::text_muted()))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let mut lines = header_lines(reader);
    lines.push(Line::default());

    if let Some(error) = &reader.error {
        lines.push(Line::styled(
            format!("Failed to load message: {}", error),
            Theme::error_bar(),
        ));
    } else if let Some(body) = &reader.body {
        lines.extend(
            sanitize_text(body)
                .lines()
                .map(|line| Line::styled(line.to_string(), Theme::text())),
        );
    } else {
        lines.push(Line::styled("Loading...", Theme::text_muted()));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((reader.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn header_lines(reader: &ReaderState) -> Vec<Line<'static>> {
    let summary = &reader.summary;
    let mut lines = vec![
        field("From", summary.from.to_string()),
        field("To", join_addresses(&summary.to)),
    ];
    if !summary.cc.is_empty() {
        lines.push(field("Cc", join_addresses(&summary.cc)));
    }
    lines.push(field("Date", format_full_date(summary.date)));
    lines.push(Line::from(vec![
        Span::styled("Subject: ", Theme::text_muted()),
        Span::styled(
            sanitize_text(summary.display_subject()),
            Theme::text_unread(),
        ),
    ]));

    if !reader.attachments.is_empty() {
        let mut spans = vec![Span::styled("Attachments: ", Theme::text_muted())];
        for (i, name) in reader.attachments.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if i == reader.attachment_cursor {
                Theme::selected()
            } else {
                Theme::text_accent()
            };
            spans.push(Span::styled(format!("[{}]", sanitize_text(name)), style));
        }
        lines.push(Line::from(spans));
    }

    lines
}

fn field(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", name), Theme::text_muted()),
        Span::styled(sanitize_text(&value), Theme::text()),
    ])
}
