//! Small formatting helpers shared by the panes

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cuts `s` to at most `max_width` terminal columns, ending in "..." when cut.
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let (budget, ellipsis) = if max_width > 3 {
        (max_width - 3, "...")
    } else {
        (max_width, "")
    };

    let mut result = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        result.push(c);
    }
    result.push_str(ellipsis);
    result
}

/// Date column of the message list: time for today, day and month for
/// this year, full date otherwise.
pub fn format_list_date(date: DateTime<Utc>) -> String {
    format_list_date_at(date, Local::now())
}

pub fn format_list_date_at<Tz: TimeZone>(date: DateTime<Utc>, now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = date.with_timezone(&now.timezone());
    if local.date_naive() == now.date_naive() {
        local.format("%H:%M").to_string()
    } else if local.year() == now.year() {
        local.format("%d %b").to_string()
    } else {
        local.format("%d/%m/%Y").to_string()
    }
}

/// Date line of the reader header
pub fn format_full_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%a %d/%m/%Y %H:%M")
        .to_string()
}

/// Removes ANSI escape sequences and replaces control characters so
/// untrusted mail text cannot drive the terminal.
pub fn sanitize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for ch in chars.by_ref() {
                if ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        if c.is_control() && c != '\n' && c != '\t' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}
