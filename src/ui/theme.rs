//! Colors and styles for the TUI

use ratatui::style::{Color, Modifier, Style};
use std::sync::RwLock;

use crate::config::ThemeVariant;

static THEME_VARIANT: RwLock<ThemeVariant> = RwLock::new(ThemeVariant::Dark);

/// Selects the palette. Call once at startup.
pub fn init_theme(variant: ThemeVariant) {
    if let Ok(mut guard) = THEME_VARIANT.write() {
        *guard = variant;
    }
}

pub fn current_theme() -> ThemeVariant {
    THEME_VARIANT.read().map(|g| *g).unwrap_or_default()
}

pub mod colors {
    use super::*;

    pub fn bg_selection() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::Blue,
            ThemeVariant::Light => Color::LightBlue,
        }
    }

    pub fn bg_status() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::Light => Color::Gray,
        }
    }

    pub fn bg_error() -> Color {
        Color::Red
    }

    pub fn fg_primary() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::White,
            ThemeVariant::Light => Color::Black,
        }
    }

    pub fn fg_muted() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::Gray,
            ThemeVariant::Light => Color::DarkGray,
        }
    }

    pub fn fg_accent() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::Cyan,
            ThemeVariant::Light => Color::Blue,
        }
    }

    pub fn fg_warning() -> Color {
        Color::Yellow
    }

    pub fn border() -> Color {
        match current_theme() {
            ThemeVariant::Dark => Color::DarkGray,
            ThemeVariant::Light => Color::Gray,
        }
    }

    pub fn border_focused() -> Color {
        fg_accent()
    }
}

/// Pre-composed styles
pub struct Theme;

impl Theme {
    pub fn selected() -> Style {
        Style::default()
            .bg(colors::bg_selection())
            .fg(colors::fg_primary())
    }

    pub fn text() -> Style {
        Style::default().fg(colors::fg_primary())
    }

    pub fn text_muted() -> Style {
        Style::default().fg(colors::fg_muted())
    }

    pub fn text_unread() -> Style {
        Self::text().add_modifier(Modifier::BOLD)
    }

    pub fn text_accent() -> Style {
        Style::default().fg(colors::fg_accent())
    }

    pub fn flag() -> Style {
        Style::default().fg(colors::fg_warning())
    }

    pub fn status_bar() -> Style {
        Style::default()
            .bg(colors::bg_status())
            .fg(colors::fg_primary())
    }

    pub fn error_bar() -> Style {
        Style::default()
            .bg(colors::bg_error())
            .fg(colors::fg_primary())
    }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(colors::border_focused())
        } else {
            Style::default().fg(colors::border())
        }
    }
}

pub mod symbols {
    pub const UNREAD: &str = "●";
    pub const FLAGGED: &str = "★";
    pub const ATTACHMENT: &str = "@";
    pub const EXPANDED: &str = "▾";
    pub const COLLAPSED: &str = "▸";
}
