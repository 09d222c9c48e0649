//! Terminal setup and teardown.
//!
//! `Tui` owns the terminal for the lifetime of the UI and restores it on
//! drop, including when the event loop exits with an error.

use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use super::state::AppState;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            disable_raw_mode().ok();
            return Err(e).context("Failed to enter alternate screen");
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                execute!(io::stdout(), LeaveAlternateScreen).ok();
                disable_raw_mode().ok();
                Err(e).context("Failed to create terminal")
            }
        }
    }

    /// Full terminal area
    pub fn area(&self) -> Result<Rect> {
        let (width, height) = crossterm::terminal::size().context("Failed to query terminal size")?;
        Ok(Rect::new(0, 0, width, height))
    }

    pub fn draw(&mut self, state: &AppState) -> Result<()> {
        self.terminal
            .draw(|frame| crate::ui::render(frame, state))
            .context("Render error")?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        disable_raw_mode().ok();
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen).ok();
        self.terminal.show_cursor().ok();
    }
}
