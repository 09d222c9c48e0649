//! Main event loop

use anyhow::Result;
use crossterm::event;
use ratatui::layout::Rect;
use std::time::Duration;

use crate::constants::{BUSY_POLL_MS, IDLE_POLL_MS};
use crate::input::{InputResult, handle_input};

use super::App;
use super::terminal::Tui;

impl App {
    pub(crate) async fn event_loop(&mut self, tui: &mut Tui) -> Result<()> {
        loop {
            // Apply finished list loads before drawing
            if self.process_list_events() {
                self.dirty = true;
            }

            while let Ok(app_event) = self.events_rx.try_recv() {
                self.handle_app_event(app_event);
                self.dirty = true;
            }

            // Render only when something changed
            if self.dirty {
                tui.draw(&self.state)?;
                self.dirty = false;
            }

            // Poll faster while loads are pending so results show up promptly
            let poll_timeout = if self.is_busy() {
                BUSY_POLL_MS
            } else {
                IDLE_POLL_MS
            };
            if event::poll(Duration::from_millis(poll_timeout))? {
                let evt = event::read()?;
                // Any input event (including resize) requires re-render
                self.dirty = true;
                match handle_input(evt, &self.bindings) {
                    InputResult::Quit => break,
                    InputResult::Action(action) => {
                        self.state.status.error = None;
                        self.handle_action(action);
                    }
                    InputResult::Resize(width, height) => {
                        self.resize(Rect::new(0, 0, width, height));
                    }
                    InputResult::Continue => {}
                }
            }
        }

        Ok(())
    }

    /// Drains load results into the list. Returns true if the visible state changed.
    fn process_list_events(&mut self) -> bool {
        let Some(list) = self.list.as_mut() else {
            return false;
        };
        let loaded = list.poll_loaded();
        // A debounced load may have started or failed since the last pass
        let status_changed = list.status() != self.state.list.status;
        if loaded || status_changed {
            self.sync_list();
            return true;
        }
        false
    }

    fn is_busy(&self) -> bool {
        self.list.as_ref().is_some_and(|list| list.is_loading())
            || self
                .state
                .reader
                .as_ref()
                .is_some_and(|reader| reader.body.is_none() && reader.error.is_none())
    }
}
