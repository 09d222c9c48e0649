//! Opening messages

use std::sync::Arc;

use crate::app::AppEvent;
use crate::app::state::{Focus, ReaderState};
use crate::mail::{Message, RemoteMessage, render_content, to_text};

use super::super::App;

impl App {
    /// Shows the selected message in the reader and fetches its body in the
    /// background.
    pub(crate) fn open_selected_message(&mut self) {
        let Some(folder) = self.state.folders.current.clone() else {
            return;
        };
        let index = self.state.list.selected;
        let mut selected = None;
        let loaded = self
            .list
            .as_ref()
            .is_some_and(|list| list.select(index, |summary, _| selected = Some(summary.clone())));
        let Some(summary) = selected.filter(|_| loaded) else {
            self.state.status.set_message("Message not loaded yet");
            return;
        };

        tracing::debug!("Opening message {} in {}", summary.id, folder);
        let message = Arc::new(RemoteMessage::new(
            (*self.api).clone(),
            &folder,
            summary.clone(),
        ));
        self.message = Some(Arc::clone(&message));
        self.state.reader = Some(ReaderState::loading(summary));
        self.state.focus = Focus::Reader;

        let tx = self.events_tx.clone();
        let policy = self.config.sanitizer.policy();
        let width = self.panes.reader_width();
        tokio::spawn(async move {
            let id = message.summary().id.clone();
            let event = match message.content().await {
                Ok(content) => {
                    let rendered = render_content(message.as_ref(), &content, &policy);
                    AppEvent::ContentLoaded {
                        id,
                        text: to_text(&rendered, width),
                        attachments: rendered.attachments,
                    }
                }
                Err(e) => AppEvent::ContentFailed {
                    id,
                    error: format!("{:#}", e),
                },
            };
            if tx.send(event).is_err() {
                tracing::debug!("App closed before message content arrived");
            }
        });
    }

    /// Applies loaded content if its message is still the one in the reader.
    pub(crate) fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ContentLoaded {
                id,
                text,
                attachments,
            } => {
                let Some(reader) = self.state.reader.as_mut().filter(|r| r.summary.id == id)
                else {
                    tracing::debug!("Dropping content of closed message {}", id);
                    return;
                };
                reader.body = Some(text);
                reader.attachments = attachments;
                reader.attachment_cursor = 0;
            }
            AppEvent::ContentFailed { id, error } => {
                tracing::warn!("Failed to load message {}: {}", id, error);
                let Some(reader) = self.state.reader.as_mut().filter(|r| r.summary.id == id)
                else {
                    return;
                };
                reader.error = Some(error.clone());
                self.state.status.set_error(error);
            }
        }
    }
}
