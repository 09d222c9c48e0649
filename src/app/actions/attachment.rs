//! Attachment actions in the reader

use crate::mail::Message;

use super::super::App;

impl App {
    /// Opens the highlighted attachment with the system viewer and moves the
    /// highlight on, so repeated presses walk through all attachments.
    pub(crate) fn open_attachment(&mut self) {
        let Some(reader) = self.state.reader.as_mut() else {
            return;
        };
        let Some(name) = reader.attachments.get(reader.attachment_cursor).cloned() else {
            self.state.status.set_message("No attachments");
            return;
        };
        reader.attachment_cursor = (reader.attachment_cursor + 1) % reader.attachments.len();

        let Some(message) = self.message.as_ref() else {
            return;
        };
        match message.open_attachment(&name) {
            Ok(()) => self.state.status.set_message(format!("Opened {}", name)),
            Err(e) => {
                tracing::warn!("Failed to open attachment {}: {:#}", name, e);
                self.state.status.set_error(format!("{:#}", e));
            }
        }
    }
}
