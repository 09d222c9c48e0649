//! Folder tree actions

use std::sync::Arc;

use crate::app::state::{Focus, find_folder};
use crate::lazylist::LazyList;
use crate::mail::FolderSource;

use super::super::App;

impl App {
    pub(crate) fn open_selected_folder(&mut self) {
        let Some(path) = self.state.folders.selected_row().map(|row| row.path.clone()) else {
            return;
        };
        self.open_folder(&path);
        self.state.focus = Focus::List;
    }

    /// Points the message list at `path`. Results still loading for the
    /// previous folder are dropped.
    pub(crate) fn open_folder(&mut self, path: &str) {
        let Some(folder) = find_folder(&self.folders, path) else {
            tracing::warn!("Folder {} not found", path);
            return;
        };
        tracing::info!("Opening folder {} ({} messages)", path, folder.msgnum);

        let (length, unread) = (folder.msgnum, folder.unread);
        let source = Arc::new(FolderSource::new(folder, Arc::clone(&self.api)));
        let viewport = self.panes.list_viewport();
        match self.list.as_mut() {
            Some(list) => list.set_source(source, length, viewport),
            None => {
                let mut list = LazyList::new(source, length, self.config.list.options());
                list.mount(viewport);
                self.list = Some(list);
            }
        }

        self.state.folders.current = Some(path.to_string());
        self.state.list.selected = 0;
        self.state.list.scroll_top = 0;
        self.sync_list();
        self.state
            .status
            .set_message(format!("{}: {} messages, {} unread", path, length, unread));
    }

    pub(crate) fn toggle_selected_folder(&mut self) {
        let Some(row) = self.state.folders.selected_row() else {
            return;
        };
        if !row.has_children {
            return;
        }
        let path = row.path.clone();
        self.state.folders.toggle(&path);
        self.state.folders.rebuild(&self.folders);
    }
}
