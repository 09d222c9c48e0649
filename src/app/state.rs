use std::collections::HashSet;
use std::sync::Arc;

use crate::lazylist::ListStatus;
use crate::mail::{Folder, MessageSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Folders,
    List,
    Reader,
}

/// One visible line of the folder tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub unread: u64,
    pub msgnum: usize,
    pub has_children: bool,
    pub expanded: bool,
}

#[derive(Debug, Default)]
pub struct FolderTreeState {
    pub rows: Vec<FolderRow>,
    pub selected: usize,
    /// Paths of collapsed folders; everything else is expanded
    pub collapsed: HashSet<String>,
    /// Path of the folder shown in the list pane
    pub current: Option<String>,
}

impl FolderTreeState {
    pub fn rebuild(&mut self, folders: &[Arc<Folder>]) {
        let selected_path = self.rows.get(self.selected).map(|r| r.path.clone());
        self.rows = flatten(folders, &self.collapsed);
        self.selected = selected_path
            .and_then(|path| self.rows.iter().position(|r| r.path == path))
            .unwrap_or(0);
    }

    pub fn selected_row(&self) -> Option<&FolderRow> {
        self.rows.get(self.selected)
    }

    pub fn toggle(&mut self, path: &str) {
        if !self.collapsed.remove(path) {
            self.collapsed.insert(path.to_string());
        }
    }
}

/// Depth-first rows for the folder tree, skipping children of collapsed folders.
pub fn flatten(folders: &[Arc<Folder>], collapsed: &HashSet<String>) -> Vec<FolderRow> {
    fn walk(
        folders: &[Arc<Folder>],
        depth: usize,
        collapsed: &HashSet<String>,
        rows: &mut Vec<FolderRow>,
    ) {
        for folder in folders {
            let expanded = !collapsed.contains(&folder.path);
            rows.push(FolderRow {
                path: folder.path.clone(),
                name: folder.name.clone(),
                depth,
                unread: folder.unread,
                msgnum: folder.msgnum,
                has_children: !folder.subfolder.is_empty(),
                expanded,
            });
            if expanded {
                walk(&folder.subfolder, depth + 1, collapsed, rows);
            }
        }
    }

    let mut rows = Vec::new();
    walk(folders, 0, collapsed, &mut rows);
    rows
}

/// Finds a folder anywhere in the tree by path.
pub fn find_folder(folders: &[Arc<Folder>], path: &str) -> Option<Arc<Folder>> {
    folders.iter().find_map(|folder| {
        if folder.path == path {
            Some(Arc::clone(folder))
        } else {
            find_folder(&folder.subfolder, path)
        }
    })
}

/// A list entry in the visible range. `summary` is `None` until loaded.
#[derive(Debug, Clone)]
pub struct ListRow {
    pub index: usize,
    pub summary: Option<MessageSummary>,
}

#[derive(Debug, Default)]
pub struct MessageListState {
    pub rows: Vec<ListRow>,
    pub selected: usize,
    /// Scroll offset in terminal rows
    pub scroll_top: u64,
    pub length: usize,
    pub item_height: u32,
    pub status: ListStatus,
}

#[derive(Debug)]
pub struct ReaderState {
    pub summary: MessageSummary,
    /// Wrapped body text, `None` while loading
    pub body: Option<String>,
    pub attachments: Vec<String>,
    pub scroll: u16,
    pub attachment_cursor: usize,
    pub error: Option<String>,
}

impl ReaderState {
    pub fn loading(summary: MessageSummary) -> Self {
        Self {
            summary,
            body: None,
            attachments: Vec::new(),
            scroll: 0,
            attachment_cursor: 0,
            error: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct StatusState {
    pub message: String,
    pub error: Option<String>,
}

impl StatusState {
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.error = None;
    }

    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }
}

/// Everything the renderer reads
#[derive(Debug, Default)]
pub struct AppState {
    pub focus: Focus,
    pub folders: FolderTreeState,
    pub list: MessageListState,
    pub reader: Option<ReaderState>,
    pub status: StatusState,
    /// List pane width in percent of the space right of the folder tree
    pub split_ratio: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn folder(name: &str, path: &str, subfolder: Vec<Arc<Folder>>) -> Arc<Folder> {
        Arc::new(Folder::new(
            name.to_string(),
            path.to_string(),
            0,
            3,
            subfolder,
        ))
    }

    fn tree() -> Vec<Arc<Folder>> {
        vec![
            folder(
                "INBOX",
                "INBOX",
                vec![
                    folder("lists", "INBOX/lists", vec![]),
                    folder("work", "INBOX/work", vec![]),
                ],
            ),
            folder("Sent", "Sent", vec![]),
        ]
    }

    #[test]
    fn test_flatten_expands_by_default() {
        let rows = flatten(&tree(), &HashSet::new());
        let paths: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["INBOX", "INBOX/lists", "INBOX/work", "Sent"]);
        assert_eq!(rows[1].depth, 1);
        assert!(rows[0].has_children && rows[0].expanded);
    }

    #[test]
    fn test_toggle_hides_children_and_keeps_selection() {
        let folders = tree();
        let mut state = FolderTreeState::default();
        state.rebuild(&folders);
        state.selected = 3;

        state.toggle("INBOX");
        state.rebuild(&folders);
        assert_eq!(state.rows.len(), 2);
        assert_eq!(state.selected_row().map(|r| r.path.as_str()), Some("Sent"));
        assert!(!state.rows[0].expanded);

        state.toggle("INBOX");
        state.rebuild(&folders);
        assert_eq!(state.rows.len(), 4);
    }

    #[test]
    fn test_find_folder_searches_subfolders() {
        let folders = tree();
        assert_eq!(
            find_folder(&folders, "INBOX/work").map(|f| f.name.clone()),
            Some("work".to_string())
        );
        assert!(find_folder(&folders, "Trash").is_none());
    }
}
