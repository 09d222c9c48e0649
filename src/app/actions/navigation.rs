//! Movement, scrolling and focus

use crate::app::state::{Focus, ListRow};

use super::super::App;

impl App {
    pub(crate) fn move_by(&mut self, delta: isize) {
        match self.state.focus {
            Focus::Folders => {
                let tree = &mut self.state.folders;
                tree.selected = step(tree.selected, delta, tree.rows.len());
            }
            Focus::List => {
                let len = self.list.as_ref().map_or(0, |list| list.len());
                self.state.list.selected = step(self.state.list.selected, delta, len);
                self.scroll_list_to_selection();
            }
            Focus::Reader => {
                if let Some(reader) = self.state.reader.as_mut() {
                    let lines = reader.body.as_ref().map_or(0, |body| body.lines().count());
                    let scroll = step(usize::from(reader.scroll), delta, lines + 1);
                    reader.scroll = u16::try_from(scroll).unwrap_or(u16::MAX);
                }
            }
        }
    }

    pub(crate) fn move_to_edge(&mut self, bottom: bool) {
        let delta = if bottom { isize::MAX } else { isize::MIN };
        self.move_by(delta);
    }

    /// Moves a screenful up (`-1`) or down (`1`).
    pub(crate) fn move_page(&mut self, direction: isize) {
        let rows = match self.state.focus {
            Focus::Folders => usize::from(self.panes.folders.height.saturating_sub(2)),
            Focus::List => {
                let item_height = self.list.as_ref().map_or(1, |list| list.item_height());
                (self.panes.list_viewport() / item_height) as usize
            }
            Focus::Reader => usize::from(self.panes.reader_height()),
        };
        self.move_by(direction * rows.max(1) as isize);
    }

    pub(crate) fn cycle_focus(&mut self, forward: bool) {
        let has_reader = self.state.reader.is_some();
        self.state.focus = match (self.state.focus, forward) {
            (Focus::Folders, true) => Focus::List,
            (Focus::List, true) if has_reader => Focus::Reader,
            (Focus::List, true) => Focus::Folders,
            (Focus::Reader, true) => Focus::Folders,
            (Focus::Folders, false) if has_reader => Focus::Reader,
            (Focus::Folders, false) => Focus::List,
            (Focus::List, false) => Focus::Folders,
            (Focus::Reader, false) => Focus::List,
        };
    }

    pub(crate) fn go_back(&mut self) {
        self.state.focus = match self.state.focus {
            Focus::Reader => Focus::List,
            Focus::List | Focus::Folders => Focus::Folders,
        };
    }

    /// Scrolls the list just enough to show the selected entry, then lets the
    /// list load whatever became visible.
    pub(crate) fn scroll_list_to_selection(&mut self) {
        let Some(list) = self.list.as_mut() else {
            return;
        };
        let viewport = self.panes.list_viewport();
        let scroll_top = scroll_to_show(
            self.state.list.scroll_top,
            list.item_top(self.state.list.selected),
            u64::from(list.item_height()),
            u64::from(viewport),
        );
        self.state.list.scroll_top = scroll_top;
        list.on_scroll(scroll_top, viewport);
        self.sync_list();
    }

    /// Copies the visible part of the list into the UI state.
    pub(crate) fn sync_list(&mut self) {
        let Some(list) = self.list.as_ref() else {
            return;
        };
        let visible = list.visible_range(self.state.list.scroll_top, self.panes.list_viewport());
        let view = &mut self.state.list;
        view.rows = (visible.start..visible.end)
            .map(|index| ListRow {
                index,
                summary: list.get(index).cloned(),
            })
            .collect();
        view.length = list.len();
        view.item_height = list.item_height();
        view.status = list.status();
    }
}

/// Moves `current` by `delta` within `[0, len)`.
fn step(current: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(len - 1)
}

/// Smallest change to `scroll_top` that shows the item at `item_top`.
fn scroll_to_show(scroll_top: u64, item_top: u64, item_height: u64, viewport: u64) -> u64 {
    if item_top < scroll_top {
        item_top
    } else if item_top + item_height > scroll_top + viewport {
        (item_top + item_height).saturating_sub(viewport)
    } else {
        scroll_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps() {
        assert_eq!(step(0, -1, 10), 0);
        assert_eq!(step(3, 1, 10), 4);
        assert_eq!(step(8, 5, 10), 9);
        assert_eq!(step(5, isize::MIN, 10), 0);
        assert_eq!(step(5, isize::MAX, 10), 9);
        assert_eq!(step(5, 1, 0), 0);
    }

    #[test]
    fn test_scroll_follows_selection() {
        // Already visible
        assert_eq!(scroll_to_show(10, 12, 2, 20), 10);
        // Above the viewport
        assert_eq!(scroll_to_show(10, 4, 2, 20), 4);
        // Below: bottom edge of the item aligns with the viewport
        assert_eq!(scroll_to_show(10, 30, 2, 20), 12);
    }
}
