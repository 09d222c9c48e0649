//! Virtualized list controller.
//!
//! Only a window of items around the viewport is held in memory. Scrolling
//! takes a fast path (synchronous `fastload` of exactly the visible rows,
//! usually from a cache) and, once scrolling pauses for the debounce period,
//! a slow path that loads the visible rows plus a prefetch margin on each
//! side. Slow loads run as detached tasks and report back over a channel;
//! the owner drains it with [`LazyList::poll_loaded`] or
//! [`LazyList::next_loaded`].
//!
//! Every commit carries a stamp from one counter. A load result older than
//! the last commit is discarded, so a slow response can never overwrite a
//! newer view.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::{RetryConfig, with_retry};
use crate::constants::{LIST_DEBOUNCE_MS, LIST_ITEM_HEIGHT, PREFETCH_MARGIN};

/// Half-open index range `[start, end)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: Window) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Where a [`LazyList`] gets its items from.
pub trait DataSource<T>: Send + Sync + 'static {
    /// Returns exactly the requested items if they are available without
    /// waiting, `None` otherwise.
    fn fastload(&self, _window: Window) -> Option<Vec<T>> {
        None
    }

    /// Loads the requested items. May take arbitrarily long.
    fn load(&self, window: Window) -> BoxFuture<'static, anyhow::Result<Vec<T>>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LazyListOptions {
    /// Rows per item
    pub item_height: u32,
    /// Items prefetched before and after the visible range
    pub prefetch_window: (usize, usize),
    /// Quiet period after the last scroll before a slow load starts
    pub debounce: Duration,
    pub retry: RetryConfig,
}

impl Default for LazyListOptions {
    fn default() -> Self {
        Self {
            item_height: LIST_ITEM_HEIGHT,
            prefetch_window: (PREFETCH_MARGIN, PREFETCH_MARGIN),
            debounce: Duration::from_millis(LIST_DEBOUNCE_MS),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListStatus {
    #[default]
    Idle,
    Loading,
    /// The most recent slow load failed; the previous items are still shown
    Failed(String),
}

struct Loaded<T> {
    stamp: u64,
    window: Window,
    result: Result<Vec<T>, String>,
}

/// Everything a detached load task needs.
struct Fetcher<S, T> {
    source: Arc<S>,
    stamps: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
    retry: RetryConfig,
    tx: mpsc::UnboundedSender<Loaded<T>>,
}

impl<S, T> Clone for Fetcher<S, T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            stamps: Arc::clone(&self.stamps),
            in_flight: Arc::clone(&self.in_flight),
            retry: self.retry.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<S, T> Fetcher<S, T>
where
    S: DataSource<T>,
    T: Send + 'static,
{
    fn next_stamp(&self) -> u64 {
        self.stamps.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn spawn(&self, window: Window) {
        let stamp = self.next_stamp();
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let fetcher = self.clone();

        tokio::spawn(async move {
            tracing::debug!(
                "Loading items {}..{} (stamp {})",
                window.start,
                window.end,
                stamp
            );
            let result = with_retry(&fetcher.retry, || fetcher.source.load(window))
                .await
                .map_err(|e| format!("{:#}", e));
            if fetcher
                .tx
                .send(Loaded {
                    stamp,
                    window,
                    result,
                })
                .is_err()
            {
                tracing::debug!("List dropped before load {} finished", stamp);
            }
        });
    }
}

pub struct LazyList<S, T> {
    fetcher: Fetcher<S, T>,
    options: LazyListOptions,
    length: usize,
    window: Window,
    items: Vec<T>,
    committed: u64,
    failure: Option<String>,
    timer: Option<JoinHandle<()>>,
    results: mpsc::UnboundedReceiver<Loaded<T>>,
}

impl<S, T> LazyList<S, T>
where
    S: DataSource<T>,
    T: Send + 'static,
{
    /// Creates an empty list. Nothing is loaded until [`LazyList::mount`].
    ///
    /// Loading spawns Tokio tasks, so the list must be driven from within a
    /// runtime.
    pub fn new(source: Arc<S>, length: usize, options: LazyListOptions) -> Self {
        let (tx, results) = mpsc::unbounded_channel();
        Self {
            fetcher: Fetcher {
                source,
                stamps: Arc::new(AtomicU64::new(0)),
                in_flight: Arc::new(AtomicUsize::new(0)),
                retry: options.retry.clone(),
                tx,
            },
            options,
            length,
            window: Window::default(),
            items: Vec::new(),
            committed: 0,
            failure: None,
            timer: None,
            results,
        }
    }

    /// Loads the first screen (plus prefetch) for a viewport `viewport` rows tall.
    pub fn mount(&mut self, viewport: u32) {
        self.cancel_timer();
        let rows = viewport / self.item_height();
        let visible = Window::new(0, self.length.min(rows as usize + 1));
        self.load_now(visible);
    }

    /// Changes the item count and reloads from the top.
    pub fn set_length(&mut self, length: usize, viewport: u32) {
        self.length = length;
        self.mount(viewport);
    }

    /// Switches to another source. Results still in flight from the old
    /// source are discarded.
    pub fn set_source(&mut self, source: Arc<S>, length: usize, viewport: u32) {
        self.cancel_timer();
        self.fetcher.source = source;
        self.committed = self.fetcher.stamps.load(Ordering::SeqCst);
        self.window = Window::default();
        self.items.clear();
        self.failure = None;
        self.set_length(length, viewport);
    }

    /// Indices visible at scroll offset `scroll_top` (in rows) for a viewport
    /// `viewport` rows tall, clamped to the list length.
    pub fn visible_range(&self, scroll_top: u64, viewport: u32) -> Window {
        let height = u64::from(self.item_height());
        let start = (scroll_top / height) as usize;
        let end = ((scroll_top + u64::from(viewport)) / height) as usize + 1;
        Window::new(start.min(self.length), end.min(self.length))
    }

    pub fn on_scroll(&mut self, scroll_top: u64, viewport: u32) {
        let visible = self.visible_range(scroll_top, viewport);
        self.adjust(visible);
    }

    fn adjust(&mut self, visible: Window) {
        self.cancel_timer();

        if !self.window.contains(visible)
            && let Some(items) = self.fetcher.source.fastload(visible)
        {
            let stamp = self.fetcher.next_stamp();
            self.commit(stamp, visible, items);
        }

        // Plenty prefetched on both sides: nothing to do yet.
        let (before, after) = self.options.prefetch_window;
        let half = Window::new(
            visible.start.saturating_sub(before >> 1),
            (visible.end + (after >> 1)).min(self.length),
        );
        if self.window.contains(half) {
            return;
        }

        let prefetch = self.prefetch_range(visible);
        let fetcher = self.fetcher.clone();
        let debounce = self.options.debounce;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            fetcher.spawn(prefetch);
        }));
    }

    fn prefetch_range(&self, visible: Window) -> Window {
        let (before, after) = self.options.prefetch_window;
        Window::new(
            visible.start.saturating_sub(before),
            (visible.end + after).min(self.length),
        )
    }

    fn load_now(&mut self, visible: Window) {
        let prefetch = self.prefetch_range(visible);
        if prefetch.is_empty() {
            let stamp = self.fetcher.next_stamp();
            self.commit(stamp, prefetch, Vec::new());
            return;
        }
        self.fetcher.spawn(prefetch);
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    fn commit(&mut self, stamp: u64, window: Window, items: Vec<T>) {
        self.committed = stamp;
        self.window = window;
        self.items = items;
        self.failure = None;
    }

    fn apply(&mut self, loaded: Loaded<T>) -> bool {
        self.fetcher.in_flight.fetch_sub(1, Ordering::SeqCst);
        if loaded.stamp <= self.committed {
            tracing::debug!(
                "Discarding stale load {} (committed {})",
                loaded.stamp,
                self.committed
            );
            return false;
        }
        match loaded.result {
            Ok(items) => self.commit(loaded.stamp, loaded.window, items),
            Err(e) => {
                tracing::warn!(
                    "Failed to load items {}..{}: {}",
                    loaded.window.start,
                    loaded.window.end,
                    e
                );
                self.failure = Some(e);
            }
        }
        true
    }

    /// Applies finished loads without waiting. Returns whether anything changed.
    pub fn poll_loaded(&mut self) -> bool {
        let mut changed = false;
        while let Ok(loaded) = self.results.try_recv() {
            changed |= self.apply(loaded);
        }
        changed
    }

    /// Waits for the next finished load and applies it.
    pub async fn next_loaded(&mut self) -> bool {
        match self.results.recv().await {
            Some(loaded) => self.apply(loaded),
            None => false,
        }
    }

    /// Calls `f` with the item at `index` if it is loaded.
    pub fn select<F>(&self, index: usize, f: F) -> bool
    where
        F: FnOnce(&T, usize),
    {
        if !self.window.contains_index(index) {
            return false;
        }
        match self.items.get(index - self.window.start) {
            Some(item) => {
                f(item, index);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if !self.window.contains_index(index) {
            return None;
        }
        self.items.get(index - self.window.start)
    }

    /// Loaded items with their absolute indices.
    pub fn rendered(&self) -> impl Iterator<Item = (usize, &T)> {
        let start = self.window.start;
        self.items
            .iter()
            .enumerate()
            .map(move |(i, item)| (start + i, item))
    }

    /// Row offset of item `index` from the top of the list.
    pub fn item_top(&self, index: usize) -> u64 {
        index as u64 * u64::from(self.item_height())
    }

    /// Total rows for all items, loaded or not.
    pub fn content_height(&self) -> u64 {
        self.length as u64 * u64::from(self.item_height())
    }

    pub fn item_height(&self) -> u32 {
        self.options.item_height.max(1)
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn is_loading(&self) -> bool {
        self.fetcher.in_flight.load(Ordering::SeqCst) > 0
            || self.timer.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn status(&self) -> ListStatus {
        if self.is_loading() {
            ListStatus::Loading
        } else if let Some(ref e) = self.failure {
            ListStatus::Failed(e.clone())
        } else {
            ListStatus::Idle
        }
    }
}

impl<S, T> Drop for LazyList<S, T> {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
