//! Folders and their cached message listings

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use futures::future::BoxFuture;

use super::api::MessageApi;
use super::types::MessageSummary;
use crate::cache::{FULLY_CACHED, RangeCache};
use crate::lazylist::{DataSource, Window};

/// A mail folder. Owns the cache of its message listing, so cached rows
/// live exactly as long as the folder.
#[derive(Debug)]
pub struct Folder {
    pub name: String,
    /// Slash-separated path from the root, used to address the folder
    pub path: String,
    pub unread: u64,
    /// Number of messages
    pub msgnum: usize,
    pub subfolder: Vec<Arc<Folder>>,
    cache: Mutex<RangeCache<MessageSummary>>,
}

impl Folder {
    pub fn new(
        name: String,
        path: String,
        unread: u64,
        msgnum: usize,
        subfolder: Vec<Arc<Folder>>,
    ) -> Self {
        Self {
            name,
            path,
            unread,
            msgnum,
            subfolder,
            cache: Mutex::new(RangeCache::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, RangeCache<MessageSummary>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached summaries for `window`, if every one of them is cached.
    pub fn cached(&self, window: Window) -> Option<Vec<MessageSummary>> {
        if window.is_empty() {
            return Some(Vec::new());
        }
        match self.cache().get(window.start, window.end - 1) {
            Ok(items) => items.map(<[MessageSummary]>::to_vec),
            Err(e) => {
                tracing::warn!("Cache lookup failed for {}: {}", self.path, e);
                None
            }
        }
    }

    /// Summaries for `window`, fetching only what the cache lacks.
    ///
    /// The cache reports `(0, 0)` both when nothing is missing and when only
    /// index 0 is; if the lookup after the masked fetch still misses, the
    /// whole window is fetched.
    pub async fn fetch_range<A>(&self, api: &A, window: Window) -> Result<Vec<MessageSummary>>
    where
        A: MessageApi + ?Sized,
    {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let (start, end) = (window.start, window.end - 1);

        let missing = self.cache().mask(start, end)?;
        if missing != FULLY_CACHED {
            tracing::debug!(
                "{}: fetching {}..={} for {}..={}",
                self.path,
                missing.0,
                missing.1,
                start,
                end
            );
            let items = self.fetch(api, missing.0, missing.1).await?;
            self.cache().put(missing.0, missing.1, items)?;
        }

        if let Some(items) = self.cached(window) {
            return Ok(items);
        }

        tracing::debug!("{}: fetching whole range {}..={}", self.path, start, end);
        let items = self.fetch(api, start, end).await?;
        self.cache().put(start, end, items.clone())?;
        Ok(items)
    }

    async fn fetch<A>(&self, api: &A, start: usize, end: usize) -> Result<Vec<MessageSummary>>
    where
        A: MessageApi + ?Sized,
    {
        let items = api.messages(&self.path, start, end).await?;
        let expected = end - start + 1;
        if items.len() != expected {
            anyhow::bail!(
                "Expected {} messages for {}..={} of {}, got {}",
                expected,
                start,
                end,
                self.path,
                items.len()
            );
        }
        Ok(items)
    }
}

/// Feeds a folder's listing to the message list: cached rows synchronously,
/// anything else from the API.
pub struct FolderSource<A> {
    folder: Arc<Folder>,
    api: Arc<A>,
}

impl<A> FolderSource<A> {
    pub fn new(folder: Arc<Folder>, api: Arc<A>) -> Self {
        Self { folder, api }
    }

    pub fn folder(&self) -> &Arc<Folder> {
        &self.folder
    }
}

impl<A: MessageApi> DataSource<MessageSummary> for FolderSource<A> {
    fn fastload(&self, window: Window) -> Option<Vec<MessageSummary>> {
        self.folder.cached(window)
    }

    fn load(&self, window: Window) -> BoxFuture<'static, Result<Vec<MessageSummary>>> {
        let folder = Arc::clone(&self.folder);
        let api = Arc::clone(&self.api);
        Box::pin(async move { folder.fetch_range(api.as_ref(), window).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Serves summaries whose id is their index and records every request.
    #[derive(Default)]
    struct FakeApi {
        requests: Mutex<Vec<(String, usize, usize)>>,
    }

    impl FakeApi {
        fn requests(&self) -> Vec<(usize, usize)> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(_, start, end)| (*start, *end))
                .collect()
        }
    }

    fn summary(index: usize) -> MessageSummary {
        MessageSummary {
            id: index.to_string(),
            from: Default::default(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: format!("message {}", index),
            summary: String::new(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            unread: false,
            flagged: false,
            has_attachment: false,
        }
    }

    impl MessageApi for FakeApi {
        fn messages(
            &self,
            folder: &str,
            start: usize,
            end: usize,
        ) -> BoxFuture<'static, Result<Vec<MessageSummary>>> {
            self.requests
                .lock()
                .unwrap()
                .push((folder.to_string(), start, end));
            Box::pin(async move { Ok((start..=end).map(summary).collect()) })
        }
    }

    fn folder() -> Folder {
        Folder::new("INBOX".into(), "INBOX".into(), 0, 100, Vec::new())
    }

    fn ids(items: &[MessageSummary]) -> Vec<String> {
        items.iter().map(|m| m.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_fetch_only_missing_tail() {
        let api = FakeApi::default();
        let folder = folder();

        folder.fetch_range(&api, Window::new(0, 5)).await.unwrap();
        let items = folder.fetch_range(&api, Window::new(3, 8)).await.unwrap();

        assert_eq!(ids(&items), vec!["3", "4", "5", "6", "7"]);
        assert_eq!(api.requests(), vec![(0, 4), (5, 7)]);
    }

    #[tokio::test]
    async fn test_fully_cached_window_makes_no_request() {
        let api = FakeApi::default();
        let folder = folder();

        folder.fetch_range(&api, Window::new(10, 20)).await.unwrap();
        let items = folder.fetch_range(&api, Window::new(12, 15)).await.unwrap();

        assert_eq!(ids(&items), vec!["12", "13", "14"]);
        assert_eq!(api.requests(), vec![(10, 19)]);
        assert_eq!(folder.cached(Window::new(12, 15)).map(|v| v.len()), Some(3));
    }

    #[tokio::test]
    async fn test_inner_cached_entry_refetches_whole_window() {
        let api = FakeApi::default();
        let folder = folder();

        folder.fetch_range(&api, Window::new(3, 6)).await.unwrap();
        let items = folder.fetch_range(&api, Window::new(0, 10)).await.unwrap();

        assert_eq!(items.len(), 10);
        assert_eq!(items[0].id, "0");
        assert_eq!(api.requests(), vec![(3, 5), (0, 9)]);
    }

    #[tokio::test]
    async fn test_first_index_alone_falls_back_to_full_fetch() {
        let api = FakeApi::default();
        let folder = folder();

        let items = folder.fetch_range(&api, Window::new(0, 1)).await.unwrap();
        assert_eq!(ids(&items), vec!["0"]);
        assert_eq!(api.requests(), vec![(0, 0)]);

        folder.fetch_range(&api, Window::new(0, 1)).await.unwrap();
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_short_response_is_an_error() {
        struct Short;
        impl MessageApi for Short {
            fn messages(
                &self,
                _folder: &str,
                start: usize,
                _end: usize,
            ) -> BoxFuture<'static, Result<Vec<MessageSummary>>> {
                Box::pin(async move { Ok(vec![summary(start)]) })
            }
        }

        let result = folder().fetch_range(&Short, Window::new(0, 3)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_source_fastload_reads_cache_only() {
        let api = Arc::new(FakeApi::default());
        let source = FolderSource::new(Arc::new(folder()), Arc::clone(&api));

        assert!(source.fastload(Window::new(0, 3)).is_none());
        let loaded = source.load(Window::new(0, 3)).await.unwrap();
        assert_eq!(ids(&loaded), vec!["0", "1", "2"]);
        assert_eq!(
            source.fastload(Window::new(1, 3)).map(|v| ids(&v)),
            Some(vec!["1".to_string(), "2".to_string()])
        );
        assert_eq!(source.fastload(Window::new(5, 5)), Some(Vec::new()));
        assert_eq!(api.requests().len(), 1);
    }
}
