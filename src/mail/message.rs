//! Messages that can be displayed: fetched from the server or held locally

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future::BoxFuture;

use super::api::ApiClient;
use super::types::{Content, MessageSummary};

pub trait Message: Send + Sync {
    fn summary(&self) -> &MessageSummary;

    fn content(&self) -> BoxFuture<'_, Result<Content>>;

    /// Fetchable URL for an inline part referenced as `cid:<cid>`.
    fn cid_url(&self, cid: &str) -> Option<String>;

    fn attachment_url(&self, name: &str) -> Option<String>;

    /// Opens the named attachment with the system's default handler.
    fn open_attachment(&self, name: &str) -> Result<()> {
        let url = self
            .attachment_url(name)
            .with_context(|| format!("Attachment {} cannot be opened from here", name))?;
        tracing::debug!("Opening attachment {} at {}", name, url);
        open::that(&url).with_context(|| format!("Failed to open {}", url))
    }
}

/// A message stored on the server, addressed by folder path and id.
pub struct RemoteMessage {
    api: ApiClient,
    folder: String,
    summary: MessageSummary,
}

impl RemoteMessage {
    pub fn new(api: ApiClient, folder: &str, summary: MessageSummary) -> Self {
        Self {
            api,
            folder: folder.to_string(),
            summary,
        }
    }
}

impl Message for RemoteMessage {
    fn summary(&self) -> &MessageSummary {
        &self.summary
    }

    fn content(&self) -> BoxFuture<'_, Result<Content>> {
        Box::pin(async move {
            self.api
                .content(&self.folder, &self.summary.id)
                .await
                .with_context(|| format!("Failed to load message {}", self.summary.id))
        })
    }

    fn cid_url(&self, cid: &str) -> Option<String> {
        match self.api.cid_url(&self.folder, &self.summary.id, cid) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Cannot resolve cid:{}: {:#}", cid, e);
                None
            }
        }
    }

    fn attachment_url(&self, name: &str) -> Option<String> {
        match self.api.attachment_url(&self.folder, &self.summary.id, name) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!("Cannot resolve attachment {}: {:#}", name, e);
                None
            }
        }
    }
}

/// A message that exists only locally, such as a file being previewed.
/// Has no server-side parts, so `cid:` and attachment URLs never resolve.
pub struct DraftMessage {
    summary: MessageSummary,
    content: Content,
}

impl DraftMessage {
    pub fn new(summary: MessageSummary, content: Content) -> Self {
        Self { summary, content }
    }

    /// A draft with the given body and an otherwise empty summary.
    pub fn with_body(content_type: &str, body: String) -> Self {
        let summary = MessageSummary {
            id: "draft".to_string(),
            from: Default::default(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            summary: String::new(),
            date: Utc::now(),
            unread: false,
            flagged: false,
            has_attachment: false,
        };
        Self::new(
            summary,
            Content {
                content_type: content_type.to_string(),
                content: body,
                attachment: Vec::new(),
            },
        )
    }
}

impl Message for DraftMessage {
    fn summary(&self) -> &MessageSummary {
        &self.summary
    }

    fn content(&self) -> BoxFuture<'_, Result<Content>> {
        let content = self.content.clone();
        Box::pin(async move { Ok(content) })
    }

    fn cid_url(&self, _cid: &str) -> Option<String> {
        None
    }

    fn attachment_url(&self, _name: &str) -> Option<String> {
        None
    }
}
