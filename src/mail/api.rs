//! Client for the JSON mail API

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use super::folder::Folder;
use super::types::{Content, FolderEntry, MessageSummary};
use crate::config::ApiConfig;

/// Listing access used by the folder cache.
///
/// Indices are inclusive on both ends.
pub trait MessageApi: Send + Sync + 'static {
    fn messages(
        &self,
        folder: &str,
        start: usize,
        end: usize,
    ) -> BoxFuture<'static, Result<Vec<MessageSummary>>>;
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// Absolute URL of `endpoint` with form-encoded query parameters.
    pub fn url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Url> {
        let base = format!("{}/{}", self.base_url, endpoint);
        if params.is_empty() {
            return Url::parse(&base).with_context(|| format!("Invalid API URL: {}", base));
        }
        Url::parse_with_params(&base, params).with_context(|| format!("Invalid API URL: {}", base))
    }

    /// GETs `endpoint` and decodes the JSON response.
    ///
    /// Non-2xx responses are errors carrying the response body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(endpoint, params)?;
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}) on {}: {}", status, endpoint, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse response from {}", endpoint))
    }

    /// Fetches and decodes the folder tree.
    pub async fn folders(&self) -> Result<Vec<Arc<Folder>>> {
        let entries: Vec<FolderEntry> = self
            .get("folders", &[])
            .await
            .context("Unexpected API return value")?;
        Ok(build_folders(entries, ""))
    }

    /// Summaries for the inclusive index range `start..=end` of `folder`.
    pub async fn messages(
        &self,
        folder: &str,
        start: usize,
        end: usize,
    ) -> Result<Vec<MessageSummary>> {
        self.get(
            "messages",
            &[
                ("folder", folder.to_string()),
                ("start", start.to_string()),
                ("end", end.to_string()),
            ],
        )
        .await
    }

    pub async fn content(&self, folder: &str, id: &str) -> Result<Content> {
        self.get(
            "content",
            &[("folder", folder.to_string()), ("id", id.to_string())],
        )
        .await
    }

    /// Where the inline part referenced as `cid:<cid>` can be fetched.
    pub fn cid_url(&self, folder: &str, id: &str, cid: &str) -> Result<String> {
        let url = self.url(
            "cid",
            &[
                ("folder", folder.to_string()),
                ("id", id.to_string()),
                ("cid", cid.to_string()),
            ],
        )?;
        Ok(url.into())
    }

    pub fn attachment_url(&self, folder: &str, id: &str, name: &str) -> Result<String> {
        let url = self.url(
            "attachment",
            &[
                ("folder", folder.to_string()),
                ("id", id.to_string()),
                ("name", name.to_string()),
            ],
        )?;
        Ok(url.into())
    }
}

impl MessageApi for ApiClient {
    fn messages(
        &self,
        folder: &str,
        start: usize,
        end: usize,
    ) -> BoxFuture<'static, Result<Vec<MessageSummary>>> {
        let api = self.clone();
        let folder = folder.to_string();
        Box::pin(async move { ApiClient::messages(&api, &folder, start, end).await })
    }
}

/// Resolves folder paths: each folder's path is its parent's path plus its
/// name, and children of `a` get `a/` as parent path.
pub fn build_folders(entries: Vec<FolderEntry>, parent_path: &str) -> Vec<Arc<Folder>> {
    entries
        .into_iter()
        .map(|entry| {
            let path = format!("{}{}", parent_path, entry.name);
            let subfolder = build_folders(entry.subfolder, &format!("{}/", path));
            Arc::new(Folder::new(
                entry.name,
                path,
                entry.unread,
                entry.messages,
                subfolder,
            ))
        })
        .collect()
}

/// API client plus the folder tree, fetched once per client.
pub struct Store {
    api: ApiClient,
    folders: OnceCell<Vec<Arc<Folder>>>,
}

impl Store {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            folders: OnceCell::new(),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The folder tree. Fetched on first call; a failed fetch is retried on
    /// the next call.
    pub async fn folders(&self) -> Result<&[Arc<Folder>]> {
        let folders = self
            .folders
            .get_or_try_init(|| self.api.folders())
            .await?;
        Ok(folders.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:6245/api/", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_folder_paths() {
        let entries: Vec<FolderEntry> = serde_json::from_str(
            r#"[
                {"name": "INBOX", "unread": 2, "messages": 10, "subfolder": [
                    {"name": "Lists", "unread": 0, "messages": 4, "subfolder": [
                        {"name": "rust", "unread": 1, "messages": 1, "subfolder": []}
                    ]}
                ]},
                {"name": "Sent", "unread": 0, "messages": 7, "subfolder": []}
            ]"#,
        )
        .unwrap();

        let folders = build_folders(entries, "");
        assert_eq!(folders.len(), 2);
        assert_eq!(folders[0].path, "INBOX");
        assert_eq!(folders[0].msgnum, 10);
        assert_eq!(folders[0].subfolder[0].path, "INBOX/Lists");
        assert_eq!(folders[0].subfolder[0].subfolder[0].path, "INBOX/Lists/rust");
        assert_eq!(folders[1].path, "Sent");
        assert!(folders[1].subfolder.is_empty());
    }

    #[test]
    fn test_urls_are_form_encoded() {
        let api = client();
        assert_eq!(
            api.url("folders", &[]).unwrap().as_str(),
            "http://localhost:6245/api/folders"
        );
        assert_eq!(
            api.cid_url("INBOX/a b", "7", "img@1").unwrap(),
            "http://localhost:6245/api/cid?folder=INBOX%2Fa+b&id=7&cid=img%401"
        );
        assert_eq!(
            api.attachment_url("INBOX", "7", "r&d.pdf").unwrap(),
            "http://localhost:6245/api/attachment?folder=INBOX&id=7&name=r%26d.pdf"
        );
    }

    #[test]
    fn test_message_range_query() {
        let url = client()
            .url(
                "messages",
                &[
                    ("folder", "INBOX".to_string()),
                    ("start", "0".to_string()),
                    ("end", "19".to_string()),
                ],
            )
            .unwrap();
        assert_eq!(url.query(), Some("folder=INBOX&start=0&end=19"));
    }
}
