use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::actor::RetryConfig;
use crate::constants::{
    API_TIMEOUT_SECS, DEFAULT_API_BASE, LIST_DEBOUNCE_MS, LIST_ITEM_HEIGHT, LOAD_RETRIES,
    NS_PREFIX, PREFETCH_MARGIN, SPLIT_RATIO_MAX, SPLIT_RATIO_MIN,
};
use crate::html::SanitizePolicy;
use crate::lazylist::LazyListOptions;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub sanitizer: SanitizerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root URL of the JSON mail API
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Message list virtualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConfig {
    /// Terminal rows per list entry
    #[serde(default = "default_item_height")]
    pub item_height: u32,
    #[serde(default = "default_prefetch")]
    pub prefetch_before: usize,
    #[serde(default = "default_prefetch")]
    pub prefetch_after: usize,
    /// Quiet period after scrolling before the list loads more
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Retries for a failed load (0 = fail on first error)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            item_height: default_item_height(),
            prefetch_before: default_prefetch(),
            prefetch_after: default_prefetch(),
            debounce_ms: default_debounce_ms(),
            max_retries: default_max_retries(),
        }
    }
}

impl ListConfig {
    pub fn options(&self) -> LazyListOptions {
        LazyListOptions {
            item_height: self.item_height.max(1),
            prefetch_window: (self.prefetch_before, self.prefetch_after),
            debounce: Duration::from_millis(self.debounce_ms),
            retry: RetryConfig {
                max_retries: self.max_retries,
                ..RetryConfig::default()
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Prefix for ids, names and classes in sanitized mail
    #[serde(default = "default_ns_prefix")]
    pub ns_prefix: String,
    /// Leave HTML comments where content was removed
    #[serde(default = "default_true")]
    pub annotate: bool,
    /// URL schemes allowed in addition to http, https, ftp and mailto
    #[serde(default)]
    pub extra_protocols: Vec<String>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            ns_prefix: default_ns_prefix(),
            annotate: true,
            extra_protocols: Vec::new(),
        }
    }
}

impl SanitizerConfig {
    pub fn policy(&self) -> SanitizePolicy {
        self.extra_protocols.iter().fold(
            SanitizePolicy::default()
                .with_ns_prefix(&self.ns_prefix)
                .with_annotations(self.annotate),
            |policy, protocol| policy.allow_protocol(protocol),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Width of the list pane as a percentage of the space right of the
    /// folder tree (30-70)
    #[serde(default = "default_split_ratio")]
    pub split_ratio: u16,
    #[serde(default)]
    pub theme: ThemeVariant,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            split_ratio: default_split_ratio(),
            theme: ThemeVariant::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeVariant {
    #[default]
    Dark,
    Light,
}

impl UiConfig {
    pub fn split_ratio(&self) -> u16 {
        self.split_ratio.clamp(SPLIT_RATIO_MIN, SPLIT_RATIO_MAX)
    }
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout_secs() -> u64 {
    API_TIMEOUT_SECS
}

fn default_item_height() -> u32 {
    LIST_ITEM_HEIGHT
}

fn default_prefetch() -> usize {
    PREFETCH_MARGIN
}

fn default_debounce_ms() -> u64 {
    LIST_DEBOUNCE_MS
}

fn default_max_retries() -> u32 {
    LOAD_RETRIES
}

fn default_ns_prefix() -> String {
    NS_PREFIX.to_string()
}

fn default_true() -> bool {
    true
}

fn default_split_ratio() -> u16 {
    40
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("mailfront");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads the config file, or defaults when there is none.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.ensure_dirs()?;

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [api]
            base_url = "https://mail.example.com/api"
            timeout_secs = 10

            [list]
            item_height = 3
            prefetch_before = 5
            prefetch_after = 50
            debounce_ms = 100
            max_retries = 0

            [sanitizer]
            ns_prefix = "mail_"
            annotate = false
            extra_protocols = ["cid", "tel"]

            [ui]
            split_ratio = 55
            theme = "light"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base_url, "https://mail.example.com/api");
        assert_eq!(config.api.timeout_secs, 10);

        let options = config.list.options();
        assert_eq!(options.item_height, 3);
        assert_eq!(options.prefetch_window, (5, 50));
        assert_eq!(options.debounce, Duration::from_millis(100));
        assert_eq!(options.retry.max_retries, 0);

        let policy = config.sanitizer.policy();
        assert_eq!(policy.ns_prefix, "mail_");
        assert!(!policy.annotate);
        assert!(policy.protocol_allow_list.contains("tel"));
        assert!(policy.protocol_allow_list.contains("https"));
        assert_eq!(config.ui.split_ratio(), 55);
        assert_eq!(config.ui.theme, ThemeVariant::Light);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[list]\nprefetch_after = 40\n").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:6245/api");
        assert_eq!(config.list.item_height, 2);
        assert_eq!(config.list.prefetch_before, 20);
        assert_eq!(config.list.prefetch_after, 40);
        assert_eq!(config.list.debounce_ms, 200);
        assert_eq!(config.sanitizer.ns_prefix, "x_");
        assert!(config.sanitizer.annotate);
        assert_eq!(config.ui.split_ratio, 40);
    }

    #[test]
    fn test_split_ratio_is_clamped() {
        let config: Config = toml::from_str("[ui]\nsplit_ratio = 95\n").unwrap();
        assert_eq!(config.ui.split_ratio(), 70);
    }

    #[test]
    fn test_roundtrip_through_toml() {
        let mut config = Config::default();
        config.sanitizer.extra_protocols.push("cid".to_string());
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sanitizer.extra_protocols, vec!["cid"]);
        assert_eq!(parsed.list.max_retries, config.list.max_retries);
    }
}
