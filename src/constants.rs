//! Application-wide constants for tuning and configuration
//!
//! Centralizes magic numbers to make them discoverable and configurable.

/// Quiet period after the last scroll before the list issues a prefetch.
pub const LIST_DEBOUNCE_MS: u64 = 200;

/// Items fetched beyond each edge of the viewport.
pub const PREFETCH_MARGIN: usize = 20;

/// Terminal rows per message list entry (headline + subject line).
pub const LIST_ITEM_HEIGHT: u32 = 2;

/// Prefix applied to ids, names and classes of sanitized markup.
pub const NS_PREFIX: &str = "x_";

/// Default root of the JSON mail API.
pub const DEFAULT_API_BASE: &str = "http://localhost:6245/api";

/// Request timeout for API calls in seconds.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Retries for a failed list load after the first attempt.
pub const LOAD_RETRIES: u32 = 2;

/// Delay before the first load retry in milliseconds.
pub const LOAD_RETRY_INITIAL_MS: u64 = 500;

/// Cap for the doubled retry delay in milliseconds.
pub const LOAD_RETRY_MAX_MS: u64 = 5_000;

/// Wrap width used when converting rendered HTML to terminal text.
pub const READER_WRAP_WIDTH: usize = 100;

// === UI Constants ===

/// Minimum split ratio percentage for the list pane.
pub const SPLIT_RATIO_MIN: u16 = 30;

/// Maximum split ratio percentage for the list pane.
pub const SPLIT_RATIO_MAX: u16 = 70;

/// Fixed width of the folder sidebar pane in columns.
pub const FOLDER_SIDEBAR_WIDTH: u16 = 24;

/// Input poll interval while idle, in milliseconds.
pub const IDLE_POLL_MS: u64 = 150;

/// Input poll interval while loads are pending, in milliseconds.
pub const BUSY_POLL_MS: u64 = 50;
