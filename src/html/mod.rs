//! Turning untrusted mail content into markup that is safe to embed.

pub mod css;
pub mod dom;
pub mod linkify;
pub mod sanitize;

pub use linkify::{encode_uri, html_escape, linkify};
pub use sanitize::{KeepUrls, SanitizePolicy, Sanitizer, UrlRewriter};
