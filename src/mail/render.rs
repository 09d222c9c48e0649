//! Message body rendering

use super::message::Message;
use super::types::Content;
use crate::html::{SanitizePolicy, Sanitizer, linkify};

/// A body ready to embed, plus what the reader shows around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedContent {
    pub html: String,
    /// Came from `text/plain`; whitespace is significant
    pub plain: bool,
    pub attachments: Vec<String>,
}

/// Renders `content` of `message` to safe markup.
///
/// HTML is sanitized with `cid:` URLs allowed and mapped to the message's
/// inline parts; anything else is treated as plain text and linkified.
pub fn render_content(
    message: &dyn Message,
    content: &Content,
    policy: &SanitizePolicy,
) -> RenderedContent {
    let html = if content.is_html() {
        let policy = policy.clone().allow_protocol("cid");
        let sanitizer = Sanitizer::with_policy(policy, |url: String| {
            match url.strip_prefix("cid:") {
                Some(cid) => message.cid_url(cid),
                None => Some(url),
            }
        });
        sanitizer.sanitize(&content.content)
    } else {
        linkify(&content.content)
    };

    RenderedContent {
        html,
        plain: !content.is_html(),
        attachments: content.attachment.clone(),
    }
}

/// Converts rendered markup to wrapped terminal text.
pub fn to_text(rendered: &RenderedContent, width: usize) -> String {
    let html = if rendered.plain {
        format!("<pre>{}</pre>", rendered.html)
    } else {
        rendered.html.clone()
    };
    match html2text::config::plain().string_from_read(html.as_bytes(), width.max(1)) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("Failed to convert message to text: {}", e);
            rendered.html.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::message::DraftMessage;
    use crate::mail::types::MessageSummary;
    use anyhow::Result;
    use futures::future::BoxFuture;

    /// Resolves every cid to a fixed host.
    struct WithParts(DraftMessage);

    impl Message for WithParts {
        fn summary(&self) -> &MessageSummary {
            self.0.summary()
        }

        fn content(&self) -> BoxFuture<'_, Result<Content>> {
            self.0.content()
        }

        fn cid_url(&self, cid: &str) -> Option<String> {
            Some(format!("http://parts.local/{}", cid))
        }

        fn attachment_url(&self, _name: &str) -> Option<String> {
            None
        }
    }

    fn content(content_type: &str, body: &str) -> Content {
        Content {
            content_type: content_type.to_string(),
            content: body.to_string(),
            attachment: vec!["report.pdf".to_string()],
        }
    }

    fn policy() -> SanitizePolicy {
        SanitizePolicy::default().with_annotations(false)
    }

    #[test]
    fn test_html_cid_images_are_remapped() {
        let message = WithParts(DraftMessage::with_body("text/html", String::new()));
        let rendered = render_content(
            &message,
            &content("text/html", r#"<img src="cid:logo"><script>x()</script>"#),
            &policy(),
        );

        assert_eq!(rendered.html, r#"<img src="http://parts.local/logo">"#);
        assert!(!rendered.plain);
        assert_eq!(rendered.attachments, vec!["report.pdf"]);
    }

    #[test]
    fn test_unresolvable_cid_is_dropped() {
        let message = DraftMessage::with_body("text/html", String::new());
        let rendered = render_content(
            &message,
            &content("text/html", r#"<img src="cid:logo" alt="logo">"#),
            &policy(),
        );
        assert_eq!(rendered.html, r#"<img src="" alt="logo">"#);
    }

    #[test]
    fn test_plain_text_is_linkified() {
        let message = DraftMessage::with_body("text/plain", String::new());
        let rendered = render_content(
            &message,
            &content("text/plain", "docs: https://docs.rs <3"),
            &policy(),
        );
        assert_eq!(
            rendered.html,
            r#"docs: <a target="_blank" href="https://docs.rs">https://docs.rs</a> &lt;3"#
        );
        assert!(rendered.plain);
    }

    #[test]
    fn test_to_text_keeps_plain_line_breaks() {
        let rendered = RenderedContent {
            html: "first line\nsecond line".to_string(),
            plain: true,
            attachments: Vec::new(),
        };
        let text = to_text(&rendered, 80);
        assert!(text.contains("first line\nsecond line"));
    }
}
