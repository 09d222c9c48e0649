use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl Address {
    /// Short form for list rows: the name, else the address.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else if !self.address.is_empty() {
            &self.address
        } else {
            "(no sender)"
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name.is_empty(), self.address.is_empty()) {
            (false, false) => write!(f, "{} <{}>", self.name, self.address),
            (true, _) => f.write_str(&self.address),
            (false, true) => f.write_str(&self.name),
        }
    }
}

/// Joins addresses for a header line.
pub fn join_addresses(addresses: &[Address]) -> String {
    addresses
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// One row of a folder listing, as returned by `GET messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSummary {
    pub id: String,
    #[serde(default)]
    pub from: Address,
    #[serde(default)]
    pub to: Vec<Address>,
    #[serde(default)]
    pub cc: Vec<Address>,
    #[serde(default)]
    pub bcc: Vec<Address>,
    #[serde(default)]
    pub subject: String,
    /// Leading text of the body
    #[serde(default)]
    pub summary: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub has_attachment: bool,
}

impl MessageSummary {
    pub fn display_subject(&self) -> &str {
        if self.subject.is_empty() {
            "(no subject)"
        } else {
            &self.subject
        }
    }
}

/// A message body, as returned by `GET content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub content_type: String,
    pub content: String,
    /// Attachment names
    #[serde(default)]
    pub attachment: Vec<String>,
}

impl Content {
    pub fn is_html(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("text/html")
    }
}

/// Raw folder tree entry from `GET folders`. Every key is required.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderEntry {
    pub name: String,
    pub unread: u64,
    pub messages: usize,
    pub subfolder: Vec<FolderEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_display() {
        let full = Address {
            name: "Ada".to_string(),
            address: "ada@example.com".to_string(),
        };
        let bare = Address {
            name: String::new(),
            address: "bob@example.com".to_string(),
        };
        assert_eq!(full.to_string(), "Ada <ada@example.com>");
        assert_eq!(bare.to_string(), "bob@example.com");
        assert_eq!(bare.display_name(), "bob@example.com");
        assert_eq!(Address::default().display_name(), "(no sender)");
        assert_eq!(
            join_addresses(&[full, bare]),
            "Ada <ada@example.com>; bob@example.com"
        );
    }

    #[test]
    fn test_decode_summary() {
        let summary: MessageSummary = serde_json::from_str(
            r#"{
                "id": "42",
                "from": {"name": "Ada", "address": "ada@example.com"},
                "to": [{"address": "bob@example.com"}],
                "subject": "",
                "summary": "Hello",
                "date": "2024-03-01T09:30:00Z",
                "unread": true,
                "hasAttachment": true
            }"#,
        )
        .unwrap();

        assert_eq!(summary.id, "42");
        assert_eq!(summary.to[0].name, "");
        assert!(summary.cc.is_empty());
        assert!(summary.has_attachment);
        assert!(!summary.flagged);
        assert_eq!(summary.display_subject(), "(no subject)");
    }

    #[test]
    fn test_decode_content() {
        let content: Content =
            serde_json::from_str(r#"{"type": "text/HTML", "content": "<p>x</p>", "attachment": ["a.pdf"]}"#)
                .unwrap();
        assert!(content.is_html());
        assert_eq!(content.attachment, vec!["a.pdf"]);

        let plain: Content = serde_json::from_str(r#"{"type": "text/plain", "content": "x"}"#).unwrap();
        assert!(!plain.is_html());
        assert!(plain.attachment.is_empty());
    }

    #[test]
    fn test_folder_entry_requires_all_keys() {
        let missing = serde_json::from_str::<Vec<FolderEntry>>(
            r#"[{"name": "INBOX", "unread": 1, "messages": 3}]"#,
        );
        assert!(missing.is_err());

        let not_array = serde_json::from_str::<Vec<FolderEntry>>(r#"{"name": "INBOX"}"#);
        assert!(not_array.is_err());
    }
}
