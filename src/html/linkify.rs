//! Plain text to HTML with bare `http(s)` URLs turned into links.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

/// ASCII word boundary, scheme, then a host (IPv4-ish, bracketed IPv6, or a name without the
/// brackets, quotes and parentheses common around URLs in prose), an
/// optional port and an optional path.
const URL_PATTERN: &str = concat!(
    r"(?-u:\b)([0-9A-Za-z+.-]+):/?/?",
    r#"([0-9.]+|\[[0-9a-fA-F:.]+\]|[^\]\[<>()/":\s]+)"#,
    r"(:[0-9]+)?",
    r#"(/[^\]\[<>"\s]*)?"#,
);

static URL_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(URL_PATTERN).ok());

/// Characters left alone by `encodeURI`: unreserved marks plus the URI
/// delimiters.
const URI_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'#');

/// Punctuation that ends a sentence rather than a URL.
const TRAILING_PUNCTUATION: &[char] = &[',', ';', '\\', '.', ':', '!', '?'];

/// Escapes text for use as HTML element content.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encodes everything except URI syntax characters.
pub fn encode_uri(url: &str) -> String {
    utf8_percent_encode(url, URI_KEEP).to_string()
}

/// Escapes `content` and wraps each `http`/`https` URL in an anchor that
/// opens in a new browsing context.
///
/// Trailing sentence punctuation is left outside the link. A trailing `)` is
/// too, unless the text since the previous URL opened a parenthesis.
/// URLs with other schemes are escaped but not linked.
pub fn linkify(content: &str) -> String {
    let Some(regex) = URL_REGEX.as_ref() else {
        return html_escape(content);
    };

    let mut out = String::with_capacity(content.len());
    let mut index = 0;

    for caps in regex.captures_iter(content) {
        let Some(found) = caps.get(0) else {
            continue;
        };
        let text = &content[index..found.start()];
        out.push_str(&html_escape(text));
        index = found.end();

        let url = found.as_str();
        let protocol = caps.get(1).map_or("", |m| m.as_str());
        if protocol != "http" && protocol != "https" {
            out.push_str(&html_escape(url));
            continue;
        }

        let url = if text.contains('(') {
            url.trim_end_matches(TRAILING_PUNCTUATION)
        } else {
            url.trim_end_matches(|c: char| TRAILING_PUNCTUATION.contains(&c) || c == ')')
        };
        index = found.start() + url.len();

        out.push_str(&format!(
            r#"<a target="_blank" href="{}">{}</a>"#,
            html_escape(&encode_uri(url)),
            html_escape(url)
        ));
    }

    out.push_str(&html_escape(&content[index..]));
    out
}
