//! HTML pages for keynote.
//!
//! Pages are built as plain strings. Every interpolated value goes through
//! [`escape`] (HTML context) or [`js_string`] (inline script context).
//!
//! - [`render_home`]: site landing page listing the content tree
//! - [`render_content`]: one deck, book or bundle

mod content;
mod home;

use kn_tree::ContentKind;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub use content::{ContentPage, render_content};
pub use home::{HomeData, LinkMode, render_home};

/// Unreserved characters: A-Z a-z 0-9 - . _ ~
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// reveal.js distribution used by deck pages.
pub const REVEAL_CDN: &str = "https://cdn.jsdelivr.net/npm/reveal.js@5.1.0/dist";

/// docsify distribution used by book pages.
pub const DOCSIFY_CDN: &str = "https://cdn.jsdelivr.net/npm/docsify@4";

/// Escape HTML special characters.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Quote a value as a JavaScript string literal safe inside `<script>`.
#[must_use]
pub fn js_string(s: &str) -> String {
    script_json(&serde_json::Value::from(s))
}

/// Serialize JSON for embedding in an inline script.
fn script_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// URL of a file below a kind prefix: `{base}{kind}s/{folders...}/{name}{suffix}`.
///
/// `base` must end with `/`. Folder segments and `name` are percent-encoded;
/// `suffix` is appended as is.
#[must_use]
pub fn entry_url(
    base: &str,
    kind: ContentKind,
    folders: &[String],
    name: &str,
    suffix: &str,
) -> String {
    let mut url = format!("{base}{}", kind.url_segment());
    for segment in folders.iter().map(String::as_str).chain([name]) {
        url.push('/');
        url.extend(utf8_percent_encode(segment, SEGMENT_ENCODE_SET));
    }
    url.push_str(suffix);
    url
}

/// Shared `<head>` opening: charset, viewport, title and optional icon.
fn push_head(html: &mut String, title: &str, icon: &str) {
    use std::fmt::Write;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(html, "<title>{}</title>", escape(title));
    if !icon.is_empty() {
        let _ = writeln!(html, "<link rel=\"icon\" href=\"{}\">", escape(icon));
    }
}
