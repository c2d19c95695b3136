//! Plain-text to HTML conversion
//!
//! Each line becomes its own paragraph; blank lines are kept as line breaks
//! so the rendered spacing follows the source file.

use super::types::ConvertedDocument;

pub fn convert(bytes: &[u8]) -> ConvertedDocument {
    let text = String::from_utf8_lossy(bytes)
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();

    let mut html = String::with_capacity(text.len() + text.len() / 4);
    for line in text.lines() {
        if line.trim().is_empty() {
            html.push_str("<br />\n");
        } else {
            html.push_str("<p>");
            html.push_str(&html_escape::encode_text(line));
            html.push_str("</p>\n");
        }
    }

    ConvertedDocument {
        html,
        plain_text: text,
    }
}
