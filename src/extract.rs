//! Visible-text extraction from policy pages
//!
//! Walks the parsed document in order, keeping only text that a browser
//! would render: anything under script, style and similar non-rendered
//! elements is dropped. Output is whitespace-collapsed and hard-capped.

use scraper::Html;

/// Hard cap on extracted text length, in characters. Capped extraction is
/// acceptable for the dataset; downstream analysis does not need complete
/// policies.
pub const MAX_EXTRACT_CHARS: usize = 10_000;

/// Elements whose text content is never rendered to the user.
const NON_VISIBLE_ELEMENTS: [&str; 7] =
    ["script", "style", "noscript", "template", "head", "svg", "iframe"];

/// Extract the visible text of an HTML page.
///
/// Text nodes are concatenated in document order with single spaces
/// between them, internal whitespace collapsed. The result never exceeds
/// [`MAX_EXTRACT_CHARS`] characters. Empty or whitespace-only pages yield
/// an empty string, which is valid output rather than an error.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.root_element().descendants() {
        let text = match node.value().as_text() {
            Some(t) => t,
            None => continue,
        };

        // Drop text under non-rendered ancestors (script, style, head, ...).
        let mut hidden = false;
        let mut current = node.parent();
        while let Some(parent) = current {
            if let Some(element) = parent.value().as_element() {
                if NON_VISIBLE_ELEMENTS.contains(&element.name()) {
                    hidden = true;
                    break;
                }
            }
            current = parent.parent();
        }
        if hidden {
            continue;
        }

        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&collapsed);

        // A char is at most 4 bytes, so this many bytes already holds the
        // full cap; stop walking arbitrarily large documents early.
        if out.len() >= MAX_EXTRACT_CHARS * 4 {
            break;
        }
    }

    truncate_chars(&out, MAX_EXTRACT_CHARS)
}

/// Truncate to the first `max_chars` characters on a char boundary.
fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
