//! Privacy-policy link discovery
//!
//! Scans the anchors of a fetched base page for the first one that looks
//! like a privacy-policy link and resolves it to an absolute URL. The
//! heuristic is a case-insensitive "privacy" substring over the anchor
//! text and href, which tolerates wording variation ("Privacy Notice",
//! "Privacy & Cookies") without a fixed link-text catalogue.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

// Safety: the selector string is a compile-time constant containing a
// valid CSS selector, so Selector::parse cannot fail here.
static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a[href]").unwrap()
});

const KEYWORD: &str = "privacy";

/// A discovered privacy-policy link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyLink {
    /// Absolute URL the link points to.
    pub absolute_url: Url,
    /// The anchor's visible text, whitespace-collapsed. May be empty when
    /// the match came from the href alone.
    pub matched_text: String,
}

/// Find the most plausible privacy-policy link on a page.
///
/// The first anchor in document order whose text or href contains
/// "privacy" (case-insensitive) wins, which keeps output reproducible
/// across identical inputs. Anchors whose href cannot be resolved to an
/// absolute http(s) URL (mailto:, javascript:, garbage) are skipped and
/// the scan continues. Malformed markup is parsed best-effort and never
/// fails the operation; no candidate simply yields `None`.
pub fn resolve_policy_link(base_url: &Url, html: &str) -> Option<PolicyLink> {
    let document = Html::parse_document(html);

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let href = match anchor.value().attr("href") {
            Some(h) => h.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }

        let text = collapse_whitespace(&anchor.text().collect::<String>());

        let qualifies = text.to_lowercase().contains(KEYWORD)
            || href.to_lowercase().contains(KEYWORD);
        if !qualifies {
            continue;
        }

        match resolve_href(base_url, href) {
            Some(absolute_url) => {
                debug!("Found privacy policy link: {} (\"{}\")", absolute_url, text);
                return Some(PolicyLink {
                    absolute_url,
                    matched_text: text,
                });
            }
            None => {
                debug!("Skipping unresolvable privacy candidate href: {}", href);
                continue;
            }
        }
    }

    None
}

/// Resolve an href against the base URL, accepting only http(s) results.
/// `Url::join` covers path-relative, root-relative, protocol-relative and
/// already-absolute forms.
fn resolve_href(base_url: &Url, href: &str) -> Option<Url> {
    let resolved = base_url.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
