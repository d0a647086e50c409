//! Per-site scraping pipeline
//!
//! Sequences base fetch, link discovery, policy fetch and text extraction
//! for one site, mapping every failure onto a terminal status. One bad
//! site never aborts the batch: nothing escapes this module as an error.

use tracing::{debug, warn};
use url::Url;

use crate::extract::extract_visible_text;
use crate::fetch::PolicyFetcher;
use crate::resolver::resolve_policy_link;
use crate::sitelist::SiteRecord;

/// Terminal status of one site's pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteStatus {
    /// Policy link found, fetched and extracted.
    Ok,
    /// Base page fetched but no privacy-policy anchor matched.
    NoLinkFound,
    /// Policy link found but the policy page could not be fetched.
    FetchFailed,
    /// The base page itself could not be fetched.
    Unreachable,
}

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteStatus::Ok => "ok",
            SiteStatus::NoLinkFound => "no_link_found",
            SiteStatus::FetchFailed => "fetch_failed",
            SiteStatus::Unreachable => "unreachable",
        }
    }
}

impl std::fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-site output unit written to the dataset. Assembled once at the
/// end of the pipeline and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRecord {
    pub company_name: String,
    /// The input site URL, kept for logging and the console summary; not
    /// part of the CSV schema.
    pub site_url: String,
    pub policy_url: Option<String>,
    pub extracted_text: Option<String>,
    pub status: SiteStatus,
}

impl PolicyRecord {
    fn failed(site: &SiteRecord, status: SiteStatus) -> Self {
        Self {
            company_name: site.name.clone(),
            site_url: site.url.clone(),
            policy_url: None,
            extracted_text: None,
            status,
        }
    }
}

/// Common policy paths probed when link discovery finds nothing and
/// `probe_common_paths` is enabled. Ordered by how often they hit.
const COMMON_POLICY_PATHS: [&str; 4] =
    ["/privacy-policy", "/privacy", "/legal/privacy", "/privacy.html"];

/// Ensure a site URL has an http(s) scheme. Bare domains from input lists
/// default to https.
pub fn normalize_site_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Run the full pipeline for one site and produce exactly one record.
///
/// State machine: base fetch failure ends with `unreachable`; no matching
/// anchor ends with `no_link_found`; a policy fetch failure ends with
/// `fetch_failed` but preserves the resolved URL, since partial
/// information is more useful than none.
pub async fn process_site(
    fetcher: &PolicyFetcher,
    site: &SiteRecord,
    probe_common_paths: bool,
) -> PolicyRecord {
    let base_url = match Url::parse(&normalize_site_url(&site.url)) {
        Ok(u) => u,
        Err(e) => {
            warn!("Invalid site URL for {} ({}): {}", site.name, site.url, e);
            return PolicyRecord::failed(site, SiteStatus::Unreachable);
        }
    };

    // Base fetch
    let base_page = match fetcher.fetch(&base_url).await {
        Ok(page) => page,
        Err(e) => {
            debug!("Base fetch failed for {}: {}", site.url, e);
            return PolicyRecord::failed(site, SiteStatus::Unreachable);
        }
    };

    // Link discovery, resolved against the post-redirect URL
    let policy_url = match resolve_policy_link(&base_page.final_url, &base_page.html) {
        Some(link) => link.absolute_url,
        None => {
            let probed = if probe_common_paths {
                probe_common_policy_paths(fetcher, &base_page.final_url).await
            } else {
                None
            };
            match probed {
                Some(url) => url,
                None => {
                    debug!("No privacy policy link found on {}", site.url);
                    return PolicyRecord::failed(site, SiteStatus::NoLinkFound);
                }
            }
        }
    };

    // Policy fetch
    let policy_page = match fetcher.fetch(&policy_url).await {
        Ok(page) => page,
        Err(e) => {
            debug!("Policy fetch failed for {} ({}): {}", site.name, policy_url, e);
            return PolicyRecord {
                company_name: site.name.clone(),
                site_url: site.url.clone(),
                policy_url: Some(policy_url.to_string()),
                extracted_text: None,
                status: SiteStatus::FetchFailed,
            };
        }
    };

    // Extraction
    let text = extract_visible_text(&policy_page.html);
    debug!("Extracted {} characters from {}", text.chars().count(), policy_url);

    PolicyRecord {
        company_name: site.name.clone(),
        site_url: site.url.clone(),
        policy_url: Some(policy_url.to_string()),
        extracted_text: Some(text),
        status: SiteStatus::Ok,
    }
}

/// Fallback strategy: HEAD-probe well-known policy paths on the base host.
async fn probe_common_policy_paths(fetcher: &PolicyFetcher, base_url: &Url) -> Option<Url> {
    for path in COMMON_POLICY_PATHS {
        let candidate = match base_url.join(path) {
            Ok(u) => u,
            Err(_) => continue,
        };
        if fetcher.head_ok(&candidate).await {
            debug!("Found policy at common path: {}", candidate);
            return Some(candidate);
        }
    }
    None
}
