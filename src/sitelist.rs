//! Site list input parsing
//!
//! The batch input is an ordered list of `{name, url}` records read from a
//! CSV or JSON file (format auto-detected from the extension). Input order
//! is preserved all the way to the output CSV. Records without a name get
//! one derived from their host.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;
use url::Url;

use crate::processor::normalize_site_url;

/// One target website: a company name and its base URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteRecord {
    pub name: String,
    pub url: String,
}

/// Input format for site list files
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") | Some("txt") => Some(Self::Csv),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse a site list from a file (auto-detects format from extension).
/// Failure here is the run's only fatal error: with no readable input
/// there is nothing to process.
pub fn parse_site_file(path: &Path) -> Result<Vec<SiteRecord>> {
    let format = InputFormat::from_path(path).with_context(|| {
        format!(
            "Cannot determine input format from file extension. Expected .csv, .txt or .json: {}",
            path.display()
        )
    })?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file: {}", path.display()))?;

    match format {
        InputFormat::Csv => parse_csv_sites(&content),
        InputFormat::Json => parse_json_sites(&content),
    }
}

/// Parse sites from CSV content.
///
/// Supports two formats:
/// 1. One URL per line (no header), `#` comments and blank lines skipped
/// 2. CSV with a `url` column header and an optional `name` column
///
/// URLs are taken as-is: an entry that cannot be fetched still gets its
/// own output row (as `unreachable`) instead of being dropped here.
pub fn parse_csv_sites(content: &str) -> Result<Vec<SiteRecord>> {
    let mut sites = Vec::new();
    let lines: Vec<&str> = content.lines().collect();

    if lines.is_empty() {
        return Ok(sites);
    }

    // A header row must carry an exact column name; a substring match
    // would mistake a first domain like curl.se for a header.
    let has_header = lines[0]
        .split(',')
        .any(|field| matches!(field.trim().to_lowercase().as_str(), "url" | "name" | "company"));

    if has_header {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers().context("Failed to read CSV headers")?.clone();

        let url_idx = headers
            .iter()
            .position(|h| h.to_lowercase() == "url")
            .context("CSV must have a 'url' column when using headers")?;
        let name_idx = headers
            .iter()
            .position(|h| matches!(h.to_lowercase().as_str(), "name" | "company"));

        for result in reader.records() {
            let record = result.context("Failed to parse CSV record")?;

            let url = record
                .get(url_idx)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());

            if let Some(url) = url {
                let name = name_idx
                    .and_then(|idx| record.get(idx))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| company_name_from_url(&url));

                sites.push(SiteRecord { name, url });
            }
        }
    } else {
        for line in lines {
            let url = line.split(',').next().unwrap_or(line).trim();

            if url.is_empty() || url.starts_with('#') {
                continue;
            }

            sites.push(SiteRecord {
                name: company_name_from_url(url),
                url: url.to_string(),
            });
        }
    }

    Ok(sites)
}

/// Parse sites from JSON content.
///
/// Supports three formats:
/// 1. Array of URL strings: `["example.com", "https://test.org"]`
/// 2. Array of objects: `[{"name": "Example", "url": "example.com"}]`
/// 3. Object with a `sites` array: `{"sites": [...]}`
pub fn parse_json_sites(content: &str) -> Result<Vec<SiteRecord>> {
    let value: serde_json::Value =
        serde_json::from_str(content).context("Failed to parse JSON content")?;

    let entries = match &value {
        serde_json::Value::Array(arr) => parse_json_array(arr),

        serde_json::Value::Object(obj) => {
            if let Some(serde_json::Value::Array(arr)) = obj.get("sites") {
                parse_json_array(arr)
            } else {
                bail!("JSON object must have a 'sites' array field");
            }
        }

        _ => bail!("JSON must be an array of sites or an object with a 'sites' field"),
    };

    Ok(entries)
}

fn parse_json_array(arr: &[serde_json::Value]) -> Vec<SiteRecord> {
    let mut entries = Vec::new();

    for item in arr {
        match item {
            serde_json::Value::String(url) => {
                let url = url.trim();
                if url.is_empty() {
                    warn!("Skipping empty URL entry in site list");
                    continue;
                }
                entries.push(SiteRecord {
                    name: company_name_from_url(url),
                    url: url.to_string(),
                });
            }

            serde_json::Value::Object(obj) => {
                let url = match obj.get("url").and_then(|v| v.as_str()) {
                    Some(u) if !u.trim().is_empty() => u.trim(),
                    _ => {
                        warn!("Skipping site entry without a 'url' field: {}", item);
                        continue;
                    }
                };

                let name = obj
                    .get("name")
                    .and_then(|v| v.as_str())
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| company_name_from_url(url));

                entries.push(SiteRecord {
                    name,
                    url: url.to_string(),
                });
            }

            other => {
                warn!("Skipping malformed site entry: {}", other);
            }
        }
    }

    entries
}

/// Derive a company name from a site URL's host: the registrable label,
/// capitalized. `www.example.co.uk` becomes `Example`.
pub fn company_name_from_url(url: &str) -> String {
    let host = Url::parse(&normalize_site_url(url))
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string());

    let host = host.strip_prefix("www.").unwrap_or(&host);
    let parts: Vec<&str> = host.split('.').collect();

    // Compound TLDs (co.uk, com.au, ...) push the registrable label one
    // position to the left.
    let compound_tlds = ["co.uk", "com.au", "co.au", "co.nz", "co.jp", "com.br"];
    let label = if parts.len() >= 3 {
        let last_two = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
        if compound_tlds.contains(&last_two.as_str()) {
            parts[parts.len() - 3]
        } else {
            parts[parts.len() - 2]
        }
    } else if parts.len() == 2 {
        parts[0]
    } else {
        host
    };

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
