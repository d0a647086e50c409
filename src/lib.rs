//! policyfinder: collect privacy policy text from company websites.
//!
//! The pipeline per site: fetch the landing page, find the first anchor
//! that mentions "privacy", fetch that page, extract its visible text.
//! A batch runner drives the pipeline over a whole site list and writes
//! one CSV row per input site.

pub mod batch;
pub mod cli;
pub mod config;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod processor;
pub mod rate_limit;
pub mod resolver;
pub mod sitelist;

pub use batch::{run_batch, BatchOptions, RunSummary};
pub use config::AppConfig;
pub use extract::extract_visible_text;
pub use fetch::{FetchErrorKind, FetchedPage, PolicyFetcher};
pub use processor::{process_site, PolicyRecord, SiteStatus};
pub use resolver::{resolve_policy_link, PolicyLink};
pub use sitelist::{parse_site_file, SiteRecord};
