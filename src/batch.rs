//! Batch processing of the site list
//!
//! Runs the per-site pipeline over every input record with bounded
//! concurrency. Each site is fully independent; a failure in one never
//! aborts or delays the others beyond its own timeout. Output order
//! always matches input order regardless of completion order.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::info;

use crate::fetch::PolicyFetcher;
use crate::processor::{process_site, PolicyRecord, SiteStatus};
use crate::rate_limit::SharedRateLimiter;
use crate::sitelist::SiteRecord;

/// Options controlling a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of sites processed concurrently.
    pub parallel_jobs: usize,
    /// Enable the common-path HEAD probe fallback in the site processor.
    pub probe_common_paths: bool,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

/// Summary of a completed batch run, built from the emitted records.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub total_sites: usize,
    pub ok: usize,
    pub no_link_found: usize,
    pub fetch_failed: usize,
    pub unreachable: usize,
    /// Sites skipped because the run was interrupted before they started.
    pub cancelled: usize,
    pub total_duration_secs: f64,
    pub started_at: String,
    pub completed_at: String,
}

impl RunSummary {
    fn from_records(
        records: &[PolicyRecord],
        total_sites: usize,
        started_at: String,
        duration_secs: f64,
    ) -> Self {
        let count = |status: SiteStatus| records.iter().filter(|r| r.status == status).count();

        Self {
            total_sites,
            ok: count(SiteStatus::Ok),
            no_link_found: count(SiteStatus::NoLinkFound),
            fetch_failed: count(SiteStatus::FetchFailed),
            unreachable: count(SiteStatus::Unreachable),
            cancelled: total_sites - records.len(),
            total_duration_secs: duration_secs,
            started_at,
            completed_at: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

/// Process every site in the list and collect one record per site.
///
/// Workers pick up sites as capacity frees, but every task carries its
/// input index and results are re-seated by that index, so the returned
/// sequence is deterministic for a given input.
///
/// `cancel` is checked before each site is dispatched; sites that never
/// started are omitted from the output (never emitted as partial
/// records), while in-flight sites run to completion.
pub async fn run_batch(
    fetcher: &PolicyFetcher,
    sites: &[SiteRecord],
    options: &BatchOptions,
    limiter: &SharedRateLimiter,
    cancel: &AtomicBool,
) -> (Vec<PolicyRecord>, RunSummary) {
    let started_at = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let batch_start = Instant::now();
    let total = sites.len();

    info!("Starting batch of {} sites ({} parallel)", total, options.parallel_jobs);

    let progress = if options.show_progress {
        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Some(pb)
    } else {
        None
    };

    let indexed: Vec<(usize, Option<PolicyRecord>)> =
        stream::iter(sites.iter().enumerate().map(|(index, site)| {
            let progress = progress.as_ref();
            async move {
                if cancel.load(Ordering::SeqCst) {
                    return (index, None);
                }

                limiter.acquire().await;
                let record = process_site(fetcher, site, options.probe_common_paths).await;

                if let Some(pb) = progress {
                    pb.println(format!(
                        "[{}/{}] {} ({}): {}",
                        index + 1,
                        total,
                        record.company_name,
                        record.site_url,
                        record.status
                    ));
                    pb.inc(1);
                }

                (index, Some(record))
            }
        }))
        .buffer_unordered(options.parallel_jobs.max(1))
        .collect()
        .await;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    // Re-seat by original index so output order matches input order.
    let mut slots: Vec<Option<PolicyRecord>> = vec![None; total];
    for (index, record) in indexed {
        slots[index] = record;
    }
    let records: Vec<PolicyRecord> = slots.into_iter().flatten().collect();

    let summary = RunSummary::from_records(
        &records,
        total,
        started_at,
        batch_start.elapsed().as_secs_f64(),
    );

    info!(
        "Batch complete: {} ok, {} no_link_found, {} fetch_failed, {} unreachable, {} cancelled",
        summary.ok, summary.no_link_found, summary.fetch_failed, summary.unreachable,
        summary.cancelled
    );

    (records, summary)
}
