use anyhow::{Context, Result};
use clap::Parser;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use policyfinder::batch::{run_batch, BatchOptions};
use policyfinder::cli::Cli;
use policyfinder::config::AppConfig;
use policyfinder::export::{export_csv, print_run_summary};
use policyfinder::fetch::PolicyFetcher;
use policyfinder::rate_limit::SharedRateLimiter;
use policyfinder::sitelist::parse_site_file;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .init();

    if cli.init {
        let path = AppConfig::create_default_config()
            .context("Failed to create default config file")?;
        println!("Created default configuration at {}", path.display());
        return Ok(());
    }

    cli.validate()?;

    let mut config = AppConfig::load().context("Failed to load configuration")?;

    // CLI flags win over the config file
    if let Some(jobs) = cli.parallel_jobs {
        config.batch.parallel_jobs = jobs;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.http.request_timeout_secs = timeout;
    }
    if let Some(ua) = &cli.user_agent {
        config.http.user_agent = ua.clone();
    }
    if cli.probe_common_paths {
        config.batch.probe_common_paths = true;
    }

    let input_file = cli
        .input_file
        .as_ref()
        .context("An input site list is required")?;

    let sites = parse_site_file(input_file)?;
    if sites.is_empty() {
        warn!("No usable site entries found in {}", input_file.display());
    }
    info!("Loaded {} sites from {}", sites.len(), input_file.display());

    let fetcher = PolicyFetcher::new(&config.http)?;
    let limiter = SharedRateLimiter::new(config.batch.requests_per_second);

    // Ctrl-C requests a graceful stop: in-flight sites finish, queued
    // sites are skipped, and whatever completed is still written out.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_handler = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, finishing in-flight sites...");
        cancel_handler.store(true, Ordering::SeqCst);
    })
    .context("Failed to install interrupt handler")?;

    let options = BatchOptions {
        parallel_jobs: config.batch.parallel_jobs,
        probe_common_paths: config.batch.probe_common_paths,
        show_progress: !cli.no_progress,
    };

    let (records, summary) = run_batch(&fetcher, &sites, &options, &limiter, &cancel).await;

    export_csv(&records, &cli.output)?;
    print_run_summary(&summary, &cli.output);

    Ok(())
}
