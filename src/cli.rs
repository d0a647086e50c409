//! Command-line interface definition

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "policyfinder",
    about = "Collect privacy policy text from a list of company websites",
    version
)]
pub struct Cli {
    /// Input site list (.csv, .txt or .json)
    #[arg(required_unless_present = "init")]
    pub input_file: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "privacy_policies.csv")]
    pub output: PathBuf,

    /// Number of sites processed in parallel (overrides config)
    #[arg(short = 'j', long)]
    pub parallel_jobs: Option<usize>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// User-Agent header sent with every request (overrides config)
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Probe well-known policy paths (/privacy, /privacy-policy, ...)
    /// when no link is found on the base page
    #[arg(long)]
    pub probe_common_paths: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write a default config file to ./config/policyfinder.toml and exit
    #[arg(long)]
    pub init: bool,
}

impl Cli {
    /// Validate argument combinations before any work starts.
    pub fn validate(&self) -> Result<()> {
        if let Some(jobs) = self.parallel_jobs {
            if jobs == 0 {
                bail!("--parallel-jobs must be at least 1");
            }
            if jobs > 100 {
                bail!("--parallel-jobs must be 100 or less");
            }
        }

        if let Some(timeout) = self.timeout_secs {
            if timeout == 0 {
                bail!("--timeout-secs must be at least 1");
            }
        }

        if let Some(ua) = &self.user_agent {
            if ua.trim().is_empty() {
                bail!("--user-agent cannot be empty");
            }
        }

        if let Some(input) = &self.input_file {
            if !input.exists() {
                bail!("Input file does not exist: {}", input.display());
            }
        }

        Ok(())
    }

    /// Log filter directive derived from the verbosity flag.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "policyfinder=warn",
            1 => "policyfinder=info",
            2 => "policyfinder=debug",
            _ => "trace",
        }
    }
}
