//! CSV export and the console run summary
//!
//! Writes the dataset with the fixed four-column schema. Fields that do
//! not apply to a record's status are written as empty strings, never
//! omitted, so every row has the same shape.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::batch::RunSummary;
use crate::processor::PolicyRecord;

/// Write the collected records to a CSV file.
///
/// The header is always `company_name,policy_url,extracted_text,status`
/// and rows appear in the same order as the input site list. The csv
/// writer handles quoting of embedded commas, quotes and newlines.
pub fn export_csv(records: &[PolicyRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    writer
        .write_record(["company_name", "policy_url", "extracted_text", "status"])
        .context("Failed to write CSV header")?;

    for record in records {
        writer
            .write_record([
                record.company_name.as_str(),
                record.policy_url.as_deref().unwrap_or(""),
                record.extracted_text.as_deref().unwrap_or(""),
                record.status.as_str(),
            ])
            .with_context(|| format!("Failed to write CSV row for {}", record.company_name))?;
    }

    writer.flush().context("Failed to flush CSV output")?;

    info!("Wrote {} records to {}", records.len(), path.display());
    Ok(())
}

/// Print the end-of-run summary block to stdout.
pub fn print_run_summary(summary: &RunSummary, output_path: &Path) {
    println!();
    println!("{}", "=".repeat(60));
    println!("PRIVACY POLICY EXTRACTION SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Sites processed:     {}", summary.total_sites - summary.cancelled);
    println!("  ok:                {}", summary.ok);
    println!("  no_link_found:     {}", summary.no_link_found);
    println!("  fetch_failed:      {}", summary.fetch_failed);
    println!("  unreachable:       {}", summary.unreachable);
    if summary.cancelled > 0 {
        println!("Cancelled (skipped): {}", summary.cancelled);
    }
    println!("Duration:            {:.1}s", summary.total_duration_secs);
    println!("Output:              {}", output_path.display());
    println!("{}", "=".repeat(60));
}
