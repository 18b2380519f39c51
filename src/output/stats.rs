//! End-of-run summaries
//!
//! Console output for the crawl report and the consolidation result.

use crate::crawler::{CrawlReport, StopReason};
use crate::output::ConsolidationReport;

/// Prints the crawl report to stdout
pub fn print_report(report: &CrawlReport) {
    println!("\n=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Listing pages processed: {}", report.pages_processed);
    println!("  Properties collected: {}", report.collected);
    println!("  Failed to collect: {}", report.failed.len());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    match report.stop_reason {
        StopReason::PageCap => println!("  Stopped at: page cap"),
        StopReason::ListingExhausted { page } => {
            println!("  Stopped at: listing page {} (no more data)", page)
        }
    }
    println!();

    if !report.batch_files.is_empty() {
        println!("Batch Files ({}):", report.batch_files.len());
        for path in &report.batch_files {
            println!("  - {}", path.display());
        }
        println!();
    }

    if let Some(log) = &report.failed_log {
        println!("Failed URLs written to {}", log.display());
    }

    println!(
        "Success Rate: {:.1}% ({} / {} properties)",
        success_rate(report),
        report.collected,
        report.collected + report.failed.len() as u64
    );
}

/// Prints the consolidation result to stdout
pub fn print_consolidation(report: &ConsolidationReport) {
    println!(
        "\nCombined {} properties from {} batch files into {}",
        report.rows,
        report.batch_files.len(),
        report.output_path.display()
    );
}

/// Collected share of all attempted detail pages, in percent
fn success_rate(report: &CrawlReport) -> f64 {
    let attempted = report.collected + report.failed.len() as u64;
    if attempted == 0 {
        return 0.0;
    }
    (report.collected as f64 / attempted as f64) * 100.0
}
