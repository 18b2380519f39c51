//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing numbered CSV batch files of property records
//! - Merging batch files into the combined output
//! - Recording URLs that could not be collected
//! - Printing the end-of-run summary

mod batch;
mod consolidate;
mod failed;
pub mod stats;

pub use batch::{batch_file_name, parse_batch_number, BatchWriter, COMBINED_FILE_NAME};
pub use consolidate::{AssumeNo, AssumeYes, Confirm, ConsolidationReport, Consolidator};
pub use failed::{write_failed_urls, FailedUrl};
pub use stats::{print_consolidation, print_report};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed batch file {path:?}: {message}")]
    MalformedBatch { path: PathBuf, message: String },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
