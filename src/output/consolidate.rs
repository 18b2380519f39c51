//! Batch consolidation
//!
//! Merges every `properties_batch_<N>.csv` in the output directory into
//! `properties.csv`, ordered by batch number, under a single header.
//! Deleting the merged batch files is gated behind a `Confirm` capability so
//! the interactive prompt stays at the edge of the program.

use crate::output::batch::{parse_batch_number, COMBINED_FILE_NAME};
use crate::output::{OutputError, OutputResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Yes/no decision source for destructive operations
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Always confirms
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Never confirms
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone)]
pub struct ConsolidationReport {
    /// The combined file
    pub output_path: PathBuf,

    /// Source batch files in the order they were merged
    pub batch_files: Vec<PathBuf>,

    /// Data rows written (header excluded)
    pub rows: u64,
}

/// Merges batch files found in one directory
#[derive(Debug, Clone)]
pub struct Consolidator {
    directory: PathBuf,
}

impl Consolidator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Lists batch files sorted by their embedded batch number
    ///
    /// Sorting is numeric, so batch 10 comes after batch 2. A missing
    /// directory simply has no batches.
    pub fn discover_batches(&self) -> OutputResult<Vec<(u32, PathBuf)>> {
        let entries = match std::fs::read_dir(&self.directory) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut batches = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }

            let file_name = entry.file_name();
            if let Some(number) = file_name.to_str().and_then(parse_batch_number) {
                batches.push((number, entry.path()));
            }
        }

        batches.sort_by_key(|(number, _)| *number);
        Ok(batches)
    }

    /// Merges all batch files into the combined file
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No batch files exist; nothing was written
    /// * `Ok(Some(report))` - Combined file written
    /// * `Err(OutputError)` - A batch could not be read, or its header
    ///   differs from the first batch's header
    pub fn combine(&self) -> OutputResult<Option<ConsolidationReport>> {
        let batches = self.discover_batches()?;
        if batches.is_empty() {
            tracing::info!("No batch files found to combine");
            return Ok(None);
        }

        tracing::info!("Combining {} batch files...", batches.len());

        let header = shared_header(&batches)?;

        let output_path = self.directory.join(COMBINED_FILE_NAME);
        let mut writer = csv::Writer::from_path(&output_path)?;
        writer.write_record(&header)?;
        let mut rows = 0u64;

        for (_, path) in &batches {
            tracing::debug!("Processing {}...", path.display());
            let mut reader = csv::Reader::from_path(path)?;
            for record in reader.records() {
                writer.write_record(&record?)?;
                rows += 1;
            }
        }
        writer.flush()?;

        tracing::info!(
            "Combined {} properties into {}",
            rows,
            output_path.display()
        );

        Ok(Some(ConsolidationReport {
            output_path,
            batch_files: batches.into_iter().map(|(_, path)| path).collect(),
            rows,
        }))
    }

    /// Deletes the merged batch files if `confirm` agrees
    ///
    /// Returns the number of files removed.
    pub fn cleanup(
        &self,
        report: &ConsolidationReport,
        confirm: &dyn Confirm,
    ) -> OutputResult<usize> {
        if report.batch_files.is_empty() {
            return Ok(0);
        }

        let prompt = format!(
            "Delete {} batch files after combining?",
            report.batch_files.len()
        );
        if !confirm.confirm(&prompt) {
            tracing::info!("Keeping batch files");
            return Ok(0);
        }

        for path in &report.batch_files {
            remove_batch(path)?;
        }

        Ok(report.batch_files.len())
    }
}

/// Reads every batch header and returns the one they all share
///
/// Runs before the combined file is opened, so a mismatch leaves no partial
/// output behind.
fn shared_header(batches: &[(u32, PathBuf)]) -> OutputResult<csv::StringRecord> {
    let mut shared: Option<csv::StringRecord> = None;

    for (_, path) in batches {
        let header = csv::Reader::from_path(path)?.headers()?.clone();
        match &shared {
            None => shared = Some(header),
            Some(expected) if *expected != header => {
                return Err(OutputError::MalformedBatch {
                    path: path.clone(),
                    message: format!(
                        "header {:?} does not match {:?}",
                        header.iter().collect::<Vec<_>>(),
                        expected.iter().collect::<Vec<_>>()
                    ),
                });
            }
            Some(_) => {}
        }
    }

    Ok(shared.unwrap_or_default())
}

fn remove_batch(path: &Path) -> OutputResult<()> {
    std::fs::remove_file(path)?;
    tracing::info!("Deleted {}", path.display());
    Ok(())
}
