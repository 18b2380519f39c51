//! Batch file writer
//!
//! Each flushed buffer becomes `properties_batch_<N>.csv`; a write without a
//! batch number goes to `properties.csv`. Files are overwritten, never
//! appended to.

use crate::crawler::{PropertyRecord, FIELD_NAMES};
use crate::output::OutputResult;
use std::path::PathBuf;

/// Name of the consolidated output file
pub const COMBINED_FILE_NAME: &str = "properties.csv";

const BATCH_PREFIX: &str = "properties_batch_";
const BATCH_SUFFIX: &str = ".csv";

/// File name for a batch, or for the combined file when `batch` is None
///
/// Numbers are never zero-padded.
pub fn batch_file_name(batch: Option<u32>) -> String {
    match batch {
        Some(n) => format!("{}{}{}", BATCH_PREFIX, n, BATCH_SUFFIX),
        None => COMBINED_FILE_NAME.to_string(),
    }
}

/// Extracts the batch number from a batch file name
///
/// Returns None for anything that is not `properties_batch_<digits>.csv`.
pub fn parse_batch_number(file_name: &str) -> Option<u32> {
    let digits = file_name
        .strip_prefix(BATCH_PREFIX)?
        .strip_suffix(BATCH_SUFFIX)?;

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    digits.parse().ok()
}

/// Serializes property records into CSV files inside one directory
#[derive(Debug, Clone)]
pub struct BatchWriter {
    directory: PathBuf,
}

impl BatchWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, batch: Option<u32>) -> PathBuf {
        self.directory.join(batch_file_name(batch))
    }

    /// Writes `records` under the fixed header and returns the file path
    ///
    /// A failure part-way leaves an incomplete file behind; earlier batch
    /// files are not touched.
    pub fn write_batch(
        &self,
        records: &[PropertyRecord],
        batch: Option<u32>,
    ) -> OutputResult<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.path_for(batch);

        let mut writer = csv::Writer::from_path(&path)?;
        if records.is_empty() {
            // serialize() emits the header with the first row only
            writer.write_record(FIELD_NAMES)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        match batch {
            Some(n) => tracing::info!("Batch {} exported to {}", n, path.display()),
            None => tracing::info!("Data exported to {}", path.display()),
        }

        Ok(path)
    }
}
