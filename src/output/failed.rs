//! Durable log of detail URLs that could not be collected

use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A detail URL that failed terminally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedUrl {
    pub url: String,

    /// Last failure cause
    pub reason: String,

    pub failed_at: DateTime<Utc>,
}

impl FailedUrl {
    pub fn new(url: &str, reason: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            reason: reason.into(),
            failed_at: Utc::now(),
        }
    }
}

/// Writes the failed URLs as CSV (`url,reason,failed_at`), replacing any
/// previous log at `path`
pub fn write_failed_urls(path: &Path, failed: &[FailedUrl]) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if failed.is_empty() {
        writer.write_record(["url", "reason", "failed_at"])?;
    }
    for entry in failed {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} failed URLs to {}", failed.len(), path.display());
    Ok(())
}
