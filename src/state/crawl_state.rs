//! Transient state owned by the orchestrator for one run
//!
//! Nothing here outlives the run except what gets flushed: buffered records
//! become batch files and the failed URLs become the failure log.

use crate::crawler::PropertyRecord;
use crate::output::FailedUrl;
use crate::state::CrawlPhase;
use crate::HarvestError;

/// Cursor, buffer and counters for one crawl run
#[derive(Debug)]
pub struct CrawlState {
    phase: CrawlPhase,

    /// Next listing page to request
    pub current_page: u32,

    /// Number used for the next batch file
    pub batch_number: u32,

    /// Records not yet flushed to a batch file
    buffer: Vec<PropertyRecord>,

    /// Records successfully extracted over the whole run
    collected: u64,

    /// Detail URLs that failed terminally, in discovery order
    failed: Vec<FailedUrl>,
}

impl CrawlState {
    /// Creates the state for a fresh run starting at page 1, batch 1
    pub fn new() -> Self {
        Self {
            phase: CrawlPhase::Idle,
            current_page: 1,
            batch_number: 1,
            buffer: Vec::new(),
            collected: 0,
            failed: Vec::new(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn advance(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Buffers an extracted record and counts it as collected
    pub fn push_record(&mut self, record: PropertyRecord) {
        self.buffer.push(record);
        self.collected += 1;
    }

    /// Records a detail URL that could not be collected
    pub fn record_failure(&mut self, url: &str, reason: impl Into<String>) {
        self.failed.push(FailedUrl::new(url, reason));
    }

    /// Empties the buffer, handing its records to the caller
    pub fn take_buffer(&mut self) -> Vec<PropertyRecord> {
        std::mem::take(&mut self.buffer)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn collected(&self) -> u64 {
        self.collected
    }

    pub fn failed(&self) -> &[FailedUrl] {
        &self.failed
    }

    /// Consumes the state, keeping only the failed URLs
    pub fn into_failed(self) -> Vec<FailedUrl> {
        self.failed
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}
