//! Crawl phase definitions for the orchestrator state machine
//!
//! A run moves `Idle -> FetchingListing -> ExtractingUrls -> FetchingDetail(s)
//! -> BatchCheck -> (FetchingListing | Done)`.

use std::fmt;

/// Represents where the orchestrator is within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Run created, nothing requested yet
    Idle,

    /// Waiting on a listing page
    FetchingListing,

    /// Pulling detail URLs out of a fetched listing page
    ExtractingUrls,

    /// Fetching and extracting one detail page
    FetchingDetail,

    /// End of a page range: flush the buffer if it holds records
    BatchCheck,

    /// Page cap reached or listings exhausted
    Done,
}

impl CrawlPhase {
    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the orchestrator may move from `self` to `next`
    ///
    /// - A listing page either yields URLs or ends the range (fetch failure).
    /// - A page with no detail URLs goes straight to the next listing page
    ///   or to the batch check.
    /// - Detail fetches chain into each other, into the next listing page,
    ///   or into the batch check.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;

        matches!(
            (self, next),
            (Idle, FetchingListing)
                | (FetchingListing, ExtractingUrls)
                | (FetchingListing, BatchCheck)
                | (ExtractingUrls, FetchingDetail)
                | (ExtractingUrls, FetchingListing)
                | (ExtractingUrls, BatchCheck)
                | (FetchingDetail, FetchingDetail)
                | (FetchingDetail, FetchingListing)
                | (FetchingDetail, BatchCheck)
                | (BatchCheck, FetchingListing)
                | (BatchCheck, Done)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingListing => "fetching_listing",
            Self::ExtractingUrls => "extracting_urls",
            Self::FetchingDetail => "fetching_detail",
            Self::BatchCheck => "batch_check",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
