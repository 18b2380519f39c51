//! Crawler module for listing traversal and property extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Listing page parsing (detail URL discovery)
//! - Detail page parsing (property extraction)
//! - Overall crawl coordination and batching

mod coordinator;
mod detail;
mod fetcher;
mod listing;
mod record;

pub use coordinator::{run_crawl, Coordinator, CrawlReport, StopReason};
pub use detail::extract_property;
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpTransport, RetryPolicy, Transport};
pub use listing::extract_listing_urls;
pub use record::{PropertyRecord, FIELD_NAMES, NOT_AVAILABLE};
