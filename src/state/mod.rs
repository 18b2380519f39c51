//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where the orchestrator is in its page/batch cycle
//! - `CrawlState`: cursor, batch buffer, counters and failed URLs of one run

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::CrawlState;
pub use phase::CrawlPhase;
