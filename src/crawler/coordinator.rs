//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates:
//! - Walking listing pages in fixed-size page ranges
//! - Fetching and extracting every detail page found on them
//! - Flushing one batch file per page range
//! - Pacing requests and keeping track of failed URLs

use crate::config::{validate, Config};
use crate::crawler::detail::extract_property;
use crate::crawler::fetcher::{Fetcher, HttpTransport, RetryPolicy, Transport};
use crate::crawler::listing::extract_listing_urls;
use crate::output::{write_failed_urls, BatchWriter, FailedUrl};
use crate::state::{CrawlPhase, CrawlState};
use crate::HarvestError;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every page up to `max-pages` was requested
    PageCap,

    /// A listing page could not be fetched; treated as the end of the data.
    /// A transient outage on that page truncates the crawl the same way.
    ListingExhausted { page: u32 },
}

/// Outcome of a crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Listing pages fetched successfully
    pub pages_processed: u32,

    /// Batch files written, in creation order
    pub batch_files: Vec<PathBuf>,

    /// Properties extracted over the whole run
    pub collected: u64,

    /// Detail URLs that could not be collected
    pub failed: Vec<FailedUrl>,

    /// Where the failed URLs were written, if any failed
    pub failed_log: Option<PathBuf>,

    pub stop_reason: StopReason,

    pub elapsed: Duration,
}

/// Main crawler coordinator structure
pub struct Coordinator<T> {
    config: Config,
    fetcher: Fetcher<T>,
    writer: BatchWriter,
    origin: Url,
    request_delay: Duration,
    state: CrawlState,
}

impl Coordinator<HttpTransport> {
    /// Creates a coordinator that talks to the network through reqwest
    pub fn new(config: Config) -> Result<Self, HarvestError> {
        let transport = HttpTransport::new(&config.http)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Coordinator<T> {
    /// Creates a coordinator on top of any transport
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - The configuration is invalid
    pub fn with_transport(config: Config, transport: T) -> Result<Self, HarvestError> {
        validate(&config)?;

        let origin = Url::parse(&config.site.origin)?;
        let fetcher = Fetcher::new(transport, RetryPolicy::from_config(&config.http));
        let writer = BatchWriter::new(&config.output.directory);
        let request_delay = Duration::from_millis(config.crawler.request_delay_ms);

        Ok(Self {
            config,
            fetcher,
            writer,
            origin,
            request_delay,
            state: CrawlState::new(),
        })
    }

    /// Runs the crawl to completion
    ///
    /// Page ranges of `batch-size` pages are processed in ascending order
    /// until `max-pages` is passed or a listing page cannot be fetched. Each
    /// range that produced records is flushed to `properties_batch_<N>.csv`
    /// where N is the range's ordinal. Detail-page failures are recorded and
    /// skipped; only a batch write failure aborts the run.
    pub async fn run(mut self) -> Result<CrawlReport, HarvestError> {
        let start = Instant::now();
        let max_pages = self.config.crawler.max_pages;
        let batch_size = self.config.crawler.batch_size;

        tracing::info!(
            "Starting property crawl: {} pages per batch, up to {} pages",
            batch_size,
            max_pages
        );

        let mut pages_processed = 0u32;
        let mut batch_files = Vec::new();
        let mut stop_reason = StopReason::PageCap;

        while self.state.current_page <= max_pages {
            let first_page = self.state.current_page;
            let last_page = first_page
                .saturating_add(batch_size - 1)
                .min(max_pages);

            tracing::info!(
                "[BATCH {}] Processing pages {}-{}",
                self.state.batch_number,
                first_page,
                last_page
            );

            for page in first_page..=last_page {
                self.state.advance(CrawlPhase::FetchingListing)?;

                let Some(detail_urls) = self.fetch_listing(page).await? else {
                    tracing::info!("Stopping - no more properties available");
                    stop_reason = StopReason::ListingExhausted { page };
                    break;
                };
                pages_processed += 1;

                let total = detail_urls.len();
                for (idx, url) in detail_urls.iter().enumerate() {
                    self.state.advance(CrawlPhase::FetchingDetail)?;
                    tracing::debug!("[{}/{}] Fetching property {}", idx + 1, total, url);
                    self.process_detail(url).await;
                }
            }

            self.state.advance(CrawlPhase::BatchCheck)?;
            let flushed = match self.flush_batch() {
                Ok(flushed) => flushed,
                Err(e) => {
                    tracing::error!("[BATCH {}] Save failed: {}", self.state.batch_number, e);
                    // Earlier batches stay on disk; keep the failures collected so far too
                    if let Err(log_err) = self.persist_failures() {
                        tracing::error!("Could not write failed URLs: {}", log_err);
                    }
                    return Err(e);
                }
            };
            if let Some(path) = flushed {
                batch_files.push(path);
            }
            self.state.batch_number += 1;

            if matches!(stop_reason, StopReason::ListingExhausted { .. }) {
                break;
            }
            match last_page.checked_add(1) {
                Some(next) => self.state.current_page = next,
                None => break,
            }
        }

        self.state.advance(CrawlPhase::Done)?;
        debug_assert!(self.state.phase().is_terminal());

        let failed_log = self.persist_failures()?;
        let collected = self.state.collected();
        let failed = self.state.into_failed();

        tracing::info!(
            "Scraping complete: {} total properties collected, {} failed",
            collected,
            failed.len()
        );

        Ok(CrawlReport {
            pages_processed,
            batch_files,
            collected,
            failed,
            failed_log,
            stop_reason,
            elapsed: start.elapsed(),
        })
    }

    /// Writes the failed URLs collected so far, if there are any
    fn persist_failures(&self) -> Result<Option<PathBuf>, HarvestError> {
        let failed = self.state.failed();
        if failed.is_empty() {
            return Ok(None);
        }

        let path = PathBuf::from(&self.config.output.directory)
            .join(&self.config.output.failed_urls_file);
        write_failed_urls(&path, failed)?;
        Ok(Some(path))
    }

    /// Fetches a listing page and returns its detail URLs
    ///
    /// `Ok(None)` means the listing page could not be fetched.
    async fn fetch_listing(&mut self, page: u32) -> Result<Option<Vec<String>>, HarvestError> {
        tracing::info!("[Page {}] Fetching listing...", page);

        let Some(document) = self
            .fetcher
            .fetch(&self.config.site.listing_url, Some(page))
            .await
        else {
            return Ok(None);
        };

        self.state.advance(CrawlPhase::ExtractingUrls)?;
        let urls: Vec<String> = extract_listing_urls(&document, &self.origin).collect();
        tracing::info!("Found {} properties on page {}", urls.len(), page);

        Ok(Some(urls))
    }

    /// Fetches and extracts one detail page, then waits out the pacing delay
    async fn process_detail(&mut self, url: &str) {
        match self.fetcher.fetch_outcome(url, None).await {
            Ok(body) => {
                let record = extract_property(&scraper::Html::parse_document(&body));
                tracing::info!("{} - {}", record.title, record.price);
                self.state.push_record(record);
            }
            Err(e) => {
                tracing::warn!("Skipped {} (too many failures)", url);
                self.state.record_failure(url, e.to_string());
            }
        }

        tokio::time::sleep(self.request_delay).await;
    }

    /// Writes the buffered records as the current batch, if there are any
    fn flush_batch(&mut self) -> Result<Option<PathBuf>, HarvestError> {
        if self.state.buffered() == 0 {
            tracing::debug!(
                "[BATCH {}] Nothing collected, no file written",
                self.state.batch_number
            );
            return Ok(None);
        }

        let batch_number = self.state.batch_number;
        let records = self.state.take_buffer();
        tracing::info!(
            "[BATCH {}] Saving {} properties...",
            batch_number,
            records.len()
        );

        let path = self.writer.write_batch(&records, Some(batch_number))?;
        Ok(Some(path))
    }
}

/// Runs a crawl over the network with the given configuration
///
/// # Example
///
/// ```no_run
/// use rent_harvest::config::Config;
/// use rent_harvest::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(Config::default()).await?;
/// println!("{} properties collected", report.collected);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    Coordinator::new(config)?.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::fetcher::FetchError;
    use crate::crawler::PropertyRecord;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    const LISTING_URL: &str = "https://test.ng/rent?page=";
    const ORIGIN: &str = "https://test.ng";

    /// In-memory site: known URLs answer with their page, everything else 404s
    #[derive(Default)]
    struct FakeSite {
        pages: HashMap<String, String>,
        broken: HashSet<String>,
        requests: Mutex<Vec<String>>,
    }

    impl FakeSite {
        /// Adds listing page `page` linking to `count` detail pages
        fn listing(mut self, page: u32, count: usize) -> Self {
            let mut cards = String::new();
            for i in 0..count {
                let path = format!("/property/p{}-{}", page, i);
                cards.push_str(&format!(
                    r#"<div class="property-listing"><a href="{}">card</a></div>"#,
                    path
                ));
                self.pages.insert(
                    format!("{}{}", ORIGIN, path),
                    format!(
                        r#"<div class="col-md-8"><h1>Flat {}-{}</h1></div>
                           <div class="pricing"><h2><strong>₦ {}</strong></h2></div>"#,
                        page,
                        i,
                        1000 + i
                    ),
                );
            }
            self.pages
                .insert(format!("{}{}", LISTING_URL, page), format!("<html><body>{}</body></html>", cards));
            self
        }

        fn broken(mut self, url: &str) -> Self {
            self.broken.insert(url.to_string());
            self
        }

        fn request_count(&self, url: &str) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.as_str() == url)
                .count()
        }
    }

    #[async_trait]
    impl Transport for FakeSite {
        async fn get(&self, url: &str) -> Result<String, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());

            if self.broken.contains(url) {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 500,
                });
            }

            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    fn test_config(dir: &Path, batch_size: u32, max_pages: u32) -> Config {
        let mut config = Config::default();
        config.site.listing_url = LISTING_URL.to_string();
        config.site.origin = ORIGIN.to_string();
        config.crawler.batch_size = batch_size;
        config.crawler.max_pages = max_pages;
        config.output.directory = dir.to_string_lossy().into_owned();
        config
    }

    fn rows(path: &Path) -> Vec<PropertyRecord> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .map(|r| r.unwrap())
            .collect()
    }

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_follow_page_ranges_until_exhaustion() {
        let dir = TempDir::new().unwrap();
        let mut site = FakeSite::default();
        for page in 1..=45 {
            site = site.listing(page, 1);
        }
        let site = Arc::new(site);

        let config = test_config(dir.path(), 20, 800);
        let report = Coordinator::with_transport(config, site.clone())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(
            file_names(&report.batch_files),
            vec![
                "properties_batch_1.csv",
                "properties_batch_2.csv",
                "properties_batch_3.csv"
            ]
        );
        assert_eq!(rows(&report.batch_files[0]).len(), 20);
        assert_eq!(rows(&report.batch_files[1]).len(), 20);
        assert_eq!(rows(&report.batch_files[2]).len(), 5);
        assert_eq!(report.stop_reason, StopReason::ListingExhausted { page: 46 });
        assert_eq!(report.pages_processed, 45);
        assert_eq!(report.collected, 45);
        assert!(report.failed.is_empty());
        assert!(report.failed_log.is_none());

        // The failing listing page used the full retry budget, nothing beyond it was asked for
        assert_eq!(site.request_count("https://test.ng/rent?page=46"), 3);
        assert_eq!(site.request_count("https://test.ng/rent?page=47"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_cap_stops_crawl() {
        let dir = TempDir::new().unwrap();
        let site = Arc::new(
            FakeSite::default()
                .listing(1, 2)
                .listing(2, 1)
                .listing(3, 1)
                .listing(4, 1),
        );

        let config = test_config(dir.path(), 2, 3);
        let report = Coordinator::with_transport(config, site.clone())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::PageCap);
        assert_eq!(report.pages_processed, 3);
        assert_eq!(
            file_names(&report.batch_files),
            vec!["properties_batch_1.csv", "properties_batch_2.csv"]
        );
        assert_eq!(rows(&report.batch_files[0]).len(), 3);
        assert_eq!(site.request_count("https://test.ng/rent?page=4"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detail_failures_are_recorded_and_skipped() {
        let dir = TempDir::new().unwrap();
        let site = Arc::new(
            FakeSite::default()
                .listing(1, 3)
                .broken("https://test.ng/property/p1-1"),
        );

        let config = test_config(dir.path(), 5, 1);
        let report = Coordinator::with_transport(config, site.clone())
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.collected, 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].url, "https://test.ng/property/p1-1");
        assert!(report.failed[0].reason.contains("500"));

        let titles: Vec<String> = rows(&report.batch_files[0])
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Flat 1-0", "Flat 1-2"]);

        let log = report.failed_log.unwrap();
        assert_eq!(log, dir.path().join("failed_urls.csv"));
        let logged = csv::Reader::from_path(&log).unwrap().records().count();
        assert_eq!(logged, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_applies_to_every_detail_attempt() {
        let dir = TempDir::new().unwrap();
        let site = Arc::new(
            FakeSite::default()
                .listing(1, 2)
                .broken("https://test.ng/property/p1-1"),
        );

        let config = test_config(dir.path(), 1, 1);
        let report = Coordinator::with_transport(config, site)
            .unwrap()
            .run()
            .await
            .unwrap();

        // 1s pacing after the success, 3s + 6s backoff and 1s pacing after the failure
        assert_eq!(report.elapsed, Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_range_skips_file_but_advances_batch_number() {
        let dir = TempDir::new().unwrap();
        let site = Arc::new(
            FakeSite::default()
                .listing(1, 1)
                .listing(2, 0)
                .listing(3, 1),
        );

        let config = test_config(dir.path(), 1, 3);
        let report = Coordinator::with_transport(config, site)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(
            file_names(&report.batch_files),
            vec!["properties_batch_1.csv", "properties_batch_3.csv"]
        );
        assert!(!dir.path().join("properties_batch_2.csv").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_listing_failure_ends_run_cleanly() {
        let dir = TempDir::new().unwrap();
        let site = Arc::new(FakeSite::default());

        let config = test_config(dir.path(), 20, 800);
        let report = Coordinator::with_transport(config, site)
            .unwrap()
            .run()
            .await
            .unwrap();

        assert_eq!(report.stop_reason, StopReason::ListingExhausted { page: 1 });
        assert_eq!(report.pages_processed, 0);
        assert_eq!(report.collected, 0);
        assert!(report.batch_files.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_write_failure_keeps_earlier_output() {
        let dir = TempDir::new().unwrap();
        // A directory in the way makes batch 2 unwritable
        std::fs::create_dir(dir.path().join("properties_batch_2.csv")).unwrap();
        let site = Arc::new(
            FakeSite::default()
                .listing(1, 2)
                .listing(2, 1)
                .broken("https://test.ng/property/p1-1"),
        );

        let config = test_config(dir.path(), 1, 2);
        let result = Coordinator::with_transport(config, site).unwrap().run().await;

        assert!(matches!(result, Err(HarvestError::Output(_))));

        let batch_1 = rows(&dir.path().join("properties_batch_1.csv"));
        assert_eq!(batch_1.len(), 1);
        assert_eq!(batch_1[0].title, "Flat 1-0");

        let logged: Vec<String> = csv::Reader::from_path(dir.path().join("failed_urls.csv"))
            .unwrap()
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(logged, vec!["https://test.ng/property/p1-1"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path(), 20, 800);
        config.crawler.batch_size = 0;

        let result = Coordinator::with_transport(config, FakeSite::default());
        assert!(matches!(result, Err(HarvestError::Config(_))));
    }
}
