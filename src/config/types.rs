use serde::Deserialize;

/// Default listing URL; the page number is appended verbatim
pub const DEFAULT_LISTING_URL: &str = "https://propertypro.ng/property-for-rent/in/lagos?page=";

/// Default origin used to resolve relative detail links
pub const DEFAULT_ORIGIN: &str = "https://propertypro.ng";

/// Default client identity sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure for Rent-Harvest
///
/// Every section is optional in the TOML file; missing sections and keys
/// fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the listings live
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Listing URL template; the page number is appended to it
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Origin that relative detail links are resolved against
    pub origin: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: DEFAULT_LISTING_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

/// Crawl pacing and batching
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of listing pages flushed together as one batch file
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Highest listing page number that will be requested
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Pause after every detail-page attempt (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            max_pages: 800,
            request_delay_ms: 1000,
        }
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Retries after the first attempt
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff before retry `k` is `k * retry_backoff_ms`
    #[serde(rename = "retry-backoff-ms")]
    pub retry_backoff_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 20,
            max_retries: 2,
            retry_backoff_ms: 3000,
        }
    }
}

/// Output locations
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding batch files and the combined file
    pub directory: String,

    /// File name (inside `directory`) for the failed-URL log
    #[serde(rename = "failed-urls-file")]
    pub failed_urls_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            failed_urls_file: "failed_urls.csv".to_string(),
        }
    }
}
