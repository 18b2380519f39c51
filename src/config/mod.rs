//! Configuration module for Rent-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Without a file the crawler runs on built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use rent_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will stop after page {}", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, HttpConfig, OutputConfig, SiteConfig, DEFAULT_LISTING_URL,
    DEFAULT_ORIGIN, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
