//! Configuration module for Steam-Harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and layering command-line overrides on top of it.
//!
//! # Example
//!
//! ```no_run
//! use steam_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Harvester will rank the top {} apps", config.crawler.top_n);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, EndpointConfig, OutputConfig, UserAgentConfig, DEFAULT_DETAILS_URL,
    DEFAULT_LISTING_URL, DEFAULT_REVIEWS_URL,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, resolve_config, ConfigOverrides,
};
