//! Configuration module for Scrape-Herald
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every key has a default, so running without a file is
//! equivalent to loading an empty one.
//!
//! # Example
//!
//! ```no_run
//! use scrape_herald::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("herald.toml")).unwrap();
//! println!("Fetch timeout: {}ms", config.fetch.timeout_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, WebhookConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
