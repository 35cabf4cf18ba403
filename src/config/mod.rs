//! Configuration module for Crawl-Tasks
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use crawl_tasks::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl-tasks.toml")).unwrap();
//! println!("Requests time out after {}ms", config.backend.timeout_ms);
//! ```

mod parser;
mod types;
pub(crate) mod validation;

// Re-export types
pub use types::{
    AnalysisConfig, BackendConfig, Config, PollConfig, DEFAULT_BASE_URL, DEFAULT_STRATEGY,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
