//! Error types for the CLI

use std::path::PathBuf;
use thiserror::Error;

/// Main CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Config file is not valid TOML or has mistyped keys
    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Cache or puzzle error
    #[error("Cache error: {0}")]
    Cache(#[from] aoc_puzzle::CacheError),

    /// HTTP client error
    #[error("HTTP client error: {0}")]
    Http(#[from] aoc_http_client::AocError),

    /// Rate limiter store could not be opened
    #[error("Rate limiter error: {0}")]
    RateLimit(#[from] aoc_http_client::RateLimitError),

    /// Session cookie rejected by the server
    #[error("Invalid session: could not fetch user ID")]
    InvalidSession,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
