//! Error types for the AOC HTTP client

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when using the AOC HTTP client
#[derive(Error, Debug)]
pub enum AocError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with anything other than 200 OK
    #[error("HTTP {status}: {reason}")]
    Fetch {
        /// The status code that was received
        status: reqwest::StatusCode,
        /// Reason phrase for the status
        reason: String,
    },

    /// Failed to decode response as UTF-8
    #[error("Failed to decode response as UTF-8")]
    Encoding,

    /// Client initialization failed
    #[error("Client initialization failed: {0}")]
    ClientInit(String),

    /// The shared rate limiter could not admit the request
    #[error("Rate limiter failed: {0}")]
    RateLimit(#[from] RateLimitError),
}

/// Errors raised by the persistent rate limiter
#[derive(Error, Debug)]
pub enum RateLimitError {
    /// The SQLite store is corrupt, locked for too long or unwritable
    #[error("Rate limit store error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The directory holding the store could not be created
    #[error("Rate limit store directory error: {0}")]
    StoreDir(#[from] std::io::Error),

    /// A previous holder of the connection panicked
    #[error("Rate limit store connection poisoned")]
    LockPoisoned,

    /// Waiting for a slot took longer than the configured maximum delay
    #[error("Rate limit delay exceeded after waiting {waited:?}")]
    DelayExceeded {
        /// Time already spent waiting
        waited: Duration,
    },
}
