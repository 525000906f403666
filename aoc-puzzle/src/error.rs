//! Error types for the puzzle cache

use std::path::PathBuf;
use thiserror::Error;

/// Error type for cache and puzzle operations
#[derive(Debug, Error)]
pub enum CacheError {
    /// Fetching from the remote site failed (non-200, network, rate limiter)
    #[error("Fetch failed: {0}")]
    Fetch(#[from] aoc_http_client::AocError),

    /// A cache file or directory could not be read or written
    #[error("Cache storage error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Year, day or part outside the accepted range
    #[error("Invalid puzzle key: {0}")]
    InvalidKey(String),
}

/// Error type for cached file names that do not decode back to an answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The name is empty
    #[error("Encoded name is empty")]
    Empty,
    /// A character outside `[A-Za-z0-9%]`
    #[error("Unexpected character {0:?} in encoded name")]
    InvalidChar(char),
    /// A `%` not followed by two hex digits
    #[error("Malformed escape at byte {0}")]
    BadEscape(usize),
    /// The decoded bytes are not UTF-8
    #[error("Decoded name is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
