//! AOC HTTP Client Library
//!
//! Blocking, rate-limited access to the Advent of Code website: puzzle pages,
//! puzzle inputs and answer submissions.
//!
//! # Features
//!
//! - Generic GET/POST that only accept `200 OK` and report anything else as
//!   [`AocError::Fetch`] with status and reason
//! - A rolling-window [`RateLimiter`] persisted in SQLite, shared by every
//!   process that opens the same store
//! - Optional session cookie, sent as a sensitive header and zeroized after use
//! - Secure TLS using rustls (no OpenSSL dependencies)
//! - Session verification against the settings page
//!
//! # Example
//!
//! ```no_run
//! use aoc_http_client::{AocClient, RateLimiter};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let limiter = Arc::new(RateLimiter::open(Path::new(".advent-tool/ratelimit.sqlite"))?);
//! let client = AocClient::builder()
//!     .user_agent("my-tool/1.0 (me@example.com)")
//!     .session(std::env::var("AOC_SESSION").ok())
//!     .rate_limiter(limiter)
//!     .build()?;
//!
//! let input = client.get(client.input_url(2024, 1)?)?;
//! let result = client.post(client.answer_url(2024, 1)?, &[("level", "1"), ("answer", "42")])?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod rate_limit;

pub use client::{
    AocClient, AocClientBuilder, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, REQUEST_TIMEOUT,
    SessionInfo,
};
pub use error::{AocError, RateLimitError};
pub use rate_limit::{DEFAULT_MAX_DELAY, Rate, RateLimiter};
pub use reqwest::{StatusCode, Url};
