//! Persistent rolling-window rate limiter
//!
//! Request timestamps live in an SQLite table so that separate invocations of
//! the tool draw from one shared budget. Every admission decision runs inside
//! a single `BEGIN EXCLUSIVE` transaction, which serializes concurrent
//! processes on the database lock.

use crate::error::RateLimitError;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS rate_bucket (
        name TEXT NOT NULL,
        timestamp_ms INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_rate_bucket_timestamp ON rate_bucket(timestamp_ms);
";

/// Shortest sleep between two admission attempts
const MIN_POLL: Duration = Duration::from_millis(10);
/// Longest sleep between two admission attempts
const MAX_POLL: Duration = Duration::from_millis(250);
/// How long a connection waits for another process to release the store
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);
/// Default upper bound on the time a single `acquire` may block
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Number of requests allowed inside a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    /// Maximum requests dispatched within any window
    pub capacity: u32,
    /// Length of the rolling window
    pub window: Duration,
}

impl Rate {
    pub const fn new(capacity: u32, window: Duration) -> Self {
        Self { capacity, window }
    }

    fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

impl Default for Rate {
    /// Three requests every three seconds, one per second on average
    fn default() -> Self {
        Self::new(3, Duration::from_secs(3))
    }
}

/// Rate limiter backed by a durable SQLite bucket
///
/// The handle is meant to be created once and passed to every client that
/// talks to the remote site. Cloning is done through `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    conn: Mutex<Connection>,
    rate: Rate,
    max_delay: Duration,
}

impl RateLimiter {
    /// Open (or create) the store at `path` with the default rate
    pub fn open(path: &Path) -> Result<Self, RateLimitError> {
        Self::open_with_rate(path, Rate::default())
    }

    /// Open (or create) the store at `path` with a custom rate
    pub fn open_with_rate(path: &Path, rate: Rate) -> Result<Self, RateLimitError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::from_connection(conn, rate)
    }

    /// Limiter whose state only lives as long as this process
    pub fn in_memory(rate: Rate) -> Result<Self, RateLimitError> {
        Self::from_connection(Connection::open_in_memory()?, rate)
    }

    fn from_connection(conn: Connection, rate: Rate) -> Result<Self, RateLimitError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            rate,
            max_delay: DEFAULT_MAX_DELAY,
        })
    }

    /// Change the upper bound on the time a single `acquire` may block
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// The configured rate
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Block until a request slot is free, then record the request under `key`
    ///
    /// The wait happens in bounded sleeps; the store is re-read after every
    /// sleep because other processes may have taken or freed slots meanwhile.
    ///
    /// # Errors
    ///
    /// * `RateLimitError::Storage` - the store is corrupt or unreachable
    /// * `RateLimitError::DelayExceeded` - no slot freed up within the maximum delay
    pub fn acquire(&self, key: &str) -> Result<(), RateLimitError> {
        let started = Instant::now();
        let mut throttled = false;

        loop {
            let Some(wait) = self.try_acquire(key)? else {
                if throttled {
                    debug!(key, waited = ?started.elapsed(), "Rate limit slot acquired");
                }
                return Ok(());
            };

            let waited = started.elapsed();
            if waited + wait > self.max_delay {
                return Err(RateLimitError::DelayExceeded { waited });
            }
            if !throttled {
                info!(key, wait_ms = wait.as_millis() as u64, "Enforcing HTTP rate limits");
                throttled = true;
            }
            std::thread::sleep(wait.clamp(MIN_POLL, MAX_POLL));
        }
    }

    /// Number of requests recorded inside the current window
    pub fn recent_requests(&self) -> Result<u32, RateLimitError> {
        let conn = self.conn.lock().map_err(|_| RateLimitError::LockPoisoned)?;
        let window_start = now_ms() - self.rate.window_ms();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rate_bucket WHERE timestamp_ms > ?1",
            params![window_start],
            |row| row.get(0),
        )?;
        Ok(count as u32)
    }

    /// One admission attempt
    ///
    /// Returns `None` once the request is recorded, or the time until the
    /// oldest blocking request leaves the window.
    fn try_acquire(&self, key: &str) -> Result<Option<Duration>, RateLimitError> {
        let mut conn = self.conn.lock().map_err(|_| RateLimitError::LockPoisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Exclusive)?;

        let now = now_ms();
        let window_ms = self.rate.window_ms();
        tx.execute(
            "DELETE FROM rate_bucket WHERE timestamp_ms <= ?1",
            params![now - window_ms],
        )?;

        let in_window: i64 =
            tx.query_row("SELECT COUNT(*) FROM rate_bucket", [], |row| row.get(0))?;

        if in_window < i64::from(self.rate.capacity) {
            tx.execute(
                "INSERT INTO rate_bucket (name, timestamp_ms) VALUES (?1, ?2)",
                params![key, now],
            )?;
            tx.commit()?;
            return Ok(None);
        }

        // A slot frees up when the capacity-th most recent request expires
        let offset = i64::from(self.rate.capacity.saturating_sub(1));
        let blocking: Option<i64> = tx
            .query_row(
                "SELECT timestamp_ms FROM rate_bucket ORDER BY timestamp_ms DESC LIMIT 1 OFFSET ?1",
                params![offset],
                |row| row.get(0),
            )
            .optional()?;
        tx.commit()?;

        let wait_ms = blocking.map_or(1, |ts| (ts + window_ms - now).max(1));
        Ok(Some(Duration::from_millis(wait_ms as u64)))
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
