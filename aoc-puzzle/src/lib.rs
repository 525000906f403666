//! Puzzle cache and submission guard for Advent of Code
//!
//! Pages, inputs and answer responses are fetched once through an
//! [`AocClient`](aoc_http_client::AocClient) and kept on disk under
//! `{cache_dir}/{user}/{year}/{day:02}/`. Answer responses are stored one
//! file per submitted answer, named with a reversible filesystem-safe
//! encoding, so the submission history of a part can be rebuilt from the
//! cache alone. Before an answer is sent, [`SubmissionPolicy`] checks it
//! against the page's examples, the accepted answers and earlier hints.
//!
//! # Example
//!
//! ```no_run
//! use aoc_http_client::AocClient;
//! use aoc_puzzle::{Part, Puzzle, PuzzleCache, PuzzleKey, Submission};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AocClient::builder().session(Some("your_session_cookie")).build()?;
//! let cache = PuzzleCache::new(".advent-tool/cache", "default", client);
//!
//! let mut puzzle = Puzzle::new(PuzzleKey::new(2023, 1)?, &cache);
//! println!("{}", puzzle.title()?.unwrap_or("untitled"));
//!
//! match puzzle.submit(Part::One, "142", || true)? {
//!     Submission::Refused(verdict) => println!("Not sent: {}", verdict),
//!     Submission::Declined => {}
//!     Submission::Submitted { message, .. } => println!("{}", message),
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod error;
pub mod filename;
mod key;
mod page;
mod part;
mod policy;
mod puzzle;

pub use cache::{PuzzleCache, SubmissionRecord};
pub use error::{CacheError, DecodeError};
pub use key::{CacheKey, FIRST_YEAR, PuzzleKey, ResourceKind};
pub use page::{CORRECT_MARKER, Description, Hint, PageParser, SubmissionOutcome};
pub use part::{ByPart, Part};
pub use policy::{Attempt, Submission, SubmissionPolicy, Verdict};
pub use puzzle::{Puzzle, Slot};
