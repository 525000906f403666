//! Cache keys and on-disk layout

use crate::error::CacheError;
use crate::filename;
use crate::part::Part;
use std::fmt;
use std::path::PathBuf;

/// First year puzzles were published
pub const FIRST_YEAR: u16 = 2015;

/// Identifies one puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PuzzleKey {
    year: u16,
    day: u8,
}

impl PuzzleKey {
    /// Create a key, rejecting years before 2015 and days outside 1..=25
    pub fn new(year: u16, day: u8) -> Result<Self, CacheError> {
        if year < FIRST_YEAR {
            return Err(CacheError::InvalidKey(format!(
                "year must be {} or later, got {}",
                FIRST_YEAR, year
            )));
        }
        if !(1..=25).contains(&day) {
            return Err(CacheError::InvalidKey(format!(
                "day must be between 1 and 25, got {}",
                day
            )));
        }
        Ok(Self { year, day })
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    /// `{year}/{day:02}`
    pub fn relative_dir(&self) -> PathBuf {
        PathBuf::from(self.year.to_string()).join(format!("{:02}", self.day))
    }
}

impl fmt::Display for PuzzleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} day {}", self.year, self.day)
    }
}

/// Category of remote content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Page,
    Input,
    AnswerResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Resource {
    Page,
    Input,
    Answer {
        part: Part,
        answer: String,
        discriminator: String,
    },
}

/// Identity of one cache entry
///
/// Answer keys always carry a part and a discriminator; page and input keys
/// never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    puzzle: PuzzleKey,
    resource: Resource,
}

impl CacheKey {
    pub fn page(puzzle: PuzzleKey) -> Self {
        Self {
            puzzle,
            resource: Resource::Page,
        }
    }

    pub fn input(puzzle: PuzzleKey) -> Self {
        Self {
            puzzle,
            resource: Resource::Input,
        }
    }

    /// Key of the server response to submitting `answer` for `part`
    pub fn answer(puzzle: PuzzleKey, part: Part, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        let discriminator = filename::encode(&answer);
        Self {
            puzzle,
            resource: Resource::Answer {
                part,
                answer,
                discriminator,
            },
        }
    }

    pub fn puzzle(&self) -> PuzzleKey {
        self.puzzle
    }

    pub fn kind(&self) -> ResourceKind {
        match self.resource {
            Resource::Page => ResourceKind::Page,
            Resource::Input => ResourceKind::Input,
            Resource::Answer { .. } => ResourceKind::AnswerResult,
        }
    }

    pub fn part(&self) -> Option<Part> {
        match &self.resource {
            Resource::Answer { part, .. } => Some(*part),
            _ => None,
        }
    }

    /// Raw answer text of an answer key
    pub fn answer_text(&self) -> Option<&str> {
        match &self.resource {
            Resource::Answer { answer, .. } => Some(answer),
            _ => None,
        }
    }

    /// Encoded answer of an answer key
    pub fn discriminator(&self) -> Option<&str> {
        match &self.resource {
            Resource::Answer { discriminator, .. } => Some(discriminator),
            _ => None,
        }
    }

    /// Path of the entry relative to the user's cache root
    pub fn relative_path(&self) -> PathBuf {
        let dir = self.puzzle.relative_dir();
        match &self.resource {
            Resource::Page => dir.join("index.html"),
            Resource::Input => dir.join("input.txt"),
            Resource::Answer {
                part, discriminator, ..
            } => answer_dir(self.puzzle, *part).join(format!("{}.html", discriminator)),
        }
    }
}

/// Directory holding every submission record of one part
pub(crate) fn answer_dir(puzzle: PuzzleKey, part: Part) -> PathBuf {
    puzzle
        .relative_dir()
        .join("answer")
        .join(part.level().to_string())
}
