//! Answer deduplication before submitting

use crate::page::{CORRECT_MARKER, Hint, SubmissionOutcome};
use std::cmp::Ordering;
use std::fmt;

/// A previously submitted answer and the server's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub answer: String,
    /// Server message, cut at the first `.`
    pub message: String,
    pub outcome: SubmissionOutcome,
}

impl Attempt {
    fn is_correct(&self) -> bool {
        self.message.contains(CORRECT_MARKER) || self.outcome == SubmissionOutcome::Correct
    }
}

/// Decision for a candidate answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate is one of the page's example snippets
    ExampleRejected,
    /// The page already records an accepted answer
    AlreadyCorrectKnown { correct: String },
    /// A cached submission was accepted
    AlreadyCorrectCached { correct: String },
    /// An earlier answer at least as large was too low
    TooLow { previous: String },
    /// An earlier answer at least as small was too high
    TooHigh { previous: String },
    /// Nothing rules the candidate out; submit after confirmation
    PendingSubmit,
}

impl Verdict {
    pub fn allows_submit(&self) -> bool {
        matches!(self, Verdict::PendingSubmit)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ExampleRejected => {
                write!(f, "It looks like you are using example input data")
            }
            Verdict::AlreadyCorrectKnown { correct }
            | Verdict::AlreadyCorrectCached { correct } => {
                write!(f, "This part is already solved; the correct answer was {}", correct)
            }
            Verdict::TooLow { previous } => write!(
                f,
                "Looking at previous responses your answer is too low ({} was too low)",
                previous
            ),
            Verdict::TooHigh { previous } => write!(
                f,
                "Looking at previous responses your answer is too high ({} was too high)",
                previous
            ),
            Verdict::PendingSubmit => write!(f, "Ready to submit"),
        }
    }
}

/// What happened to a submission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The policy ruled the answer out; nothing was sent
    Refused(Verdict),
    /// Confirmation was declined; nothing was sent
    Declined,
    /// The answer was sent and the reply cached
    Submitted {
        message: String,
        outcome: SubmissionOutcome,
    },
}

/// Cached state of one puzzle part that decides whether an answer is sent
#[derive(Debug, Clone, Default)]
pub struct SubmissionPolicy {
    /// Inline example snippets of the page
    pub examples: Vec<String>,
    /// Accepted answer shown on the page
    pub known_answer: Option<String>,
    /// Cached submissions, oldest first
    pub history: Vec<Attempt>,
}

impl SubmissionPolicy {
    /// Evaluate `candidate` against the rules in priority order
    pub fn evaluate(&self, candidate: &str) -> Verdict {
        if self.examples.iter().any(|example| example == candidate) {
            return Verdict::ExampleRejected;
        }

        if let Some(correct) = &self.known_answer {
            return Verdict::AlreadyCorrectKnown {
                correct: correct.clone(),
            };
        }

        if let Some(attempt) = self.history.iter().find(|attempt| {
            attempt.is_correct()
                && self
                    .known_answer
                    .as_ref()
                    .is_none_or(|known| *known == attempt.answer)
        }) {
            return Verdict::AlreadyCorrectCached {
                correct: attempt.answer.clone(),
            };
        }

        if let Some(value) = as_integer(candidate) {
            for attempt in &self.history {
                let Some(previous) = as_integer(&attempt.answer) else {
                    continue;
                };
                match attempt.outcome {
                    SubmissionOutcome::Incorrect {
                        hint: Some(Hint::TooLow),
                    } if value <= previous => {
                        return Verdict::TooLow {
                            previous: attempt.answer.clone(),
                        };
                    }
                    SubmissionOutcome::Incorrect {
                        hint: Some(Hint::TooHigh),
                    } if value >= previous => {
                        return Verdict::TooHigh {
                            previous: attempt.answer.clone(),
                        };
                    }
                    _ => {}
                }
            }
        }

        Verdict::PendingSubmit
    }
}

/// Decimal integer of any length, ordered by value
#[derive(Debug, PartialEq, Eq)]
struct Integer<'a> {
    negative: bool,
    /// Magnitude without leading zeros; empty for zero
    digits: &'a str,
}

impl Ord for Integer<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        let magnitude = self
            .digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(other.digits));
        match (self.negative, other.negative) {
            (false, false) => magnitude,
            (true, true) => magnitude.reverse(),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Integer<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parse an optionally signed run of ASCII digits, ignoring outer whitespace
fn as_integer(text: &str) -> Option<Integer<'_>> {
    let text = text.trim();
    let (negative, unsigned) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = unsigned.trim_start_matches('0');
    Some(Integer {
        negative: negative && !digits.is_empty(),
        digits,
    })
}
