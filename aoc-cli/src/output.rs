//! Output formatting for puzzle data and submission results

use aoc_puzzle::{ByPart, Hint, Part, SubmissionOutcome, SubmissionRecord, Verdict};
use chrono::{DateTime, Local};
use std::time::Duration;

/// Accepted answers, one line per part
pub fn format_answers(answers: &ByPart<Option<String>>) -> String {
    answers
        .iter()
        .map(|(part, answer)| match answer {
            Some(answer) => format!("{}: {}", part.name(), answer),
            None => format!("{}: not solved", part.name()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One line per cached submission with its local time and message
pub fn format_history(records: &[(SubmissionRecord, String)]) -> String {
    if records.is_empty() {
        return "No submissions".to_string();
    }
    records
        .iter()
        .map(|(record, message)| {
            let time: DateTime<Local> = record.submitted_at.into();
            format!(
                "{}  {:>12}  {}",
                time.format("%Y-%m-%d %H:%M:%S"),
                record.answer,
                message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Explain why an answer was not sent
pub fn describe_refusal(verdict: &Verdict, part: Part, answer: &str) -> String {
    match verdict {
        Verdict::AlreadyCorrectKnown { correct } | Verdict::AlreadyCorrectCached { correct }
            if correct == answer =>
        {
            format!("That's the right answer; {} is already solved", part.name())
        }
        Verdict::AlreadyCorrectKnown { correct } | Verdict::AlreadyCorrectCached { correct } => {
            format!(
                "That's not the right answer; your correct answer was {}",
                correct
            )
        }
        other => other.to_string(),
    }
}

/// Format a submission outcome for display
pub fn format_outcome(outcome: &SubmissionOutcome) -> String {
    match outcome {
        SubmissionOutcome::Correct => "✓ Correct".to_string(),
        SubmissionOutcome::Incorrect { hint } => match hint {
            Some(Hint::TooLow) => "✗ Incorrect (too low)".to_string(),
            Some(Hint::TooHigh) => "✗ Incorrect (too high)".to_string(),
            None => "✗ Incorrect".to_string(),
        },
        SubmissionOutcome::AlreadyCompleted => "⏭ Already completed".to_string(),
        SubmissionOutcome::Throttled { wait_time } => match wait_time {
            Some(d) => format!("⏳ Throttled (wait {})", format_duration(*d)),
            None => "⏳ Throttled".to_string(),
        },
        SubmissionOutcome::Unknown => "? Unrecognized response".to_string(),
    }
}

/// Format a wait time for display
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", d.as_millis())
    }
}
