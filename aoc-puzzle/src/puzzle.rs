//! Per-puzzle facade with memoized page attributes

use crate::cache::PuzzleCache;
use crate::error::CacheError;
use crate::key::PuzzleKey;
use crate::page::{Description, PageParser, SubmissionOutcome};
use crate::part::{ByPart, Part};
use crate::policy::{Attempt, Submission, SubmissionPolicy, Verdict};
use aoc_http_client::Url;
use std::cell::OnceCell;
use tracing::info;

/// Named memo slots of a [`Puzzle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Html,
    Title,
    Descriptions,
    Answers,
    Examples,
    Submissions,
    Input,
}

impl Slot {
    /// Slots derived from the puzzle page
    pub const PAGE: [Slot; 5] = [
        Slot::Html,
        Slot::Title,
        Slot::Descriptions,
        Slot::Answers,
        Slot::Examples,
    ];

    pub const ALL: [Slot; 7] = [
        Slot::Html,
        Slot::Title,
        Slot::Descriptions,
        Slot::Answers,
        Slot::Examples,
        Slot::Submissions,
        Slot::Input,
    ];
}

/// One puzzle, read through a [`PuzzleCache`]
///
/// Every attribute is computed on first use and kept until its slot is
/// invalidated.
#[derive(Debug)]
pub struct Puzzle<'c> {
    key: PuzzleKey,
    cache: &'c PuzzleCache,
    parser: PageParser,
    html: OnceCell<String>,
    title: OnceCell<Option<String>>,
    descriptions: OnceCell<ByPart<Option<Description>>>,
    answers: OnceCell<ByPart<Option<String>>>,
    examples: OnceCell<Vec<String>>,
    submissions: OnceCell<ByPart<Vec<Attempt>>>,
    input: OnceCell<String>,
}

impl<'c> Puzzle<'c> {
    pub fn new(key: PuzzleKey, cache: &'c PuzzleCache) -> Self {
        info!(puzzle = %key, "Loading puzzle");
        Self {
            key,
            cache,
            parser: PageParser::new(),
            html: OnceCell::new(),
            title: OnceCell::new(),
            descriptions: OnceCell::new(),
            answers: OnceCell::new(),
            examples: OnceCell::new(),
            submissions: OnceCell::new(),
            input: OnceCell::new(),
        }
    }

    pub fn key(&self) -> PuzzleKey {
        self.key
    }

    /// Drop the memoized values of `slots`
    pub fn invalidate(&mut self, slots: &[Slot]) {
        for slot in slots {
            match slot {
                Slot::Html => drop(self.html.take()),
                Slot::Title => drop(self.title.take()),
                Slot::Descriptions => drop(self.descriptions.take()),
                Slot::Answers => drop(self.answers.take()),
                Slot::Examples => drop(self.examples.take()),
                Slot::Submissions => drop(self.submissions.take()),
                Slot::Input => drop(self.input.take()),
            }
        }
    }

    pub fn url(&self) -> Result<Url, CacheError> {
        Ok(self
            .cache
            .client()
            .page_url(self.key.year(), self.key.day())?)
    }

    /// Raw page HTML
    pub fn html(&self) -> Result<&str, CacheError> {
        memo(&self.html, || self.cache.page(self.key, false)).map(String::as_str)
    }

    pub fn title(&self) -> Result<Option<&str>, CacheError> {
        let html = self.html()?;
        memo(&self.title, || Ok(self.parser.title(html))).map(Option::as_deref)
    }

    pub fn descriptions(&self) -> Result<&ByPart<Option<Description>>, CacheError> {
        let html = self.html()?;
        memo(&self.descriptions, || Ok(self.parser.descriptions(html)))
    }

    /// Accepted answers shown on the page
    pub fn answers(&self) -> Result<&ByPart<Option<String>>, CacheError> {
        let html = self.html()?;
        memo(&self.answers, || Ok(self.parser.answers(html)))
    }

    pub fn examples(&self) -> Result<&[String], CacheError> {
        let html = self.html()?;
        memo(&self.examples, || Ok(self.parser.examples(html))).map(Vec::as_slice)
    }

    pub fn input(&self) -> Result<&str, CacheError> {
        memo(&self.input, || self.cache.input(self.key, false)).map(String::as_str)
    }

    /// Fetch the input again, replacing the cached entry
    pub fn reload_input(&mut self) -> Result<&str, CacheError> {
        self.invalidate(&[Slot::Input]);
        let input = self.cache.input(self.key, true)?;
        Ok(self.input.get_or_init(|| input).as_str())
    }

    /// Cached submissions for `part`, oldest first
    pub fn submissions(&self, part: Part) -> Result<&[Attempt], CacheError> {
        let all = memo(&self.submissions, || {
            let load = |part| -> Result<Vec<Attempt>, CacheError> {
                Ok(self
                    .cache
                    .list_submissions(self.key, part)?
                    .into_iter()
                    .map(|record| Attempt {
                        message: self.parser.submission_message(&record.server_message),
                        outcome: self.parser.submission_outcome(&record.server_message),
                        answer: record.answer,
                    })
                    .collect())
            };
            Ok(ByPart {
                one: load(Part::One)?,
                two: load(Part::Two)?,
            })
        })?;
        Ok(all.get(part).as_slice())
    }

    /// Policy inputs for `part` gathered from the page and submission history
    pub fn policy(&self, part: Part) -> Result<SubmissionPolicy, CacheError> {
        Ok(SubmissionPolicy {
            examples: self.examples()?.to_vec(),
            known_answer: self.answers()?.get(part).clone(),
            history: self.submissions(part)?.to_vec(),
        })
    }

    pub fn evaluate(&self, part: Part, answer: &str) -> Result<Verdict, CacheError> {
        Ok(self.policy(part)?.evaluate(answer))
    }

    /// Submit `answer` for `part` if the policy allows it and `confirm` agrees
    ///
    /// Nothing is sent or written when the answer is refused or confirmation
    /// is declined. A correct answer refreshes the cached page right away so
    /// later reads see the accepted answer and the newly unlocked part.
    pub fn submit(
        &mut self,
        part: Part,
        answer: &str,
        confirm: impl FnOnce() -> bool,
    ) -> Result<Submission, CacheError> {
        let verdict = self.evaluate(part, answer)?;
        if !verdict.allows_submit() {
            info!(puzzle = %self.key, %part, answer, ?verdict, "Submission refused");
            return Ok(Submission::Refused(verdict));
        }
        if !confirm() {
            return Ok(Submission::Declined);
        }

        let html = self.cache.post_answer(self.key, part, answer)?;
        self.invalidate(&[Slot::Submissions]);

        let message = self.parser.submission_message(&html);
        let outcome = self.parser.submission_outcome(&html);
        info!(puzzle = %self.key, %part, answer, %message, "Submitted answer");

        if outcome == SubmissionOutcome::Correct {
            self.refresh()?;
        }
        Ok(Submission::Submitted { message, outcome })
    }

    /// Fetch the page again and drop everything derived from it
    pub fn refresh(&mut self) -> Result<(), CacheError> {
        self.invalidate(&Slot::PAGE);
        self.invalidate(&[Slot::Submissions]);
        let html = self.cache.page(self.key, true)?;
        self.html.get_or_init(|| html);
        Ok(())
    }
}

fn memo<T>(
    cell: &OnceCell<T>,
    init: impl FnOnce() -> Result<T, CacheError>,
) -> Result<&T, CacheError> {
    if let Some(value) = cell.get() {
        return Ok(value);
    }
    let value = init()?;
    Ok(cell.get_or_init(|| value))
}
