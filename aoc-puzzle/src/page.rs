//! HTML page and submission response parsing

use crate::part::ByPart;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::cell::OnceCell;
use std::time::Duration;

/// Marker the server uses for an accepted answer
pub const CORRECT_MARKER: &str = "That's the right answer";

/// Result of a submission, as classified from the server's message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Answer is correct
    Correct,
    /// Answer is wrong, with the server's hint if it gave one
    Incorrect { hint: Option<Hint> },
    /// Part already completed
    AlreadyCompleted,
    /// Submitted too recently, with the wait time if it could be parsed
    Throttled { wait_time: Option<Duration> },
    /// Message not recognized
    Unknown,
}

/// Direction hint given for a wrong numeric answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    TooLow,
    TooHigh,
}

/// One part's description article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Description {
    /// Raw `<article>` markup
    pub html: String,
    /// Text content with surrounding whitespace trimmed
    pub text: String,
}

/// Parser for puzzle pages and answer responses with cached selectors
#[derive(Clone, Debug, Default)]
pub struct PageParser {
    title_regex: OnceCell<Regex>,
    throttle_regex: OnceCell<Regex>,
    heading_selector: OnceCell<Selector>,
    description_selector: OnceCell<Selector>,
    paragraph_selector: OnceCell<Selector>,
    code_selector: OnceCell<Selector>,
    article_selector: OnceCell<Selector>,
    main_selector: OnceCell<Selector>,
}

impl PageParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn title_regex(&self) -> &Regex {
        self.title_regex
            .get_or_init(|| Regex::new(r"--- Day (?:\d+): (?P<title>.+) ---").unwrap())
    }

    fn throttle_regex(&self) -> &Regex {
        self.throttle_regex
            .get_or_init(|| Regex::new(r"You have (.+?) left to wait").unwrap())
    }

    fn selector<'a>(cell: &'a OnceCell<Selector>, css: &str) -> &'a Selector {
        cell.get_or_init(|| Selector::parse(css).unwrap())
    }

    fn description_selector(&self) -> &Selector {
        Self::selector(&self.description_selector, "article.day-desc")
    }

    fn code_selector(&self) -> &Selector {
        Self::selector(&self.code_selector, "code")
    }

    fn paragraph_selector(&self) -> &Selector {
        Self::selector(&self.paragraph_selector, "p")
    }

    /// Puzzle title from the `--- Day N: TITLE ---` heading
    ///
    /// Double quotes are replaced with single quotes.
    pub fn title(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let headings = Self::selector(&self.heading_selector, "h2");

        document.select(headings).find_map(|heading| {
            let text = heading.text().collect::<String>();
            let captures = self.title_regex().captures(&text)?;
            Some(captures["title"].replace('"', "'"))
        })
    }

    /// Description articles by position: part one, then part two
    pub fn descriptions(&self, html: &str) -> ByPart<Option<Description>> {
        let document = Html::parse_document(html);
        ByPart::from_ordered(document.select(self.description_selector()).map(|article| {
            Description {
                html: article.html(),
                text: article.text().collect::<String>().trim().to_string(),
            }
        }))
    }

    /// Accepted answers recorded on the page, by position
    pub fn answers(&self, html: &str) -> ByPart<Option<String>> {
        let document = Html::parse_document(html);
        ByPart::from_ordered(
            document
                .select(self.paragraph_selector())
                .filter(|p| text_of(p).starts_with("Your puzzle answer was"))
                .filter_map(|p| p.select(self.code_selector()).next())
                .map(|code| text_of(&code)),
        )
    }

    /// Inline `<code>` snippets of the description articles
    ///
    /// Code inside `<pre>` blocks is example input, not an example answer,
    /// and is left out.
    pub fn examples(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(self.description_selector())
            .flat_map(|article| article.select(self.code_selector()))
            .filter(|code| !inside_pre(code))
            .map(|code| text_of(&code))
            .collect()
    }

    /// Message of an answer response: the first paragraph of the first
    /// article, up to its first `.`
    pub fn submission_message(&self, html: &str) -> String {
        let text = self.first_paragraph(html).unwrap_or_default();
        match text.split_once('.') {
            Some((message, _)) => message.to_string(),
            None => text,
        }
    }

    /// Classify an answer response
    pub fn submission_outcome(&self, html: &str) -> SubmissionOutcome {
        let document = Html::parse_document(html);
        let article = Self::selector(&self.article_selector, "article");
        let main = Self::selector(&self.main_selector, "main");
        let text = document
            .select(article)
            .next()
            .or_else(|| document.select(main).next())
            .map(|element| text_of(&element))
            .unwrap_or_else(|| document.root_element().text().collect());

        classify(&text, self.throttle_regex())
    }

    fn first_paragraph(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        let article = Self::selector(&self.article_selector, "article");
        let paragraph = document
            .select(article)
            .next()?
            .select(self.paragraph_selector())
            .next()?;
        Some(text_of(&paragraph))
    }
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

fn inside_pre(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "pre")
}

fn classify(text: &str, throttle_regex: &Regex) -> SubmissionOutcome {
    if text.contains(CORRECT_MARKER) {
        return SubmissionOutcome::Correct;
    }

    if text.contains("not the right answer") {
        let hint = if text.contains("too low") {
            Some(Hint::TooLow)
        } else if text.contains("too high") {
            Some(Hint::TooHigh)
        } else {
            None
        };
        return SubmissionOutcome::Incorrect { hint };
    }

    if text.contains("already complete it") {
        return SubmissionOutcome::AlreadyCompleted;
    }

    if text.contains("gave an answer too recently") {
        let wait_time = throttle_regex
            .captures(text)
            .and_then(|captures| humantime::parse_duration(&captures[1]).ok());
        return SubmissionOutcome::Throttled { wait_time };
    }

    SubmissionOutcome::Unknown
}
