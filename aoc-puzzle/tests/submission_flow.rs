//! End-to-end submission decisions through the puzzle facade

use aoc_http_client::{AocClient, Rate, RateLimiter};
use aoc_puzzle::{
    CacheKey, Hint, Part, Puzzle, PuzzleCache, PuzzleKey, Slot, Submission, SubmissionOutcome,
    Verdict,
};
use mockito::Matcher;
use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PART_ONE_PAGE: &str = r#"<html><body><main>
<article class="day-desc"><h2>--- Day 1: Trebuchet?! ---</h2>
<p>In this example, the calibration values of these four lines are <code>12</code>, <code>38</code>, <code>15</code>, and <code>77</code>. Adding these together produces <code>142</code>.</p>
<pre><code>1abc2
pqr3stu8vwx</code></pre>
</article>
<form method="post" action="1/answer"><input type="hidden" name="level" value="1"/></form>
</main></body></html>"#;

const PART_TWO_PAGE: &str = r#"<html><body><main>
<article class="day-desc"><h2>--- Day 1: Trebuchet?! ---</h2>
<p>Adding these together produces <code>142</code>.</p>
</article>
<p>Your puzzle answer was <code>54304</code>.</p>
<article class="day-desc"><h2 id="part2">--- Part Two ---</h2>
<p>Adding these together produces <code>281</code>.</p>
</article>
</main></body></html>"#;

const TOO_LOW: &str = "<html><body><main><article><p>That's not the right answer; your answer is too low.  If you're stuck, make sure you're using the full input data. Please wait one minute before trying again. [<a href=\"/2023/day/1\">Return to Day 1</a>]</p></article></main></body></html>";

const TOO_HIGH: &str = "<html><body><main><article><p>That's not the right answer; your answer is too high.  Please wait one minute before trying again. [<a href=\"/2023/day/1\">Return to Day 1</a>]</p></article></main></body></html>";

const CORRECT: &str = "<html><body><main><article><p>That's the right answer!  You are one gold star closer to restoring snow operations. [<a href=\"/2023/day/1#part2\">Continue to Part Two</a>]</p></article></main></body></html>";

fn cache_for(server: &mockito::Server, dir: &TempDir) -> PuzzleCache {
    let client = AocClient::builder()
        .base_url(server.url())
        .unwrap()
        .session(Some("abc123"))
        .rate_limiter(Arc::new(
            RateLimiter::in_memory(Rate::new(1000, Duration::from_secs(1))).unwrap(),
        ))
        .build()
        .unwrap();
    PuzzleCache::new(dir.path(), "default", client)
}

fn key() -> PuzzleKey {
    PuzzleKey::new(2023, 1).unwrap()
}

#[test]
fn test_example_answer_is_rejected_without_network() {
    let mut server = mockito::Server::new();
    let post = server.mock("POST", "/2023/day/1/answer").expect(0).create();
    let page = server
        .mock("GET", "/2023/day/1")
        .with_status(200)
        .with_body(PART_ONE_PAGE)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    let mut puzzle = Puzzle::new(key(), &cache);

    assert_eq!(puzzle.title().unwrap(), Some("Trebuchet?!"));
    assert_eq!(puzzle.examples().unwrap(), ["12", "38", "15", "77", "142"]);

    let asked = Cell::new(false);
    let result = puzzle
        .submit(Part::One, "142", || {
            asked.set(true);
            true
        })
        .unwrap();

    assert_eq!(result, Submission::Refused(Verdict::ExampleRejected));
    assert!(!asked.get());
    assert!(!cache.contains(&CacheKey::answer(key(), Part::One, "142")));
    post.assert();
    page.assert();
}

#[test]
fn test_previous_too_low_bounds_new_answers() {
    let mut server = mockito::Server::new();
    let page = server
        .mock("GET", "/2023/day/1")
        .with_status(200)
        .with_body(PART_ONE_PAGE)
        .expect(1)
        .create();
    let post = server
        .mock("POST", "/2023/day/1/answer")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("level".into(), "1".into()),
            Matcher::UrlEncoded("answer".into(), "150".into()),
        ]))
        .with_status(200)
        .with_body(TOO_HIGH)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    cache
        .write(&CacheKey::answer(key(), Part::One, "100"), TOO_LOW)
        .unwrap();
    let mut puzzle = Puzzle::new(key(), &cache);

    let history = puzzle.submissions(Part::One).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(
        history[0].message,
        "That's not the right answer; your answer is too low"
    );

    assert_eq!(
        puzzle.evaluate(Part::One, "50").unwrap(),
        Verdict::TooLow {
            previous: "100".to_string()
        }
    );
    assert_eq!(
        puzzle.evaluate(Part::One, "150").unwrap(),
        Verdict::PendingSubmit
    );

    // declining sends and writes nothing
    assert_eq!(
        puzzle.submit(Part::One, "150", || false).unwrap(),
        Submission::Declined
    );
    assert!(!cache.contains(&CacheKey::answer(key(), Part::One, "150")));

    let result = puzzle.submit(Part::One, "150", || true).unwrap();
    assert_eq!(
        result,
        Submission::Submitted {
            message: "That's not the right answer; your answer is too high".to_string(),
            outcome: SubmissionOutcome::Incorrect {
                hint: Some(Hint::TooHigh)
            },
        }
    );
    assert!(cache.contains(&CacheKey::answer(key(), Part::One, "150")));

    // the new record is visible and now bounds from above
    let answers: Vec<_> = puzzle
        .submissions(Part::One)
        .unwrap()
        .iter()
        .map(|attempt| attempt.answer.clone())
        .collect();
    assert_eq!(answers.len(), 2);
    assert!(answers.contains(&"150".to_string()));
    assert_eq!(
        puzzle.evaluate(Part::One, "200").unwrap(),
        Verdict::TooHigh {
            previous: "150".to_string()
        }
    );
    assert_eq!(
        puzzle.evaluate(Part::One, "120").unwrap(),
        Verdict::PendingSubmit
    );

    page.assert();
    post.assert();
}

#[test]
fn test_correct_submission_refreshes_page() {
    let mut server = mockito::Server::new();
    let page = server
        .mock("GET", "/2023/day/1")
        .with_status(200)
        .with_body(PART_TWO_PAGE)
        .expect(1)
        .create();
    let post = server
        .mock("POST", "/2023/day/1/answer")
        .with_status(200)
        .with_body(CORRECT)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    cache.write(&CacheKey::page(key()), PART_ONE_PAGE).unwrap();
    let mut puzzle = Puzzle::new(key(), &cache);

    assert!(puzzle.descriptions().unwrap().two.is_none());

    let result = puzzle.submit(Part::One, "54304", || true).unwrap();
    assert!(matches!(
        result,
        Submission::Submitted {
            outcome: SubmissionOutcome::Correct,
            ..
        }
    ));

    let answers = puzzle.answers().unwrap();
    assert_eq!(answers.one.as_deref(), Some("54304"));
    assert!(puzzle.descriptions().unwrap().two.is_some());

    // later reads come from the refreshed cache entry
    puzzle.invalidate(&Slot::ALL);
    assert!(puzzle.html().unwrap().contains("Part Two"));

    assert_eq!(
        puzzle.evaluate(Part::One, "1").unwrap(),
        Verdict::AlreadyCorrectKnown {
            correct: "54304".to_string()
        }
    );

    page.assert();
    post.assert();
}

#[test]
fn test_correct_submission_updates_page_for_next_run() {
    let mut server = mockito::Server::new();
    let page = server
        .mock("GET", "/2023/day/1")
        .with_status(200)
        .with_body(PART_TWO_PAGE)
        .expect(1)
        .create();
    let post = server
        .mock("POST", "/2023/day/1/answer")
        .with_status(200)
        .with_body(CORRECT)
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    cache.write(&CacheKey::page(key()), PART_ONE_PAGE).unwrap();

    {
        let mut puzzle = Puzzle::new(key(), &cache);
        puzzle.submit(Part::One, "54304", || true).unwrap();
    }
    assert!(cache.read(&CacheKey::page(key()), false).unwrap().contains("Part Two"));

    // a new puzzle on the same cache sees the accepted answer without fetching
    let puzzle = Puzzle::new(key(), &cache);
    assert_eq!(puzzle.answers().unwrap().one.as_deref(), Some("54304"));
    assert!(puzzle.descriptions().unwrap().two.is_some());
    assert_eq!(
        puzzle.evaluate(Part::One, "54304").unwrap(),
        Verdict::AlreadyCorrectKnown {
            correct: "54304".to_string()
        }
    );

    page.assert();
    post.assert();
}

#[test]
fn test_cached_correct_answer_blocks_resubmission() {
    let mut server = mockito::Server::new();
    let post = server.mock("POST", "/2023/day/1/answer").expect(0).create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    cache.write(&CacheKey::page(key()), PART_ONE_PAGE).unwrap();
    cache
        .write(&CacheKey::answer(key(), Part::One, "54304"), CORRECT)
        .unwrap();
    let mut puzzle = Puzzle::new(key(), &cache);

    assert_eq!(
        puzzle.submit(Part::One, "99", || true).unwrap(),
        Submission::Refused(Verdict::AlreadyCorrectCached {
            correct: "54304".to_string()
        })
    );
    post.assert();
}

#[test]
fn test_refresh_refetches_page_and_input_reload() {
    let mut server = mockito::Server::new();
    let page = server
        .mock("GET", "/2023/day/1")
        .with_status(200)
        .with_body(PART_TWO_PAGE)
        .expect(1)
        .create();
    let input = server
        .mock("GET", "/2023/day/1/input")
        .with_status(200)
        .with_body("1abc2\n")
        .expect(1)
        .create();

    let dir = TempDir::new().unwrap();
    let cache = cache_for(&server, &dir);
    cache.write(&CacheKey::page(key()), PART_ONE_PAGE).unwrap();
    cache.write(&CacheKey::input(key()), "old\n").unwrap();
    let mut puzzle = Puzzle::new(key(), &cache);

    assert_eq!(puzzle.input().unwrap(), "old\n");
    assert!(puzzle.answers().unwrap().one.is_none());

    puzzle.refresh().unwrap();
    assert_eq!(puzzle.answers().unwrap().one.as_deref(), Some("54304"));

    assert_eq!(puzzle.reload_input().unwrap(), "1abc2\n");
    assert_eq!(puzzle.input().unwrap(), "1abc2\n");

    assert_eq!(puzzle.url().unwrap().path(), "/2023/day/1");
    page.assert();
    input.assert();
}
