//! AOC CLI - fetch, cache and submit Advent of Code puzzles

mod cli;
mod config;
mod error;
mod output;
mod template;

use aoc_http_client::{AocClient, RateLimiter};
use aoc_puzzle::{PageParser, Part, Puzzle, PuzzleCache, PuzzleKey, Submission};
use clap::Parser;
use cli::{Args, Command, PuzzleCommand};
use config::Settings;
use error::CliError;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use template::TemplateVars;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` applies unless `-v` is given
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let settings = Settings::from_args(&args)?;
    let limiter = Arc::new(RateLimiter::open(&settings.rate_limit_store())?);

    match args.command {
        Command::Login => login(&settings, limiter),
        Command::Puzzle(command) => {
            let key = config::resolve_puzzle(args.year, args.day, chrono::Utc::now())?;
            run_puzzle(key, command, &settings, limiter)
        }
    }
}

fn run_puzzle(
    key: PuzzleKey,
    command: PuzzleCommand,
    settings: &Settings,
    limiter: Arc<RateLimiter>,
) -> Result<(), CliError> {
    let client = AocClient::builder()
        .base_url(settings.http_root.as_str())?
        .user_agent(settings.user_agent.as_str())
        .session(settings.session.as_ref().map(|s| s.as_str()))
        .rate_limiter(limiter)
        .build()?;
    if !client.has_session() {
        eprintln!(
            "Warning: No session found; run `aoc login` or set {}",
            config::SESSION_ENV
        );
    }

    let cache = PuzzleCache::new(settings.cache_dir(), &settings.user, client);
    let mut puzzle = Puzzle::new(key, &cache);

    match command {
        PuzzleCommand::Title => println!("{}", puzzle.title()?.unwrap_or_default()),
        PuzzleCommand::Page { refresh } => {
            if refresh {
                puzzle.refresh()?;
            }
            print_page(&puzzle)?;
        }
        PuzzleCommand::Input { refresh } => {
            let input = if refresh {
                puzzle.reload_input()?
            } else {
                puzzle.input()?
            };
            print!("{}", input);
        }
        PuzzleCommand::Answers => println!("{}", output::format_answers(puzzle.answers()?)),
        PuzzleCommand::History { part } => {
            let part = Part::try_from(part)?;
            let parser = PageParser::new();
            let records: Vec<_> = cache
                .list_submissions(key, part)?
                .into_iter()
                .map(|record| {
                    let message = parser.submission_message(&record.server_message);
                    (record, message)
                })
                .collect();
            println!("{}", output::format_history(&records));
        }
        PuzzleCommand::Refresh => {
            puzzle.refresh()?;
            println!("Refreshed {}", key);
        }
        PuzzleCommand::Submit { part, answer, yes } => {
            submit(&mut puzzle, Part::try_from(part)?, &answer, yes)?
        }
        PuzzleCommand::Init => init(settings, &puzzle)?,
    }

    Ok(())
}

fn print_page(puzzle: &Puzzle<'_>) -> Result<(), CliError> {
    for (part, description) in puzzle.descriptions()?.iter() {
        match description {
            Some(description) => println!("{}\n", description.text),
            None => println!("{} is locked\n", part.name()),
        }
    }
    Ok(())
}

fn submit(puzzle: &mut Puzzle<'_>, part: Part, answer: &str, yes: bool) -> Result<(), CliError> {
    let key = puzzle.key();
    println!("Your answer to {} is {}", part.name(), answer);

    match puzzle.submit(part, answer, || yes || confirm("Ready to submit (Y/N)? "))? {
        Submission::Refused(verdict) => {
            println!("{}", output::describe_refusal(&verdict, part, answer))
        }
        Submission::Declined => println!("Not submitted"),
        Submission::Submitted { message, outcome } => {
            println!("Submitted {} {}: {}", key, part.name(), answer);
            println!("{}", message);
            println!("{}", output::format_outcome(&outcome));
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => line.trim().eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

fn login(settings: &Settings, limiter: Arc<RateLimiter>) -> Result<(), CliError> {
    let session = config::prompt_session("Paste the session cookie from adventofcode.com")?;

    let client = AocClient::builder()
        .base_url(settings.http_root.as_str())?
        .user_agent(settings.user_agent.as_str())
        .rate_limiter(limiter)
        .build()?;
    let user_id = client
        .verify_session(&session)?
        .user_id
        .ok_or(CliError::InvalidSession)?;

    let path = config::store_session(&settings.tool_path, &session)?;
    info!(user_id, path = %path.display(), "Session stored");
    println!("Logged in as user #{}; session saved to {}", user_id, path.display());
    Ok(())
}

fn init(settings: &Settings, puzzle: &Puzzle<'_>) -> Result<(), CliError> {
    let key = puzzle.key();
    let url = puzzle.url()?.to_string();
    let title = puzzle.title()?.unwrap_or_default().to_string();
    let vars = TemplateVars {
        year: key.year(),
        day: key.day(),
        title: &title,
        url: &url,
    };

    if settings.template.enabled {
        let content = match &settings.template.file {
            Some(file) => std::fs::read_to_string(config::expand_tilde(file))?,
            None => template::DEFAULT_TEMPLATE.to_string(),
        };
        let path = PathBuf::from(template::render(&settings.template.path, &vars));
        report_write(&path, template::write_new(&path, &template::render(&content, &vars))?);
    }

    if settings.input.enabled {
        let path = PathBuf::from(template::render(&settings.input.path, &vars));
        report_write(&path, template::write_new(&path, puzzle.input()?)?);
    }
    Ok(())
}

fn report_write(path: &std::path::Path, written: bool) {
    if written {
        println!("Created {}", path.display());
    } else {
        println!("Skipped {} (already exists)", path.display());
    }
}
