//! CLI argument parsing using clap

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Advent of Code puzzle fetcher and answer submitter
#[derive(Parser, Debug)]
#[command(
    name = "aoc",
    about = "Fetch, cache and submit Advent of Code puzzles",
    version
)]
pub struct Args {
    /// Puzzle year (defaults to the current or most recent event)
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u16).range(2015..))]
    pub year: Option<u16>,

    /// Puzzle day (defaults to today during December)
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u8).range(1..=25))]
    pub day: Option<u8>,

    /// User name for cache organization
    #[arg(long, global = true, default_value = "default")]
    pub user: String,

    /// Tool directory holding the cache, session and rate limiter store
    #[arg(long, global = true, default_value = ".advent-tool")]
    pub tool_path: PathBuf,

    /// Config file
    #[arg(long, global = true, default_value = ".advent-tool.toml")]
    pub config: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Store and verify a session cookie
    Login,

    #[command(flatten)]
    Puzzle(PuzzleCommand),
}

/// Commands that act on a single puzzle
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleCommand {
    /// Print the puzzle title
    Title,

    /// Print the puzzle description of every unlocked part
    Page {
        /// Fetch the page again instead of using the cache
        #[arg(long)]
        refresh: bool,
    },

    /// Print the puzzle input
    Input {
        /// Fetch the input again instead of using the cache
        #[arg(long)]
        refresh: bool,
    },

    /// Print the accepted answers shown on the puzzle page
    Answers,

    /// List cached submissions for a part, oldest first
    History {
        /// Part to list
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
        part: u8,
    },

    /// Fetch the puzzle page again
    Refresh,

    /// Submit an answer after checking it against the cache
    Submit {
        /// Part the answer is for
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=2))]
        part: u8,

        /// The answer
        #[arg(allow_negative_numbers = true)]
        answer: String,

        /// Submit without asking for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Write the solution template and save the puzzle input
    Init,
}
