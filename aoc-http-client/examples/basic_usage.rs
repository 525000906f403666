//! Basic usage example for the AOC HTTP client
//!
//! This example demonstrates how to:
//! - Open a durable rate limiter shared with other processes
//! - Create a client with a session cookie and user agent
//! - Verify the session cookie
//! - Fetch a puzzle page and its input
//!
//! Note: This example requires a valid AOC session cookie in `AOC_SESSION`.

use aoc_http_client::{AocClient, AocError, RateLimiter};
use std::path::Path;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = std::env::var("AOC_SESSION").ok();

    println!("=== Opening rate limiter ===");
    let limiter = Arc::new(RateLimiter::open(Path::new(
        ".advent-tool/ratelimit.sqlite",
    ))?);
    println!(
        "✓ {} requests already recorded in the current window",
        limiter.recent_requests()?
    );

    let client = AocClient::builder()
        .user_agent("aoc-http-client basic_usage example")
        .session(session.as_deref())
        .rate_limiter(limiter)
        .build()?;

    if let Some(session) = session.as_deref() {
        println!("\nVerifying session cookie...");
        match client.verify_session(session)?.user_id {
            Some(user_id) => println!("✓ Session is valid (User ID: {})", user_id),
            None => println!("✗ Session is invalid"),
        }
    } else {
        println!("\nNo AOC_SESSION set, requests will be unauthenticated");
    }

    let (year, day) = (2024, 1);
    println!("\nFetching page for year {} day {}...", year, day);
    let page = client.get(client.page_url(year, day)?)?;
    println!("✓ Page fetched ({} bytes)", page.len());

    println!("\nFetching input...");
    match client.get(client.input_url(year, day)?) {
        Ok(input) => println!("✓ Input fetched ({} bytes)", input.len()),
        Err(AocError::Fetch { status, reason }) => {
            println!("✗ Server refused the input: {} {}", status.as_u16(), reason)
        }
        Err(e) => println!("✗ Failed to fetch input: {}", e),
    }

    Ok(())
}
