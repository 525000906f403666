//! Solution templates and saved input files

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Template used when no template file is configured
pub const DEFAULT_TEMPLATE: &str = r#"//! Advent of Code {year} day {day}: {title}
//!
//! {url}

fn parse(input: &str) -> Vec<&str> {
    input.lines().collect()
}

fn part_one(input: &str) -> usize {
    parse(input).len()
}

fn part_two(input: &str) -> usize {
    parse(input).len()
}

fn main() {
    let input = include_str!("../../input/{year}/day{day:02}.txt");
    println!("Part one: {}", part_one(input));
    println!("Part two: {}", part_two(input));
}
"#;

/// Values substituted into templates and output paths
#[derive(Debug, Clone, Copy)]
pub struct TemplateVars<'a> {
    pub year: u16,
    pub day: u8,
    pub title: &'a str,
    pub url: &'a str,
}

/// Replace `{year}`, `{day}`, `{day:02}`, `{title}` and `{url}`
///
/// Substituted values are never scanned again. Anything else in braces is
/// left untouched.
pub fn render(template: &str, vars: &TemplateVars<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];

        let Some(end) = rest.find('}') else { break };
        match &rest[1..end] {
            "year" => out.push_str(&vars.year.to_string()),
            "day" => out.push_str(&vars.day.to_string()),
            "day:02" => out.push_str(&format!("{:02}", vars.day)),
            "title" => out.push_str(vars.title),
            "url" => out.push_str(vars.url),
            _ => {
                out.push('{');
                rest = &rest[1..];
                continue;
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    out
}

/// Write `content` to `path` unless it already exists
///
/// Parent directories are created. Returns whether the file was written.
pub fn write_new(path: &Path, content: &str) -> io::Result<bool> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    match fs::OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(mut file) => {
            file.write_all(content.as_bytes())?;
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e),
    }
}
