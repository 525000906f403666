//! Settings resolved from the config file, environment and CLI args

use crate::cli::Args;
use crate::error::CliError;
use aoc_http_client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
use aoc_puzzle::PuzzleKey;
use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use zeroize::Zeroizing;

/// File holding the session cookie inside the tool directory
pub const SESSION_FILE: &str = "session.txt";

/// Rate limiter store inside the tool directory
pub const RATE_LIMIT_FILE: &str = "ratelimit.sqlite";

/// Environment variable checked when no session file exists
pub const SESSION_ENV: &str = "AOC_SESSION";

/// Contents of `.advent-tool.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FileConfig {
    pub http: HttpSection,
    pub template: TemplateSection,
    pub input: InputSection,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpSection {
    pub root: String,
    pub user_agent: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            root: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TemplateSection {
    pub enabled: bool,
    /// Template file; the built-in template is used when unset
    pub file: Option<PathBuf>,
    /// Output path pattern
    pub path: String,
}

impl Default for TemplateSection {
    fn default() -> Self {
        Self {
            enabled: true,
            file: None,
            path: "src/{year}/day{day:02}.rs".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InputSection {
    pub enabled: bool,
    /// Output path pattern
    pub path: String,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "input/{year}/day{day:02}.txt".to_string(),
        }
    }
}

impl FileConfig {
    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, CliError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(path, &content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn parse(path: &Path, content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Resolved runtime settings
pub struct Settings {
    /// Tool directory (cache, session file, rate limiter store)
    pub tool_path: PathBuf,
    /// Cache user segment
    pub user: String,
    pub http_root: String,
    pub user_agent: String,
    /// Session key (zeroized on drop)
    pub session: Option<Zeroizing<String>>,
    pub template: TemplateSection,
    pub input: InputSection,
}

impl Settings {
    /// Build settings from CLI args, the config file and the environment
    pub fn from_args(args: &Args) -> Result<Self, CliError> {
        let tool_path = expand_tilde(&args.tool_path);
        let file = FileConfig::load(&expand_tilde(&args.config))?;
        let session = find_session(&tool_path, std::env::var(SESSION_ENV).ok())?;

        Ok(Settings {
            tool_path,
            user: args.user.clone(),
            http_root: file.http.root,
            user_agent: file.http.user_agent,
            session,
            template: file.template,
            input: file.input,
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.tool_path.join("cache")
    }

    pub fn rate_limit_store(&self) -> PathBuf {
        self.tool_path.join(RATE_LIMIT_FILE)
    }
}

/// Expand ~ to home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str()
        && (path_str.starts_with("~/") || path_str == "~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(path_str.get(2..).unwrap_or_default());
    }
    path.to_path_buf()
}

/// Session from `{tool_path}/session.txt`, then from `env_value`
///
/// Blank values count as missing.
pub fn find_session(
    tool_path: &Path,
    env_value: Option<String>,
) -> Result<Option<Zeroizing<String>>, CliError> {
    let path = tool_path.join(SESSION_FILE);
    match fs::read_to_string(&path) {
        Ok(content) => {
            let content = Zeroizing::new(content);
            let session = content.trim();
            if !session.is_empty() {
                debug!(path = %path.display(), "Using session from file");
                return Ok(Some(Zeroizing::new(session.to_string())));
            }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    Ok(env_value
        .map(Zeroizing::new)
        .filter(|session| !session.trim().is_empty()))
}

/// Write the session to `{tool_path}/session.txt`, readable by the owner only
pub fn store_session(tool_path: &Path, session: &str) -> Result<PathBuf, CliError> {
    fs::create_dir_all(tool_path)?;
    let path = tool_path.join(SESSION_FILE);
    fs::write(&path, session.trim())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(path)
}

/// Prompt user for session token
pub fn prompt_session(reason: &str) -> Result<Zeroizing<String>, CliError> {
    println!("{}", reason);
    let s = rpassword::prompt_password("Enter AOC session key: ")
        .map_err(|e| CliError::Config(format!("Failed to read session: {}", e)))?;
    let s = Zeroizing::new(s);
    if s.trim().is_empty() {
        return Err(CliError::Config("Session token is required.".to_string()));
    }
    Ok(Zeroizing::new(s.trim().to_string()))
}

/// Puzzle named by `year` and `day`, filling gaps from the event calendar
///
/// Puzzles unlock at midnight US Eastern time. Without `--year` the current
/// event is used in December and the previous one otherwise; without
/// `--day` today's puzzle is used, which only exists from December 1st to
/// 25th.
pub fn resolve_puzzle(
    year: Option<u16>,
    day: Option<u8>,
    now: DateTime<Utc>,
) -> Result<PuzzleKey, CliError> {
    let eastern = FixedOffset::west_opt(5 * 3600)
        .ok_or_else(|| CliError::Config("Invalid time zone offset".to_string()))?;
    let today = now.with_timezone(&eastern).date_naive();
    let in_event = today.month() == 12 && today.day() <= 25;

    let current_event = if today.month() == 12 {
        today.year()
    } else {
        today.year() - 1
    };
    let year = match year {
        Some(year) => year,
        None => u16::try_from(current_event)
            .map_err(|_| CliError::Config(format!("Unsupported year {}", current_event)))?,
    };

    let day = match day {
        Some(day) => day,
        None if in_event && i32::from(year) == today.year() => today.day() as u8,
        None => {
            return Err(CliError::Config(
                "No puzzle today; pass --day".to_string(),
            ));
        }
    };

    Ok(PuzzleKey::new(year, day)?)
}
