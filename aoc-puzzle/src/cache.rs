//! Fetch-through on-disk cache

use crate::error::CacheError;
use crate::filename;
use crate::key::{self, CacheKey, PuzzleKey, ResourceKind};
use crate::part::Part;
use aoc_http_client::AocClient;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Longest file name most filesystems accept, in bytes
const MAX_FILE_NAME: usize = 255;

/// One cached answer submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub answer: String,
    /// Server response fragment exactly as cached
    pub server_message: String,
    /// Modification time of the cache entry
    pub submitted_at: SystemTime,
}

/// Maps cache keys to text blobs under `{cache_dir}/{user}`
///
/// Entries are served verbatim once written. A miss, or a forced refresh,
/// fetches through the [`AocClient`] and replaces the entry atomically.
#[derive(Debug, Clone)]
pub struct PuzzleCache {
    root: PathBuf,
    client: AocClient,
}

impl PuzzleCache {
    /// Create a cache for `user` below `cache_dir`
    ///
    /// The user name is encoded so any string is a single path segment.
    pub fn new(cache_dir: impl AsRef<Path>, user: &str, client: AocClient) -> Self {
        Self {
            root: cache_dir.as_ref().join(filename::encode(user)),
            client,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn client(&self) -> &AocClient {
        &self.client
    }

    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.relative_path())
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    /// Return the entry for `key`, fetching it on a miss or when forced
    ///
    /// # Errors
    ///
    /// * `CacheError::Fetch` - the remote request failed; nothing is written
    /// * `CacheError::Storage` - the entry could not be read or written
    pub fn read(&self, key: &CacheKey, force_refresh: bool) -> Result<String, CacheError> {
        let path = self.path_for(key);

        if !force_refresh {
            match fs::read_to_string(&path) {
                Ok(content) => {
                    debug!(path = %path.display(), "Cache hit");
                    return Ok(content);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Cache miss");
                }
                Err(source) => return Err(CacheError::Storage { path, source }),
            }
        }

        let content = self.fetch(key)?;
        write_atomic(&path, &content)?;
        Ok(content)
    }

    /// Replace the entry for `key` with `content`
    pub fn write(&self, key: &CacheKey, content: &str) -> Result<(), CacheError> {
        write_atomic(&self.path_for(key), content)
    }

    /// Submit `answer` for `part` and cache the server's response
    ///
    /// # Errors
    ///
    /// * `CacheError::InvalidKey` - the record's file name would be too long;
    ///   nothing is sent
    pub fn post_answer(
        &self,
        puzzle: PuzzleKey,
        part: Part,
        answer: &str,
    ) -> Result<String, CacheError> {
        let key = CacheKey::answer(puzzle, part, answer);
        let path = self.path_for(&key);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if temp_name(&name).len() > MAX_FILE_NAME {
            return Err(CacheError::InvalidKey(format!(
                "answer of {} bytes is too long to record",
                answer.len()
            )));
        }
        self.read(&key, true)
    }

    pub fn page(&self, puzzle: PuzzleKey, force_refresh: bool) -> Result<String, CacheError> {
        self.read(&CacheKey::page(puzzle), force_refresh)
    }

    pub fn input(&self, puzzle: PuzzleKey, force_refresh: bool) -> Result<String, CacheError> {
        self.read(&CacheKey::input(puzzle), force_refresh)
    }

    /// Every cached submission for `part`, oldest first
    ///
    /// Temp files and names that do not decode are skipped. Entries with the
    /// same modification time are ordered by file name.
    pub fn list_submissions(
        &self,
        puzzle: PuzzleKey,
        part: Part,
    ) -> Result<Vec<SubmissionRecord>, CacheError> {
        let dir = self.root.join(key::answer_dir(puzzle, part));
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(CacheError::Storage { path: dir, source }),
        };

        let storage = |path: &Path| {
            let path = path.to_path_buf();
            move |source: io::Error| CacheError::Storage { path, source }
        };

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry.map_err(storage(&dir))?;
            let path = entry.path();
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                warn!(path = %path.display(), "Skipping cache entry with non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let Some(token) = name.strip_suffix(".html") else {
                continue;
            };

            let answer = match filename::decode(token) {
                Ok(answer) => answer,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping undecodable cache entry");
                    continue;
                }
            };

            let submitted_at = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .map_err(storage(&path))?;
            let server_message = fs::read_to_string(&path).map_err(storage(&path))?;

            found.push((
                token.to_string(),
                SubmissionRecord {
                    answer,
                    server_message,
                    submitted_at,
                },
            ));
        }

        found.sort_by(|(a_name, a), (b_name, b)| {
            a.submitted_at
                .cmp(&b.submitted_at)
                .then_with(|| a_name.cmp(b_name))
        });
        Ok(found.into_iter().map(|(_, record)| record).collect())
    }

    fn fetch(&self, key: &CacheKey) -> Result<String, CacheError> {
        let puzzle = key.puzzle();
        let (year, day) = (puzzle.year(), puzzle.day());

        let content = match (key.kind(), key.part(), key.answer_text()) {
            (ResourceKind::Page, ..) => self.client.get(self.client.page_url(year, day)?)?,
            (ResourceKind::Input, ..) => self.client.get(self.client.input_url(year, day)?)?,
            (ResourceKind::AnswerResult, Some(part), Some(answer)) => {
                let level = part.level().to_string();
                self.client.post(
                    self.client.answer_url(year, day)?,
                    &[("level", level.as_str()), ("answer", answer)],
                )?
            }
            (ResourceKind::AnswerResult, ..) => {
                return Err(CacheError::InvalidKey(
                    "answer key without part or answer".to_string(),
                ));
            }
        };
        Ok(content)
    }
}

/// Write `content` to a temp file next to `path`, then rename it into place
///
/// Readers see either the old entry or the complete new one.
fn write_atomic(path: &Path, content: &str) -> Result<(), CacheError> {
    let storage = |path: &Path, source: io::Error| CacheError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| storage(dir, e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = dir.join(temp_name(&name));

    let written = fs::File::create(&temp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&temp_path, path)) {
        let _ = fs::remove_file(&temp_path);
        return Err(storage(path, e));
    }

    debug!(path = %path.display(), bytes = content.len(), "Cache entry written");
    Ok(())
}

fn temp_name(name: &str) -> String {
    format!(".{}.{}.tmp", name, std::process::id())
}
