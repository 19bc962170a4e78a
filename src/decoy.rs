// Decoy responses for Stolypote
// Maps a request's extension (or /robots.txt) to a canned payload file

use crate::error::HoneypotError;
use crate::models::path_extension;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ROBOTS_PATH: &str = "/robots.txt";
pub const ROBOTS_KEY: &str = "robots.txt";
pub const DEFAULT_BODY: &str = "ok";
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// What the selector decided to send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoy {
    pub body: Bytes,
    pub content_type: String,
    /// Mapped payload file name, `None` for the default reply
    pub source: Option<String>,
}

impl Decoy {
    pub fn fallback() -> Self {
        Self {
            body: Bytes::from_static(DEFAULT_BODY.as_bytes()),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            source: None,
        }
    }
}

/// Static key -> payload file table, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct ResponseMapping {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ResponseMapping {
    /// An empty mapping: every request gets the default reply.
    pub fn empty(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Loads `mapping_file`. A missing file yields an empty mapping.
    pub fn load(mapping_file: &Path, responses_dir: &Path) -> Self {
        match std::fs::read_to_string(mapping_file) {
            Ok(text) => Self::parse(&text, responses_dir),
            Err(e) => {
                warn!(path = %mapping_file.display(), error = %e, "no response mapping file, serving only 'ok'");
                Self::empty(responses_dir)
            }
        }
    }

    /// Parses `key = filename` lines. Comments, blanks, malformed lines and
    /// entries whose payload does not exist are skipped.
    pub fn parse(text: &str, responses_dir: &Path) -> Self {
        let mut mapping = Self::empty(responses_dir);
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, file) = match line.split_once('=') {
                Some((k, f)) => (k.trim(), f.trim()),
                None => {
                    warn!(%line, "invalid response mapping line");
                    continue;
                }
            };
            if key.is_empty() || file.is_empty() {
                warn!(%line, "invalid response mapping line");
                continue;
            }
            let target = responses_dir.join(file);
            if !target.exists() {
                warn!(path = %target.display(), "response file does not exist");
                continue;
            }
            mapping.entries.insert(key.to_string(), file.to_string());
        }
        info!(entries = ?mapping.entries, "loaded response mappings");
        mapping
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookup key for a request path: `robots.txt` for `/robots.txt`, otherwise the extension.
    pub fn lookup_key(path: &str) -> Option<&str> {
        if path == ROBOTS_PATH {
            Some(ROBOTS_KEY)
        } else {
            path_extension(path)
        }
    }

    /// Picks the payload for `path`. Only a mapped but unreadable payload is an error.
    pub async fn select(&self, path: &str) -> Result<Decoy, HoneypotError> {
        let file = match Self::lookup_key(path).and_then(|key| self.get(key)) {
            Some(file) => file,
            None => return Ok(Decoy::fallback()),
        };
        let full_path = self.dir.join(file);
        let body = tokio::fs::read(&full_path)
            .await
            .map_err(|source| HoneypotError::DecoyUnreadable {
                path: full_path.clone(),
                source,
            })?;
        let content_type = mime_guess::from_path(file)
            .first_raw()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();
        Ok(Decoy {
            body: Bytes::from(body),
            content_type,
            source: Some(file.to_string()),
        })
    }
}
