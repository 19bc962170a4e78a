// Fixed on-disk layout for Stolypote
// The binary always uses the container paths; tests root the same layout in a temp dir

use crate::error::HoneypotError;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN: &str = "0.0.0.0:65111";

/// Turns a listen address into something `TcpListener::bind` can resolve.
/// Host names pass through; a bare `:port` listens on every interface.
pub fn bind_target(listen: &str) -> String {
    let listen = listen.trim();
    if listen.starts_with(':') {
        format!("0.0.0.0{}", listen)
    } else {
        listen.to_string()
    }
}

/// Where wordlists, capture records and decoy payloads live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoneypotPaths {
    pub wordlists: PathBuf,
    pub dump: PathBuf,
    pub responses: PathBuf,
    pub response_map: PathBuf,
}

impl Default for HoneypotPaths {
    fn default() -> Self {
        Self::under("/app")
    }
}

impl HoneypotPaths {
    /// Same layout as the container, rooted at `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let wordlists = root.join("wordlists");
        Self {
            dump: wordlists.join("dump").join("http"),
            wordlists,
            responses: root.join("responses"),
            response_map: root.join("config").join("responses.txt"),
        }
    }

    /// Create the persistence directories. Failing here must stop startup.
    pub fn ensure_directories(&self) -> Result<(), HoneypotError> {
        for dir in [&self.dump, &self.wordlists] {
            std::fs::create_dir_all(dir).map_err(|source| HoneypotError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
