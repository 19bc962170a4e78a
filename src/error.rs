// Error types for Stolypote
// Only startup and listener faults are fatal; everything else is logged and degraded

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HoneypotError {
    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write capture record {path}: {source}")]
    CaptureWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode capture record: {0}")]
    CaptureEncode(#[from] serde_json::Error),

    #[error("decoy payload {path} is unreadable: {source}")]
    DecoyUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("listener error: {0}")]
    Listener(#[from] io::Error),
}
