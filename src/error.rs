//! Error types for neovate-wrapped

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The data root itself could not be listed. This is the only failure
    /// that aborts a scan.
    #[error("cannot read data directory {}: {source}", path.display())]
    DataRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model catalog could not be fetched or parsed
    #[error("model catalog error: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
