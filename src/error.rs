use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabError {
    #[error("invalid {field} selector `{selector}`: {reason}")]
    Selector {
        field: &'static str,
        selector: String,
        reason: String,
    },

    #[error("failed to read {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, VocabError>;
