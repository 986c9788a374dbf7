use std::path::PathBuf;

use thiserror;

/// The Result type for slide48.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("io error")]
    StdIOError(#[from] std::io::Error),

    #[error("log error")]
    LogError(#[from] log::SetLoggerError),

    #[error("{source}")]
    TuiError {
        #[from]
        source: crate::tui::error::TuiError,
    },

    #[error("unable to encode score store: {0}")]
    StoreEncode(#[from] serde_json::Error),

    #[error("unable to decode score store {path:?}: {source}")]
    StoreDecode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unable to write score store {path:?}: {source}")]
    StoreWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}
