use thiserror;

/// The Result type for the terminal front end.
pub(crate) type Result<T> = std::result::Result<T, TuiError>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum TuiError {
    #[error("out of bounds x - {0}")]
    OutOfBoundsX(usize),

    #[error("out of bounds y - {0}")]
    OutOfBoundsY(usize),

    #[error("terminal too small, required minimum size {0} x {1}")]
    TerminalTooSmall(usize, usize),

    #[error("terminal io error")]
    StdIOError(#[from] std::io::Error),
}
