use thiserror::Error;

/// Failure to obtain the album catalog. The console keeps running with an
/// empty catalog when this happens.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog endpoint returned HTTP {0}")]
    Status(u16),

    #[error("catalog response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// A saved response given with `--catalog-file` could not be read.
    #[error("catalog file could not be read: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by recorder commands. Catalog failures never reach the
/// recorder; they stay a `FetchError` and are shown in the footer.
#[derive(Debug, Error)]
pub enum SetlistError {
    #[error("Invalid time {0:?}; expected HH:MM:SS.")]
    Format(String),

    #[error("setlist index {index} is out of range for {len} entries")]
    OutOfRange { index: usize, len: usize },

    #[error("No song selected.")]
    NoSongSelected,
}
