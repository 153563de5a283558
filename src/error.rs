use thiserror::Error;

/// Contract violations on palette data and session operations.
///
/// Every fallible session method checks its precondition up front and
/// returns one of these without touching state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaletteError {
    #[error("invalid hex color: {0:?}")]
    InvalidColor(String),

    #[error("a palette needs at least one color")]
    EmptyPalette,

    #[error("unknown mood: {0}")]
    UnknownMood(String),

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures talking to the lookup service. None of these are retried.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("lookup request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("lookup service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("lookup response was not a palette list: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Anything a picker action can fail with.
#[derive(Debug, Error)]
pub enum PickerError {
    #[error(transparent)]
    Palette(#[from] PaletteError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
