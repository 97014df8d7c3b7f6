use crate::types::Tick;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Cannot choose from an empty collection")]
    EmptyInput,

    #[error("{resource} used before it was initialized")]
    UninitializedResource { resource: &'static str },

    #[error("Fetch failed for asset '{id}': {source}")]
    Fetch {
        id: String,
        #[source]
        source: FetchError,
    },

    #[error("Asset '{id}' could not be decoded: {reason}")]
    Decode { id: String, reason: String },

    #[error("Recording out of order at event {index}: tick {tick} follows tick {previous}")]
    UnorderedRecording {
        index: usize,
        tick: Tick,
        previous: Tick,
    },

    #[error("Recording '{id}' not found")]
    RecordingNotFound { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure reported by a data-fetch collaborator.
///
/// A fatal failure aborts the preload pass (and the enclosing `reset`).
/// A non-fatal one only leaves that asset out of the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub message: String,
    pub fatal: bool,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
        }
    }

    pub fn not_found(id: &str) -> Self {
        Self::new(format!("no data for '{id}'"))
    }

    /// A failure that should skip the asset without aborting the pass.
    pub fn non_fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
        }
    }
}
