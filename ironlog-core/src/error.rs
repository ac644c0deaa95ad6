use thiserror::Error;

/// Error taxonomy for every data-service operation surface.
///
/// Validation failures never reach a store; quota exhaustion is kept
/// distinct from generic storage faults so callers can show a specific
/// message for it.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DataError {
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("local storage quota exceeded")]
    QuotaExceeded,

    #[error("local storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("remote {op} failed: {source}")]
    Remote {
        op: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

impl DataError {
    pub fn remote(op: &'static str, source: impl Into<anyhow::Error>) -> Self {
        DataError::Remote {
            op,
            source: source.into(),
        }
    }

    /// True when the error came from the remote leg and a local retry can
    /// make sense under `fallback_to_local`.
    pub fn is_remote(&self) -> bool {
        matches!(self, DataError::Remote { .. })
    }
}

pub type Result<T, E = DataError> = std::result::Result<T, E>;
