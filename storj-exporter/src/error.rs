use reqwest::StatusCode;

/// Failure of a single upstream call. Never leaves the client: it is logged
/// and replaced by the empty snapshot.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Connection problems and 5xx answers are worth another attempt.
    /// Timeouts are not: the per-call timeout already bounds the wait.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport { source, .. } => !source.is_timeout(),
            ApiError::Status { status, .. } => status.is_server_error(),
            ApiError::Decode { .. } => false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ExpositionError {
    #[error("failed to encode metric families: {0}")]
    Encode(#[from] prometheus::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("exposition output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Why a satellite entry of the node snapshot was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SatelliteEntryError {
    #[error("satellite entry is not an object")]
    NotAnObject,
    #[error("satellite entry has no id")]
    MissingId,
    #[error("satellite {0} has no url")]
    MissingUrl(String),
}
