use scaffold_protocol::{ErrorCode, ServiceError};
use thiserror::Error;

/// Failures of a single scaffold fetch. Any of these means the record buffer
/// was discarded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not load FASTA index for '{path}': {reason}")]
    IndexLoadFailed { path: String, reason: String },
    #[error("Could not fetch scaffold '{scaffold}' from '{path}': {reason}")]
    ScaffoldNotFound {
        path: String,
        scaffold: String,
        reason: String,
    },
    #[error("Could not append {needed} bytes to record buffer (limit {limit} bytes)")]
    BufferWriteFailed { needed: usize, limit: usize },
}

impl FetchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::IndexLoadFailed { .. } => ErrorCode::IndexLoadFailed,
            Self::ScaffoldNotFound { .. } => ErrorCode::ScaffoldNotFound,
            Self::BufferWriteFailed { .. } => ErrorCode::BufferWriteFailed,
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("No local index matches '{0}' and no peer store ran the request")]
    NoStoreAvailable(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OrchestrationError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoStoreAvailable(_) => ErrorCode::NoStoreAvailable,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read service config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse service config '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Service config '{0}' lists no index files")]
    NoIndexFiles(String),
}

impl From<&FetchError> for ServiceError {
    fn from(err: &FetchError) -> Self {
        ServiceError::new(err.code(), err.to_string())
    }
}

impl From<&OrchestrationError> for ServiceError {
    fn from(err: &OrchestrationError) -> Self {
        ServiceError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_maps_to_service_error() {
        let err = FetchError::BufferWriteFailed {
            needed: 12,
            limit: 8,
        };
        let summary = ServiceError::from(&err);
        assert_eq!(summary.code, ErrorCode::BufferWriteFailed);
        assert!(summary.message.contains("limit 8"));
    }

    #[test]
    fn test_orchestration_error_codes() {
        let err = OrchestrationError::NoStoreAvailable("unknownX".to_string());
        assert_eq!(err.code(), ErrorCode::NoStoreAvailable);
        assert!(err.to_string().contains("unknownX"));
        assert_eq!(
            OrchestrationError::InvalidRequest("x".to_string()).code(),
            ErrorCode::InvalidRequest
        );
    }
}
