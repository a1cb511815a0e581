use std::fmt;

use crate::domain::PutParameterRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    ParameterAlreadyExists(String),
    Throttled(String),
    RequestFailed(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterAlreadyExists(msg) => write!(f, "Parameter already exists: {}", msg),
            Self::Throttled(msg) => write!(f, "Request throttled: {}", msg),
            Self::RequestFailed(msg) => write!(f, "Request failed: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Write capability of a remote parameter store.
///
/// Implementations must be safe to share between tasks: the writer calls
/// `put_parameter` concurrently through a single `Arc`.
#[async_trait::async_trait]
pub trait ParameterStore: Send + Sync {
    /// Creates the parameter, or replaces it when the request allows
    /// overwriting. Returns the version the store assigned.
    async fn put_parameter(&self, request: &PutParameterRequest) -> Result<i64, StoreError>;
}
