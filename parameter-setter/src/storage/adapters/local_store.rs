use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use crate::domain::{PutParameterRequest, ValueType};
use crate::storage::repository::{ParameterStore, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredParameter {
    pub value: String,
    pub value_type: ValueType,
    pub version: i64,
}

/// In-memory parameter store.
///
/// Applies the same overwrite rules as the remote store and records every
/// request it receives, so tests can assert on what a writer forwarded.
#[derive(Clone, Default)]
pub struct LocalParameterStore {
    parameters: Arc<RwLock<HashMap<String, StoredParameter>>>,
    requests: Arc<Mutex<Vec<PutParameterRequest>>>,
    failure: Option<StoreError>,
    latency: Option<Duration>,
}

impl LocalParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails with `error`, after being recorded.
    pub fn failing_with(error: StoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Delays each call by `latency` before touching the store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn get(&self, key: &str) -> Option<StoredParameter> {
        self.parameters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.parameters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `put_parameter` calls received, successful or not.
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn requests(&self) -> Vec<PutParameterRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl std::fmt::Debug for LocalParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalParameterStore")
            .field("parameters", &self.len())
            .field("calls", &self.calls())
            .finish()
    }
}

#[async_trait::async_trait]
impl ParameterStore for LocalParameterStore {
    async fn put_parameter(&self, request: &PutParameterRequest) -> Result<i64, StoreError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        let mut parameters = self
            .parameters
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let version = match parameters.get(request.key()) {
            Some(_) if !request.overwrite() => {
                return Err(StoreError::ParameterAlreadyExists(format!(
                    "The parameter {} already exists",
                    request.key()
                )));
            }
            Some(existing) => existing.version + 1,
            None => 1,
        };

        parameters.insert(
            request.key().to_string(),
            StoredParameter {
                value: request.value().to_string(),
                value_type: request.value_type(),
                version,
            },
        );

        Ok(version)
    }
}
