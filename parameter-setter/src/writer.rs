use std::{fmt, sync::Arc};

use tracing::{debug, warn};

use crate::{
    configs::SetterConfig,
    context::{Interruption, RequestContext},
    domain::{DomainError, PutParameterRequest, ValueType},
    storage::{
        adapters::ssm_store::SsmParameterStore,
        repository::{ParameterStore, StoreError},
    },
};

#[derive(Debug)]
pub enum SetterError {
    /// Rejected locally; nothing was sent to the store.
    InvalidInput(DomainError),
    PutFailed {
        key: String,
        source: StoreError,
    },
    /// The context fired before the store answered. The write may or may not
    /// have been applied.
    Interrupted {
        key: String,
        reason: Interruption,
    },
}

impl SetterError {
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidInput(_) => None,
            Self::PutFailed { key, .. } | Self::Interrupted { key, .. } => Some(key),
        }
    }
}

impl fmt::Display for SetterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "{}", err),
            Self::PutFailed { key, source } => {
                write!(f, "failed to put parameter {}: {}", key, source)
            }
            Self::Interrupted { key, reason } => {
                write!(f, "failed to put parameter {}: {}", key, reason)
            }
        }
    }
}

impl std::error::Error for SetterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::PutFailed { source, .. } => Some(source),
            Self::Interrupted { reason, .. } => Some(reason),
        }
    }
}

impl From<DomainError> for SetterError {
    fn from(err: DomainError) -> Self {
        Self::InvalidInput(err)
    }
}

/// Creates or updates parameters in a parameter store.
///
/// The writer holds a shared handle to its store and nothing else, so it can
/// be cloned freely and used from many tasks at once. Concurrent writes to
/// the same key are not ordered; the store keeps whichever it applies last.
pub struct ParameterWriter<S = SsmParameterStore>
where
    S: ParameterStore + ?Sized,
{
    store: Arc<S>,
}

impl ParameterWriter<SsmParameterStore> {
    /// Writer bound to `ssm_region`, or to the region from the environment
    /// or shared config file when it is empty. Credentials come from the
    /// default provider chain; problems with either surface on the first
    /// `put`.
    pub async fn new(ssm_region: &str) -> Self {
        Self::from_config(&SetterConfig::new(ssm_region)).await
    }

    pub async fn from_config(config: &SetterConfig) -> Self {
        Self::with_store(Arc::new(SsmParameterStore::new(config).await))
    }
}

impl<S> ParameterWriter<S>
where
    S: ParameterStore + ?Sized,
{
    pub fn with_store(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Stores `value` under `key`.
    ///
    /// `value_type` must be one of `String`, `StringList` or `SecureString`;
    /// anything else fails before a request is made. With `allow_overwrite`
    /// unset the store rejects keys that already exist.
    pub async fn put(
        &self,
        ctx: &RequestContext,
        key: &str,
        value: &str,
        value_type: &str,
        allow_overwrite: bool,
    ) -> Result<(), SetterError> {
        let value_type = value_type.parse::<ValueType>()?;
        let request = PutParameterRequest::new(key, value, value_type, allow_overwrite)?;

        self.put_request(ctx, &request).await.map(|_| ())
    }

    /// Sends an already validated request and returns the version the store
    /// assigned to the parameter.
    pub async fn put_request(
        &self,
        ctx: &RequestContext,
        request: &PutParameterRequest,
    ) -> Result<i64, SetterError> {
        let interrupted = |reason: Interruption| SetterError::Interrupted {
            key: request.key().to_string(),
            reason,
        };

        if let Some(reason) = ctx.interruption() {
            return Err(interrupted(reason));
        }

        debug!(
            key = request.key(),
            value_type = request.value_type().as_str(),
            overwrite = request.overwrite(),
            "Putting parameter"
        );

        let result = tokio::select! {
            biased;

            reason = ctx.done() => {
                warn!(key = request.key(), %reason, "Put parameter interrupted, remote state unknown");
                return Err(interrupted(reason));
            }
            result = self.store.put_parameter(request) => result,
        };

        let version = result.map_err(|source| SetterError::PutFailed {
            key: request.key().to_string(),
            source,
        })?;

        debug!(key = request.key(), version, "Parameter stored");

        Ok(version)
    }
}

impl<S> Clone for ParameterWriter<S>
where
    S: ParameterStore + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> fmt::Debug for ParameterWriter<S>
where
    S: ParameterStore + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterWriter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::adapters::local_store::LocalParameterStore;
    use std::time::Duration;

    fn local_writer() -> (ParameterWriter<LocalParameterStore>, Arc<LocalParameterStore>) {
        let store = Arc::new(LocalParameterStore::new());
        (ParameterWriter::with_store(Arc::clone(&store)), store)
    }

    #[tokio::test]
    async fn test_invalid_value_type_makes_no_call() {
        let (writer, store) = local_writer();
        let ctx = RequestContext::background();

        for value_type in ["", "Secure", "string", "Integer"] {
            let err = writer
                .put(&ctx, "app/key", "value", value_type, true)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                SetterError::InvalidInput(DomainError::InvalidValueType(_))
            ));
        }

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_key_makes_no_call() {
        let (writer, store) = local_writer();

        let err = writer
            .put(&RequestContext::background(), "", "value", "String", true)
            .await
            .unwrap_err();

        assert!(matches!(err, SetterError::InvalidInput(DomainError::EmptyKey)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_put_failed_carries_key_and_cause() {
        let store = Arc::new(LocalParameterStore::failing_with(StoreError::RequestFailed(
            "AccessDeniedException: not authorized".to_string(),
        )));
        let writer = ParameterWriter::with_store(store);

        let err = writer
            .put(&RequestContext::background(), "app/key", "v", "String", true)
            .await
            .unwrap_err();

        assert_eq!(err.key(), Some("app/key"));
        let message = err.to_string();
        assert!(message.contains("failed to put parameter app/key"));
        assert!(message.contains("AccessDeniedException"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_cancelled_context_makes_no_call() {
        let (writer, store) = local_writer();
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = writer
            .put(&ctx, "app/key", "value", "String", true)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SetterError::Interrupted {
                reason: Interruption::Cancelled,
                ..
            }
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_interrupts_slow_store() {
        let store = Arc::new(LocalParameterStore::new().with_latency(Duration::from_secs(5)));
        let writer = ParameterWriter::with_store(Arc::clone(&store));
        let ctx = RequestContext::background().with_timeout(Duration::from_millis(100));

        let err = writer
            .put(&ctx, "app/key", "value", "String", true)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SetterError::Interrupted {
                reason: Interruption::DeadlineExceeded,
                ..
            }
        ));
        assert_eq!(err.key(), Some("app/key"));
        assert_eq!(store.calls(), 1);

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(
            source.downcast_ref::<Interruption>(),
            Some(&Interruption::DeadlineExceeded)
        );
    }

    #[tokio::test]
    async fn test_put_request_returns_version() {
        let (writer, _store) = local_writer();
        let ctx = RequestContext::background();
        let request =
            PutParameterRequest::new("app/key", "v1", ValueType::PlainText, true).unwrap();

        assert_eq!(writer.put_request(&ctx, &request).await.unwrap(), 1);
        assert_eq!(writer.put_request(&ctx, &request).await.unwrap(), 2);
    }

    #[test]
    fn test_writer_is_send_sync_clone() {
        fn assert_bounds<T: Send + Sync + Clone>() {}
        assert_bounds::<ParameterWriter<LocalParameterStore>>();
        assert_bounds::<ParameterWriter<SsmParameterStore>>();
        assert_bounds::<ParameterWriter<dyn ParameterStore>>();
    }
}
