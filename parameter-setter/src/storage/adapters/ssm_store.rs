use aws_config::{
    BehaviorVersion, ConfigLoader, SdkConfig,
    environment::region::EnvironmentVariableRegionProvider, meta::region::RegionProviderChain,
    profile::ProfileFileRegionProvider,
};
use aws_sdk_ssm::{
    Client,
    config::SharedCredentialsProvider,
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::put_parameter::PutParameterError,
    types::ParameterType,
};
use aws_types::region::Region;
use tracing::debug;

use crate::{
    configs::SetterConfig,
    domain::{PutParameterRequest, ValueType},
    storage::repository::{ParameterStore, StoreError},
};

const THROTTLING_ERROR_CODE: &str = "ThrottlingException";

/// AWS Systems Manager Parameter Store backend.
///
/// Cloning is cheap: the SDK client is reference counted and safe to use
/// from many tasks at once.
#[derive(Clone)]
pub struct SsmParameterStore {
    client: Client,
}

impl SsmParameterStore {
    /// Builds a client from the ambient AWS configuration chain. An empty
    /// `ssm_region` falls back to `AWS_REGION`/`AWS_DEFAULT_REGION`, then to
    /// the shared config file. Instance metadata is never queried for the
    /// region, so construction does no network I/O.
    pub async fn new(config: &SetterConfig) -> Self {
        let shared_config = Self::loader(config).load().await;
        Self::from_sdk_config(&shared_config)
    }

    /// Same as [`SsmParameterStore::new`] but with an explicit credentials
    /// provider instead of the default provider chain.
    pub async fn with_credentials_provider(
        config: &SetterConfig,
        credentials_provider: SharedCredentialsProvider,
    ) -> Self {
        let shared_config = Self::loader(config)
            .credentials_provider(credentials_provider)
            .load()
            .await;
        Self::from_sdk_config(&shared_config)
    }

    pub fn from_sdk_config(shared_config: &SdkConfig) -> Self {
        Self::with_client(Client::new(shared_config))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn loader(config: &SetterConfig) -> ConfigLoader {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }

        loader = match config.region() {
            Some(region) => loader.region(Region::new(region.to_string())),
            None => loader.region(Self::local_region_chain(config.profile.as_deref())),
        };

        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }

        loader
    }

    fn local_region_chain(profile: Option<&str>) -> RegionProviderChain {
        let mut profile_region = ProfileFileRegionProvider::builder();
        if let Some(profile) = profile {
            profile_region = profile_region.profile_name(profile);
        }

        RegionProviderChain::first_try(EnvironmentVariableRegionProvider::new())
            .or_else(profile_region.build())
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Region the client resolved at construction, if any.
    pub fn region(&self) -> Option<&str> {
        self.client.config().region().map(|region| region.as_ref())
    }
}

impl std::fmt::Debug for SsmParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsmParameterStore")
            .field("region", &self.region())
            .finish()
    }
}

fn parameter_type(value_type: ValueType) -> ParameterType {
    match value_type {
        ValueType::PlainText => ParameterType::String,
        ValueType::MultiValueText => ParameterType::StringList,
        ValueType::EncryptedText => ParameterType::SecureString,
    }
}

fn store_error(err: SdkError<PutParameterError>) -> StoreError {
    let message = DisplayErrorContext(&err).to_string();
    match err.as_service_error() {
        Some(service_err) if service_err.is_parameter_already_exists() => {
            StoreError::ParameterAlreadyExists(message)
        }
        Some(service_err)
            if service_err.is_too_many_updates()
                || service_err.code() == Some(THROTTLING_ERROR_CODE) =>
        {
            StoreError::Throttled(message)
        }
        _ => StoreError::RequestFailed(message),
    }
}

#[async_trait::async_trait]
impl ParameterStore for SsmParameterStore {
    async fn put_parameter(&self, request: &PutParameterRequest) -> Result<i64, StoreError> {
        debug!(
            key = request.key(),
            value_type = request.value_type().as_str(),
            overwrite = request.overwrite(),
            "Sending PutParameter to SSM"
        );

        let output = self
            .client
            .put_parameter()
            .name(request.key())
            .value(request.value())
            .r#type(parameter_type(request.value_type()))
            .overwrite(request.overwrite())
            .send()
            .await
            .map_err(store_error)?;

        Ok(output.version())
    }
}
