use super::{
    Configs,
    environment::{env_or, optional_env},
};

/// Connection settings for the parameter store client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetterConfig {
    /// Empty means "resolve the region from the environment".
    pub ssm_region: String,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
}

impl SetterConfig {
    pub fn new(ssm_region: impl Into<String>) -> Self {
        Self {
            ssm_region: ssm_region.into(),
            ..Self::default()
        }
    }

    pub fn region(&self) -> Option<&str> {
        Some(self.ssm_region.as_str()).filter(|region| !region.is_empty())
    }
}

#[async_trait::async_trait]
impl Configs for SetterConfig {
    async fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(SetterConfig {
            ssm_region: env_or("SSM_REGION", ""),
            profile: optional_env("AWS_PROFILE"),
            endpoint_url: optional_env("SSM_ENDPOINT").or_else(|| optional_env("AWS_ENDPOINT")),
        })
    }
}
