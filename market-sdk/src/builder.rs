// ABOUTME: Builder pattern configuration for the image gateway and hosted blog store
// ABOUTME: Provides type-safe configuration with defaults taken from the SDK constants

use crate::blog::HostedBlogStore;
use crate::constants::{blog, proxy};
use crate::error::BlogError;
use crate::retry::RetryConfig;
use secrecy::SecretString;
use std::time::Duration;
use typed_builder::TypedBuilder;
use url::Url;

#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    #[builder(default = proxy::FETCH_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default = proxy::CACHE_MAX_AGE_SECS)]
    pub cache_max_age: u64,

    #[builder(default = proxy::MAX_BODY_BYTES)]
    pub max_body_bytes: u64,

    #[builder(default = proxy::USER_AGENT.to_string(), setter(into))]
    pub user_agent: String,

    #[builder(default = proxy::REFERER.to_string(), setter(into))]
    pub referer: String,

    #[builder(default = proxy::ACCEPT.to_string(), setter(into))]
    pub accept: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GatewayConfig {
    /// `Cache-Control` value for relayed images
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

#[derive(Debug, TypedBuilder)]
#[builder(build_method(into = Result<HostedBlogStore, BlogError>))]
pub struct HostedBlogConfig {
    #[builder(setter(into))]
    pub base_url: String,

    pub api_key: SecretString,

    #[builder(default = blog::DEFAULT_TABLE.to_string(), setter(into))]
    pub table: String,

    #[builder(default = blog::REQUEST_TIMEOUT)]
    pub timeout: Duration,

    #[builder(default)]
    pub retry: RetryConfig,
}

impl From<HostedBlogConfig> for Result<HostedBlogStore, BlogError> {
    fn from(config: HostedBlogConfig) -> Self {
        HostedBlogStore::from_config(config)
    }
}

impl HostedBlogConfig {
    /// Parse the backend base URL, rejecting anything that is not http(s)
    pub fn parsed_base_url(&self) -> Result<Url, BlogError> {
        let url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| BlogError::Configuration(format!("Invalid blog URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(BlogError::Configuration(format!(
                "Unsupported blog URL scheme '{}'",
                scheme
            ))),
        }
    }
}
