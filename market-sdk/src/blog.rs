// ABOUTME: Blog collaborator backed by a hosted PostgREST-style data store
// ABOUTME: Lists and fetches posts with retry on transient failures; constructed once and shared

use crate::builder::HostedBlogConfig;
use crate::constants::blog::POST_COLUMNS;
use crate::error::BlogError;
use crate::retry::{retry_with_backoff, RetryConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub text_content: String,
}

#[async_trait]
pub trait BlogStore: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> Result<Vec<Post>, BlogError>;

    async fn get_post(&self, id: i64) -> Result<Option<Post>, BlogError>;
}

pub struct HostedBlogStore {
    client: reqwest::Client,
    table_url: Url,
    retry: RetryConfig,
}

impl HostedBlogStore {
    pub fn builder() -> crate::builder::HostedBlogConfigBuilder<((), (), (), (), ())> {
        HostedBlogConfig::builder()
    }

    pub fn from_config(config: HostedBlogConfig) -> Result<Self, BlogError> {
        let base_url = config.parsed_base_url()?;
        let table_url = base_url
            .join(&format!("/rest/v1/{}", config.table))
            .map_err(|e| BlogError::Configuration(format!("Invalid blog table: {}", e)))?;

        let headers = auth_headers(&config.api_key)?;
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| BlogError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            table_url,
            retry: config.retry,
        })
    }

    fn list_url(&self) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", POST_COLUMNS)
            .append_pair("order", "created_at.desc");
        url
    }

    fn post_url(&self, id: i64) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", POST_COLUMNS)
            .append_pair("id", &format!("eq.{}", id));
        url
    }

    async fn fetch_posts(&self, url: Url) -> Result<Vec<Post>, BlogError> {
        retry_with_backoff(&self.retry, || {
            let url = url.clone();
            async move {
                log::debug!("Fetching blog posts from {}", url);
                let response = self.client.get(url).send().await?;

                let status = response.status();
                if !status.is_success() {
                    let message = response.text().await.unwrap_or_default();
                    return Err(BlogError::Status {
                        status: status.as_u16(),
                        message,
                    });
                }

                let body = response.text().await?;
                Ok(serde_json::from_str::<Vec<Post>>(&body)?)
            }
        })
        .await
    }
}

fn auth_headers(api_key: &SecretString) -> Result<HeaderMap, BlogError> {
    let key = api_key.expose_secret();
    let invalid = |_: reqwest::header::InvalidHeaderValue| {
        BlogError::Configuration("Blog API key contains invalid characters".to_string())
    };

    let mut apikey = HeaderValue::from_str(key).map_err(invalid)?;
    apikey.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(invalid)?;
    bearer.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert("apikey", apikey);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

#[async_trait]
impl BlogStore for HostedBlogStore {
    async fn list_posts(&self) -> Result<Vec<Post>, BlogError> {
        self.fetch_posts(self.list_url()).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, BlogError> {
        Ok(self.fetch_posts(self.post_url(id)).await?.into_iter().next())
    }
}
