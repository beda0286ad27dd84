// ABOUTME: Image fetch gateway that re-fetches remote images on behalf of the browser
// ABOUTME: Enforces a cancellable deadline, validates image content and classifies every failure

use crate::builder::GatewayConfig;
use crate::constants::proxy;
use crate::error::GatewayError;
use crate::normalize::{decode_component, ensure_scheme};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA, REFERER, USER_AGENT};
use reqwest::{redirect, Client, Response};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use url::Url;

/// A fetched image ready to be relayed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedImage {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub origin_url: String,
}

/// Exactly one of success or a classified failure per request
pub type ProxyOutcome = Result<ProxiedImage, GatewayError>;

pub struct ImageGateway {
    client: Client,
    config: GatewayConfig,
}

impl ImageGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        // No client-level timeout: the deadline is owned by `fetch`
        let client = Client::builder()
            .redirect(redirect::Policy::limited(proxy::MAX_REDIRECTS))
            .build()
            .map_err(|e| GatewayError::Proxy(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Handle one proxy request given the raw `url` query value
    pub async fn proxy(&self, param: Option<&str>) -> ProxyOutcome {
        let raw = param
            .filter(|value| !value.is_empty())
            .ok_or(GatewayError::MissingParam)?;

        let decoded = decode_component(raw)?;
        let target = ensure_scheme(&decoded).into_owned();

        log::info!("Proxying request to: {}", target);
        self.fetch(&target).await
    }

    /// Fetch `target` under the configured deadline. Never retries.
    pub async fn fetch(&self, target: &str) -> ProxyOutcome {
        let url = Url::parse(target).map_err(|e| GatewayError::Network {
            url: target.to_string(),
            message: format!("Invalid URL: {}", e),
        })?;

        let deadline = CancellationToken::new();
        let _timer = arm_deadline(&deadline, self.config.timeout);

        // Losing the race drops the in-flight request, which closes its connection
        let outcome = tokio::select! {
            _ = deadline.cancelled() => Err(GatewayError::Timeout {
                url: target.to_string(),
            }),
            result = self.exchange(url, target) => result,
        };

        match &outcome {
            Ok(image) => log::debug!(
                "Proxied {} ({} bytes, {})",
                target,
                image.bytes.len(),
                image.content_type
            ),
            Err(err @ GatewayError::Timeout { .. }) => {
                log::error!("Request timed out for URL: {} ({})", target, err)
            }
            Err(err) => log::warn!("Proxy failure [{}] for URL: {}: {}", err.kind(), target, err),
        }

        outcome
    }

    async fn exchange(&self, url: Url, target: &str) -> ProxyOutcome {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, &self.config.accept)
            .header(REFERER, &self.config.referer)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| GatewayError::from_transport(target, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Http {
                url: target.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let content_type =
            image_content_type(response.headers()).map_err(|observed| GatewayError::NotImage {
                url: target.to_string(),
                content_type: observed,
            })?;

        self.validate_content_length(&response, target)?;
        let bytes = self.read_body_with_limit(response, target).await?;

        Ok(ProxiedImage {
            bytes,
            content_type,
            origin_url: target.to_string(),
        })
    }

    fn validate_content_length(&self, response: &Response, target: &str) -> Result<(), GatewayError> {
        match response.content_length() {
            Some(length) if length > self.config.max_body_bytes => Err(GatewayError::TooLarge {
                url: target.to_string(),
                limit: self.config.max_body_bytes,
            }),
            _ => Ok(()),
        }
    }

    async fn read_body_with_limit(
        &self,
        response: Response,
        target: &str,
    ) -> Result<Vec<u8>, GatewayError> {
        let limit = self.config.max_body_bytes;
        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| GatewayError::from_transport(target, e))?;
            bytes.extend_from_slice(&chunk);

            // Content-Length can be absent or wrong
            if bytes.len() as u64 > limit {
                return Err(GatewayError::TooLarge {
                    url: target.to_string(),
                    limit,
                });
            }
        }

        Ok(bytes)
    }
}

/// Cancel `deadline` after `timeout`; the timer stops as soon as the handle is dropped
fn arm_deadline(deadline: &CancellationToken, timeout: Duration) -> AbortOnDropHandle<()> {
    let deadline = deadline.clone();
    AbortOnDropHandle::new(tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        deadline.cancel();
    }))
}

/// The response's content type if it declares an image, otherwise what was observed
fn image_content_type(headers: &HeaderMap) -> Result<String, String> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match content_type {
        Some(value) if value.starts_with("image/") => Ok(value.to_string()),
        Some(value) => Err(value.to_string()),
        None => Err("unknown".to_string()),
    }
}
