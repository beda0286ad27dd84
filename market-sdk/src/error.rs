// ABOUTME: Custom error types for the market SDK with machine-readable classifications
// ABOUTME: Maps gateway failures to status codes and diagnostic headers, plus catalog and blog errors

use crate::constants::headers;
use http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Machine-readable failure classification carried in `X-Error-Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    MissingParam,
    Timeout,
    HttpError,
    NotImage,
    NetworkError,
    TooLarge,
    ProxyError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingParam => "MISSING_PARAM",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::HttpError => "HTTP_ERROR",
            ErrorKind::NotImage => "NOT_IMAGE",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::TooLarge => "TOO_LARGE",
            ErrorKind::ProxyError => "PROXY_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing URL parameter")]
    MissingParam,

    #[error("Request timed out")]
    Timeout { url: String },

    #[error("Failed to fetch image: {status} {reason}")]
    Http {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Response is not an image: {content_type}")]
    NotImage { url: String, content_type: String },

    #[error("Network error: {message}")]
    Network { url: String, message: String },

    #[error("Image exceeded size limit of {limit} bytes")]
    TooLarge { url: String, limit: u64 },

    #[error("Error proxying image: {0}")]
    Proxy(String),
}

impl GatewayError {
    /// Classify a transport failure for `url`
    pub fn from_transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
            }
        } else {
            GatewayError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::MissingParam => ErrorKind::MissingParam,
            GatewayError::Timeout { .. } => ErrorKind::Timeout,
            GatewayError::Http { .. } => ErrorKind::HttpError,
            GatewayError::NotImage { .. } => ErrorKind::NotImage,
            GatewayError::Network { .. } => ErrorKind::NetworkError,
            GatewayError::TooLarge { .. } => ErrorKind::TooLarge,
            GatewayError::Proxy(_) => ErrorKind::ProxyError,
        }
    }

    /// Status code written to the browser. Upstream HTTP errors are relayed as-is.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingParam | GatewayError::NotImage { .. } => StatusCode::BAD_REQUEST,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Http { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::TooLarge { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Network { .. } | GatewayError::Proxy(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Resolved target URL, once decoding got far enough to produce one
    pub fn origin_url(&self) -> Option<&str> {
        match self {
            GatewayError::Timeout { url }
            | GatewayError::Http { url, .. }
            | GatewayError::NotImage { url, .. }
            | GatewayError::Network { url, .. }
            | GatewayError::TooLarge { url, .. } => Some(url),
            GatewayError::MissingParam | GatewayError::Proxy(_) => None,
        }
    }

    pub fn diagnostic_headers(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![(headers::X_ERROR_TYPE, self.kind().as_str().to_string())];

        if let Some(url) = self.origin_url() {
            out.push((headers::X_ERROR_URL, url.to_string()));
        }

        match self {
            GatewayError::Http { status, .. } => {
                out.push((headers::X_ERROR_STATUS, status.to_string()));
            }
            GatewayError::NotImage { content_type, .. } => {
                out.push((headers::X_ERROR_CONTENT_TYPE, content_type.clone()));
            }
            GatewayError::Network { message, .. } => {
                out.push((headers::X_ERROR_MESSAGE, message.clone()));
            }
            GatewayError::Proxy(message) => {
                out.push((headers::X_ERROR_MESSAGE, message.clone()));
            }
            GatewayError::TooLarge { limit, .. } => {
                out.push((headers::X_ERROR_LIMIT, limit.to_string()));
            }
            GatewayError::MissingParam | GatewayError::Timeout { .. } => {}
        }

        out
    }
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Failed to read market data from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Market data has no header row")]
    MissingHeader,

    #[error("Market data is missing the required column '{0}'")]
    MissingColumn(String),
}

#[derive(Debug, Error)]
pub enum BlogError {
    #[error("Blog backend is not configured: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: blog backend took too long to respond")]
    Timeout,

    #[error("Blog backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid blog response: {0}")]
    InvalidResponse(String),
}

impl BlogError {
    pub fn help_text(&self) -> Option<&'static str> {
        match self {
            BlogError::Configuration(_) => {
                Some("Set SUPABASE_URL and SUPABASE_ANON_KEY, or add a [blog] section to the config file")
            }
            BlogError::Network(_) | BlogError::Timeout => {
                Some("Check your internet connection and try again")
            }
            BlogError::Status { status: 401, .. } | BlogError::Status { status: 403, .. } => {
                Some("Check that the blog API key is valid for this project")
            }
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            BlogError::Network(_) | BlogError::Timeout => true,
            BlogError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for BlogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BlogError::Timeout
        } else if err.is_decode() {
            BlogError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            BlogError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            BlogError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BlogError {
    fn from(err: serde_json::Error) -> Self {
        BlogError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header<'a>(pairs: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GatewayError::MissingParam.to_string(),
            "Missing URL parameter"
        );
        assert_eq!(
            GatewayError::Http {
                url: "https://example.com/a.jpg".to_string(),
                status: 404,
                reason: "Not Found".to_string(),
            }
            .to_string(),
            "Failed to fetch image: 404 Not Found"
        );
        assert_eq!(
            GatewayError::NotImage {
                url: "https://example.com".to_string(),
                content_type: "text/html".to_string(),
            }
            .to_string(),
            "Response is not an image: text/html"
        );
    }

    #[test]
    fn test_status_codes() {
        let url = "https://example.com/a.jpg".to_string();
        assert_eq!(GatewayError::MissingParam.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::Timeout { url: url.clone() }.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            GatewayError::Http {
                url: url.clone(),
                status: 403,
                reason: "Forbidden".to_string()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            GatewayError::Network {
                url: url.clone(),
                message: "dns".to_string()
            }
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::Proxy("bad".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_invalid_upstream_status_becomes_bad_gateway() {
        let err = GatewayError::Http {
            url: "https://example.com".to_string(),
            status: 42,
            reason: String::new(),
        };
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_diagnostic_headers_per_kind() {
        let http = GatewayError::Http {
            url: "https://example.com/a.jpg".to_string(),
            status: 404,
            reason: "Not Found".to_string(),
        }
        .diagnostic_headers();
        assert_eq!(header(&http, headers::X_ERROR_TYPE), Some("HTTP_ERROR"));
        assert_eq!(
            header(&http, headers::X_ERROR_URL),
            Some("https://example.com/a.jpg")
        );
        assert_eq!(header(&http, headers::X_ERROR_STATUS), Some("404"));

        let not_image = GatewayError::NotImage {
            url: "https://example.com".to_string(),
            content_type: "unknown".to_string(),
        }
        .diagnostic_headers();
        assert_eq!(header(&not_image, headers::X_ERROR_TYPE), Some("NOT_IMAGE"));
        assert_eq!(
            header(&not_image, headers::X_ERROR_CONTENT_TYPE),
            Some("unknown")
        );

        let timeout = GatewayError::Timeout {
            url: "https://slow.example.com".to_string(),
        }
        .diagnostic_headers();
        assert_eq!(timeout.len(), 2);
        assert_eq!(header(&timeout, headers::X_ERROR_TYPE), Some("TIMEOUT"));

        let missing = GatewayError::MissingParam.diagnostic_headers();
        assert_eq!(missing.len(), 1);
        assert_eq!(header(&missing, headers::X_ERROR_URL), None);

        let proxy = GatewayError::Proxy("invalid utf-8".to_string()).diagnostic_headers();
        assert_eq!(header(&proxy, headers::X_ERROR_TYPE), Some("PROXY_ERROR"));
        assert_eq!(
            header(&proxy, headers::X_ERROR_MESSAGE),
            Some("invalid utf-8")
        );

        let too_large = GatewayError::TooLarge {
            url: "https://example.com/huge.png".to_string(),
            limit: 10_485_760,
        }
        .diagnostic_headers();
        assert_eq!(header(&too_large, headers::X_ERROR_TYPE), Some("TOO_LARGE"));
        assert_eq!(
            header(&too_large, headers::X_ERROR_URL),
            Some("https://example.com/huge.png")
        );
        assert_eq!(header(&too_large, headers::X_ERROR_LIMIT), Some("10485760"));
    }

    #[test]
    fn test_blog_retryable() {
        assert!(BlogError::Network("reset".to_string()).is_retryable());
        assert!(BlogError::Timeout.is_retryable());
        assert!(BlogError::Status {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(BlogError::Status {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(!BlogError::Status {
            status: 404,
            message: String::new()
        }
        .is_retryable());
        assert!(!BlogError::InvalidResponse("bad json".to_string()).is_retryable());
        assert!(!BlogError::Configuration("missing url".to_string()).is_retryable());
    }

    #[test]
    fn test_blog_help_text() {
        assert!(BlogError::Configuration("x".to_string())
            .help_text()
            .unwrap()
            .contains("SUPABASE_URL"));
        assert!(BlogError::Status {
            status: 401,
            message: String::new()
        }
        .help_text()
        .is_some());
        assert_eq!(BlogError::InvalidResponse("x".to_string()).help_text(), None);
    }
}
