// ABOUTME: Centralized constants for the market SDK
// ABOUTME: Contains proxy timeouts, outbound header values, diagnostic header names and retry settings

/// Image proxy endpoint and outbound request settings
pub mod proxy {
    use std::time::Duration;

    /// Path the gateway is mounted on
    pub const PROXY_PATH: &str = "/api/image-proxy";

    /// Query parameter carrying the encoded target URL
    pub const URL_PARAM: &str = "url";

    /// Deadline for the whole outbound exchange
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

    /// `max-age` for relayed images and CORS preflight answers
    pub const CACHE_MAX_AGE_SECS: u64 = 86_400;

    /// Largest body relayed to the browser
    pub const MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;

    /// Redirect hops followed before giving up
    pub const MAX_REDIRECTS: usize = 10;

    /// Content type used when an accepted image response carries none
    pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

    /// Many origins reject requests that don't look like a browser
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
    pub const ACCEPT: &str = "image/webp,image/apng,image/*,*/*;q=0.8";
    pub const REFERER: &str = "https://www.google.com/";
}

/// Header names used on proxy responses
pub mod headers {
    pub const X_ERROR_TYPE: &str = "X-Error-Type";
    pub const X_ERROR_URL: &str = "X-Error-URL";
    pub const X_ERROR_STATUS: &str = "X-Error-Status";
    pub const X_ERROR_CONTENT_TYPE: &str = "X-Error-Content-Type";
    pub const X_ERROR_MESSAGE: &str = "X-Error-Message";
    pub const X_ERROR_LIMIT: &str = "X-Error-Limit";
    pub const X_PROXY_STATUS: &str = "X-Proxy-Status";
    pub const X_ORIGINAL_URL: &str = "X-Original-URL";
}

/// Market catalog defaults
pub mod markets {
    /// Number of markets shown in the featured strip
    pub const DEFAULT_FEATURED_COUNT: usize = 6;
}

/// Retry configuration constants for the hosted blog backend
pub mod retry {
    use std::time::Duration;

    /// Maximum number of retry attempts
    pub const MAX_RETRIES: u32 = 3;

    /// Initial delay before first retry
    pub const INITIAL_DELAY: Duration = Duration::from_millis(100);

    /// Maximum delay between retries
    pub const MAX_DELAY: Duration = Duration::from_secs(10);

    /// Backoff multiplier for exponential backoff
    pub const BACKOFF_MULTIPLIER: f64 = 2.0;
}

/// Hosted blog backend settings
pub mod blog {
    use std::time::Duration;

    /// Table holding blog posts
    pub const DEFAULT_TABLE: &str = "blogs";

    /// Columns selected for every post query
    pub const POST_COLUMNS: &str = "id,created_at,text_content";

    /// Default timeout for backend requests
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
}
