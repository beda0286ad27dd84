// ABOUTME: Centralized constants for the farmers market web service
// ABOUTME: Contains bind defaults, config file locations, CORS values and the placeholder asset

/// Server defaults
pub mod server {
    /// Address used when neither the config file nor the CLI names one
    pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

    /// Environment variable that overrides the bind address
    pub const BIND_ENV: &str = "FARMERS_MARKET_BIND";

    /// Market data read when no path is configured
    pub const DEFAULT_MARKETS_CSV: &str = "data/markets.csv";
}

/// Config file discovery
pub mod config {
    /// Directory under the XDG config home
    pub const APP_DIR: &str = "farmers-market";

    pub const FILE_NAME: &str = "config.toml";

    /// Project-local config file, checked in the working directory
    pub const PROJECT_FILE: &str = "farmers-market.toml";

    pub const BLOG_URL_ENV: &str = "SUPABASE_URL";
    pub const BLOG_KEY_ENV: &str = "SUPABASE_ANON_KEY";
}

/// API routes, relative to the `/api` prefix they are nested under
pub mod routes {
    pub const API_PREFIX: &str = "/api";
    pub const IMAGE_PROXY: &str = "/image-proxy";
    pub const MARKETS: &str = "/markets";
    pub const MARKET: &str = "/markets/:id";
    pub const BLOG: &str = "/blog";
    pub const POST: &str = "/blog/:id";
}

/// Cross-origin headers applied to every API response
pub mod cors {
    pub const ALLOW_ORIGIN: &str = "*";
    pub const API_ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
    pub const PROXY_ALLOW_METHODS: &str = "GET, OPTIONS";
    pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";
}

/// Local stand-in image served when a market has no usable picture
pub mod placeholder {
    pub const PATH: &str = "/placeholder.svg";

    pub const CACHE_CONTROL: &str = "public, max-age=86400";

    pub const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect width="400" height="300" fill="#f0fdf4"/><path d="M200 95c-38 22-58 58-52 104 46 6 82-14 104-52-16-4-34-4-52 0 8-18 8-36 0-52z" fill="#16a34a"/><path d="M152 200c22-28 48-50 78-66" stroke="#f0fdf4" stroke-width="4" fill="none"/></svg>"##;
}
