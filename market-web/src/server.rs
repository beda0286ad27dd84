// ABOUTME: HTTP surface of the directory: the image proxy route plus market and blog JSON endpoints
// ABOUTME: Builds the axum router, applies CORS headers to the API and shuts down on Ctrl-C

use crate::config::Config;
use crate::constants::{cors, placeholder, routes};
use anyhow::{Context, Result};
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, CACHE_CONTROL, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use market_sdk::constants::{headers, markets::DEFAULT_FEATURED_COUNT, proxy};
use market_sdk::{
    BlogError, BlogStore, GatewayError, ImageGateway, MarketCatalog, MarketSource, ProxiedImage,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

const CROSS_ORIGIN_RESOURCE_POLICY: &str = "Cross-Origin-Resource-Policy";

/// Collaborators shared by every request; built once at startup
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ImageGateway>,
    pub markets: Arc<dyn MarketSource>,
    pub blog: Option<Arc<dyn BlogStore>>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = ImageGateway::new(config.gateway_config()?)?;
        let markets = MarketCatalog::from_csv_path(config.markets_path())?;
        let blog = config
            .blog_store()?
            .map(|store| Arc::new(store) as Arc<dyn BlogStore>);

        Ok(Self {
            gateway: Arc::new(gateway),
            markets: Arc::new(markets),
            blog,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(routes::IMAGE_PROXY, get(proxy_image).options(proxy_preflight))
        .route(routes::MARKETS, get(list_markets))
        .route(routes::MARKET, get(get_market))
        .route(routes::BLOG, get(list_posts))
        .route(routes::POST, get(get_post))
        .fallback(api_not_found)
        .layer(middleware::map_response(add_cors_headers));

    Router::new()
        .nest(routes::API_PREFIX, api)
        .route(placeholder::PATH, get(placeholder_image))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(addr: &str, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::info!("ctrl_c received; shutting down");
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}

async fn proxy_image(State(state): State<AppState>, RawQuery(query): RawQuery) -> Response {
    let param = query.as_deref().and_then(first_url_param);
    match state.gateway.proxy(param.as_deref()).await {
        Ok(image) => image_response(image, &state.gateway.config().cache_control()),
        Err(err) => error_response(&err),
    }
}

/// First `url` value in the query string; repeated keys are not an error
fn first_url_param(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

fn image_response(image: ProxiedImage, cache_control: &str) -> Response {
    let content_type = if image.content_type.is_empty() {
        proxy::DEFAULT_CONTENT_TYPE
    } else {
        &image.content_type
    };

    let mut response_headers = HeaderMap::new();
    insert_header(&mut response_headers, CONTENT_TYPE.as_str(), content_type);
    insert_header(&mut response_headers, CACHE_CONTROL.as_str(), cache_control);
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_ORIGIN.as_str(),
        cors::ALLOW_ORIGIN,
    );
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_METHODS.as_str(),
        cors::PROXY_ALLOW_METHODS,
    );
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_HEADERS.as_str(),
        cors::ALLOW_HEADERS,
    );
    insert_header(
        &mut response_headers,
        CROSS_ORIGIN_RESOURCE_POLICY,
        "cross-origin",
    );
    insert_header(&mut response_headers, headers::X_PROXY_STATUS, "success");
    insert_header(&mut response_headers, headers::X_ORIGINAL_URL, &image.origin_url);

    (StatusCode::OK, response_headers, image.bytes).into_response()
}

fn error_response(err: &GatewayError) -> Response {
    let mut response_headers = HeaderMap::new();
    insert_header(&mut response_headers, CONTENT_TYPE.as_str(), "text/plain");
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_ORIGIN.as_str(),
        cors::ALLOW_ORIGIN,
    );
    for (name, value) in err.diagnostic_headers() {
        insert_header(&mut response_headers, name, &value);
    }

    (err.status(), response_headers, err.to_string()).into_response()
}

/// Diagnostic values echo remote input; ones that are not valid header text are dropped
fn insert_header(map: &mut HeaderMap, name: &str, value: &str) {
    match (
        HeaderName::from_bytes(name.as_bytes()),
        HeaderValue::from_str(value),
    ) {
        (Ok(name), Ok(value)) => {
            map.insert(name, value);
        }
        _ => log::debug!("Skipping header {} with unrepresentable value", name),
    }
}

async fn proxy_preflight() -> Response {
    let mut response_headers = HeaderMap::new();
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_ORIGIN.as_str(),
        cors::ALLOW_ORIGIN,
    );
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_METHODS.as_str(),
        cors::PROXY_ALLOW_METHODS,
    );
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_ALLOW_HEADERS.as_str(),
        cors::ALLOW_HEADERS,
    );
    insert_header(
        &mut response_headers,
        ACCESS_CONTROL_MAX_AGE.as_str(),
        &proxy::CACHE_MAX_AGE_SECS.to_string(),
    );

    (StatusCode::OK, response_headers).into_response()
}

/// Fill in API-wide CORS headers without overriding ones a handler already chose
async fn add_cors_headers(mut response: Response) -> Response {
    let response_headers = response.headers_mut();
    response_headers
        .entry(ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static(cors::ALLOW_ORIGIN));
    response_headers
        .entry(ACCESS_CONTROL_ALLOW_METHODS)
        .or_insert(HeaderValue::from_static(cors::API_ALLOW_METHODS));
    response_headers
        .entry(ACCESS_CONTROL_ALLOW_HEADERS)
        .or_insert(HeaderValue::from_static(cors::ALLOW_HEADERS));
    response
}

#[derive(Debug, Default, Deserialize)]
pub struct MarketsQuery {
    q: Option<String>,
    featured: Option<String>,
    count: Option<String>,
}

async fn list_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> Json<Vec<market_sdk::Market>> {
    let markets = if query.featured.as_deref() == Some("true") {
        let count = query
            .count
            .as_deref()
            .and_then(|count| count.parse().ok())
            .unwrap_or(DEFAULT_FEATURED_COUNT);
        state.markets.featured_markets(count)
    } else if let Some(needle) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        state.markets.search_markets(needle)
    } else {
        state.markets.list_markets()
    };

    Json(markets)
}

async fn get_market(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.markets.get_market(&id) {
        Some(market) => Json(market).into_response(),
        None => not_found("Market not found"),
    }
}

async fn list_posts(State(state): State<AppState>) -> Response {
    let Some(blog) = state.blog.as_ref() else {
        return blog_unavailable();
    };

    match blog.list_posts().await {
        Ok(posts) => Json(posts).into_response(),
        Err(err) => blog_error(err),
    }
}

async fn get_post(State(state): State<AppState>, Path(id): Path<i64>) -> Response {
    let Some(blog) = state.blog.as_ref() else {
        return blog_unavailable();
    };

    match blog.get_post(id).await {
        Ok(Some(post)) => Json(post).into_response(),
        Ok(None) => not_found("Post not found"),
        Err(err) => blog_error(err),
    }
}

async fn api_not_found() -> Response {
    not_found("Not found")
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

fn blog_unavailable() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "Blog backend is not configured" })),
    )
        .into_response()
}

fn blog_error(err: BlogError) -> Response {
    log::error!("Blog backend request failed: {}", err);
    if let Some(help) = err.help_text() {
        log::info!("{}", help);
    }
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": err.to_string() })),
    )
        .into_response()
}

async fn placeholder_image() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "image/svg+xml"),
            (CACHE_CONTROL, placeholder::CACHE_CONTROL),
        ],
        placeholder::SVG,
    )
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_url_param() {
        assert_eq!(first_url_param(""), None);
        assert_eq!(first_url_param("w=400"), None);
        assert_eq!(
            first_url_param("url=a.example%2Fx.jpg"),
            Some("a.example/x.jpg".to_string())
        );
        assert_eq!(
            first_url_param("url=first.jpg&url=second.jpg"),
            Some("first.jpg".to_string())
        );
        assert_eq!(first_url_param("url="), Some(String::new()));
    }
}
