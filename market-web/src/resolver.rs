// ABOUTME: Client-side image source resolution and the per-image load state machine
// ABOUTME: Routes external pictures through the proxy and falls back to a placeholder on failure

use crate::constants::placeholder;
use market_sdk::constants::proxy::{PROXY_PATH, URL_PARAM};
use market_sdk::normalize::{encode_component, normalize};

/// Where the page should actually load an image from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSrc {
    pub url: String,
    pub via_proxy: bool,
}

/// Decide the load URL for a raw image reference. External images always go through the proxy.
pub fn resolve_src(raw: &str) -> ResolvedSrc {
    let normalized = normalize(raw);

    if normalized.is_empty() {
        return ResolvedSrc {
            url: placeholder::PATH.to_string(),
            via_proxy: false,
        };
    }

    if normalized.is_external {
        return ResolvedSrc {
            url: proxied_url(&normalized.url),
            via_proxy: true,
        };
    }

    ResolvedSrc {
        url: normalized.url,
        via_proxy: false,
    }
}

/// Same-origin proxy path for an absolute image URL
pub fn proxied_url(absolute: &str) -> String {
    format!("{}?{}={}", PROXY_PATH, URL_PARAM, encode_component(absolute))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoadState {
    Loading,
    Loaded,
    Errored,
}

impl ImageLoadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLoadState::Loading => "loading",
            ImageLoadState::Loaded => "loaded",
            ImageLoadState::Errored => "errored",
        }
    }
}

/// Identifies one load attempt; events carrying an older ticket are ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Display state for a single market picture
#[derive(Debug, Clone)]
pub struct MarketImage {
    src: String,
    alt: String,
    debug: bool,
    resolved: ResolvedSrc,
    state: ImageLoadState,
    generation: u64,
}

impl MarketImage {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        let src = src.into();
        let resolved = resolve_src(&src);
        log::debug!("Resolved image source {:?} -> {}", src, resolved.url);

        Self {
            src,
            alt: alt.into(),
            debug: false,
            resolved,
            state: ImageLoadState::Loading,
            generation: 0,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn resolved(&self) -> &ResolvedSrc {
        &self.resolved
    }

    pub fn state(&self) -> ImageLoadState {
        self.state
    }

    /// Ticket for the current load attempt
    pub fn ticket(&self) -> LoadTicket {
        LoadTicket(self.generation)
    }

    /// Replace the source and start a fresh attempt. An unchanged source keeps the current one.
    pub fn set_src(&mut self, src: impl Into<String>) -> LoadTicket {
        let src = src.into();
        if src == self.src {
            return self.ticket();
        }

        self.resolved = resolve_src(&src);
        self.src = src;
        self.state = ImageLoadState::Loading;
        self.generation += 1;
        self.ticket()
    }

    /// Record a successful load. Returns whether the event applied.
    pub fn on_load(&mut self, ticket: LoadTicket) -> bool {
        self.settle(ticket, ImageLoadState::Loaded)
    }

    /// Record a failed load. Returns whether the event applied.
    pub fn on_error(&mut self, ticket: LoadTicket) -> bool {
        let applied = self.settle(ticket, ImageLoadState::Errored);
        if applied {
            log::warn!("Image failed to load: {}", self.src);
        }
        applied
    }

    fn settle(&mut self, ticket: LoadTicket, next: ImageLoadState) -> bool {
        if ticket != self.ticket() || self.state != ImageLoadState::Loading {
            return false;
        }
        self.state = next;
        true
    }

    /// URL the image element should point at right now
    pub fn effective_src(&self) -> &str {
        match self.state {
            ImageLoadState::Errored => placeholder::PATH,
            _ => &self.resolved.url,
        }
    }

    /// Diagnostic line shown over the image in debug mode
    pub fn debug_overlay(&self) -> Option<String> {
        if !self.debug {
            return None;
        }

        let line = if self.src.trim().is_empty() {
            "No source URL provided".to_string()
        } else {
            match self.state {
                ImageLoadState::Loading => {
                    format!("Original URL: {} | Fixed URL: {}", self.src, self.resolved.url)
                }
                ImageLoadState::Loaded => {
                    format!("Loaded: {} -> {}", self.src, self.resolved.url)
                }
                ImageLoadState::Errored => format!("Error: Image failed to load: {}", self.src),
            }
        };

        Some(line)
    }

    pub fn render_html(&self) -> String {
        let mut html = format!(
            r#"<div class="market-image" data-state="{}"><img src="{}" alt="{}" loading="lazy">"#,
            self.state.as_str(),
            escape_html(self.effective_src()),
            escape_html(&self.alt),
        );

        if let Some(overlay) = self.debug_overlay() {
            html.push_str(&format!(
                r#"<div class="market-image__debug">{}</div>"#,
                escape_html(&overlay)
            ));
        }

        html.push_str("</div>");
        html
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
