// ABOUTME: URL normalization for raw image references found in market data
// ABOUTME: Strips quotes, fixes missing schemes and classifies references as external or local

use crate::error::GatewayError;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;

/// Bytes left alone by the browser's `encodeURIComponent`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub url: String,
    pub is_external: bool,
}

impl NormalizedUrl {
    /// The "no image" value; callers substitute a local placeholder
    pub fn empty() -> Self {
        Self {
            url: String::new(),
            is_external: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.url.is_empty()
    }
}

/// Normalize a raw image reference. Every input has a defined output.
pub fn normalize(raw: &str) -> NormalizedUrl {
    let url = strip_quotes(raw.trim());

    if url.is_empty() {
        return NormalizedUrl::empty();
    }

    if let Some(rest) = url.strip_prefix("//") {
        return NormalizedUrl {
            url: format!("https://{}", rest),
            is_external: true,
        };
    }

    if url.starts_with("data:") || url.starts_with('/') {
        return NormalizedUrl {
            url: url.to_string(),
            is_external: false,
        };
    }

    NormalizedUrl {
        url: ensure_scheme(url).into_owned(),
        is_external: true,
    }
}

/// Remove at most one leading and one trailing quote character
pub fn strip_quotes(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .or_else(|| value.strip_prefix('\''))
        .unwrap_or(value);
    value
        .strip_suffix('"')
        .or_else(|| value.strip_suffix('\''))
        .unwrap_or(value)
}

/// Prepend `https://` unless the value already carries an http(s) scheme
pub fn ensure_scheme(url: &str) -> Cow<'_, str> {
    if has_http_scheme(url) {
        Cow::Borrowed(url)
    } else {
        Cow::Owned(format!("https://{}", url))
    }
}

fn has_http_scheme(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Percent-encode a value for use as a single query parameter
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Percent-decode a query value; malformed escapes are kept verbatim
pub fn decode_component(value: &str) -> Result<String, GatewayError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| GatewayError::Proxy(format!("URI malformed: {}", e)))
}
