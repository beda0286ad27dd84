// ABOUTME: Configuration file loading, validation, and hierarchical merging for the market service
// ABOUTME: Supports TOML config files in XDG locations plus environment overrides for secrets

use crate::constants::{config as files, server};
use anyhow::{anyhow, Context, Result};
use market_sdk::{GatewayConfig, HostedBlogStore};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bind: Option<String>,
    #[serde(default)]
    pub markets_csv: Option<PathBuf>,
    #[serde(default)]
    pub proxy: Option<ProxySettings>,
    #[serde(default)]
    pub blog: Option<BlogSettings>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct ProxySettings {
    #[serde(default, deserialize_with = "validate_duration")]
    pub timeout: Option<String>,
    #[serde(default, deserialize_with = "validate_duration")]
    pub cache_max_age: Option<String>,
    #[serde(default, deserialize_with = "validate_size")]
    pub max_image_size: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub referer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct BlogSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
}

impl Config {
    /// Load configuration from standard XDG-compliant locations, then apply the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_from_paths(&Self::get_config_paths())?;

        if let Some(path) = explicit {
            // A file named on the command line must exist
            config = config.merge(Self::load_from_file(path)?);
        }

        Ok(config.with_env_overrides())
    }

    /// Load configuration from file paths, later paths overriding earlier ones
    pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut config = Config::default();

        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                continue;
            }
            log::debug!("Loading config from {}", path.display());
            config = config.merge(Self::load_from_file(path)?);
        }

        Ok(config)
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(
                home_dir
                    .join(".config")
                    .join(files::APP_DIR)
                    .join(files::FILE_NAME),
            );
        }

        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            let path = PathBuf::from(config_home)
                .join(files::APP_DIR)
                .join(files::FILE_NAME);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join(files::PROJECT_FILE));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        Config {
            bind: other.bind.or(self.bind),
            markets_csv: other.markets_csv.or(self.markets_csv),
            proxy: match (self.proxy, other.proxy) {
                (Some(base), Some(other)) => Some(base.merge(other)),
                (base, other) => other.or(base),
            },
            blog: match (self.blog, other.blog) {
                (Some(base), Some(other)) => Some(base.merge(other)),
                (base, other) => other.or(base),
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = non_empty_env(server::BIND_ENV) {
            self.bind = Some(bind);
        }
        if let Some(url) = non_empty_env(files::BLOG_URL_ENV) {
            self.blog.get_or_insert_with(BlogSettings::default).url = Some(url);
        }
        self
    }

    pub fn bind_address(&self) -> &str {
        self.bind.as_deref().unwrap_or(server::DEFAULT_BIND)
    }

    pub fn markets_path(&self) -> PathBuf {
        self.markets_csv
            .clone()
            .unwrap_or_else(|| PathBuf::from(server::DEFAULT_MARKETS_CSV))
    }

    /// Gateway settings with config values layered over the SDK defaults
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let mut gateway = GatewayConfig::default();
        let Some(proxy) = &self.proxy else {
            return Ok(gateway);
        };

        if let Some(timeout) = &proxy.timeout {
            gateway.timeout = parse_duration(timeout)?;
        }
        if let Some(max_age) = &proxy.cache_max_age {
            gateway.cache_max_age = parse_duration(max_age)?.as_secs();
        }
        if let Some(size) = &proxy.max_image_size {
            gateway.max_body_bytes = parse_size(size)
                .ok_or_else(|| anyhow!("Invalid max_image_size '{}'", size))?;
        }
        if let Some(user_agent) = &proxy.user_agent {
            gateway.user_agent = user_agent.clone();
        }
        if let Some(referer) = &proxy.referer {
            gateway.referer = referer.clone();
        }

        Ok(gateway)
    }

    /// Build the hosted blog store when both a backend URL and an anon key are available
    pub fn blog_store(&self) -> Result<Option<HostedBlogStore>> {
        let url = self.blog.as_ref().and_then(|blog| blog.url.clone());
        let key = non_empty_env(files::BLOG_KEY_ENV);

        let (Some(url), Some(key)) = (url, key) else {
            log::info!(
                "Blog backend not configured (set {} and {})",
                files::BLOG_URL_ENV,
                files::BLOG_KEY_ENV
            );
            return Ok(None);
        };

        let table = self
            .blog
            .as_ref()
            .and_then(|blog| blog.table.clone())
            .unwrap_or_else(|| market_sdk::constants::blog::DEFAULT_TABLE.to_string());

        let store = HostedBlogStore::builder()
            .base_url(url)
            .api_key(SecretString::from(key))
            .table(table)
            .build()
            .context("Failed to configure blog backend")?;

        Ok(Some(store))
    }
}

impl ProxySettings {
    pub fn merge(self, other: ProxySettings) -> ProxySettings {
        ProxySettings {
            timeout: other.timeout.or(self.timeout),
            cache_max_age: other.cache_max_age.or(self.cache_max_age),
            max_image_size: other.max_image_size.or(self.max_image_size),
            user_agent: other.user_agent.or(self.user_agent),
            referer: other.referer.or(self.referer),
        }
    }
}

impl BlogSettings {
    pub fn merge(self, other: BlogSettings) -> BlogSettings {
        BlogSettings {
            url: other.url.or(self.url),
            table: other.table.or(self.table),
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Parse durations like `30s`, `5m`, `24h` or `1d`
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let mut chars = value.chars();
    let unit = chars.next_back();
    let number = chars.as_str();

    let multiplier = match unit {
        Some('s') => 1,
        Some('m') => 60,
        Some('h') => 60 * 60,
        Some('d') => 24 * 60 * 60,
        _ => {
            return Err(anyhow!(
                "Invalid duration format '{}'. Must end with s, m, h, or d",
                value
            ))
        }
    };

    let amount: u64 = number.parse().map_err(|_| {
        anyhow!(
            "Invalid duration format '{}'. Expected format like '10s', '5m', '1d'",
            value
        )
    })?;

    Ok(Duration::from_secs(amount * multiplier))
}

/// Parse sizes like `512KB`, `10MB` or a plain byte count
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().to_uppercase();

    let (number, unit) = if let Some(number) = value.strip_suffix("GB") {
        (number, 1024 * 1024 * 1024)
    } else if let Some(number) = value.strip_suffix("MB") {
        (number, 1024 * 1024)
    } else if let Some(number) = value.strip_suffix("KB") {
        (number, 1024)
    } else {
        (value.as_str(), 1)
    };

    number.trim().parse::<u64>().ok().map(|n| n * unit)
}

// Custom deserializer for duration validation
fn validate_duration<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;
    if let Some(ref duration) = value {
        parse_duration(duration).map_err(D::Error::custom)?;
    }
    Ok(value)
}

// Custom deserializer for size validation
fn validate_size<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;
    if let Some(ref size) = value {
        if parse_size(size).is_none() {
            return Err(D::Error::custom(format!(
                "Invalid size '{}'. Expected format like '512KB' or '10MB'",
                size
            )));
        }
    }
    Ok(value)
}
