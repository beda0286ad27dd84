// ABOUTME: Market SDK providing the image proxy gateway and the directory's data collaborators
// ABOUTME: Includes URL normalization, market catalog, hosted blog store, errors and retry helpers

pub mod blog;
pub mod builder;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod markets;
pub mod normalize;
pub mod retry;
pub mod test_helpers;

pub use blog::{BlogStore, HostedBlogStore, Post};
pub use builder::{GatewayConfig, HostedBlogConfig};
pub use error::{BlogError, ErrorKind, GatewayError, MarketError};
pub use gateway::{ImageGateway, ProxiedImage, ProxyOutcome};
pub use markets::{Market, MarketCatalog, MarketSource};
pub use normalize::{normalize, NormalizedUrl};
pub use retry::RetryConfig;
