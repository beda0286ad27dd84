// ABOUTME: Image health check that fetches every market picture through the gateway
// ABOUTME: Reports per-market outcomes using the same failure classification as the proxy route

use crate::output::ImageCheck;
use market_sdk::normalize::normalize;
use market_sdk::{ImageGateway, Market};

/// Check markets in order; each fetch runs under the gateway's own deadline
pub async fn check_images(gateway: &ImageGateway, markets: &[Market]) -> Vec<ImageCheck> {
    let mut checks = Vec::with_capacity(markets.len());
    for market in markets {
        checks.push(check_market(gateway, market).await);
    }
    checks
}

async fn check_market(gateway: &ImageGateway, market: &Market) -> ImageCheck {
    let normalized = normalize(&market.image_link);
    let mut check = ImageCheck {
        market_id: market.id.clone(),
        market_name: market.market_name.clone(),
        image_url: normalized.url.clone(),
        outcome: String::new(),
        status: 0,
        detail: String::new(),
    };

    if normalized.is_empty() {
        check.outcome = "NO_IMAGE".to_string();
        return check;
    }

    if !normalized.is_external {
        check.outcome = "LOCAL".to_string();
        check.detail = "Served by the site itself".to_string();
        return check;
    }

    match gateway.fetch(&normalized.url).await {
        Ok(image) => {
            check.outcome = "OK".to_string();
            check.status = 200;
            check.detail = format!("{}, {} bytes", image.content_type, image.bytes.len());
        }
        Err(err) => {
            check.outcome = err.kind().to_string();
            check.status = err.status().as_u16();
            check.detail = err.to_string();
        }
    }

    check
}
