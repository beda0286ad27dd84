// ABOUTME: This module handles terminal output for the market CLI commands
// ABOUTME: It provides table and JSON formatters for markets and image health reports

use anyhow::Result;
use market_sdk::Market;
use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub trait OutputFormat {
    fn format_markets(&self, markets: &[Market]) -> Result<String>;

    fn format_image_checks(&self, checks: &[ImageCheck]) -> Result<String>;
}

/// Result of fetching one market's picture through the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageCheck {
    pub market_id: String,
    pub market_name: String,
    pub image_url: String,
    pub outcome: String,
    pub status: u16,
    pub detail: String,
}

impl ImageCheck {
    pub fn is_ok(&self) -> bool {
        self.outcome == "OK"
    }
}

pub struct TableFormatter {
    use_color: bool,
}

impl TableFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn truncate(text: &str, max_len: usize) -> String {
        if text.chars().count() <= max_len {
            text.to_string()
        } else {
            let kept: String = text.chars().take(max_len - 3).collect();
            format!("{}...", kept)
        }
    }

    fn format_hours(market: &Market) -> String {
        match (
            market.market_open_time.as_str(),
            market.market_close_time.as_str(),
        ) {
            ("", "") => String::new(),
            (open, close) => format!("{}-{}", open, close),
        }
    }

    fn format_image(&self, image_link: &str) -> String {
        if image_link.is_empty() {
            let text = "none";
            if self.use_color {
                return text.dimmed().to_string();
            }
            return text.to_string();
        }
        Self::truncate(image_link, 40)
    }

    fn format_outcome(&self, check: &ImageCheck) -> String {
        if !self.use_color {
            return check.outcome.clone();
        }
        match check.outcome.as_str() {
            "OK" => check.outcome.green().to_string(),
            "NO_IMAGE" | "LOCAL" => check.outcome.dimmed().to_string(),
            "TIMEOUT" | "TOO_LARGE" => check.outcome.yellow().to_string(),
            _ => check.outcome.red().to_string(),
        }
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormat for JsonFormatter {
    fn format_markets(&self, markets: &[Market]) -> Result<String> {
        self.render(markets)
    }

    fn format_image_checks(&self, checks: &[ImageCheck]) -> Result<String> {
        self.render(checks)
    }
}

#[derive(Tabled)]
struct MarketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Market")]
    name: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Days")]
    days: String,
    #[tabled(rename = "Hours")]
    hours: String,
    #[tabled(rename = "Image")]
    image: String,
}

#[derive(Tabled)]
struct ImageCheckRow {
    #[tabled(rename = "Market")]
    name: String,
    #[tabled(rename = "Result")]
    outcome: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl OutputFormat for TableFormatter {
    fn format_markets(&self, markets: &[Market]) -> Result<String> {
        let rows: Vec<MarketRow> = markets
            .iter()
            .map(|market| MarketRow {
                id: market.id.clone(),
                name: Self::truncate(&market.market_name, 40),
                city: market.market_city.clone(),
                days: market.market_open_days.clone(),
                hours: Self::format_hours(market),
                image: self.format_image(&market.image_link),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        Ok(table.to_string())
    }

    fn format_image_checks(&self, checks: &[ImageCheck]) -> Result<String> {
        let rows: Vec<ImageCheckRow> = checks
            .iter()
            .map(|check| ImageCheckRow {
                name: Self::truncate(&check.market_name, 40),
                outcome: self.format_outcome(check),
                status: match check.status {
                    0 => String::new(),
                    status => status.to_string(),
                },
                detail: Self::truncate(&check.detail, 50),
            })
            .collect();

        let mut table = Table::new(rows);
        table.with(Style::psql());
        Ok(table.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_market(id: &str, name: &str, city: &str, image_link: &str) -> Market {
        Market {
            id: id.to_string(),
            market_name: name.to_string(),
            market_city: city.to_string(),
            market_open_days: "Saturday".to_string(),
            market_open_time: "08:30".to_string(),
            market_close_time: "13:00".to_string(),
            image_link: image_link.to_string(),
            ..Default::default()
        }
    }

    fn create_test_check(name: &str, outcome: &str, status: u16, detail: &str) -> ImageCheck {
        ImageCheck {
            market_id: format!("{}-1", name.replace(' ', "")),
            market_name: name.to_string(),
            image_url: "https://i.ibb.co/market.jpg".to_string(),
            outcome: outcome.to_string(),
            status,
            detail: detail.to_string(),
        }
    }

    #[test]
    fn test_table_formatter_markets() {
        let formatter = TableFormatter::new(false);
        let markets = vec![
            create_test_market(
                "PetalumaFarmersMarket-1",
                "Petaluma Farmers Market",
                "Petaluma",
                "i.ibb.co/petaluma.jpg",
            ),
            create_test_market("SonomaValleyMarket-2", "Sonoma Valley Market", "Sonoma", ""),
        ];

        let result = formatter.format_markets(&markets).unwrap();
        assert!(result.contains("PetalumaFarmersMarket-1"));
        assert!(result.contains("08:30-13:00"));
        assert!(result.contains("i.ibb.co/petaluma.jpg"));
        assert!(result.contains("none"));
    }

    #[test]
    fn test_truncation_is_char_safe() {
        assert_eq!(TableFormatter::truncate("short", 10), "short");
        assert_eq!(
            TableFormatter::truncate("Mercado de Agricultores Ñuñoa Centro", 12),
            "Mercado d..."
        );
        assert_eq!(TableFormatter::truncate("ñññññññ", 5), "ññ...");
    }

    #[test]
    fn test_empty_markets_keep_headers() {
        let formatter = TableFormatter::new(false);
        let result = formatter.format_markets(&[]).unwrap();
        assert!(result.contains("Market"));
        assert!(result.contains("City"));
        assert!(result.contains("Image"));
    }

    #[test]
    fn test_table_formatter_image_checks() {
        let formatter = TableFormatter::new(false);
        let checks = vec![
            create_test_check("Santa Rosa", "OK", 200, "image/jpeg, 48213 bytes"),
            create_test_check("Healdsburg", "HTTP_ERROR", 404, "Failed to fetch image: 404 Not Found"),
            create_test_check("Sebastopol", "NO_IMAGE", 0, ""),
        ];

        let result = formatter.format_image_checks(&checks).unwrap();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Result"));
        assert!(lines[1].starts_with('-'));
        assert!(lines[2].contains("OK") && lines[2].contains("200"));
        assert!(lines[3].contains("Failed to fetch image: 404 Not Found"));
        assert!(lines[4].contains("NO_IMAGE"));
        assert!(!lines[4].contains(" 0 "));
    }

    #[test]
    fn test_colored_outcomes() {
        let formatter = TableFormatter::new(true);
        let ok = create_test_check("A", "OK", 200, "");
        let failed = create_test_check("B", "NETWORK_ERROR", 500, "");

        assert!(formatter.format_outcome(&ok).contains("\u{1b}["));
        assert!(formatter.format_outcome(&failed).contains("NETWORK_ERROR"));
        assert_eq!(TableFormatter::new(false).format_outcome(&failed), "NETWORK_ERROR");
    }

    #[test]
    fn test_json_formatter_markets() {
        let formatter = JsonFormatter::new(false);
        let markets = vec![create_test_market(
            "PetalumaFarmersMarket-1",
            "Petaluma Farmers Market",
            "Petaluma",
            "",
        )];

        let result = formatter.format_markets(&markets).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed[0]["id"], "PetalumaFarmersMarket-1");
        assert_eq!(parsed[0]["market_city"], "Petaluma");
        assert_eq!(parsed[0]["image_link"], "");
        assert!(!result.contains('\n'));
    }

    #[test]
    fn test_json_formatter_pretty_checks() {
        let formatter = JsonFormatter::new(true);
        let checks = vec![create_test_check("Santa Rosa", "TIMEOUT", 504, "Request timed out")];

        let result = formatter.format_image_checks(&checks).unwrap();
        assert!(result.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed[0]["outcome"], "TIMEOUT");
        assert_eq!(parsed[0]["status"], 504);
    }

    #[test]
    fn test_json_formatter_empty() {
        let formatter = JsonFormatter::new(false);
        assert_eq!(formatter.format_markets(&[]).unwrap(), "[]");
    }
}
