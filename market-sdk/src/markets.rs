// ABOUTME: Farmers market catalog loaded from the directory CSV file
// ABOUTME: Provides listing, featured selection, detail lookup and simple substring search

use crate::error::MarketError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid market id pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub state_name: String,
    pub state_abbreviation: String,
    pub county_name: String,
    pub market_name: String,
    pub market_description: String,
    pub market_address: String,
    pub market_city: String,
    pub market_zipcode: String,
    pub market_latitude: String,
    pub market_longitude: String,
    pub market_open_days: String,
    pub market_open_time: String,
    pub market_close_time: String,
    pub market_website: String,
    pub market_phone: String,
    pub market_email: String,
    pub image_link: String,
}

impl Market {
    fn set_column(&mut self, column: &str, value: String) {
        let slot = match column {
            "state_name" => &mut self.state_name,
            "state_abbreviation" => &mut self.state_abbreviation,
            "county_name" => &mut self.county_name,
            "market_name" => &mut self.market_name,
            "market_description" => &mut self.market_description,
            "market_address" => &mut self.market_address,
            "market_city" => &mut self.market_city,
            "market_zipcode" => &mut self.market_zipcode,
            "market_latitude" => &mut self.market_latitude,
            "market_longitude" => &mut self.market_longitude,
            "market_open_days" => &mut self.market_open_days,
            "market_open_time" => &mut self.market_open_time,
            "market_close_time" => &mut self.market_close_time,
            "market_website" => &mut self.market_website,
            "market_phone" => &mut self.market_phone,
            "market_email" => &mut self.market_email,
            "image_link" => &mut self.image_link,
            _ => return,
        };
        *slot = value;
    }

    fn matches(&self, needle: &str) -> bool {
        [
            &self.market_name,
            &self.market_city,
            &self.county_name,
            &self.market_description,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Stable id for a market: its name without punctuation plus its 1-based row
pub fn market_id(name: &str, index: usize) -> String {
    format!("{}-{}", NON_ALPHANUMERIC.replace_all(name, ""), index + 1)
}

/// Read access to the market directory
pub trait MarketSource: Send + Sync {
    fn list_markets(&self) -> Vec<Market>;

    fn search_markets(&self, query: &str) -> Vec<Market>;

    fn featured_markets(&self, count: usize) -> Vec<Market>;

    fn get_market(&self, id: &str) -> Option<Market>;
}

#[derive(Debug, Clone, Default)]
pub struct MarketCatalog {
    markets: Vec<Market>,
}

impl MarketCatalog {
    pub fn new(markets: Vec<Market>) -> Self {
        Self { markets }
    }

    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, MarketError> {
        let content = std::fs::read_to_string(&path).map_err(|source| MarketError::Read {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        let catalog = Self::from_csv_str(&content)?;
        log::info!(
            "Loaded {} markets from {}",
            catalog.len(),
            path.as_ref().display()
        );
        Ok(catalog)
    }

    pub fn from_csv_str(content: &str) -> Result<Self, MarketError> {
        let mut lines = content
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty());

        let header = lines.next().ok_or(MarketError::MissingHeader)?;
        let columns: Vec<String> = parse_csv_line(header)
            .into_iter()
            .map(|column| column.trim_start_matches('\u{feff}').to_string())
            .collect();

        if !columns.iter().any(|column| column == "market_name") {
            return Err(MarketError::MissingColumn("market_name".to_string()));
        }

        let markets = lines
            .enumerate()
            .map(|(index, line)| {
                let mut market = Market::default();
                let mut values = parse_csv_line(line).into_iter();
                for column in &columns {
                    market.set_column(column, values.next().unwrap_or_default());
                }
                market.id = market_id(&market.market_name, index);
                market
            })
            .collect();

        Ok(Self { markets })
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }
}

impl MarketSource for MarketCatalog {
    fn list_markets(&self) -> Vec<Market> {
        self.markets.clone()
    }

    fn search_markets(&self, query: &str) -> Vec<Market> {
        let needle = query.trim().to_lowercase();
        self.markets
            .iter()
            .filter(|market| market.matches(&needle))
            .cloned()
            .collect()
    }

    fn featured_markets(&self, count: usize) -> Vec<Market> {
        self.markets.iter().take(count).cloned().collect()
    }

    fn get_market(&self, id: &str) -> Option<Market> {
        self.markets.iter().find(|market| market.id == id).cloned()
    }
}

/// Split one CSV record. Quoted cells may contain commas and `""` escapes.
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut values = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                values.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    values.push(current.trim().to_string());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::markets::DEFAULT_FEATURED_COUNT;
    use crate::test_helpers::SAMPLE_MARKETS_CSV;

    fn catalog() -> MarketCatalog {
        MarketCatalog::from_csv_str(SAMPLE_MARKETS_CSV).unwrap()
    }

    #[test]
    fn test_parse_csv_line_quotes() {
        assert_eq!(
            parse_csv_line(r#"a, "b, c" ,d"#),
            vec!["a".to_string(), "b, c".to_string(), "d".to_string()]
        );
        assert_eq!(
            parse_csv_line(r#""say ""hi""",x"#),
            vec!["say \"hi\"".to_string(), "x".to_string()]
        );
        assert_eq!(parse_csv_line(""), vec![String::new()]);
    }

    #[test]
    fn test_market_ids() {
        assert_eq!(
            market_id("Santa Rosa Certified Farmers' Market", 1),
            "SantaRosaCertifiedFarmersMarket-2"
        );
        assert_eq!(market_id("", 0), "-1");
    }

    #[test]
    fn test_catalog_loads_rows() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);

        let markets = catalog.list_markets();
        assert_eq!(markets[0].id, "SantaRosaOriginalFarmersMarket-1");
        assert_eq!(markets[0].market_city, "Santa Rosa");
        assert_eq!(
            markets[1].market_description,
            "Seasonal market, March to December"
        );
        assert_eq!(markets[2].image_link, "");
    }

    #[test]
    fn test_short_rows_fill_with_empty_strings() {
        let catalog =
            MarketCatalog::from_csv_str("market_name,market_city,image_link\nLone Market\n")
                .unwrap();
        let market = &catalog.list_markets()[0];
        assert_eq!(market.market_name, "Lone Market");
        assert_eq!(market.market_city, "");
        assert_eq!(market.image_link, "");
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let csv = "market_name,market_city\r\nA Market,Petaluma\r\n\r\nB Market,Sonoma\r\n";
        let catalog = MarketCatalog::from_csv_str(csv).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.list_markets()[0].market_city, "Petaluma");
        assert_eq!(catalog.list_markets()[1].id, "BMarket-2");
    }

    #[test]
    fn test_missing_header_and_column() {
        assert!(matches!(
            MarketCatalog::from_csv_str("  \n"),
            Err(MarketError::MissingHeader)
        ));
        assert!(matches!(
            MarketCatalog::from_csv_str("city\nPetaluma\n"),
            Err(MarketError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let catalog = catalog();
        assert_eq!(catalog.search_markets("SEBASTOPOL").len(), 1);
        assert_eq!(catalog.search_markets("santa rosa").len(), 2);
        // County and description are searched too
        assert_eq!(catalog.search_markets("sonoma").len(), 3);
        assert_eq!(catalog.search_markets("december").len(), 1);
        assert!(catalog.search_markets("napa").is_empty());
        assert_eq!(catalog.search_markets("").len(), 3);
    }

    #[test]
    fn test_featured_and_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.featured_markets(2).len(), 2);
        assert_eq!(catalog.featured_markets(DEFAULT_FEATURED_COUNT).len(), 3);
        assert_eq!(
            catalog
                .get_market("SebastopolFarmersMarket-3")
                .map(|m| m.market_name),
            Some("Sebastopol Farmers Market".to_string())
        );
        assert!(catalog.get_market("Nope-9").is_none());
    }

    #[test]
    fn test_from_csv_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("markets.csv");
        std::fs::write(&path, SAMPLE_MARKETS_CSV).unwrap();

        assert_eq!(MarketCatalog::from_csv_path(&path).unwrap().len(), 3);
        assert!(matches!(
            MarketCatalog::from_csv_path(dir.path().join("missing.csv")),
            Err(MarketError::Read { .. })
        ));
    }
}
