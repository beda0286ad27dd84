// ABOUTME: Test helper utilities for mocking image origins and the hosted blog backend
// ABOUTME: Provides mockito-based helpers and shared fixtures for unit tests

#[cfg(test)]
use mockito::{Server, ServerGuard};
#[cfg(test)]
use serde_json::json;

#[cfg(test)]
pub async fn mock_origin() -> ServerGuard {
    Server::new_async().await
}

/// Smallest byte sequence that starts like a JPEG file
#[cfg(test)]
pub fn jpeg_bytes() -> Vec<u8> {
    vec![
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0xFF, 0xD9,
    ]
}

#[cfg(test)]
pub fn mock_blog_posts_response() -> serde_json::Value {
    json!([
        {
            "id": 2,
            "created_at": "2025-07-12T18:05:23.123456+00:00",
            "text_content": "Summer hours start this weekend at every Sonoma market."
        },
        {
            "id": 1,
            "created_at": "2025-06-01T09:30:00+00:00",
            "text_content": "Five heirloom tomatoes worth the trip to Sebastopol."
        }
    ])
}

#[cfg(test)]
pub const SAMPLE_MARKETS_CSV: &str = "\
state_name,state_abbreviation,county_name,market_name,market_description,market_address,market_city,market_zipcode,market_latitude,market_longitude,market_open_days,market_open_time,market_close_time,market_website,market_phone,market_email,image_link
California,CA,Sonoma,Santa Rosa Original Farmers Market,\"Year-round market with produce, baked goods and crafts\",50 Mark West Springs Rd,Santa Rosa,95403,38.4839,-122.7214,Wednesday & Saturday,08:30,13:00,https://thesantarosafarmersmarket.com,,info@thesantarosafarmersmarket.com,\"https://images.unsplash.com/photo-1506744038136-46273834b3fb?w=400&h=300&fit=crop\"
California,CA,Sonoma,Santa Rosa Certified Farmers' Market,\"Seasonal market, March to December\",1351 Maple Ave,Santa Rosa,95404,38.4411,-122.7145,Saturday,08:30,13:00,https://northbayfarmersmarkets.org/locations/santa-rosa/,707-9580,info@northbayfarmersmarkets.org,i.ibb.co/market/santa-rosa.jpg
California,CA,Sonoma,Sebastopol Farmers Market,Fresh local produce and live music in the plaza,Downtown Plaza,Sebastopol,95472,38.4200,-122.8252,Sunday,10:00,13:30,http://sebastopolfarmersmarket.org,,info@sebastopolfarmersmarket.org,
";
