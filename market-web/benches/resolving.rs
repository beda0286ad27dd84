// ABOUTME: Benchmark for image source resolution and market catalog loading
// ABOUTME: Measures URL normalization, proxy URL building and CSV parsing of the directory

use criterion::{criterion_group, criterion_main, Criterion};
use market_sdk::{normalize, MarketCatalog, MarketSource};
use market_web::resolver::{resolve_src, MarketImage};
use std::hint::black_box;

const RAW_SOURCES: &[&str] = &[
    "https://images.unsplash.com/photo-1488459716781-31db52582fe9?w=400&h=300&fit=crop",
    "i.ibb.co/market/santa-rosa.jpg",
    "\"www.farmtrails.org/images/sebastopol.jpg\"",
    "//cdn.example.com/markets/healdsburg.png",
    "/images/local-market.png",
    "",
];

fn sample_csv(rows: usize) -> String {
    let mut csv = String::from("market_name,market_city,county_name,market_description,image_link\n");
    for i in 0..rows {
        csv.push_str(&format!(
            "Market {i},City {i},Sonoma,\"Produce, flowers and bread\",i.ibb.co/{i}.jpg\n"
        ));
    }
    csv
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_mixed_sources", |b| {
        b.iter(|| {
            for raw in RAW_SOURCES {
                black_box(normalize(black_box(raw)));
            }
        })
    });
}

fn bench_resolve(c: &mut Criterion) {
    c.bench_function("resolve_src_mixed_sources", |b| {
        b.iter(|| {
            for raw in RAW_SOURCES {
                black_box(resolve_src(black_box(raw)));
            }
        })
    });

    c.bench_function("render_market_image", |b| {
        b.iter(|| {
            let image = MarketImage::new(black_box(RAW_SOURCES[0]), "Santa Rosa Farmers Market");
            black_box(image.render_html())
        })
    });
}

fn bench_catalog(c: &mut Criterion) {
    let csv = sample_csv(500);

    c.bench_function("load_catalog_500_rows", |b| {
        b.iter(|| MarketCatalog::from_csv_str(black_box(&csv)))
    });

    let catalog = MarketCatalog::from_csv_str(&csv).unwrap();
    c.bench_function("search_catalog_500_rows", |b| {
        b.iter(|| black_box(catalog.search_markets(black_box("city 4"))))
    });
}

criterion_group!(benches, bench_normalize, bench_resolve, bench_catalog);
criterion_main!(benches);
