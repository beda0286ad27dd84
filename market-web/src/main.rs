// ABOUTME: Main entry point for the farmers market web service
// ABOUTME: Serves the directory and image proxy, and offers CLI views over the market data

use anyhow::Result;
use clap::Parser;
use market_sdk::{ImageGateway, MarketCatalog, MarketSource};
use market_web::checks::check_images;
use market_web::cli::{Cli, Commands};
use market_web::config::Config;
use market_web::output::{JsonFormatter, OutputFormat, TableFormatter};
use market_web::resolver::MarketImage;
use market_web::server::{self, AppState};
use std::env;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.markets_csv {
        config.markets_csv = Some(path.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;

    // Determine if color should be used
    let use_color = !cli.no_color
        && env::var("NO_COLOR").is_err()
        && env::var("TERM").unwrap_or_default() != "dumb";

    match cli.command {
        Commands::Serve { bind } => {
            let mut config = config;
            if let Some(bind) = bind {
                config.bind = Some(bind);
            }
            let state = AppState::from_config(&config)?;
            server::serve(config.bind_address(), state).await?;
        }
        Commands::Markets {
            query,
            featured,
            json,
            pretty,
        } => {
            let catalog = MarketCatalog::from_csv_path(config.markets_path())?;
            let markets = match (featured, query.as_deref()) {
                (Some(count), _) => catalog.featured_markets(count),
                (None, Some(query)) => catalog.search_markets(query),
                (None, None) => catalog.list_markets(),
            };

            if markets.is_empty() && !json {
                println!("No markets found.");
            } else {
                let output = if json {
                    JsonFormatter::new(pretty).format_markets(&markets)?
                } else {
                    TableFormatter::new(use_color).format_markets(&markets)?
                };
                println!("{}", output);
            }
        }
        Commands::Resolve { raw, debug, alt } => {
            let image = MarketImage::new(raw, alt).with_debug(debug);
            let resolved = image.resolved();

            println!("Load URL:  {}", resolved.url);
            println!("Via proxy: {}", if resolved.via_proxy { "yes" } else { "no" });
            println!();
            println!("{}", image.render_html());
        }
        Commands::CheckImages { limit, json } => {
            let gateway = ImageGateway::new(config.gateway_config()?)?;
            let catalog = MarketCatalog::from_csv_path(config.markets_path())?;

            let mut markets = catalog.list_markets();
            if let Some(limit) = limit {
                markets.truncate(limit as usize);
            }

            let checks = check_images(&gateway, &markets).await;
            let output = if json {
                JsonFormatter::new(false).format_image_checks(&checks)?
            } else {
                TableFormatter::new(use_color).format_image_checks(&checks)?
            };
            println!("{}", output);

            let failed = checks
                .iter()
                .filter(|check| !check.is_ok() && check.status != 0)
                .count();
            if failed > 0 {
                eprintln!("{} of {} market images failed to load", failed, checks.len());
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
