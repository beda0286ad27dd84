// ABOUTME: CLI argument definitions for the farmers market service
// ABOUTME: Defines the command-line interface structure using clap derive macros

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "market-web")]
#[command(about = "Farmers market directory with a CORS-safe image proxy", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to load on top of the standard locations
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Market data CSV (overrides the config file)
    #[arg(long, global = true, value_name = "FILE")]
    pub markets_csv: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output for debugging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to listen on, e.g. 0.0.0.0:8080
        #[arg(long)]
        bind: Option<String>,
    },
    /// List markets from the directory
    Markets {
        /// Case-insensitive search over name, city, county and description
        #[arg(short, long)]
        query: Option<String>,

        /// Show only the first N markets
        #[arg(long, value_name = "COUNT", num_args = 0..=1, default_missing_value = "6", conflicts_with = "query")]
        featured: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Pretty print JSON output
        #[arg(long, requires = "json")]
        pretty: bool,
    },
    /// Show how an image reference would be loaded by the page
    Resolve {
        /// Raw image reference as stored in the market data
        raw: String,

        /// Include the diagnostic overlay in the rendered markup
        #[arg(long)]
        debug: bool,

        /// Alternative text for the rendered image
        #[arg(long, default_value = "Farmers market")]
        alt: String,
    },
    /// Fetch every market picture through the gateway and report failures
    CheckImages {
        /// Maximum number of markets to check
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
