mod commands;

use clap::{Parser, Subcommand};
use evmart_core::CatalogKind;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "evmart")]
#[command(about = "EV marketplace catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Page through a whole catalog
    List {
        /// Catalog kind: vehicles, accessories, charging-stations, garages
        kind: CatalogKind,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Show one record by id
    Get { kind: CatalogKind, id: i64 },
    /// List the distinct values of a field
    Unique { kind: CatalogKind, field: String },
    /// Filter a catalog and show one page of matches
    Search {
        kind: CatalogKind,
        /// Field selection as `field=value` (e.g. `price=0-50000`, `brand=BYD`)
        #[arg(long = "filter", value_parser = parse_selection)]
        filters: Vec<(String, String)>,
        /// Free-text keyword matched across descriptive fields
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long, default_value = "0")]
        offset: usize,
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// Rank records by distance from a position
    Nearest {
        kind: CatalogKind,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, default_value = "5")]
        limit: usize,
        /// Restrict ranking to records matching `field=value`
        #[arg(long = "filter", value_parser = parse_selection)]
        filters: Vec<(String, String)>,
    },
    /// Resolve media references to servable URLs
    Image {
        kind: CatalogKind,
        /// One reference, or several comma-separated for a gallery
        reference: String,
    },
    /// Extract a coordinate from a map link
    Coord { link: String },
}

/// Parses a `field=value` selection.
fn parse_selection(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got \"{raw}\""))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in \"{raw}\""));
    }
    Ok((field.to_owned(), value.trim().to_owned()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = evmart_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("evmart ready (env: {}, api: {})", config.env, config.api_base_url);
        return Ok(());
    };

    let market = evmart_catalog::Marketplace::from_app_config(&config)?;
    tracing::debug!(env = %config.env, "marketplace initialised");
    commands::run(&market, command).await
}

#[cfg(test)]
mod tests;
