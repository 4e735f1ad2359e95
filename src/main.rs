use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vitrini_scout::legacy;
use vitrini_scout::scrapers::VitriniScraper;
use vitrini_scout::store::ListingStore;
use vitrini_scout::{ListingExtractor, ScoutConfig};

#[derive(Parser)]
#[command(name = "vitrini-scout", about = "Rental listing scraper for Imobiliária Vitrini")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl the site and merge listings into the dataset
    Crawl {
        /// Override the maximum number of requests
        #[arg(long)]
        max_requests: Option<usize>,
        /// Override the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Extract one saved detail page and print the record
    Extract {
        /// HTML file of the detail page
        html: PathBuf,
        /// URL the page was served from
        #[arg(long)]
        url: String,
    },
    /// Rewrite string prices in a legacy dataset as numbers, in place
    ConvertPrices {
        /// Legacy JSON array
        file: PathBuf,
    },
    /// Import a legacy dataset into the canonical record format
    Upgrade {
        /// Legacy JSON array
        file: PathBuf,
        /// Override the output directory
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = ScoutConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Crawl { max_requests, output } => {
            if let Some(max) = max_requests {
                config.crawl.max_requests_per_crawl = max;
            }
            if let Some(dir) = output {
                config.output_dir = dir;
            }
            crawl(&config).await
        }
        Command::Extract { html, url } => {
            let raw = tokio::fs::read_to_string(&html)
                .await
                .with_context(|| format!("Failed to read {}", html.display()))?;
            let record = ListingExtractor::new(config.site).extract_html(&raw, &url);
            if !record.is_usable() {
                warn!("Extracted record has no title");
            }
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Command::ConvertPrices { file } => {
            let summary = legacy::convert_file(&file).await?;
            println!(
                "Converted {} items ({} prices, {} zeroed, {} fees, {} fees removed)",
                summary.items,
                summary.prices_converted,
                summary.prices_zeroed,
                summary.fees_converted,
                summary.fees_removed
            );
            Ok(())
        }
        Command::Upgrade { file, output } => {
            let dir = output.unwrap_or(config.output_dir);
            let items = legacy::read_array(&file).await?;
            let mut store = ListingStore::load(&dir).await?;
            let mut skipped = 0;
            for item in &items {
                match legacy::upgrade(item, &config.site) {
                    Some(record) => {
                        store.upsert(record);
                    }
                    None => skipped += 1,
                }
            }
            if skipped > 0 {
                warn!("Skipped {} legacy items without a URL", skipped);
            }
            store.save(&dir).await?;
            Ok(())
        }
    }
}

async fn crawl(config: &ScoutConfig) -> Result<()> {
    info!("🏠 Vitrini Scout - rental listings crawler");

    let scraper = VitriniScraper::with_config(config)?;
    let mut store = ListingStore::load(&config.output_dir).await?;
    let before = store.len();

    let report = scraper.crawl_into(&mut store).await?;

    for (i, record) in store.records().iter().enumerate().skip(before) {
        let rent = record
            .rent_amount
            .map(|r| format!("R$ {:.2}", r))
            .unwrap_or_else(|| "sem preço".to_string());
        println!("{}. {} ({})", i + 1, record.title, rent);
        if !record.neighborhood.is_empty() {
            println!("   Bairro: {}", record.neighborhood);
        }
        println!("   URL: {}", record.url);
    }

    store.save(&config.output_dir).await?;
    info!(
        "Crawl took {}s: {} new, {} updated, {} discarded",
        (report.finished_at - report.started_at).num_seconds(),
        report.listings_extracted - report.listings_replaced,
        report.listings_replaced,
        report.unusable_listings
    );
    Ok(())
}
