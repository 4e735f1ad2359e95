use crate::models::ListingRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for all listing scrapers
/// Each source site gets its own implementation feeding the same store
#[async_trait]
pub trait ScraperTrait: Send + Sync {
    /// Crawl the source and return the extracted listings
    async fn scrape(&self) -> Result<Vec<ListingRecord>>;

    /// Get the name of the scraper source
    fn source_name(&self) -> &'static str;
}
