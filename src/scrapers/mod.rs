pub mod traits;
pub mod types;
pub mod vitrini;

pub use traits::ScraperTrait;
pub use types::{CrawlParams, PageLabel};
pub use vitrini::{CrawlOutcome, CrawlReport, VitriniScraper};
