//! Rental listing scraper for imobiliariavitrini.com.br.
//!
//! [`extract()`] turns a listing detail page into a [`ListingRecord`];
//! [`scrapers::VitriniScraper`] crawls the site and feeds a [`store::ListingStore`].

pub mod config;
pub mod extract;
pub mod legacy;
pub mod models;
pub mod scrapers;
pub mod store;

pub use config::{ScoutConfig, SiteProfile};
pub use extract::{extract, extract_html, ListingExtractor};
pub use models::{ListingRecord, Source};
