use crate::config::ScoutConfig;
use crate::extract::ListingExtractor;
use crate::models::ListingRecord;
use crate::scrapers::traits::ScraperTrait;
use crate::scrapers::types::{CrawlParams, PageLabel};
use crate::store::{ListingStore, Upsert};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

static LINKS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Summary of one crawl run
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub listings_extracted: usize,
    pub listings_replaced: usize,
    pub unusable_listings: usize,
}

/// Records collected by a crawl plus its report
#[derive(Debug)]
pub struct CrawlOutcome {
    pub store: ListingStore,
    pub report: CrawlReport,
}

/// What a fetched page contributed
enum PageOutcome {
    Listing(Box<ListingRecord>),
    Links(Vec<(Url, PageLabel)>),
}

/// Crawler for imobiliariavitrini.com.br rental listings
pub struct VitriniScraper {
    client: Client,
    params: CrawlParams,
    extractor: ListingExtractor,
}

impl VitriniScraper {
    /// Create a new scraper with the default site profile and crawl parameters
    pub fn new() -> Result<Self> {
        Self::with_config(&ScoutConfig::default())
    }

    /// Create a new scraper from a loaded configuration
    pub fn with_config(config: &ScoutConfig) -> Result<Self> {
        let params = config.crawl.clone();
        let client = Client::builder()
            .timeout(Duration::from_secs(params.request_timeout_secs))
            .user_agent(params.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            params,
            extractor: ListingExtractor::new(config.site.clone()),
        })
    }

    pub fn params(&self) -> &CrawlParams {
        &self.params
    }

    /// Crawl into a fresh store
    pub async fn crawl(&self) -> Result<CrawlOutcome> {
        let mut store = ListingStore::new();
        let report = self.crawl_into(&mut store).await?;
        Ok(CrawlOutcome { store, report })
    }

    /// Breadth-first crawl from the start URLs, upserting every usable listing into `store`.
    ///
    /// Failed fetches are logged and skipped; the crawl stops once
    /// `max_requests_per_crawl` pages have been requested.
    pub async fn crawl_into(&self, store: &mut ListingStore) -> Result<CrawlReport> {
        let mut report = CrawlReport {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            pages_fetched: 0,
            fetch_failures: 0,
            listings_extracted: 0,
            listings_replaced: 0,
            unusable_listings: 0,
        };

        let mut queue: VecDeque<(Url, PageLabel)> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();

        for raw in &self.params.start_urls {
            match Url::parse(raw) {
                Ok(url) => {
                    let label = self.classify(&url, &url).unwrap_or(PageLabel::List);
                    if seen.insert(url.to_string()) {
                        queue.push_back((url, label));
                    }
                }
                Err(e) => warn!("Skipping invalid start URL {}: {}", raw, e),
            }
        }
        if queue.is_empty() {
            anyhow::bail!("No valid start URLs configured");
        }

        info!("Starting {} crawl from {} start URLs", self.source_name(), queue.len());

        let mut requests = 0;
        while let Some((url, label)) = queue.pop_front() {
            if requests >= self.params.max_requests_per_crawl {
                info!("Reached max requests per crawl ({})", self.params.max_requests_per_crawl);
                break;
            }
            if requests > 0 && self.params.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.params.request_delay_ms)).await;
            }
            requests += 1;

            let (final_url, html) = match self.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!("{:#}", e);
                    report.fetch_failures += 1;
                    continue;
                }
            };
            report.pages_fetched += 1;

            match self.process_page(&html, &final_url, label) {
                PageOutcome::Listing(record) => {
                    if !record.is_usable() {
                        warn!(url = %record.url, "Discarding listing without title");
                        report.unusable_listings += 1;
                        continue;
                    }
                    info!(
                        url = %record.url,
                        code = ?record.code,
                        title = %record.title,
                        rent = ?record.rent_amount,
                        area = ?record.area_sq_meters,
                        bedrooms = ?record.bedroom_count,
                        bathrooms = ?record.bathroom_count,
                        furnished = record.furnished,
                        pet_friendly = record.pet_friendly,
                        "Extracted listing"
                    );
                    report.listings_extracted += 1;
                    if store.upsert(*record) == Upsert::Replaced {
                        report.listings_replaced += 1;
                    }
                }
                PageOutcome::Links(links) => {
                    let mut added = 0;
                    for (link, link_label) in links {
                        if seen.insert(link.to_string()) {
                            queue.push_back((link, link_label));
                            added += 1;
                        }
                    }
                    info!("List page processed: {} ({} new links)", final_url, added);
                }
            }
        }

        report.finished_at = Utc::now();
        info!(
            "✅ Crawl finished: {} pages, {} failures, {} listings",
            report.pages_fetched, report.fetch_failures, report.listings_extracted
        );
        Ok(report)
    }

    /// Fetch a page, returning the post-redirect URL and body
    async fn fetch(&self, url: &Url) -> Result<(Url, String)> {
        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to fetch {}: {}", url, response.status());
        }

        let final_url = response.url().clone();
        let html = response.text().await.context("Failed to read response body")?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok((final_url, html))
    }

    /// Parse and handle one page. Kept synchronous: the parsed DOM never crosses an await.
    fn process_page(&self, html: &str, page_url: &Url, label: PageLabel) -> PageOutcome {
        let document = Html::parse_document(html);
        match label {
            PageLabel::Detail => {
                PageOutcome::Listing(Box::new(self.extractor.extract(&document, page_url.as_str())))
            }
            PageLabel::List => PageOutcome::Links(self.discover_links(&document, page_url)),
        }
    }

    fn discover_links(&self, document: &Html, page_url: &Url) -> Vec<(Url, PageLabel)> {
        document
            .select(&LINKS)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| page_url.join(href.trim()).ok())
            .filter_map(|mut link| {
                link.set_fragment(None);
                let label = self.classify(&link, page_url)?;
                Some((link, label))
            })
            .collect()
    }

    /// Label a same-host link as a detail or list page; anything else is not followed.
    pub fn classify(&self, link: &Url, origin: &Url) -> Option<PageLabel> {
        if link.host_str() != origin.host_str() || link.port_or_known_default() != origin.port_or_known_default() {
            return None;
        }
        if self.is_detail(link) {
            Some(PageLabel::Detail)
        } else if link.as_str().starts_with(&self.params.list_url_prefix) {
            Some(PageLabel::List)
        } else {
            None
        }
    }

    fn is_detail(&self, link: &Url) -> bool {
        let marker = &self.params.detail_path_marker;
        let code_param = &self.extractor.profile().code_param;
        let in_path = link
            .path_segments()
            .map(|mut segments| segments.any(|s| s.starts_with(marker.as_str())))
            .unwrap_or(false);
        in_path && link.query_pairs().any(|(key, _)| key.eq_ignore_ascii_case(code_param))
    }
}

#[async_trait]
impl ScraperTrait for VitriniScraper {
    async fn scrape(&self) -> Result<Vec<ListingRecord>> {
        let outcome = self.crawl().await?;
        Ok(outcome.store.into_records())
    }

    fn source_name(&self) -> &'static str {
        self.extractor.profile().source.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use pretty_assertions::assert_eq;

    const LIST_PATH: &str = "/buscar-imoveis/imoveis-para-alugar/";

    fn config_for(base: &str, max_requests: usize) -> ScoutConfig {
        let mut config = ScoutConfig::default();
        config.crawl.start_urls = vec![format!("{base}{LIST_PATH}?ordenacao=menor-preco")];
        config.crawl.list_url_prefix = format!("{base}{LIST_PATH}");
        config.crawl.max_requests_per_crawl = max_requests;
        config.crawl.request_delay_ms = 0;
        config.crawl.request_timeout_secs = 5;
        config
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn classifies_links() {
        let scraper = VitriniScraper::with_config(&config_for("https://imobiliariavitrini.com.br", 10)).unwrap();
        let origin = url("https://imobiliariavitrini.com.br/buscar-imoveis/imoveis-para-alugar/");

        assert_eq!(
            scraper.classify(&url("https://imobiliariavitrini.com.br/imovel/?codigo=43906"), &origin),
            Some(PageLabel::Detail)
        );
        assert_eq!(
            scraper.classify(&url("https://imobiliariavitrini.com.br/buscar-imoveis/imoveis-para-alugar/?pagina=2"), &origin),
            Some(PageLabel::List)
        );
        assert_eq!(scraper.classify(&url("https://imobiliariavitrini.com.br/contato/"), &origin), None);
        assert_eq!(scraper.classify(&url("https://imobiliariavitrini.com.br/imovel/"), &origin), None);
        assert_eq!(scraper.classify(&url("https://other.test/imovel/?codigo=1"), &origin), None);
    }

    #[tokio::test]
    async fn crawls_list_then_detail_pages() {
        let mut server = Server::new_async().await;
        let base = server.url();

        let list = server
            .mock("GET", LIST_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(
                r##"<html><body>
                <a href="/imovel/?codigo=101">A</a>
                <a href="/imovel/?codigo=102#fotos">B</a>
                <a href="/imovel/?codigo=103">C</a>
                <a href="/imovel/?codigo=101">A again</a>
                <a href="https://elsewhere.test/imovel/?codigo=9">external</a>
                <a href="/contato/">contato</a>
                </body></html>"##,
            )
            .expect(1)
            .create_async()
            .await;
        let first = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::UrlEncoded("codigo".into(), "101".into()))
            .with_status(200)
            .with_body(
                r#"<html><body><h1>Apartamento 2 quartos</h1>
                <p>Aluguel: R$ 1.500,00</p></body></html>"#,
            )
            .expect(1)
            .create_async()
            .await;
        let broken = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::UrlEncoded("codigo".into(), "102".into()))
            .with_status(500)
            .expect(1)
            .create_async()
            .await;
        let untitled = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::UrlEncoded("codigo".into(), "103".into()))
            .with_status(200)
            .with_body("<html><body><p>sem título</p></body></html>")
            .expect(1)
            .create_async()
            .await;

        let scraper = VitriniScraper::with_config(&config_for(&base, 100)).unwrap();
        let outcome = scraper.crawl().await.unwrap();

        list.assert_async().await;
        first.assert_async().await;
        broken.assert_async().await;
        untitled.assert_async().await;

        assert_eq!(outcome.report.pages_fetched, 3);
        assert_eq!(outcome.report.fetch_failures, 1);
        assert_eq!(outcome.report.unusable_listings, 1);
        assert_eq!(outcome.report.listings_extracted, 1);

        let records = outcome.store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code.as_deref(), Some("101"));
        assert_eq!(records[0].title, "Apartamento 2 quartos");
        assert_eq!(records[0].rent_amount, Some(1500.0));
        assert_eq!(records[0].url, format!("{base}/imovel/?codigo=101"));
    }

    #[tokio::test]
    async fn detail_records_use_the_redirect_target() {
        let mut server = Server::new_async().await;
        let base = server.url();

        let list = server
            .mock("GET", LIST_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<a href="/imovel/?codigo=201">antigo</a>"#)
            .expect(1)
            .create_async()
            .await;
        let moved = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::UrlEncoded("codigo".into(), "201".into()))
            .with_status(301)
            .with_header("location", &format!("{base}/imovel/?codigo=202"))
            .expect(1)
            .create_async()
            .await;
        let target = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::UrlEncoded("codigo".into(), "202".into()))
            .with_status(200)
            .with_body("<html><body><h1>Casa 3 quartos</h1><p>Aluguel: R$ 2.900,00</p></body></html>")
            .expect(1)
            .create_async()
            .await;

        let scraper = VitriniScraper::with_config(&config_for(&base, 10)).unwrap();
        let outcome = scraper.crawl().await.unwrap();

        list.assert_async().await;
        moved.assert_async().await;
        target.assert_async().await;

        let records = outcome.store.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, format!("{base}/imovel/?codigo=202"));
        assert_eq!(records[0].code.as_deref(), Some("202"));
        assert!(outcome.store.get("code:202").is_some());
        assert!(outcome.store.get("code:201").is_none());
    }

    #[tokio::test]
    async fn stops_at_request_cap() {
        let mut server = Server::new_async().await;
        let base = server.url();

        let list = server
            .mock("GET", LIST_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"<a href="/imovel/?codigo=1">A</a>"#)
            .expect(1)
            .create_async()
            .await;
        let detail = server
            .mock("GET", "/imovel/")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let scraper = VitriniScraper::with_config(&config_for(&base, 1)).unwrap();
        let records = scraper.scrape().await.unwrap();

        list.assert_async().await;
        detail.assert_async().await;
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn no_valid_start_url_is_an_error() {
        let mut config = ScoutConfig::default();
        config.crawl.start_urls = vec!["not a url".to_string()];
        let scraper = VitriniScraper::with_config(&config).unwrap();
        assert!(scraper.crawl().await.is_err());
    }
}
