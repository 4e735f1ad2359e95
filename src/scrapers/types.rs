use serde::{Deserialize, Serialize};

/// Crawl parameters for the listing scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlParams {
    /// Pages the crawl starts from (search result pages)
    pub start_urls: Vec<String>,
    /// Hard cap on the number of fetched pages
    pub max_requests_per_crawl: usize,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Pause between two requests in milliseconds
    pub request_delay_ms: u64,
    /// User agent sent with every request
    pub user_agent: String,
    /// Links starting with this prefix are search result pages
    pub list_url_prefix: String,
    /// Path fragment that marks a listing detail page
    pub detail_path_marker: String,
}

impl Default for CrawlParams {
    fn default() -> Self {
        Self {
            start_urls: vec![
                "https://imobiliariavitrini.com.br/buscar-imoveis/imoveis-para-alugar/?ordenacao=menor-preco&cidade="
                    .to_string(),
            ],
            max_requests_per_crawl: 100,
            request_timeout_secs: 30,
            request_delay_ms: 500,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            list_url_prefix: "https://imobiliariavitrini.com.br/buscar-imoveis/imoveis-para-alugar/".to_string(),
            detail_path_marker: "imovel".to_string(),
        }
    }
}

/// What kind of page a queued URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    /// Search results; only followed for links
    List,
    /// A single listing; handed to the extractor
    Detail,
}
