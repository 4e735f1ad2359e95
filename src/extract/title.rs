use crate::config::SiteProfile;
use crate::extract::text::{fold, non_empty, trimmed_text};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static OG_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));

/// First heading, then `og:title` minus the site suffix, then `<title>`.
pub fn resolve_title(doc: &Html, profile: &SiteProfile) -> String {
    first_heading(doc)
        .or_else(|| open_graph_title(doc, &profile.site_name))
        .or_else(|| document_title(doc))
        .unwrap_or_default()
}

fn first_heading(doc: &Html) -> Option<String> {
    doc.select(&H1).next().map(trimmed_text).and_then(non_empty)
}

fn open_graph_title(doc: &Html, site_name: &str) -> Option<String> {
    let content = doc.select(&OG_TITLE).next()?.value().attr("content")?;
    non_empty(strip_site_suffix(content, site_name).to_string())
}

fn document_title(doc: &Html) -> Option<String> {
    doc.select(&TITLE).next().map(trimmed_text).and_then(non_empty)
}

/// `"Casa 3 quartos - Imobiliária Vitrini"` -> `"Casa 3 quartos"`.
pub fn strip_site_suffix<'a>(title: &'a str, site_name: &str) -> &'a str {
    let trimmed = title.trim();
    if let Some(dash) = trimmed.rfind('-') {
        if fold(trimmed[dash + 1..].trim()) == fold(site_name.trim()) {
            return trimmed[..dash].trim();
        }
    }
    trimmed
}
