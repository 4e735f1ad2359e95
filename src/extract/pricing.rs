use crate::config::SiteProfile;
use crate::extract::numbers::parse_brl;
use crate::extract::text::{body_text, element_text, fold};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

// Patterns run on folded (lower-case, unaccented) text.
static RENT_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"aluguel:\s*(r\$\s*[0-9.,]+)").unwrap());
static CONDO_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"condominio:\s*(r\$\s*[0-9.,]+)").unwrap());
static TAX_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"iptu:\s*(r\$\s*[0-9.,]+)").unwrap());

static EMPHASIZED: Lazy<Selector> = Lazy::new(|| Selector::parse("strong, b").expect("valid selector"));
static PRICE_HINTS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"[class*="preco"], [class*="valor"]"#).expect("valid selector"));

/// Strategies get the document and its folded body text.
type RentStrategy = fn(&Html, &str) -> Option<f64>;

const RENT_STRATEGIES: &[(&str, RentStrategy)] = &[
    ("labeled", labeled_rent),
    ("emphasized", emphasized_rent),
    ("price-class", price_class_rent),
];

/// Monthly amounts found on a detail page, in major units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pricing {
    pub rent: Option<f64>,
    pub condo_fee: Option<f64>,
    pub property_tax: Option<f64>,
}

pub fn extract_pricing(doc: &Html, profile: &SiteProfile) -> Pricing {
    let page = fold(&body_text(doc));
    let fee_blocks = fee_block_texts(doc, &profile.fee_block_class);

    Pricing {
        rent: rent(doc, &page),
        condo_fee: fee(&fee_blocks, &page, &CONDO_LABEL),
        property_tax: fee(&fee_blocks, &page, &TAX_LABEL),
    }
}

fn rent(doc: &Html, page: &str) -> Option<f64> {
    RENT_STRATEGIES.iter().find_map(|(name, strategy)| {
        let found = strategy(doc, page)?;
        debug!(strategy = *name, amount = found, "rent found");
        Some(found)
    })
}

fn labeled_rent(_doc: &Html, page: &str) -> Option<f64> {
    labeled_amount(page, &RENT_LABEL)
}

fn emphasized_rent(doc: &Html, _page: &str) -> Option<f64> {
    doc.select(&EMPHASIZED)
        .find_map(|el| parse_brl(element_text(el).trim()))
}

fn price_class_rent(doc: &Html, _page: &str) -> Option<f64> {
    let el = doc.select(&PRICE_HINTS).next()?;
    parse_brl(element_text(el).trim())
}

/// Fee block first, whole page second.
fn fee(blocks: &[String], page: &str, label: &Regex) -> Option<f64> {
    blocks
        .iter()
        .find_map(|block| labeled_amount(block, label))
        .or_else(|| labeled_amount(page, label))
}

fn fee_block_texts(doc: &Html, class_hint: &str) -> Vec<String> {
    if class_hint.is_empty() {
        return Vec::new();
    }
    let Ok(selector) = Selector::parse(&format!(r#"[class*="{}"]"#, class_hint.replace('"', ""))) else {
        return Vec::new();
    };
    doc.select(&selector).map(|el| fold(&element_text(el))).collect()
}

fn labeled_amount(folded: &str, label: &Regex) -> Option<f64> {
    let caps = label.captures(folded)?;
    parse_brl(&caps[1])
}
