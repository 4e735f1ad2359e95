//! Structured fields from a listing detail page.
//!
//! The source site has no stable markup, so each field is recovered by an
//! ordered list of strategies where the first hit wins. Nothing in here
//! fails: a strategy that finds nothing leaves its field absent, and a page
//! with no recognizable structure still yields a record carrying its URL.

pub mod amenities;
pub mod description;
pub mod dimensions;
pub mod image;
pub mod location;
pub mod numbers;
pub mod pricing;
pub mod text;
pub mod title;

use crate::config::SiteProfile;
use crate::models::{is_amount, neighborhood_of, ListingRecord};
use amenities::UnitTraits;
use once_cell::sync::Lazy;
use scraper::Html;
use url::Url;

static DEFAULT_EXTRACTOR: Lazy<ListingExtractor> = Lazy::new(ListingExtractor::default);

/// Extracts with the default (Vitrini) site profile.
pub fn extract(document: &Html, page_url: &str) -> ListingRecord {
    DEFAULT_EXTRACTOR.extract(document, page_url)
}

/// Parses `html` and extracts with the default site profile.
pub fn extract_html(html: &str, page_url: &str) -> ListingRecord {
    extract(&Html::parse_document(html), page_url)
}

/// Detail-page extractor bound to one site profile.
///
/// Holds no per-call state; one instance can serve any number of pages.
#[derive(Debug, Clone, Default)]
pub struct ListingExtractor {
    profile: SiteProfile,
}

impl ListingExtractor {
    pub fn new(profile: SiteProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn extract(&self, document: &Html, page_url: &str) -> ListingRecord {
        let profile = &self.profile;

        let title = title::resolve_title(document, profile);
        let location_text = location::resolve_location(document, &title, profile);
        let pricing = pricing::extract_pricing(document, profile);
        let dimensions = dimensions::extract_dimensions(document);
        let description = description::extract_description(document);
        let amenities = amenities::extract_amenities(document);
        let traits = UnitTraits::derive(&amenities, description.as_deref().unwrap_or_default());
        let image_url = image::resolve_image(document, page_url, &profile.placeholder_image);

        ListingRecord {
            url: page_url.to_string(),
            code: listing_code(page_url, &profile.code_param),
            title,
            rent_amount: amount(pricing.rent),
            condo_fee: amount(pricing.condo_fee),
            property_tax: amount(pricing.property_tax),
            neighborhood: neighborhood_of(&location_text),
            location_text,
            area_sq_meters: amount(dimensions.area),
            bedroom_count: amount(dimensions.bedrooms),
            bathroom_count: amount(dimensions.bathrooms),
            description,
            furnished: traits.furnished,
            pet_friendly: traits.pet_friendly,
            amenities,
            image_url,
            source_origin: profile.source,
        }
    }

    /// Parses `html` first.
    pub fn extract_html(&self, html: &str, page_url: &str) -> ListingRecord {
        self.extract(&Html::parse_document(html), page_url)
    }
}

fn amount(value: Option<f64>) -> Option<f64> {
    value.filter(|v| is_amount(*v))
}

/// Numeric listing code from the page URL's query, e.g. `?codigo=43906`.
///
/// The key is matched case-insensitively; the leading digits of its value are the code.
pub fn listing_code(page_url: &str, param: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let mut pairs = url.query_pairs();
    pairs.find_map(|(key, value)| {
        if !key.eq_ignore_ascii_case(param) {
            return None;
        }
        let digits: String = value.chars().take_while(char::is_ascii_digit).collect();
        if digits.is_empty() {
            None
        } else {
            Some(digits)
        }
    })
}
