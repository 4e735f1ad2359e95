//! Migration of datasets written by the older scraper, which stored prices
//! as formatted text (`"price": "R$ 1.200,00"`) under Portuguese keys.

use crate::config::SiteProfile;
use crate::extract::listing_code;
use crate::extract::numbers::parse_brl;
use crate::models::{is_amount, neighborhood_of, ListingRecord, Source};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{info, warn};

/// Counters reported after [`convert_prices`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub items: usize,
    pub prices_converted: usize,
    pub prices_zeroed: usize,
    pub fees_converted: usize,
    pub fees_removed: usize,
}

/// Rewrites string prices as numbers, in place.
///
/// `price` becomes `0` when unparseable, `condominio`/`iptu` are removed
/// instead, and a missing `origin` defaults to `vitrini`.
pub fn convert_prices(items: &mut [Value]) -> ConversionSummary {
    let mut summary = ConversionSummary::default();
    for item in items.iter_mut() {
        let Some(obj) = item.as_object_mut() else {
            warn!("Skipping non-object dataset entry");
            continue;
        };
        summary.items += 1;

        if let Some(Value::String(raw)) = obj.get("price") {
            match parse_brl(raw) {
                Some(n) => {
                    obj.insert("price".to_string(), json!(n));
                    summary.prices_converted += 1;
                }
                None => {
                    obj.insert("price".to_string(), json!(0));
                    summary.prices_zeroed += 1;
                }
            }
        }

        for key in ["condominio", "iptu"] {
            if let Some(Value::String(raw)) = obj.get(key) {
                match parse_brl(raw) {
                    Some(n) => {
                        obj.insert(key.to_string(), json!(n));
                        summary.fees_converted += 1;
                    }
                    None => {
                        obj.remove(key);
                        summary.fees_removed += 1;
                    }
                }
            }
        }

        if !is_truthy(obj.get("origin")) {
            obj.insert("origin".to_string(), json!(Source::Vitrini.as_str()));
        }
    }
    summary
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

/// Converts a legacy JSON array file in place.
pub async fn convert_file(path: &Path) -> Result<ConversionSummary> {
    let mut items = read_array(path).await?;
    let summary = convert_prices(&mut items);
    let json = serde_json::to_string_pretty(&items)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(
        "Converted {} items in {} ({} prices, {} fees, {} fees removed)",
        summary.items,
        path.display(),
        summary.prices_converted,
        summary.fees_converted,
        summary.fees_removed
    );
    Ok(summary)
}

pub async fn read_array(path: &Path) -> Result<Vec<Value>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array", path.display()))
}

/// Maps a legacy item to the canonical record. Items without a URL are dropped.
///
/// A missing `codigo` falls back to the profile's code key in the URL query.
pub fn upgrade(item: &Value, profile: &SiteProfile) -> Option<ListingRecord> {
    let obj = item.as_object()?;
    let url = str_field(obj, "url").filter(|u| !u.is_empty())?;

    let mut record = ListingRecord::empty(url.clone(), profile.source);
    record.code = code_field(obj).or_else(|| listing_code(&url, &profile.code_param));
    record.title = str_field(obj, "title").unwrap_or_default().trim().to_string();
    record.rent_amount = amount_field(obj, "price");
    record.condo_fee = amount_field(obj, "condominio");
    record.property_tax = amount_field(obj, "iptu");
    record.location_text = str_field(obj, "location").unwrap_or_default();
    record.neighborhood = str_field(obj, "neighborhood")
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| neighborhood_of(&record.location_text));
    record.area_sq_meters = number_field(obj, "area");
    record.bedroom_count = number_field(obj, "bedrooms");
    record.bathroom_count = number_field(obj, "bathrooms");
    record.description = str_field(obj, "description").filter(|d| !d.is_empty());
    record.furnished = obj.get("furnished").and_then(Value::as_bool).unwrap_or(false);
    record.pet_friendly = obj.get("petFriendly").and_then(Value::as_bool).unwrap_or(false);
    record.amenities = obj
        .get("characteristics")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    record.image_url = str_field(obj, "image").filter(|i| !i.is_empty());
    Some(record)
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn code_field(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("codigo")? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64).filter(|v| is_amount(*v))
}

/// Numbers as-is, strings through the BRL rule. A zero rent means "unknown".
fn amount_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    let value = match obj.get(key)? {
        Value::String(raw) => parse_brl(raw),
        other => other.as_f64(),
    };
    value.filter(|v| is_amount(*v) && !(key == "price" && *v == 0.0))
}
