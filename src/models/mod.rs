use serde::{Deserialize, Serialize};

/// Source of the listing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    #[default]
    Vitrini,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Vitrini => "vitrini",
        }
    }
}

/// Normalized rental listing, as produced by one extraction call.
///
/// Monetary fields are major-unit amounts (`"R$ 1.200,00"` becomes `1200.0`).
/// Absent fields are skipped when serialized, never written as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condo_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_tax: Option<f64>,
    #[serde(default)]
    pub location_text: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_sq_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedroom_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bathroom_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub pet_friendly: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amenities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source_origin: Source,
}

impl ListingRecord {
    /// Record carrying only the page URL; every other field absent.
    pub fn empty(url: impl Into<String>, source: Source) -> Self {
        Self {
            url: url.into(),
            code: None,
            title: String::new(),
            rent_amount: None,
            condo_fee: None,
            property_tax: None,
            location_text: String::new(),
            neighborhood: String::new(),
            area_sq_meters: None,
            bedroom_count: None,
            bathroom_count: None,
            description: None,
            furnished: false,
            pet_friendly: false,
            amenities: Vec::new(),
            image_url: None,
            source_origin: source,
        }
    }

    /// A record is worth keeping when it has a title and sane numbers.
    pub fn is_usable(&self) -> bool {
        !self.title.trim().is_empty() && self.numeric_fields().iter().flatten().all(|v| is_amount(*v))
    }

    /// Upsert key: the site code when known, the URL otherwise.
    pub fn identity_key(&self) -> String {
        match &self.code {
            Some(code) => format!("code:{code}"),
            None => format!("url:{}", self.url),
        }
    }

    fn numeric_fields(&self) -> [Option<f64>; 6] {
        [
            self.rent_amount,
            self.condo_fee,
            self.property_tax,
            self.area_sq_meters,
            self.bedroom_count,
            self.bathroom_count,
        ]
    }
}

/// Finite and non-negative.
pub fn is_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// Grouping key for a location string: `"Savassi, Belo Horizonte"` -> `"Savassi"`.
pub fn neighborhood_of(location: &str) -> String {
    let head = location.split(',').next().unwrap_or_default().trim();
    if head.is_empty() {
        location.trim().to_string()
    } else {
        head.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn neighborhood_takes_first_segment() {
        assert_eq!(neighborhood_of("Savassi, Belo Horizonte"), "Savassi");
        assert_eq!(neighborhood_of("  Funcionários , BH, MG"), "Funcionários");
    }

    #[test]
    fn neighborhood_without_comma_is_whole_string() {
        assert_eq!(neighborhood_of("Belo Horizonte"), "Belo Horizonte");
        assert_eq!(neighborhood_of(", Belo Horizonte"), ", Belo Horizonte");
        assert_eq!(neighborhood_of(""), "");
    }

    #[test]
    fn identity_prefers_code() {
        let mut record = ListingRecord::empty("https://x.test/imovel/?codigo=7", Source::Vitrini);
        assert_eq!(record.identity_key(), "url:https://x.test/imovel/?codigo=7");
        record.code = Some("7".to_string());
        assert_eq!(record.identity_key(), "code:7");
    }

    #[test]
    fn usable_requires_title_and_sane_numbers() {
        let mut record = ListingRecord::empty("https://x.test/a", Source::Vitrini);
        assert!(!record.is_usable());
        record.title = "Apartamento".to_string();
        record.rent_amount = Some(1200.0);
        assert!(record.is_usable());
        record.condo_fee = Some(-1.0);
        assert!(!record.is_usable());
        record.condo_fee = Some(f64::NAN);
        assert!(!record.is_usable());
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let mut record = ListingRecord::empty("https://x.test/a", Source::Vitrini);
        record.title = "Kitnet".to_string();
        record.rent_amount = Some(900.0);
        let json = serde_json::to_value(&record).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj["rentAmount"], serde_json::json!(900.0));
        assert_eq!(obj["sourceOrigin"], serde_json::json!("vitrini"));
        assert!(!obj.contains_key("condoFee"));
        assert!(!obj.contains_key("propertyTax"));
        assert!(!obj.contains_key("amenities"));
        assert!(!obj.contains_key("code"));
        assert!(obj.contains_key("locationText"));
        assert!(obj.contains_key("furnished"));
    }
}
