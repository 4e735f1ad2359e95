use crate::extract::numbers::parse_localized_number;
use crate::extract::text::{element_text, fold, KeywordSet};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static DETAIL_LABELS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h5, h6, dt, .property-detail").expect("valid selector")
});
static EMPHASIS: Lazy<Selector> = Lazy::new(|| Selector::parse("strong").expect("valid selector"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));
static LABEL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^.*:\s*").unwrap());

static AREA: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["área", "area"]));
static BEDROOMS: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["dormitório", "quarto"]));
static BATHROOMS: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["banheiro"]));

/// Area in square meters and room counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Dimensions {
    pub area: Option<f64>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
}

impl Dimensions {
    fn is_complete(&self) -> bool {
        self.area.is_some() && self.bedrooms.is_some() && self.bathrooms.is_some()
    }

    /// Records `value` for every field whose keywords appear in `label`.
    /// A later match overwrites an earlier one.
    fn observe(&mut self, label: &str, value: Option<f64>) {
        let Some(value) = value else {
            return;
        };
        if AREA.matches_folded(label) {
            self.area = Some(value);
        }
        if BEDROOMS.matches_folded(label) {
            self.bedrooms = Some(value);
        }
        if BATHROOMS.matches_folded(label) {
            self.bathrooms = Some(value);
        }
    }
}

pub fn extract_dimensions(doc: &Html) -> Dimensions {
    let mut found = Dimensions::default();
    for el in doc.select(&DETAIL_LABELS) {
        // A label holding other labels is a wrapper; its children are read on their own.
        if holds_labels(el) {
            continue;
        }
        let text = element_text(el);
        let text = text.trim();
        found.observe(&fold(text), parse_localized_number(&label_value(el, text)));
    }

    if !found.is_complete() {
        let mut listed = Dimensions::default();
        for item in doc.select(&LIST_ITEMS) {
            let text = element_text(item);
            listed.observe(&fold(&text), parse_localized_number(&text));
        }
        found.area = found.area.or(listed.area);
        found.bedrooms = found.bedrooms.or(listed.bedrooms);
        found.bathrooms = found.bathrooms.or(listed.bathrooms);
    }
    found
}

fn holds_labels(el: ElementRef<'_>) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|inner| DETAIL_LABELS.matches(&inner))
}

/// Emphasized child text, or whatever follows the label's colon.
fn label_value(el: ElementRef<'_>, text: &str) -> String {
    match el.select(&EMPHASIS).next() {
        Some(strong) => element_text(strong).trim().to_string(),
        None => LABEL_PREFIX.replace(text, "").into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dims_of(html: &str) -> Dimensions {
        extract_dimensions(&Html::parse_document(html))
    }

    #[test]
    fn definition_terms_with_emphasis() {
        let d = dims_of(
            "<dl><dt>Área útil <strong>65</strong> m²</dt><dt>Quartos <strong>2</strong></dt><dt>Banheiros <strong>1</strong></dt></dl>",
        );
        assert_eq!(
            d,
            Dimensions { area: Some(65.0), bedrooms: Some(2.0), bathrooms: Some(1.0) }
        );
    }

    #[test]
    fn value_after_colon_without_emphasis() {
        let d = dims_of(r#"<h6>Dormitórios: 3</h6><div class="property-detail">Area: 72,5 m²</div>"#);
        assert_eq!(d.bedrooms, Some(3.0));
        assert_eq!(d.area, Some(72.5));
    }

    #[test]
    fn last_match_wins() {
        let d = dims_of("<h5>Quartos: 2</h5><h5>Quartos: 3</h5>");
        assert_eq!(d.bedrooms, Some(3.0));
    }

    #[test]
    fn list_items_fill_missing_fields_only() {
        let d = dims_of(
            "<h5>Área: 50</h5><ul><li>Área útil: 80 m²</li><li>2 dormitórios</li><li>Banheiro social: 1</li></ul>",
        );
        assert_eq!(d.area, Some(50.0));
        assert_eq!(d.bedrooms, Some(2.0));
        assert_eq!(d.bathrooms, Some(1.0));
    }

    #[test]
    fn details_wrapper_is_not_a_label() {
        let d = dims_of(r#"<ul class="property-details"><li>Área: 65 m²</li><li>Quartos: 2</li></ul>"#);
        assert_eq!(d.area, Some(65.0));
        assert_eq!(d.bedrooms, Some(2.0));

        let d = dims_of(
            r#"<div class="property-detail">
                <div class="property-detail">Área: 65 m²</div>
                <div class="property-detail">Quartos: <strong>2</strong></div>
            </div>
            <p>Banheiro social reformado</p>"#,
        );
        assert_eq!(d, Dimensions { area: Some(65.0), bedrooms: Some(2.0), bathrooms: None });
    }

    #[test]
    fn unparseable_values_are_absent() {
        let d = dims_of("<dt>Área <strong>consulte</strong></dt><li>Área de serviço</li>");
        assert_eq!(d, Dimensions::default());
    }
}
