use crate::config::SiteProfile;
use crate::extract::text::{fold, non_empty, parent_element, trimmed_text};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("valid selector"));
static LOCATION_HINTS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[class*="localizacao"], [class*="endereco"], [class*="bairro"]"#)
        .expect("valid selector")
});
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));

/// Free-text location of the unit, or an empty string.
///
/// Looks first for a `"<bairro>, <city>"` line next to the title heading,
/// then for an element whose class mentions address/neighborhood, then for
/// any paragraph naming the city or state.
pub fn resolve_location(doc: &Html, title: &str, profile: &SiteProfile) -> String {
    if let Some(found) = near_title(doc, title, &profile.city) {
        debug!(location = %found, "location next to title heading");
        return found;
    }
    class_hint(doc)
        .or_else(|| city_paragraph(doc, profile))
        .unwrap_or_default()
}

fn near_title(doc: &Html, title: &str, city: &str) -> Option<String> {
    let heading = doc.select(&H1).next()?;
    let scope = parent_element(heading)?;
    scope
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .map(trimmed_text)
        .find(|text| !text.is_empty() && text != title && is_city_line(text, city))
}

fn class_hint(doc: &Html) -> Option<String> {
    doc.select(&LOCATION_HINTS).next().map(trimmed_text).and_then(non_empty)
}

fn city_paragraph(doc: &Html, profile: &SiteProfile) -> Option<String> {
    let city = fold(&profile.city);
    let state = fold(&profile.state);
    doc.select(&PARAGRAPHS)
        .map(trimmed_text)
        .find(|text| {
            let folded = fold(text);
            (!city.is_empty() && folded.contains(&city)) || (!state.is_empty() && folded.contains(&state))
        })
}

/// `"<words>, <city>..."`: only word characters and spaces before the first comma.
pub fn is_city_line(text: &str, city: &str) -> bool {
    let Some((head, tail)) = text.split_once(',') else {
        return false;
    };
    !head.is_empty()
        && head.chars().all(|c| c.is_alphanumeric() || c == '_' || c.is_whitespace())
        && fold(tail.trim_start()).starts_with(&fold(city))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn location_of(html: &str) -> String {
        let doc = Html::parse_document(html);
        resolve_location(&doc, "Apartamento", &SiteProfile::default())
    }

    #[test]
    fn city_line_next_to_heading() {
        let html = r#"<body><div class="head">
            <h1>Apartamento</h1>
            <span>Código 123</span>
            <span>Funcionários, Belo Horizonte - MG</span>
        </div></body>"#;
        assert_eq!(location_of(html), "Funcionários, Belo Horizonte - MG");
    }

    #[test]
    fn class_hint_when_heading_has_no_city_line() {
        let html = r#"<body><div><h1>Apartamento</h1></div>
            <div class="imovel-bairro"> Savassi </div>
            <p>Em Belo Horizonte desde 1990.</p></body>"#;
        assert_eq!(location_of(html), "Savassi");
    }

    #[test]
    fn paragraph_mentioning_city_is_last_resort() {
        let html = r#"<body><h2>x</h2><p>Imóvel bem localizado.</p>
            <p> Rua da Bahia, centro de belo horizonte </p></body>"#;
        assert_eq!(location_of(html), "Rua da Bahia, centro de belo horizonte");
        assert_eq!(location_of("<body><p>nada</p></body>"), "");
    }

    #[test]
    fn city_line_shape() {
        assert!(is_city_line("Savassi, Belo Horizonte", "Belo Horizonte"));
        assert!(is_city_line("Santa Efigênia,belo horizonte", "Belo Horizonte"));
        assert!(!is_city_line("Rua X, 10, Belo Horizonte", "Belo Horizonte"));
        assert!(!is_city_line("Savassi - Belo Horizonte", "Belo Horizonte"));
        assert!(!is_city_line("Savassi, Contagem", "Belo Horizonte"));
    }
}
