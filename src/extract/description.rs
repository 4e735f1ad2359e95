use crate::extract::text::{element_text, next_element_sibling, non_empty, parent_element, trimmed_text, KeywordSet};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static SECTION_HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").expect("valid selector"));
static PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").expect("valid selector"));
static ABOUT_PROPERTY: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["sobre o imóvel"]));

/// Paragraphs at least this long count as a description on their own.
const MIN_FALLBACK_CHARS: usize = 80;

pub fn extract_description(doc: &Html) -> Option<String> {
    about_section(doc).or_else(|| long_paragraph(doc))
}

/// Text of the block following the "Sobre o imóvel" heading's container.
fn about_section(doc: &Html) -> Option<String> {
    let heading = doc
        .select(&SECTION_HEADINGS)
        .find(|h| ABOUT_PROPERTY.matches(&element_text(*h)))?;
    let section = next_element_sibling(parent_element(heading)?)?;
    section
        .select(&PARAGRAPHS)
        .next()
        .map(trimmed_text)
        .and_then(non_empty)
        .or_else(|| non_empty(trimmed_text(section)))
}

fn long_paragraph(doc: &Html) -> Option<String> {
    doc.select(&PARAGRAPHS)
        .find(|p| element_text(*p).chars().count() > MIN_FALLBACK_CHARS)
        .map(trimmed_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn description_of(html: &str) -> Option<String> {
        extract_description(&Html::parse_document(html))
    }

    #[test]
    fn paragraph_after_about_heading() {
        let html = r#"<body>
            <div class="titulo"><h3>Sobre o Imóvel</h3></div>
            <div class="texto"><p> Apartamento amplo e arejado. </p><p>Segundo.</p></div>
        </body>"#;
        assert_eq!(description_of(html).as_deref(), Some("Apartamento amplo e arejado."));
    }

    #[test]
    fn container_text_when_no_paragraph() {
        let html = r#"<body>
            <div><h3>SOBRE O IMOVEL</h3></div>
            <div> Próximo ao metrô. </div>
        </body>"#;
        assert_eq!(description_of(html).as_deref(), Some("Próximo ao metrô."));
    }

    #[test]
    fn first_long_paragraph_as_fallback() {
        let long = "Excelente apartamento com vista definitiva, sol da manhã, armários planejados e vaga coberta.";
        let html = format!("<body><p>Curto.</p><p>{long}</p></body>");
        assert_eq!(description_of(&html).as_deref(), Some(long));
        assert_eq!(description_of("<body><p>Curto.</p></body>"), None);
    }
}
