//! Text helpers shared by the field strategies.
//!
//! Keyword matching is done on *folded* text: lower-cased with Portuguese
//! diacritics removed, so `"Dormitórios"` and `"DORMITORIOS"` both contain
//! `"dormitorio"`. Haystack and keywords go through the same [`fold`].

use scraper::{ElementRef, Html, Selector};
use once_cell::sync::Lazy;

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("valid selector"));

/// Lower-case and strip accents.
pub fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).map(strip_accent).collect()
}

fn strip_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// A fixed set of keywords, stored folded.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    folded: Vec<String>,
}

impl KeywordSet {
    pub fn new(words: &[&str]) -> Self {
        Self {
            folded: words.iter().map(|w| fold(w)).collect(),
        }
    }

    /// True if `haystack` contains any keyword, ignoring case and accents.
    pub fn matches(&self, haystack: &str) -> bool {
        self.matches_folded(&fold(haystack))
    }

    /// Same as [`matches`](Self::matches) for text that is already folded.
    pub fn matches_folded(&self, folded: &str) -> bool {
        self.folded.iter().any(|k| folded.contains(k.as_str()))
    }
}

/// Concatenated text of an element and its descendants.
pub fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub fn trimmed_text(el: ElementRef<'_>) -> String {
    element_text(el).trim().to_string()
}

/// `Some(s)` unless `s` is empty.
pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Full text of `<body>`, or of the whole document if there is none.
pub fn body_text(doc: &Html) -> String {
    match doc.select(&BODY).next() {
        Some(body) => element_text(body),
        None => element_text(doc.root_element()),
    }
}

pub fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

/// First following sibling that is an element.
pub fn next_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// First following sibling element with the given tag name.
pub fn next_sibling_named<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| sibling.value().name() == name)
}
