use crate::extract::text::{element_text, fold, next_sibling_named, parent_element, trimmed_text, KeywordSet};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static SECTION_HEADINGS: Lazy<Selector> = Lazy::new(|| Selector::parse("h3, h4").expect("valid selector"));
static LIST_ITEMS: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));
static CHARACTERISTICS: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["característica"]));

// "móveis" is left out of the description set: "imóveis" folds to a superset of it.
static FURNISHED_IN_AMENITIES: Lazy<KeywordSet> =
    Lazy::new(|| KeywordSet::new(&["mobiliado", "mobília", "móveis", "furnished"]));
static FURNISHED_IN_DESCRIPTION: Lazy<KeywordSet> = Lazy::new(|| KeywordSet::new(&["mobiliado", "mobília"]));
static PETS: Lazy<KeywordSet> =
    Lazy::new(|| KeywordSet::new(&["pet", "animal", "gato", "cachorro", "aceita pet"]));

/// Amenities longer than this are paragraphs, not phrases.
pub const MAX_AMENITY_CHARS: usize = 80;

/// List items under the first "Características" heading.
///
/// Items come from lists inside the heading's container, then from the
/// first list following that container. Only the first such section is read.
pub fn extract_amenities(doc: &Html) -> Vec<String> {
    let Some(heading) = doc
        .select(&SECTION_HEADINGS)
        .find(|h| CHARACTERISTICS.matches(&element_text(*h)))
    else {
        return Vec::new();
    };
    let Some(container) = parent_element(heading) else {
        return Vec::new();
    };

    let mut items = list_items_within(container);
    if let Some(list) = next_sibling_named(container, "ul") {
        items.extend(list.select(&LIST_ITEMS));
    }
    items
        .into_iter()
        .map(trimmed_text)
        .filter(|text| is_amenity(text))
        .collect()
}

/// `<li>` descendants of `container` that sit inside a `<ul>` which is itself inside `container`.
fn list_items_within(container: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    container
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "li")
        .filter(|li| {
            li.ancestors()
                .take_while(|node| node.id() != container.id())
                .any(|node| node.value().as_element().is_some_and(|el| el.name() == "ul"))
        })
        .collect()
}

pub fn is_amenity(text: &str) -> bool {
    !text.is_empty()
        && text.chars().count() < MAX_AMENITY_CHARS
        && !text.chars().all(|c| c.is_ascii_digit())
}

/// Boolean traits derived from amenities and description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitTraits {
    pub furnished: bool,
    pub pet_friendly: bool,
}

impl UnitTraits {
    pub fn derive(amenities: &[String], description: &str) -> Self {
        let amenities = fold(&amenities.join(" "));
        let description = fold(description);
        Self {
            furnished: FURNISHED_IN_AMENITIES.matches_folded(&amenities)
                || FURNISHED_IN_DESCRIPTION.matches_folded(&description),
            pet_friendly: PETS.matches_folded(&amenities) || PETS.matches_folded(&description),
        }
    }
}
