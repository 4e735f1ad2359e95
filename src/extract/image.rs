use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("valid selector"));
static GALLERY_LINKS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div.swiper-slide a, [class*="gallery"] a"#).expect("valid selector")
});
static NESTED_IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("valid selector"));
static PHOTO_IMAGES: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"img[src*="fotos"], img[src*="cdn"], img[src*="photo"]"#).expect("valid selector")
});
static STYLE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"url\(([^)]+)\)").unwrap());

/// Absolute URL of a representative photo, skipping the site's placeholder asset.
///
/// Tries `og:image`, then gallery/slider anchors (`href`, inline
/// `background: url(..)`, nested `<img>`), then the first photo-like `<img>`.
pub fn resolve_image(doc: &Html, page_url: &str, placeholder: &str) -> Option<String> {
    let candidate = open_graph_image(doc, placeholder)
        .or_else(|| gallery_image(doc, placeholder))
        .or_else(|| photo_image(doc, placeholder))?;
    debug!(candidate = %candidate, "image candidate");
    resolve_url(&candidate, page_url)
}

fn open_graph_image(doc: &Html, placeholder: &str) -> Option<String> {
    let content = doc.select(&OG_IMAGE).next()?.value().attr("content")?;
    usable_candidate(content, placeholder)
}

fn gallery_image(doc: &Html, placeholder: &str) -> Option<String> {
    doc.select(&GALLERY_LINKS)
        .find_map(|link| anchor_image(link, placeholder))
}

fn anchor_image(link: ElementRef<'_>, placeholder: &str) -> Option<String> {
    let attrs = link.value();
    attrs
        .attr("href")
        .and_then(|href| usable_candidate(href, placeholder))
        .or_else(|| {
            attrs
                .attr("style")
                .and_then(style_url)
                .and_then(|url| usable_candidate(&url, placeholder))
        })
        .or_else(|| {
            link.select(&NESTED_IMAGE)
                .next()
                .and_then(|img| img.value().attr("src"))
                .and_then(|src| usable_candidate(src, placeholder))
        })
}

fn photo_image(doc: &Html, placeholder: &str) -> Option<String> {
    doc.select(&PHOTO_IMAGES)
        .filter_map(|img| img.value().attr("src"))
        .find_map(|src| usable_candidate(src, placeholder))
}

/// `url('/fotos/1.jpg')` -> `/fotos/1.jpg`
fn style_url(style: &str) -> Option<String> {
    let caps = STYLE_URL.captures(style)?;
    Some(caps[1].replace(['\'', '"'], "").trim().to_string())
}

fn usable_candidate(raw: &str, placeholder: &str) -> Option<String> {
    let raw = raw.trim();
    let unusable = raw.is_empty()
        || raw.starts_with('#')
        || raw.starts_with("javascript:")
        || (!placeholder.is_empty() && raw.contains(placeholder));
    if unusable {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Resolves `src` against the page URL unless it is already absolute.
pub fn resolve_url(src: &str, page_url: &str) -> Option<String> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    let base = Url::parse(page_url).ok()?;
    base.join(src).ok().map(String::from)
}
