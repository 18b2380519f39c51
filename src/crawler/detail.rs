//! Property detail page parser
//!
//! Every field is looked up independently and falls back to `"N/A"` (or an
//! absent feature list) on its own, so a missing fragment never costs the
//! rest of the record.

use crate::crawler::record::{PropertyRecord, NOT_AVAILABLE};
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Maximum number of attributes joined into `spec`
const SPEC_ITEMS: usize = 3;

const SPEC_SEPARATOR: &str = " | ";

/// CSS selectors for the detail page layout
struct DetailSelectors {
    title: Selector,
    content_block: Selector,
    paragraph: Selector,
    icon: Selector,
    location_icons: [Selector; 2],
    spec_items: Selector,
    price: Selector,
    description: Selector,
    features: Selector,
}

static SELECTORS: OnceLock<DetailSelectors> = OnceLock::new();

fn selectors() -> &'static DetailSelectors {
    SELECTORS.get_or_init(|| {
        let parse = |css: &str| Selector::parse(css).expect("static detail CSS selector is valid");

        DetailSelectors {
            title: parse("div.col-md-8 h1"),
            content_block: parse("div.content-block.position-relative"),
            paragraph: parse("p"),
            icon: parse("i"),
            location_icons: [parse("i.fa-location-dot"), parse("i.fa-solid.fa-location-dot")],
            spec_items: parse("div.property-pros ul li"),
            price: parse("div.pricing h2 strong"),
            description: parse("div.des-inner.font-16.line-paragraph"),
            features: parse("div.amen-grid a"),
        }
    })
}

/// Extracts a property record from a detail page
///
/// Never fails: fields the page does not provide come back as `"N/A"` and a
/// missing amenities grid leaves `features` as `None`.
///
/// # Example
///
/// ```
/// use rent_harvest::crawler::extract_property;
/// use scraper::Html;
///
/// let record = extract_property(&Html::parse_document("<html></html>"));
/// assert_eq!(record.title, "N/A");
/// assert_eq!(record.features, None);
/// ```
pub fn extract_property(document: &Html) -> PropertyRecord {
    let sel = selectors();

    PropertyRecord {
        title: or_not_available(extract_title(document, sel)),
        location: or_not_available(extract_location(document, sel)),
        spec: or_not_available(extract_spec(document, sel)),
        price: or_not_available(extract_price(document, sel)),
        description: or_not_available(extract_description(document, sel)),
        features: extract_features(document, sel),
    }
}

fn or_not_available(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Collected descendant text, trimmed
fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// First heading inside the main detail column
fn extract_title(document: &Html, sel: &DetailSelectors) -> Option<String> {
    document.select(&sel.title).next().map(text_of)
}

/// Text of the first paragraph carrying a location pin, minus the icon's text
fn extract_location(document: &Html, sel: &DetailSelectors) -> Option<String> {
    for block in document.select(&sel.content_block) {
        for paragraph in block.select(&sel.paragraph) {
            let has_pin = sel
                .location_icons
                .iter()
                .any(|icon| paragraph.select(icon).next().is_some());
            if !has_pin {
                continue;
            }

            let mut location = text_of(paragraph);
            if let Some(icon_text) = paragraph.select(&sel.icon).next().map(text_of) {
                if !icon_text.is_empty() {
                    location = location.replace(&icon_text, "").trim().to_string();
                }
            }
            return Some(location);
        }
    }

    None
}

/// First three "property pros" items joined with `" | "`
fn extract_spec(document: &Html, sel: &DetailSelectors) -> Option<String> {
    let items: Vec<String> = document
        .select(&sel.spec_items)
        .take(SPEC_ITEMS)
        .map(text_of)
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(items.join(SPEC_SEPARATOR))
    }
}

/// Effective price from the pricing block
///
/// With two or more emphasized prices the first one is the crossed-out
/// original, so the second wins.
fn extract_price(document: &Html, sel: &DetailSelectors) -> Option<String> {
    let prices: Vec<ElementRef<'_>> = document.select(&sel.price).take(2).collect();

    match prices.as_slice() {
        [_, effective, ..] => Some(text_of(*effective)),
        [only] => Some(text_of(*only)),
        [] => None,
    }
}

fn extract_description(document: &Html, sel: &DetailSelectors) -> Option<String> {
    document.select(&sel.description).next().map(text_of)
}

/// Amenity names in page order; `None` when the grid yields nothing
fn extract_features(document: &Html, sel: &DetailSelectors) -> Option<Vec<String>> {
    let features: Vec<String> = document.select(&sel.features).map(text_of).collect();

    if features.is_empty() {
        None
    } else {
        Some(features)
    }
}
