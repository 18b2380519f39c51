//! Listing page parser
//!
//! Finds the property cards on a listing page and yields the absolute URL of
//! each card's detail page.

use crate::url::resolve_href;
use scraper::{Html, Selector};
use std::sync::OnceLock;
use url::Url;

static CONTAINER_SELECTOR: OnceLock<Selector> = OnceLock::new();
static ANCHOR_SELECTOR: OnceLock<Selector> = OnceLock::new();

/// Yields the detail URLs of a listing page, one per property card
///
/// For each `div.property-listing` card the first anchor is taken; when its
/// href resolves against `origin` the absolute URL is yielded. Cards without
/// a usable anchor are skipped silently. The iterator is lazy and single-pass.
///
/// # Example
///
/// ```
/// use rent_harvest::crawler::extract_listing_urls;
/// use scraper::Html;
/// use url::Url;
///
/// let html = Html::parse_document(
///     r#"<div class="property-listing"><a href="/property/flat-1">Flat</a></div>"#,
/// );
/// let origin = Url::parse("https://propertypro.ng").unwrap();
/// let urls: Vec<String> = extract_listing_urls(&html, &origin).collect();
/// assert_eq!(urls, vec!["https://propertypro.ng/property/flat-1"]);
/// ```
pub fn extract_listing_urls<'a>(
    document: &'a Html,
    origin: &'a Url,
) -> impl Iterator<Item = String> + 'a {
    let container = CONTAINER_SELECTOR.get_or_init(|| {
        Selector::parse("div.property-listing").expect("static listing CSS selector is valid")
    });
    let anchor = ANCHOR_SELECTOR
        .get_or_init(|| Selector::parse("a").expect("static anchor CSS selector is valid"));

    document.select(container).filter_map(move |card| {
        let first_anchor = card.select(anchor).next()?;
        let href = first_anchor.value().attr("href")?;
        resolve_href(href, origin)
    })
}
