//! URL handling for Rent-Harvest
//!
//! Builds listing-page request targets and resolves the hrefs found on
//! listing pages into absolute detail URLs.

use url::Url;

/// Builds the request target for a fetch
///
/// The page number is appended verbatim to the base URL, so a template such
/// as `https://host/rent?page=` becomes `https://host/rent?page=7`. Without a
/// page the base URL is used unchanged.
///
/// # Examples
///
/// ```
/// use rent_harvest::url::request_target;
///
/// assert_eq!(request_target("https://x.ng/rent?page=", Some(3)), "https://x.ng/rent?page=3");
/// assert_eq!(request_target("https://x.ng/p/42", None), "https://x.ng/p/42");
/// ```
pub fn request_target(base: &str, page: Option<u32>) -> String {
    match page {
        Some(page) => format!("{}{}", base, page),
        None => base.to_string(),
    }
}

/// Resolves an href against the site origin
///
/// Returns None if the href cannot lead to a detail page:
/// - empty or whitespace-only
/// - javascript:, mailto:, tel: and data: schemes
/// - fragment-only links
/// - anything that does not resolve to an http(s) URL
pub fn resolve_href(href: &str, origin: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match origin.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
