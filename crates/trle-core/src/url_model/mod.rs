//! URL modeling: listing URL validation, site-relative joins and archive
//! file names derived from the resolved download URL.

mod path;
mod validate;

pub use path::filename_from_url_path;
pub use validate::{validate_listing_url, UrlError};

/// Joins a site-relative reference onto `base` with exactly one `/` between them.
///
/// References that are already absolute `http(s)` URLs are returned unchanged.
///
/// # Examples
///
/// - `join_site_path("https://www.trle.net", "/screens/1.jpg")` → `"https://www.trle.net/screens/1.jpg"`
/// - `join_site_path("https://www.trle.net/sc/", "walk.php?lid=1")` → `"https://www.trle.net/sc/walk.php?lid=1"`
pub fn join_site_path(base: &str, reference: &str) -> String {
    let lower = reference.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return reference.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        reference.trim_start_matches('/')
    )
}
