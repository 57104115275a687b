//! Screenshot URLs: the primary image and the large versions behind the
//! hover-preview thumbnails.

use scraper::Html;

use crate::extract::Selectors;
use crate::url_model::join_site_path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Screenshots {
    /// Primary screenshot, prefixed with the site root.
    pub screen: Option<String>,
    /// Large screenshot hrefs in document order.
    pub large: Vec<String>,
}

pub fn collect_screenshots(doc: &Html, sel: &Selectors, site_root: &str) -> Screenshots {
    let screen = doc
        .select(&sel.screen)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(|src| join_site_path(site_root, src));
    if screen.is_none() {
        tracing::debug!(field = "screen", "primary screenshot not found");
    }

    let large: Vec<String> = doc
        .select(&sel.screens_large)
        .filter_map(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect();

    Screenshots { screen, large }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(html: &str) -> Screenshots {
        let doc = Html::parse_document(html);
        collect_screenshots(&doc, &Selectors::compile().unwrap(), "https://www.trle.net")
    }

    #[test]
    fn primary_and_large_in_order() {
        let s = collect(
            r#"<img class="border" src="/screens/3245.jpg">
               <a href="https://www.trle.net/screens/large/3245a.jpg" onmouseover="show(1)"><img></a>
               <a href="/sc/other.php">plain</a>
               <a href="https://www.trle.net/screens/large/3245b.jpg" onmouseover="show(2)"><img></a>"#,
        );
        assert_eq!(s.screen.as_deref(), Some("https://www.trle.net/screens/3245.jpg"));
        assert_eq!(
            s.large,
            vec![
                "https://www.trle.net/screens/large/3245a.jpg",
                "https://www.trle.net/screens/large/3245b.jpg",
            ]
        );
    }

    #[test]
    fn only_decorated_image_counts() {
        let s = collect(r#"<img src="/logo.gif"><img class="frame border" src="/screens/1.jpg">"#);
        assert_eq!(s.screen.as_deref(), Some("https://www.trle.net/screens/1.jpg"));
    }

    #[test]
    fn nothing_found_is_empty_not_error() {
        let s = collect("<p>no images</p>");
        assert_eq!(s, Screenshots::default());
    }
}
