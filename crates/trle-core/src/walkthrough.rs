//! Walkthrough resolution: listing anchor -> wrapper page -> first iframe ->
//! final document. Every hop is best effort.

use anyhow::{anyhow, Context, Result};
use scraper::Html;

use crate::extract::{anchor_href_by_text, rules, Selectors};
use crate::fetch::Fetcher;
use crate::url_model::join_site_path;

/// `href` of the anchor whose text is exactly "Walkthrough".
pub fn find_walkthrough_href(doc: &Html, sel: &Selectors) -> Option<String> {
    anchor_href_by_text(doc.select(&sel.anchor), rules::WALKTHROUGH_TEXT)
}

/// `src` of the first iframe in a wrapper page.
pub fn frame_src(doc: &Html, sel: &Selectors) -> Option<String> {
    doc.select(&sel.frame)
        .next()
        .and_then(|f| f.value().attr("src"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Fetch the walkthrough behind `href`. Failures are logged and yield None.
pub fn resolve_walkthrough(
    fetcher: &Fetcher,
    sel: &Selectors,
    walkthrough_base: &str,
    site_root: &str,
    href: &str,
) -> Option<String> {
    match fetch_walkthrough(fetcher, sel, walkthrough_base, site_root, href) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::error!(field = "walkthrough", "failed to retrieve walkthrough: {:#}", e);
            None
        }
    }
}

fn fetch_walkthrough(
    fetcher: &Fetcher,
    sel: &Selectors,
    walkthrough_base: &str,
    site_root: &str,
    href: &str,
) -> Result<String> {
    let wrapper_url = join_site_path(walkthrough_base, href);
    fetcher.pace();
    let wrapper = fetcher
        .get_page(&wrapper_url)
        .with_context(|| format!("GET {}", wrapper_url))?;

    let src = {
        let doc = Html::parse_document(&wrapper.body);
        frame_src(&doc, sel).ok_or_else(|| anyhow!("no iframe with src in {}", wrapper.url))?
    };

    let frame_url = join_site_path(site_root, &src);
    let page = fetcher
        .get_page(&frame_url)
        .with_context(|| format!("GET {}", frame_url))?;
    tracing::debug!(url = %page.url, bytes = page.body.len(), "walkthrough fetched");
    Ok(page.body)
}
