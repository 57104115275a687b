//! End-to-end run: validate, lock, fetch, extract, verify, write.
//!
//! Stages hand explicit values to each other. Only the primary page fetch,
//! validation, locking and the final write can fail the run; everything after
//! the primary fetch degrades to fallback values.

use anyhow::{Context, Result};
use scraper::Html;

use crate::archive::{find_download_href, resolve_archive};
use crate::config::ScrapeConfig;
use crate::extract::{extract_metadata, Selectors};
use crate::fetch::Fetcher;
use crate::lock::InstanceLock;
use crate::record::{assemble, write_json, ExtractionResult};
use crate::screenshots::collect_screenshots;
use crate::url_model::validate_listing_url;
use crate::walkthrough::{find_walkthrough_href, resolve_walkthrough};

const BODY_LOG_LIMIT: usize = 4096;

/// Scrape one listing page into a record. Fails only if the page itself
/// cannot be fetched.
pub fn scrape(fetcher: &Fetcher, cfg: &ScrapeConfig, url: &str) -> Result<ExtractionResult> {
    let sel = Selectors::compile()?;

    fetcher.pace();
    let page = fetcher
        .get_page(url)
        .with_context(|| format!("error fetching URL {}", url))?;
    tracing::debug!(
        url = %page.url,
        status = page.status,
        "response body: {}",
        truncate(&page.body, BODY_LOG_LIMIT)
    );

    // The parsed document is dropped before any secondary fetch.
    let (meta, shots, download_href, walkthrough_href) = {
        let doc = Html::parse_document(&page.body);
        (
            extract_metadata(&doc, &sel),
            collect_screenshots(&doc, &sel, &cfg.site_root),
            find_download_href(&doc, &sel),
            find_walkthrough_href(&doc, &sel),
        )
    };

    let archive = match download_href {
        Some(href) => resolve_archive(fetcher, &cfg.site_root, &href),
        None => {
            tracing::warn!(field = "download_url", "no Download link on {}", url);
            None
        }
    };

    let walkthrough = match walkthrough_href {
        Some(href) => {
            resolve_walkthrough(fetcher, &sel, &cfg.walkthrough_base, &cfg.site_root, &href)
        }
        None => {
            tracing::debug!(field = "walkthrough", "no Walkthrough link");
            None
        }
    };

    Ok(assemble(meta, shots, archive, walkthrough))
}

/// Full run for a user-supplied URL. The instance lock is held for the whole
/// run and released on every return path.
pub fn run(cfg: &ScrapeConfig, raw_url: &str) -> Result<ExtractionResult> {
    let url = validate_listing_url(raw_url, &cfg.trusted_domain)?;
    let lock = InstanceLock::acquire(&cfg.lock_path)?;
    tracing::info!(lock = %lock.path().display(), "scraping {}", url);

    let fetcher = Fetcher::from_config(cfg);
    let record = scrape(&fetcher, cfg, url.as_str())?;
    write_json(&record, &cfg.output_path)?;
    drop(lock);
    Ok(record)
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
