//! Download link resolution and archive integrity.
//!
//! The "Download" anchor is probed with HEAD (following redirects). Only a
//! final response declaring exactly `application/zip` is accepted; the
//! resolved URL is then streamed through an MD5 accumulator chunk by chunk.
//! Any failure drops the whole archive group and the run carries on.

use scraper::Html;

use crate::checksum::Md5Stream;
use crate::extract::{anchor_href_by_text, rules, Selectors};
use crate::fetch::Fetcher;
use crate::url_model::{filename_from_url_path, join_site_path};

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// A verified archive. The three fields only ever exist together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInfo {
    /// Final URL after redirects.
    pub download_url: String,
    /// Last path segment of `download_url`.
    pub file_name: String,
    /// Lowercase hex MD5 of the streamed bytes.
    pub md5: String,
}

/// `href` of the anchor whose text is exactly "Download".
pub fn find_download_href(doc: &Html, sel: &Selectors) -> Option<String> {
    anchor_href_by_text(doc.select(&sel.anchor), rules::DOWNLOAD_TEXT)
}

/// Strict gate: the declared type must be exactly the zip media type.
pub fn is_zip_content_type(content_type: Option<&str>) -> bool {
    content_type == Some(ZIP_CONTENT_TYPE)
}

/// Resolve and verify the archive behind `href`. Returns None (after logging
/// why) if the link does not lead to a zip or the transfer fails.
pub fn resolve_archive(fetcher: &Fetcher, site_root: &str, href: &str) -> Option<ArchiveInfo> {
    let url = join_site_path(site_root, href);
    fetcher.pace();

    let head = match fetcher.head(&url) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!(url = %url, status = ?e.status(), "failed to retrieve file information: {}", e);
            return None;
        }
    };

    if !is_zip_content_type(head.content_type.as_deref()) {
        tracing::error!(
            url = %url,
            status = head.status,
            content_type = ?head.content_type,
            "linked file is not a zip archive"
        );
        return None;
    }

    let Some(file_name) = filename_from_url_path(&head.effective_url) else {
        tracing::error!(url = %head.effective_url, "resolved download URL has no file name");
        return None;
    };

    tracing::info!(
        url = %head.effective_url,
        content_length = ?head.content_length,
        "hashing archive {}",
        file_name
    );

    let mut digest = Md5Stream::new();
    match fetcher.stream_get(&head.effective_url, |chunk| digest.update(chunk)) {
        Ok(_) => {
            let received = digest.bytes();
            if let Some(declared) = head.content_length {
                if declared != received {
                    tracing::warn!(
                        url = %head.effective_url,
                        declared,
                        received,
                        "archive length differs from HEAD Content-Length"
                    );
                }
            }
        }
        Err(e) => {
            tracing::error!(
                url = %head.effective_url,
                status = ?e.status(),
                "archive download failed, no digest: {}",
                e
            );
            return None;
        }
    }

    Some(ArchiveInfo {
        download_url: head.effective_url,
        file_name,
        md5: digest.finish(),
    })
}
