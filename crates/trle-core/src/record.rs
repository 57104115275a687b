//! The persisted extraction record and its JSON writer.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::archive::ArchiveInfo;
use crate::extract::{PageMetadata, FALLBACK};
use crate::screenshots::Screenshots;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// One listing, as written to `data.json`. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub title: String,
    pub author: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub class: String,
    #[serde(rename = "releaseDate")]
    pub release_date: String,
    pub difficulty: String,
    pub duration: String,
    pub screen: String,
    #[serde(rename = "screensLarge")]
    pub screens_large: Vec<String>,
    #[serde(rename = "zipFileSize")]
    pub zip_file_size: f64,
    #[serde(rename = "zipFileName")]
    pub zip_file_name: String,
    #[serde(rename = "zipFileMd5")]
    pub zip_file_md5: String,
    pub body: String,
    pub walkthrough: String,
    pub download_url: String,
}

/// Merge stage outputs into the record, substituting fallbacks.
pub fn assemble(
    meta: PageMetadata,
    shots: Screenshots,
    archive: Option<ArchiveInfo>,
    walkthrough: Option<String>,
) -> ExtractionResult {
    let zip_file_size = meta.file_size_mb();
    let or_missing = |v: Option<String>| v.unwrap_or_else(|| FALLBACK.to_string());
    let (download_url, zip_file_name, zip_file_md5) = match archive {
        Some(a) => (a.download_url, a.file_name, a.md5),
        None => (String::new(), String::new(), String::new()),
    };

    ExtractionResult {
        title: or_missing(meta.title),
        author: or_missing(meta.author),
        kind: or_missing(meta.kind),
        class: or_missing(meta.class),
        release_date: or_missing(meta.release_date),
        difficulty: or_missing(meta.difficulty),
        duration: or_missing(meta.duration),
        screen: or_missing(shots.screen),
        screens_large: shots.large,
        zip_file_size,
        zip_file_name,
        zip_file_md5,
        body: or_missing(meta.body),
        walkthrough: walkthrough.unwrap_or_default(),
        download_url,
    }
}

/// `<path>.part`, the staging file renamed onto `path` once fully written.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut s = final_path.as_os_str().to_owned();
    s.push(TEMP_SUFFIX);
    PathBuf::from(s)
}

/// Write `record` as one JSON document, replacing any previous file at `path`.
pub fn write_json(record: &ExtractionResult, path: &Path) -> Result<()> {
    let tmp = temp_path(path);
    {
        let file = File::create(&tmp)
            .with_context(|| format!("failed to create {}", tmp.display()))?;
        let mut w = BufWriter::new(file);
        serde_json::to_writer(&mut w, record)
            .with_context(|| format!("failed to serialize record to {}", tmp.display()))?;
        w.flush()?;
        w.get_ref()
            .sync_all()
            .with_context(|| format!("failed to sync {}", tmp.display()))?;
    }
    std::fs::rename(&tmp, path)
        .with_context(|| format!("failed to rename {} to {}", tmp.display(), path.display()))?;
    tracing::info!(path = %path.display(), "record written");
    Ok(())
}
