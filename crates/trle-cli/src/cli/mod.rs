//! CLI for trle-scrape: one listing URL in, one JSON record out.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use trle_core::checksum::md5_path;
use trle_core::config;
use trle_core::pipeline;
use trle_core::record::ExtractionResult;

/// Scrape a TRLE level listing into data.json and verify its archive.
#[derive(Debug, Parser)]
#[command(name = "trle-scrape", version)]
#[command(about = "Extract a level listing into JSON and verify its archive", long_about = None)]
pub struct Cli {
    /// Listing page URL (https, on the trusted domain).
    pub url: String,

    /// Local copy of the archive to check against the downloaded digest.
    #[arg(long, value_name = "ARCHIVE")]
    pub compare: Option<PathBuf>,
}

impl Cli {
    /// Parse process arguments without exiting, so usage errors map to exit 1.
    pub fn parse_args() -> Result<Self, clap::Error> {
        Cli::try_parse()
    }

    pub fn execute(&self) -> Result<()> {
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        let record = pipeline::run(&cfg, &self.url)?;
        print_summary(&record);
        println!("wrote {}", cfg.output_path.display());

        if let Some(local) = &self.compare {
            if !compare_local(local, &record.zip_file_md5)? {
                bail!("{} does not match the listed archive", local.display());
            }
            println!("{} matches the listed archive", local.display());
        }
        Ok(())
    }
}

/// Hash `local` and compare it with the digest of the downloaded archive.
fn compare_local(local: &Path, expected_md5: &str) -> Result<bool> {
    if expected_md5.is_empty() {
        bail!("no archive digest to compare {} against", local.display());
    }
    let actual = md5_path(local)?;
    tracing::info!(path = %local.display(), actual = %actual, expected = expected_md5, "compared local archive");
    Ok(actual == expected_md5)
}

fn print_summary(record: &ExtractionResult) {
    if !record.zip_file_md5.is_empty() {
        println!("Download URL: {}", record.download_url);
        println!("File Name: {}", record.zip_file_name);
        println!("MD5 Checksum: {}", record.zip_file_md5);
    }
    println!(
        "{} by {} ({}, {} screenshots, walkthrough: {})",
        record.title,
        record.author,
        record.difficulty,
        record.screens_large.len(),
        if record.walkthrough.is_empty() { "no" } else { "yes" }
    );
}
