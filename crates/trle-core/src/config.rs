use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration loaded from `~/.config/trle-scrape/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Registrable domain a listing URL must belong to (host equal to it or a subdomain).
    pub trusted_domain: String,
    /// Scheme and host prepended to site-relative paths (screenshots, walkthrough frames).
    pub site_root: String,
    /// Prefix for walkthrough hrefs, which are relative to this directory.
    pub walkthrough_base: String,
    /// CA bundle used for TLS peer verification. None = libcurl's built-in default.
    #[serde(default)]
    pub ca_bundle: Option<PathBuf>,
    /// Path of the single-instance lock file.
    pub lock_path: PathBuf,
    /// Where the JSON record is written (relative paths resolve against the working dir).
    pub output_path: PathBuf,
    /// Per-request timeout in seconds for page GETs and HEAD probes.
    pub timeout_secs: u64,
    /// Pause before the primary fetch, the download probe and the walkthrough fetch.
    pub pace_delay_secs: f64,
    /// Optional receive buffer size for the streamed archive GET (None = 64 KiB).
    #[serde(default)]
    pub download_buffer_bytes: Option<usize>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            trusted_domain: "trle.net".to_string(),
            site_root: "https://www.trle.net".to_string(),
            walkthrough_base: "https://www.trle.net/sc/".to_string(),
            ca_bundle: Some(PathBuf::from("/etc/ssl/certs/ca-certificates.crt")),
            lock_path: PathBuf::from("/tmp/TRLE.lock"),
            output_path: PathBuf::from("data.json"),
            timeout_secs: 5,
            pace_delay_secs: 2.0,
            download_buffer_bytes: None,
        }
    }
}

impl ScrapeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Pacing delay; negative or non-finite values collapse to zero.
    pub fn pace_delay(&self) -> Duration {
        if self.pace_delay_secs.is_finite() && self.pace_delay_secs > 0.0 {
            Duration::from_secs_f64(self.pace_delay_secs)
        } else {
            Duration::ZERO
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("trle-scrape")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ScrapeConfig> {
    let path = config_path()?;
    load_from(&path)
}

/// Like `load_or_init` but with an explicit path.
pub fn load_from(path: &Path) -> Result<ScrapeConfig> {
    if !path.exists() {
        let default_cfg = ScrapeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScrapeConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
