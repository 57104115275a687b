//! HTTP(S) access for the pipeline.
//!
//! Uses the curl crate (libcurl) for page GETs, HEAD probes that follow
//! redirects, and the streamed archive GET. Every request verifies the TLS
//! peer and host, runs in the current thread, and is attempted exactly once.
//! Only https URLs are requested, and a redirect chain that ends anywhere
//! else is rejected after the transfer.

mod parse;
mod progress;

pub use progress::ProgressStats;

use progress::DecileReporter;
use std::fmt;
use std::path::PathBuf;
use std::str;
use std::time::Duration;
use url::Url;

use crate::checksum::BUF_SIZE;
use crate::config::ScrapeConfig;

const USER_AGENT: &str = concat!("trle-scrape/", env!("CARGO_PKG_VERSION"));

/// Error from a single request: transport failure, refused scheme or non-2xx response.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    Curl(curl::Error),
    /// The request URL, or the URL a redirect chain ended at, is not https.
    Insecure { url: String },
    /// The response had a non-2xx status.
    Http { url: String, code: u32 },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Insecure { url } => write!(f, "refusing non-https URL {}", url),
            FetchError::Http { url, code } => write!(f, "{} returned HTTP {}", url, code),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Insecure { .. } | FetchError::Http { .. } => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl FetchError {
    /// HTTP status, when the failure was a non-2xx response.
    pub fn status(&self) -> Option<u32> {
        match self {
            FetchError::Http { code, .. } => Some(*code),
            FetchError::Curl(_) | FetchError::Insecure { .. } => None,
        }
    }
}

/// A fetched HTML document.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after redirects.
    pub url: String,
    pub status: u32,
    pub body: String,
}

/// Result of a HEAD request after following redirects.
#[derive(Debug, Clone)]
pub struct HeadResult {
    /// URL of the final response in the redirect chain.
    pub effective_url: String,
    pub status: u32,
    /// `Content-Type` of the final response, verbatim.
    pub content_type: Option<String>,
    /// Declared `Content-Length` of the final response.
    pub content_length: Option<u64>,
}

/// Blocking fetcher shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct Fetcher {
    ca_bundle: Option<PathBuf>,
    timeout: Duration,
    pace: Duration,
    buffer_size: usize,
    plain_http: bool,
}

impl Fetcher {
    pub fn new(ca_bundle: Option<PathBuf>, timeout: Duration, pace: Duration) -> Self {
        Self {
            ca_bundle,
            timeout,
            pace,
            buffer_size: BUF_SIZE,
            plain_http: false,
        }
    }

    pub fn from_config(cfg: &ScrapeConfig) -> Self {
        Self::new(cfg.ca_bundle.clone(), cfg.timeout(), cfg.pace_delay())
            .with_buffer_size(cfg.download_buffer_bytes.unwrap_or(BUF_SIZE))
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1024);
        self
    }

    /// Also accept `http://` URLs. Only for loopback test servers; neither the
    /// config file nor the CLI can turn this on.
    pub fn allow_plain_http(mut self) -> Self {
        self.plain_http = true;
        self
    }

    /// Sleep for the pacing delay before hitting the origin again.
    pub fn pace(&self) {
        if !self.pace.is_zero() {
            tracing::debug!("pacing {:?} before next request", self.pace);
            std::thread::sleep(self.pace);
        }
    }

    fn check_scheme(&self, url: &str) -> Result<(), FetchError> {
        let allowed = match Url::parse(url) {
            Ok(u) => u.scheme() == "https" || (self.plain_http && u.scheme() == "http"),
            Err(_) => false,
        };
        if allowed {
            Ok(())
        } else {
            Err(FetchError::Insecure {
                url: url.to_string(),
            })
        }
    }

    /// Where the transfer ended up after redirects, refused unless https.
    fn effective_url(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<String, FetchError> {
        let effective = easy.effective_url()?.unwrap_or(url).to_string();
        self.check_scheme(&effective)?;
        Ok(effective)
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, FetchError> {
        self.check_scheme(url)?;
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.useragent(USER_AGENT)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.ssl_verify_peer(true)?;
        easy.ssl_verify_host(true)?;
        if let Some(ca) = &self.ca_bundle {
            easy.cainfo(ca)?;
        }
        easy.connect_timeout(self.timeout)?;
        Ok(easy)
    }

    /// GET a document and return its body as text.
    pub fn get_page(&self, url: &str) -> Result<Page, FetchError> {
        let mut body = Vec::new();
        let mut easy = self.easy(url)?;
        easy.timeout(self.timeout)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let effective = self.effective_url(&mut easy, url)?;
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http { url: effective, code });
        }
        tracing::debug!(url = %effective, status = code, bytes = body.len(), "GET ok");

        Ok(Page {
            url: effective,
            status: code,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }

    /// Performs a HEAD request, following redirects, and returns final-hop metadata.
    pub fn head(&self, url: &str) -> Result<HeadResult, FetchError> {
        let mut headers: Vec<String> = Vec::new();
        let mut easy = self.easy(url)?;
        easy.nobody(true)?;
        easy.timeout(self.timeout)?;
        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.perform()?;
        }

        let effective = self.effective_url(&mut easy, url)?;
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http { url: effective, code });
        }

        let parsed = parse::parse_headers(&headers);
        tracing::debug!(
            url = %effective,
            status = code,
            content_type = ?parsed.content_type,
            content_length = ?parsed.content_length,
            "HEAD ok"
        );
        Ok(HeadResult {
            effective_url: effective,
            status: code,
            content_type: parsed.content_type,
            content_length: parsed.content_length,
        })
    }

    /// GET `url`, handing each received chunk to `on_chunk` as it arrives.
    /// Nothing is buffered beyond libcurl's receive buffer. Returns bytes received.
    ///
    /// There is no overall deadline: the transfer aborts if it makes no
    /// progress for the configured timeout.
    pub fn stream_get<F>(&self, url: &str, mut on_chunk: F) -> Result<u64, FetchError>
    where
        F: FnMut(&[u8]),
    {
        let mut received: u64 = 0;
        let mut reporter = DecileReporter::default();
        let mut easy = self.easy(url)?;
        easy.buffer_size(self.buffer_size)?;
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.timeout)?;
        easy.progress(true)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                on_chunk(data);
                received += data.len() as u64;
                Ok(data.len())
            })?;
            transfer.progress_function(|dltotal, dlnow, _, _| {
                let stats = ProgressStats {
                    bytes_done: dlnow as u64,
                    total_bytes: (dltotal > 0.0).then_some(dltotal as u64),
                };
                if let Some(decile) = reporter.observe(stats) {
                    tracing::debug!(
                        url,
                        bytes = stats.bytes_done,
                        total = ?stats.total_bytes,
                        "download {}%",
                        u32::from(decile) * 10
                    );
                }
                true
            })?;
            transfer.perform()?;
        }

        let effective = self.effective_url(&mut easy, url)?;
        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http { url: effective, code });
        }
        Ok(received)
    }
}
