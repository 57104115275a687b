//! Structural validation of the listing URL passed on the command line.

use url::Url;

/// Why a listing URL was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("malformed URL {input:?}: {reason}")]
    Malformed { input: String, reason: String },
    #[error("URL {input:?} must use https, not {scheme}")]
    Scheme { input: String, scheme: String },
    #[error("URL {input:?} host is not {domain} or one of its subdomains")]
    Host { input: String, domain: String },
}

/// Accepts an absolute `https` URL whose host is `domain` or a subdomain of it.
pub fn validate_listing_url(input: &str, domain: &str) -> Result<Url, UrlError> {
    let parsed = Url::parse(input).map_err(|e| UrlError::Malformed {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "https" {
        return Err(UrlError::Scheme {
            input: input.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    let domain = domain.trim_end_matches('.').to_ascii_lowercase();
    let host_ok = parsed
        .host_str()
        .map(|h| h.trim_end_matches('.').to_ascii_lowercase())
        .is_some_and(|h| h == domain || h.ends_with(&format!(".{domain}")));
    if !host_ok {
        return Err(UrlError::Host {
            input: input.to_string(),
            domain,
        });
    }

    Ok(parsed)
}
