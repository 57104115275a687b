//! Parse HTTP response header lines into HeadResult fields.

/// Header fields the archive resolver cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParsedHeaders {
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
}

/// Parse collected header lines. With redirects followed, libcurl reports the
/// headers of every hop; a status line starts a new block so only the final
/// response's headers survive.
pub(crate) fn parse_headers(lines: &[String]) -> ParsedHeaders {
    let mut parsed = ParsedHeaders::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            parsed = ParsedHeaders::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") {
                parsed.content_type = Some(value.to_string());
            }
            if name.eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.parse::<u64>() {
                    parsed.content_length = Some(n);
                }
            }
        }
    }

    parsed
}
