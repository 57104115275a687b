//! Text helpers shared by the extraction stages.

use scraper::ElementRef;

/// Concatenated text of `el` with each text node trimmed and empty ones dropped.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// First direct child of `el` as trimmed text (the segment before a `<br>`).
pub(crate) fn first_segment(el: ElementRef<'_>) -> Option<String> {
    let first = el.children().next()?;
    let text = match first.value().as_text() {
        Some(t) => t.trim().to_string(),
        None => ElementRef::wrap(first).map(stripped_text)?,
    };
    Some(text)
}

/// First anchor whose visible text is exactly `text`, and its `href`.
pub(crate) fn anchor_href_by_text<'a, I>(anchors: I, text: &str) -> Option<String>
where
    I: IntoIterator<Item = ElementRef<'a>>,
{
    anchors
        .into_iter()
        .find(|a| stripped_text(*a) == text)
        .and_then(|a| a.value().attr("href"))
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
}

/// Parse a human-readable size like `"12,345.67MB"` into megabytes.
///
/// Thousands separators and the `MB` suffix are stripped. Anything that fails
/// to parse, is zero, or is not finite yields 0.0.
pub fn parse_file_size_mb(raw: &str) -> f64 {
    let cleaned = raw.replace(',', "").replace("MB", "");
    match cleaned.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v != 0.0 => v,
        _ => 0.0,
    }
}
