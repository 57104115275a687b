//! Listing-page metadata extraction.
//!
//! Every lookup is independent and optional: a missing element leaves its
//! field as `None` and the rest of the page is still read. Fallback values
//! are substituted when the record is assembled.

pub mod rules;
mod text;

pub use rules::{LabeledField, Selectors, FALLBACK, LABEL_RULES};
pub use text::{parse_file_size_mb, stripped_text};

pub(crate) use text::anchor_href_by_text;

use scraper::{ElementRef, Html};

/// Fields read from the primary page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub kind: Option<String>,
    pub class: Option<String>,
    pub release_date: Option<String>,
    pub difficulty: Option<String>,
    pub duration: Option<String>,
    /// Outer HTML of the description block.
    pub body: Option<String>,
    /// Raw "file size:" cell text, before normalization.
    pub file_size: Option<String>,
}

impl PageMetadata {
    /// Archive size in megabytes; 0.0 when absent or unparseable.
    pub fn file_size_mb(&self) -> f64 {
        self.file_size.as_deref().map_or(0.0, parse_file_size_mb)
    }

    fn slot(&mut self, field: LabeledField) -> &mut Option<String> {
        match field {
            LabeledField::Type => &mut self.kind,
            LabeledField::Class => &mut self.class,
            LabeledField::ReleaseDate => &mut self.release_date,
            LabeledField::Difficulty => &mut self.difficulty,
            LabeledField::Duration => &mut self.duration,
            LabeledField::FileSize => &mut self.file_size,
        }
    }
}

pub fn extract_metadata(doc: &Html, sel: &Selectors) -> PageMetadata {
    let mut meta = PageMetadata {
        title: extract_title(doc, sel),
        author: doc
            .select(&sel.author)
            .next()
            .map(stripped_text)
            .filter(|s| !s.is_empty()),
        body: doc.select(&sel.body).nth(rules::BODY_INDEX).map(|el| el.html()),
        ..PageMetadata::default()
    };

    let cells: Vec<ElementRef<'_>> = doc.select(&sel.label_cell).collect();
    for rule in LABEL_RULES {
        let value = labeled_value(&cells, rule.label);
        if value.is_none() {
            tracing::debug!(field = rule.label, "labeled cell not found");
        }
        *meta.slot(rule.field) = value;
    }

    for (name, present) in [
        ("title", meta.title.is_some()),
        ("author", meta.author.is_some()),
        ("body", meta.body.is_some()),
    ] {
        if !present {
            tracing::debug!(field = name, "field not found");
        }
    }

    meta
}

/// Title is the header span's first line when it is split by `<br>`,
/// otherwise its whole text.
fn extract_title(doc: &Html, sel: &Selectors) -> Option<String> {
    let span = doc.select(&sel.title).next()?;
    let has_break = span
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|e| e.value().name() == "br");
    let title = if has_break {
        text::first_segment(span)?
    } else {
        stripped_text(span)
    };
    Some(title).filter(|t| !t.is_empty())
}

/// Text of the cell following the one whose text is exactly `label`, in
/// document order. Empty cells count as absent.
fn labeled_value(cells: &[ElementRef<'_>], label: &str) -> Option<String> {
    let idx = cells.iter().position(|c| stripped_text(*c) == label)?;
    cells
        .get(idx + 1)
        .map(|c| stripped_text(*c))
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <span class="subHeader">The Lost Library<br>Part 1</span>
        <a class="linkl" href="/sc/authorfeatures.php?aid=1"> Jane Builder </a>
        <table>
          <tr><td class="medGText" align="left" valign="top">
            <table>
              <tr><td>file type:</td><td>TR4</td></tr>
              <tr><td>class:</td><td> Egypt </td></tr>
              <tr><td>release date:</td><td>01-Jan-2020</td></tr>
              <tr><td>difficulty:</td><td>medium</td></tr>
              <tr><td>duration:</td><td>long</td></tr>
              <tr><td>file size:</td><td>1,234.50 MB</td></tr>
            </table>
          </td></tr>
          <tr><td class="medGText" align="left" valign="top">A <b>great</b> level.</td></tr>
        </table>
    </body></html>"#;

    fn extract(html: &str) -> PageMetadata {
        let doc = Html::parse_document(html);
        extract_metadata(&doc, &Selectors::compile().unwrap())
    }

    #[test]
    fn extracts_full_page() {
        let m = extract(PAGE);
        assert_eq!(m.title.as_deref(), Some("The Lost Library"));
        assert_eq!(m.author.as_deref(), Some("Jane Builder"));
        assert_eq!(m.kind.as_deref(), Some("TR4"));
        assert_eq!(m.class.as_deref(), Some("Egypt"));
        assert_eq!(m.release_date.as_deref(), Some("01-Jan-2020"));
        assert_eq!(m.difficulty.as_deref(), Some("medium"));
        assert_eq!(m.duration.as_deref(), Some("long"));
        assert_eq!(m.file_size_mb(), 1234.5);
        let body = m.body.unwrap();
        assert!(body.starts_with("<td"), "{body}");
        assert!(body.contains("A <b>great</b> level."));
    }

    #[test]
    fn title_without_break_is_whole_text() {
        let m = extract(r#"<span class="subHeader"> One <i>Line</i> </span>"#);
        assert_eq!(m.title.as_deref(), Some("OneLine"));
    }

    #[test]
    fn each_label_is_optional() {
        let m = extract(
            r#"<table><tr><td>file type:</td><td>Level</td></tr>
               <tr><td>duration:</td><td></td></tr></table>"#,
        );
        assert_eq!(m.kind.as_deref(), Some("Level"));
        assert_eq!(m.difficulty, None);
        assert_eq!(m.duration, None);
        assert_eq!(m.class, None);
        assert_eq!(m.file_size_mb(), 0.0);
    }

    #[test]
    fn label_as_last_cell_has_no_value() {
        let m = extract("<table><tr><td>difficulty:</td></tr></table>");
        assert_eq!(m.difficulty, None);
    }

    #[test]
    fn single_content_block_means_no_body() {
        let m = extract(
            r#"<table><tr><td class="medGText" align="left" valign="top">only</td></tr></table>"#,
        );
        assert_eq!(m.body, None);
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert_eq!(extract("<html></html>"), PageMetadata::default());
    }
}
