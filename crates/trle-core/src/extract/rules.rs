//! Where each field lives on a listing page.
//!
//! The page has no formal schema; every selector, label and anchor text the
//! pipeline depends on is listed here so layout changes are patched in one place.

use anyhow::{anyhow, Result};
use scraper::Selector;

/// Literal substituted for textual fields the page does not provide.
pub const FALLBACK: &str = "missing";

pub const TITLE: &str = "span.subHeader";
pub const AUTHOR: &str = "a.linkl";
pub const BODY: &str = r#"td.medGText[align="left"][valign="top"]"#;
/// The description is the second matching block; the first is the info table.
pub const BODY_INDEX: usize = 1;
pub const LABEL_CELL: &str = "td";
pub const SCREEN: &str = "img.border";
pub const SCREENS_LARGE: &str = "a[onmouseover]";
pub const ANCHOR: &str = "a";
pub const FRAME: &str = "iframe";

pub const DOWNLOAD_TEXT: &str = "Download";
pub const WALKTHROUGH_TEXT: &str = "Walkthrough";

/// Fields read from the cell following a labeled `td`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabeledField {
    Type,
    Class,
    ReleaseDate,
    Difficulty,
    Duration,
    FileSize,
}

#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub field: LabeledField,
    /// Exact (trimmed) text of the label cell.
    pub label: &'static str,
}

pub const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        field: LabeledField::Type,
        label: "file type:",
    },
    LabelRule {
        field: LabeledField::Class,
        label: "class:",
    },
    LabelRule {
        field: LabeledField::ReleaseDate,
        label: "release date:",
    },
    LabelRule {
        field: LabeledField::Difficulty,
        label: "difficulty:",
    },
    LabelRule {
        field: LabeledField::Duration,
        label: "duration:",
    },
    LabelRule {
        field: LabeledField::FileSize,
        label: "file size:",
    },
];

/// Compiled selectors, built once per run.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub title: Selector,
    pub author: Selector,
    pub body: Selector,
    pub label_cell: Selector,
    pub screen: Selector,
    pub screens_large: Selector,
    pub anchor: Selector,
    pub frame: Selector,
}

impl Selectors {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            title: parse(TITLE)?,
            author: parse(AUTHOR)?,
            body: parse(BODY)?,
            label_cell: parse(LABEL_CELL)?,
            screen: parse(SCREEN)?,
            screens_large: parse(SCREENS_LARGE)?,
            anchor: parse(ANCHOR)?,
            frame: parse(FRAME)?,
        })
    }
}

fn parse(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid selector {:?}: {}", css, e))
}
