use serde::{Deserialize, Serialize};

use crate::core::geometry::BBox;

/// Page-break marker used when a document arrives as one concatenated string.
pub const PAGE_BREAK: char = '\u{000C}';

pub const UNKNOWN_SECTION: &str = "unknown";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub pages: Vec<SourcePage>,
}

impl SourceDocument {
    /// Splits OCR text on the page-break marker. Pages carry no tables.
    pub fn from_concatenated(text: &str) -> Self {
        let pages = text
            .split(PAGE_BREAK)
            .map(|page| SourcePage {
                text: Some(page.to_string()),
                ..SourcePage::default()
            })
            .collect();
        Self { name: None, pages }
    }

    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|page| page.tables.len()).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Vec<Word>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    /// Rectangular cell matrices, first row holds the headers.
    #[serde(default)]
    pub tables: Vec<Vec<Vec<String>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    #[serde(flatten)]
    pub bbox: BBox,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageLayout {
    SingleColumn,
    TwoColumn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageItem {
    pub marker: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub number: u8,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.headers
            .iter()
            .chain(self.rows.iter().flatten())
            .map(String::as_str)
    }

    pub fn to_markdown(&self) -> String {
        let escape = |cell: &str| cell.replace('|', "\\|");
        let mut out = String::new();
        out.push_str("| ");
        out.push_str(
            &self
                .headers
                .iter()
                .map(|h| escape(h))
                .collect::<Vec<_>>()
                .join(" | "),
        );
        out.push_str(" |\n|");
        out.push_str(&" --- |".repeat(self.headers.len()));
        for row in &self.rows {
            out.push_str("\n| ");
            out.push_str(
                &row.iter()
                    .map(|cell| escape(cell))
                    .collect::<Vec<_>>()
                    .join(" | "),
            );
            out.push_str(" |");
        }
        out
    }
}

/// Where a bound table came from and how strongly it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMatch {
    pub page_idx: usize,
    pub table_idx: usize,
    pub keyword_hits: usize,
    pub shared_substrings: usize,
    pub confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub number: u32,
    pub section: String,
    pub stem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preamble: Option<String>,
    pub passage: Vec<PassageItem>,
    pub choices: Vec<Choice>,
    pub table: Option<Table>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_match: Option<TableMatch>,
}

impl Question {
    /// Passage items as markdown lines, `None` when there is no passage.
    pub fn passage_text(&self) -> Option<String> {
        if self.passage.is_empty() {
            return None;
        }
        let text = self
            .passage
            .iter()
            .map(|item| {
                if item.marker == crate::ocr::hangul::BULLET_MARKER {
                    format!("{} {}", item.marker, item.text)
                } else {
                    format!("{}. {}", item.marker, item.text)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    /// Stem plus the highest-priority attachment: table first, then passage.
    pub fn question_text(&self) -> String {
        let mut text = String::new();
        if let Some(preamble) = &self.preamble {
            text.push_str(preamble);
            text.push_str("\n\n");
        }
        text.push_str(&self.stem);
        if let Some(table) = &self.table {
            text.push_str("\n\n");
            text.push_str(&table.to_markdown());
        } else if let Some(passage) = self.passage_text() {
            text.push_str("\n\n");
            text.push_str(&passage);
        }
        text
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    EmptyDocument,
    NoQuestionMarkers,
    ExtractionFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_number: Option<u32>,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub questions: Vec<Question>,
    pub diagnostics: Vec<Diagnostic>,
}
