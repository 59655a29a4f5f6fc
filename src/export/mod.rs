pub mod csv_export;
pub mod json_export;
pub mod markdown_export;

use anyhow::Result;

use crate::core::model::ParseResult;

pub use csv_export::CsvExporter;
pub use json_export::{JsonExporter, QuestionRecord};
pub use markdown_export::MarkdownExporter;

pub trait Exporter {
    fn export(&self, result: &ParseResult) -> Result<()>;
}
