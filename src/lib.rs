pub mod config;
pub mod core;
pub mod export;
pub mod ocr;
pub mod parser;
pub mod pipeline;
pub mod tables;

pub use config::ExamProfile;
pub use core::model::{ParseResult, Question, SourceDocument};
pub use pipeline::{parse_document, parse_document_with};
