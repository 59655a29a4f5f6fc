use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::core::model::{Choice, ParseResult, PassageItem, Question, Table, TableMatch};
use crate::export::Exporter;

/// One question in the interchange schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question_number: u32,
    pub section: String,
    pub question_text: String,
    pub passage: Option<String>,
    pub passage_items: Vec<PassageItem>,
    pub options: Vec<Choice>,
    pub table: Option<Table>,
    pub table_match: Option<TableMatch>,
}

impl From<&Question> for QuestionRecord {
    fn from(question: &Question) -> Self {
        Self {
            question_number: question.number,
            section: question.section.clone(),
            question_text: question.question_text(),
            passage: question.passage_text(),
            passage_items: question.passage.clone(),
            options: question.choices.clone(),
            table: question.table.clone(),
            table_match: question.table_match.clone(),
        }
    }
}

pub fn question_records(result: &ParseResult) -> Vec<QuestionRecord> {
    result.questions.iter().map(QuestionRecord::from).collect()
}

pub fn render_json(result: &ParseResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(&question_records(result))?)
}

#[derive(Debug, Clone)]
pub struct JsonExporter {
    out_dir: PathBuf,
}

impl JsonExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for JsonExporter {
    fn export(&self, result: &ParseResult) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("questions.json"), render_json(result)?)?;
        let diagnostics = serde_json::to_string_pretty(&result.diagnostics)?;
        fs::write(self.out_dir.join("diagnostics.json"), diagnostics)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Diagnostic, DiagnosticKind};
    use serde_json::Value;

    fn result() -> ParseResult {
        ParseResult {
            name: None,
            questions: vec![Question {
                number: 1,
                section: "unknown".to_string(),
                stem: "What is X?".to_string(),
                preamble: None,
                passage: Vec::new(),
                choices: vec![
                    Choice {
                        number: 1,
                        text: "A".to_string(),
                    },
                    Choice {
                        number: 2,
                        text: "B".to_string(),
                    },
                ],
                table: None,
                table_match: None,
            }],
            diagnostics: vec![Diagnostic {
                kind: DiagnosticKind::ExtractionFailed,
                question_number: Some(2),
                message: "1 choice recovered".to_string(),
            }],
        }
    }

    #[test]
    fn renders_interchange_fields() -> Result<()> {
        let json: Value = serde_json::from_str(&render_json(&result())?)?;
        let record = &json[0];
        assert_eq!(record["question_number"], 1);
        assert_eq!(record["question_text"], "What is X?");
        assert!(record["passage"].is_null());
        assert!(record["table"].is_null());
        assert_eq!(record["passage_items"].as_array().map(Vec::len), Some(0));
        assert_eq!(record["options"][1]["text"], "B");
        Ok(())
    }

    #[test]
    fn writes_questions_and_diagnostics() -> Result<()> {
        let dir = tempfile::tempdir()?;
        JsonExporter::new(dir.path().to_path_buf()).export(&result())?;
        let diagnostics: Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("diagnostics.json"))?)?;
        assert_eq!(diagnostics[0]["kind"], "extraction_failed");
        assert!(dir.path().join("questions.json").exists());
        Ok(())
    }
}
