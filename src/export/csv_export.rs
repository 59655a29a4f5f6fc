use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::ParseResult;
use crate::export::Exporter;

const MAX_CHOICES: u8 = 5;

fn header() -> Vec<String> {
    let mut columns: Vec<String> = ["question_number", "section", "stem", "passage"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    columns.extend((1..=MAX_CHOICES).map(|n| format!("option_{n}")));
    columns.push("table".to_string());
    columns
}

/// One row per question with fixed passage and option columns.
pub fn render_csv(result: &ParseResult) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header())?;

    for question in &result.questions {
        let mut record = vec![
            question.number.to_string(),
            question.section.clone(),
            question.stem.clone(),
            question.passage_text().unwrap_or_default(),
        ];
        record.extend((1..=MAX_CHOICES).map(|n| {
            question
                .choices
                .iter()
                .find(|choice| choice.number == n)
                .map(|choice| choice.text.clone())
                .unwrap_or_default()
        }));
        record.push(
            question
                .table
                .as_ref()
                .map(|table| table.to_markdown())
                .unwrap_or_default(),
        );
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush csv writer: {}", err.error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[derive(Debug, Clone)]
pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

impl Exporter for CsvExporter {
    fn export(&self, result: &ParseResult) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("questions.csv"), render_csv(result)?)?;
        Ok(())
    }
}
