use std::fs;
use std::path::PathBuf;

use anyhow::Result;

use crate::core::model::{ParseResult, Question};
use crate::export::Exporter;
use crate::ocr::hangul::CHOICE_GLYPHS;

#[derive(Debug, Clone)]
pub struct MarkdownExporter {
    out_dir: PathBuf,
}

impl MarkdownExporter {
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir }
    }
}

fn format_question(question: &Question) -> String {
    let mut blocks: Vec<String> = vec![format!("### {}.", question.number)];
    if let Some(preamble) = &question.preamble {
        blocks.push(preamble.clone());
    }
    blocks.push(question.stem.clone());
    if let Some(table) = &question.table {
        blocks.push(table.to_markdown());
    }
    if let Some(passage) = question.passage_text() {
        blocks.push(passage);
    }

    let choices = question
        .choices
        .iter()
        .map(|choice| {
            let glyph = CHOICE_GLYPHS
                .get(usize::from(choice.number).saturating_sub(1))
                .copied()
                .unwrap_or('?');
            // Multi-line choices keep their sub-clauses indented under the glyph.
            format!("{glyph} {}", choice.text.replace('\n', "\n  "))
        })
        .collect::<Vec<_>>()
        .join("\n");
    if !choices.is_empty() {
        blocks.push(choices);
    }
    blocks.join("\n\n")
}

pub fn render_markdown(result: &ParseResult) -> String {
    let mut out = String::new();
    if let Some(name) = &result.name {
        out.push_str(&format!("# {name}\n\n"));
    }

    let mut current_section: Option<&str> = None;
    for question in &result.questions {
        if current_section != Some(question.section.as_str()) {
            out.push_str(&format!("## {}\n\n", question.section));
            current_section = Some(question.section.as_str());
        }
        out.push_str(&format_question(question));
        out.push_str("\n\n");
    }
    out
}

impl Exporter for MarkdownExporter {
    fn export(&self, result: &ParseResult) -> Result<()> {
        fs::create_dir_all(&self.out_dir)?;
        fs::write(self.out_dir.join("questions.md"), render_markdown(result))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Choice, PassageItem, Table};
    use pretty_assertions::assert_eq;

    fn question(number: u32, section: &str) -> Question {
        Question {
            number,
            section: section.to_string(),
            stem: "옳은 것은?".to_string(),
            preamble: None,
            passage: Vec::new(),
            choices: vec![
                Choice {
                    number: 1,
                    text: "가".to_string(),
                },
                Choice {
                    number: 2,
                    text: "ㄱ: 100\nㄴ: 200".to_string(),
                },
            ],
            table: None,
            table_match: None,
        }
    }

    #[test]
    fn orders_table_passage_and_choices() {
        let mut q = question(3, "재무회계");
        q.table = Some(Table {
            headers: vec!["구분".to_string()],
            rows: vec![vec!["매출".to_string()]],
        });
        q.passage = vec![PassageItem {
            marker: "ㄱ".to_string(),
            text: "자산".to_string(),
        }];
        assert_eq!(
            format_question(&q),
            "### 3.\n\n옳은 것은?\n\n| 구분 |\n| --- |\n| 매출 |\n\nㄱ. 자산\n\n① 가\n② ㄱ: 100\n  ㄴ: 200"
        );
    }

    #[test]
    fn emits_section_header_on_change_only() {
        let result = ParseResult {
            name: Some("2024 1차".to_string()),
            questions: vec![
                question(1, "재무회계"),
                question(2, "재무회계"),
                question(3, "세법개론"),
            ],
            diagnostics: Vec::new(),
        };
        let md = render_markdown(&result);
        assert!(md.starts_with("# 2024 1차\n\n## 재무회계\n\n### 1."));
        assert_eq!(md.matches("## 재무회계").count(), 1);
        assert_eq!(md.matches("## 세법개론").count(), 1);
    }
}
