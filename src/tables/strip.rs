use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{Question, Table};

/// Blank-fill placeholders such as `(ㄱ)`.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*[ㄱ-ㅎ]\s*\)").expect("valid placeholder regex"));

const MIN_STRIP_CHARS: usize = 4;

/// Cell values long enough to strip, longest first.
pub fn strippable_cells(table: &Table) -> Vec<&str> {
    let mut cells: Vec<&str> = table
        .cells()
        .map(str::trim)
        .filter(|cell| cell.chars().count() >= MIN_STRIP_CHARS)
        .collect();
    cells.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    cells.dedup();
    cells
}

pub fn strip_text(text: &str, cells: &[&str]) -> String {
    let mut out = text.to_string();
    for cell in cells {
        if out.contains(cell) {
            out = out.replace(cell, " ");
        }
    }
    let out = PLACEHOLDER.replace_all(&out, " ");
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes table text duplicated in the question's prose.
///
/// Preamble and passage are always stripped; the stem only when it was not
/// recovered as an interrogative clause, since then it may carry flattened
/// table rows. An interrogative stem keeps every word even when a cell
/// repeats it: "기말재고자산 금액으로 옳은 것은?" stays as is while the same
/// cell is removed from the preamble. Choices are left alone.
pub fn strip_table_text(question: &mut Question, table: &Table, include_stem: bool) {
    let cells = strippable_cells(table);
    if include_stem {
        question.stem = strip_text(&question.stem, &cells);
    }
    question.preamble = question
        .preamble
        .as_deref()
        .map(|preamble| strip_text(preamble, &cells))
        .filter(|preamble| !preamble.is_empty());
    for item in &mut question.passage {
        item.text = strip_text(&item.text, &cells);
    }
    question.passage.retain(|item| !item.text.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::PassageItem;
    use pretty_assertions::assert_eq;

    fn table() -> Table {
        Table {
            headers: vec!["구분".to_string(), "금액".to_string()],
            rows: vec![
                vec!["매출액".to_string(), "1,000".to_string()],
                vec!["매출원가".to_string(), "600".to_string()],
                vec!["기말재고자산".to_string(), "(ㄱ)".to_string()],
            ],
        }
    }

    #[test]
    fn longest_cells_first_and_short_cells_kept() {
        assert_eq!(strippable_cells(&table()), vec!["기말재고자산", "1,000", "매출원가"]);
    }

    #[test]
    fn strips_cells_and_placeholders() {
        let binding = table();
        let cells = strippable_cells(&binding);
        assert_eq!(
            strip_text("매출원가 600 기말재고자산 (ㄱ) 매출액 1,000", &cells),
            "600 매출액"
        );
    }

    fn question_with(stem: &str, preamble: &str) -> Question {
        Question {
            number: 1,
            section: "재무회계".to_string(),
            stem: stem.to_string(),
            preamble: Some(preamble.to_string()),
            passage: Vec::new(),
            choices: Vec::new(),
            table: None,
            table_match: None,
        }
    }

    #[test]
    fn interrogative_stem_keeps_cell_words() {
        let mut question = question_with("기말재고자산 금액으로 옳은 것은?", "기말재고자산 (ㄱ) 평가");
        strip_table_text(&mut question, &table(), false);
        assert_eq!(question.stem, "기말재고자산 금액으로 옳은 것은?");
        assert_eq!(question.preamble.as_deref(), Some("평가"));

        let mut question = question_with("매출액 1,000 기말재고자산 (ㄱ) 답하시오", "매출원가");
        strip_table_text(&mut question, &table(), true);
        assert_eq!(question.stem, "매출액 답하시오");
        assert_eq!(question.preamble, None);
    }

    #[test]
    fn drops_passage_items_left_empty() {
        let mut question = Question {
            number: 1,
            section: "재무회계".to_string(),
            stem: "매출원가는 얼마인가?".to_string(),
            preamble: Some("매출원가 600".to_string()),
            passage: vec![
                PassageItem {
                    marker: "○".to_string(),
                    text: "기말재고자산".to_string(),
                },
                PassageItem {
                    marker: "○".to_string(),
                    text: "매출총이익률은 40%".to_string(),
                },
            ],
            choices: Vec::new(),
            table: None,
            table_match: None,
        };
        strip_table_text(&mut question, &table(), false);
        assert_eq!(question.stem, "매출원가는 얼마인가?");
        assert_eq!(question.preamble.as_deref(), Some("600"));
        assert_eq!(question.passage.len(), 1);
        assert_eq!(question.passage[0].text, "매출총이익률은 40%");
    }
}
