use std::collections::BTreeSet;

use crate::config::TableFamily;
use crate::core::model::Table;

const MIN_SHARED_CHARS: usize = 3;

/// Number of `family` keywords found in `text`.
pub fn keyword_hits(text: &str, family: &TableFamily) -> usize {
    family
        .keywords
        .iter()
        .filter(|keyword| !keyword.is_empty() && text.contains(keyword.as_str()))
        .count()
}

/// Whether any cell of `table` contains one of the family's keywords.
pub fn table_mentions_family(table: &Table, family: &TableFamily) -> bool {
    table.cells().any(|cell| {
        family
            .keywords
            .iter()
            .any(|keyword| !keyword.is_empty() && cell.contains(keyword.as_str()))
    })
}

/// Distinct cell tokens of at least three characters that also occur in `text`.
pub fn shared_substrings(table: &Table, text: &str) -> usize {
    let tokens: BTreeSet<&str> = table
        .cells()
        .flat_map(str::split_whitespace)
        .filter(|token| token.chars().count() >= MIN_SHARED_CHARS)
        .collect();
    tokens.into_iter().filter(|token| text.contains(token)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table {
            headers: vec!["구분".to_string(), "금액".to_string()],
            rows: vec![
                vec!["매출액".to_string(), "1,000".to_string()],
                vec!["매출원가".to_string(), "600".to_string()],
                vec!["판매비".to_string(), "100".to_string()],
            ],
        }
    }

    fn family() -> TableFamily {
        TableFamily {
            name: "fs".to_string(),
            keywords: vec!["매출액".to_string(), "매출원가".to_string(), "자산".to_string()],
        }
    }

    #[test]
    fn counts_keywords_in_question_text() {
        assert_eq!(keyword_hits("매출액과 매출원가를 이용하여", &family()), 2);
        assert_eq!(keyword_hits("자본의 변동", &family()), 0);
        assert!(table_mentions_family(&table(), &family()));
    }

    #[test]
    fn shared_tokens_are_distinct_and_long_enough() {
        // "구분" and "금액" are too short to count.
        let text = "구분 금액 매출액 1,000 매출액 판매비 100";
        assert_eq!(shared_substrings(&table(), text), 4);
        assert_eq!(shared_substrings(&table(), "관련 없음"), 0);
    }
}
