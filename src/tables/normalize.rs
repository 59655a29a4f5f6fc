use crate::core::model::Table;
use crate::ocr::corrector::OcrCorrector;

/// Turns a raw cell matrix into a [`Table`]: the first row becomes the
/// headers, every row is padded or truncated to the header arity, and rows
/// with no content are dropped. `None` when no data row survives.
pub fn normalize_table(raw: &[Vec<String>], corrector: &OcrCorrector) -> Option<Table> {
    let (header_row, body) = raw.split_first()?;
    let headers: Vec<String> = header_row.iter().map(|cell| corrector.correct(cell)).collect();
    if headers.is_empty() {
        return None;
    }

    let rows: Vec<Vec<String>> = body
        .iter()
        .map(|row| {
            let mut cells: Vec<String> = row
                .iter()
                .take(headers.len())
                .map(|cell| corrector.correct(cell))
                .collect();
            cells.resize(headers.len(), String::new());
            cells
        })
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    if rows.is_empty() {
        return None;
    }
    Some(Table { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn pads_truncates_and_drops_empty_rows() {
        let table = normalize_table(
            &raw(&[
                &["구분", " 금액 "],
                &["매출액", "1,000", "extra"],
                &["", ""],
                &["매출원가"],
            ]),
            &OcrCorrector::default(),
        )
        .unwrap();
        assert_eq!(table.headers, vec!["구분", "금액"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["매출액".to_string(), "1,000".to_string()],
                vec!["매출원가".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn header_only_tables_are_rejected() {
        let corrector = OcrCorrector::default();
        assert_eq!(normalize_table(&raw(&[&["구분", "금액"]]), &corrector), None);
        assert_eq!(normalize_table(&[], &corrector), None);
    }
}
