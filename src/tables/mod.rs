pub mod compare;
pub mod normalize;
pub mod strip;

use tracing::debug;

use crate::config::TableFamily;
use crate::core::confidence::score_table_match;
use crate::core::model::{SourceDocument, Table, TableMatch};
use crate::ocr::corrector::OcrCorrector;

const MIN_KEYWORD_HITS: usize = 2;
const MIN_SHARED_SUBSTRINGS: usize = 3;

#[derive(Debug, Clone)]
pub struct PooledTable {
    pub page_idx: usize,
    pub table_idx: usize,
    pub table: Table,
    consumed: bool,
}

/// Page tables of one document, in page order. A table binds to at most one
/// question; once bound it is consumed.
#[derive(Debug, Default)]
pub struct TablePool {
    tables: Vec<PooledTable>,
}

impl TablePool {
    pub fn from_document(document: &SourceDocument, corrector: &OcrCorrector) -> Self {
        let mut tables = Vec::new();
        for (page_idx, page) in document.pages.iter().enumerate() {
            for (table_idx, raw) in page.tables.iter().enumerate() {
                match normalize::normalize_table(raw, corrector) {
                    Some(table) => tables.push(PooledTable {
                        page_idx,
                        table_idx,
                        table,
                        consumed: false,
                    }),
                    None => debug!(page_idx, table_idx, "skipping table without data rows"),
                }
            }
        }
        Self { tables }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn unconsumed(&self) -> usize {
        self.tables.iter().filter(|t| !t.consumed).count()
    }

    /// Binds the first eligible unconsumed table to a question.
    pub fn bind(&mut self, question_text: &str, families: &[TableFamily]) -> Option<(Table, TableMatch)> {
        for pooled in self.tables.iter_mut().filter(|t| !t.consumed) {
            let keyword_hits = families
                .iter()
                .filter(|family| compare::table_mentions_family(&pooled.table, family))
                .map(|family| compare::keyword_hits(question_text, family))
                .max()
                .unwrap_or(0);
            let shared = compare::shared_substrings(&pooled.table, question_text);
            if keyword_hits < MIN_KEYWORD_HITS && shared < MIN_SHARED_SUBSTRINGS {
                continue;
            }

            pooled.consumed = true;
            let confidence = score_table_match(keyword_hits, shared, pooled.table.cells().count());
            debug!(
                page_idx = pooled.page_idx,
                table_idx = pooled.table_idx,
                keyword_hits,
                shared,
                confidence,
                "bound table"
            );
            return Some((
                pooled.table.clone(),
                TableMatch {
                    page_idx: pooled.page_idx,
                    table_idx: pooled.table_idx,
                    keyword_hits,
                    shared_substrings: shared,
                    confidence,
                },
            ));
        }
        None
    }
}
