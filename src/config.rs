//! Exam-family configuration.
//!
//! Everything that is specific to one family of exams (subject names, which
//! question numbers belong to which subject, table keyword families, extra
//! OCR lexicon entries, page furniture) lives in an [`ExamProfile`]. A
//! built-in default covers Korean accounting certification exams; other
//! families are loaded from TOML.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ocr::corrector;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("section range {start}-{end} for '{subject}' is empty")]
    EmptyRange { start: u32, end: u32, subject: String },
    #[error("section ranges for '{first}' and '{second}' overlap")]
    OverlappingRanges { first: String, second: String },
    #[error("invalid page header pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("lexicon entry '{from}' -> '{to}' would not be stable under repeated correction")]
    UnstableLexicon { from: String, to: String },
    #[error("table family '{0}' needs at least two keywords")]
    SparseTableFamily(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRange {
    pub start: u32,
    pub end: u32,
    pub subject: String,
}

impl SectionRange {
    pub fn contains(&self, number: u32) -> bool {
        (self.start..=self.end).contains(&number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectHeader {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFamily {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamProfile {
    pub name: String,
    pub sections: Vec<SectionRange>,
    pub subjects: Vec<SubjectHeader>,
    pub table_families: Vec<TableFamily>,
    pub lexicon: Vec<LexiconEntry>,
    /// Regexes matched against whole lines; matching lines are page furniture.
    pub page_header_patterns: Vec<String>,
    /// Largest forward jump in question numbering accepted as a new question.
    /// Unset means any increasing number starts a question.
    pub max_number_gap: Option<u32>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExamProfile {
    fn default() -> Self {
        let subject = |name: &str, aliases: &[&str]| SubjectHeader {
            name: name.to_string(),
            aliases: strings(aliases),
        };
        let family = |name: &str, keywords: &[&str]| TableFamily {
            name: name.to_string(),
            keywords: strings(keywords),
        };
        Self {
            name: "korean-accounting".to_string(),
            sections: Vec::new(),
            subjects: vec![
                subject("재무회계", &["중급회계"]),
                subject("원가관리회계", &["원가회계", "관리회계"]),
                subject("정부회계", &[]),
                subject("세법개론", &["세법"]),
                subject("회계원리", &[]),
                subject("경영학", &[]),
                subject("경제원론", &[]),
                subject("상법", &[]),
            ],
            table_families: vec![
                family(
                    "financial-statements",
                    &[
                        "재무상태표",
                        "손익계산서",
                        "자산",
                        "부채",
                        "자본",
                        "매출액",
                        "매출원가",
                        "당기순이익",
                    ],
                ),
                family(
                    "cost",
                    &[
                        "직접재료원가",
                        "직접노무원가",
                        "제조간접원가",
                        "재공품",
                        "생산량",
                        "단위당",
                        "완성품",
                    ],
                ),
                family(
                    "tax",
                    &["과세표준", "세율", "소득금액", "공제", "세액", "과세기간"],
                ),
            ],
            lexicon: Vec::new(),
            page_header_patterns: strings(&[
                r"-\s*\d{1,3}\s*-",
                r"\d{1,3}\s*/\s*\d{1,3}",
                r"제\s*\d\s*교시",
                r"\(?\s*[A-Z]\s*\)?\s*형",
            ]),
            max_number_gap: None,
        }
    }
}

impl ExamProfile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let profile: ExamProfile = toml::from_str(&raw)
            .with_context(|| format!("failed to parse profile {}", path.display()))?;
        profile
            .validate()
            .with_context(|| format!("invalid profile {}", path.display()))?;
        Ok(profile)
    }

    pub fn validate(&self) -> std::result::Result<(), ProfileError> {
        for range in &self.sections {
            if range.start > range.end {
                return Err(ProfileError::EmptyRange {
                    start: range.start,
                    end: range.end,
                    subject: range.subject.clone(),
                });
            }
        }
        for (i, a) in self.sections.iter().enumerate() {
            for b in &self.sections[i + 1..] {
                if a.start <= b.end && b.start <= a.end {
                    return Err(ProfileError::OverlappingRanges {
                        first: a.subject.clone(),
                        second: b.subject.clone(),
                    });
                }
            }
        }
        for pattern in &self.page_header_patterns {
            compile_line_pattern(pattern)?;
        }
        for family in &self.table_families {
            if family.keywords.len() < 2 {
                return Err(ProfileError::SparseTableFamily(family.name.clone()));
            }
        }
        let entries: Vec<(String, String)> = self
            .lexicon
            .iter()
            .map(|e| (e.from.clone(), e.to.clone()))
            .chain(
                corrector::BUILTIN_LEXICON
                    .iter()
                    .map(|(from, to)| (from.to_string(), to.to_string())),
            )
            .collect();
        for entry in &self.lexicon {
            if !corrector::is_stable_entry(&entry.from, &entry.to, &entries) {
                return Err(ProfileError::UnstableLexicon {
                    from: entry.from.clone(),
                    to: entry.to.clone(),
                });
            }
        }
        Ok(())
    }

    /// Subject configured for a question number, if any range covers it.
    pub fn section_for(&self, number: u32) -> Option<&str> {
        self.sections
            .iter()
            .find(|range| range.contains(number))
            .map(|range| range.subject.as_str())
    }

    pub fn lexicon_pairs(&self) -> Vec<(String, String)> {
        self.lexicon
            .iter()
            .map(|e| (e.from.clone(), e.to.clone()))
            .collect()
    }

    /// Compiled page-header patterns; invalid ones are skipped.
    pub fn page_header_regexes(&self) -> Vec<Regex> {
        self.page_header_patterns
            .iter()
            .filter_map(|pattern| match compile_line_pattern(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    tracing::warn!("skipping page header pattern: {err}");
                    None
                }
            })
            .collect()
    }
}

fn compile_line_pattern(pattern: &str) -> std::result::Result<Regex, ProfileError> {
    Regex::new(&format!(r"^\s*(?:{pattern})\s*$")).map_err(|source| ProfileError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
