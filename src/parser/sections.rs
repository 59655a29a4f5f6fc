use once_cell::sync::Lazy;
use regex::Regex;
use strsim::normalized_levenshtein;

use crate::config::ExamProfile;
use crate::core::model::UNKNOWN_SECTION;

const MAX_HEADER_CHARS: usize = 24;
const FUZZY_MIN_CHARS: usize = 4;
const FUZZY_THRESHOLD: f64 = 0.75;

/// Decoration around subject names: "제1과목", brackets, separators.
static HEADER_DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"제\s*\d+\s*과목|과목|[\[\]【】<>《》()\-:·\s\d]").expect("valid decoration regex")
});

/// Marks a header line as a header rather than a body line naming a subject.
static DECORATED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"과목|[\[\]【】<>《》]").expect("valid decorated header regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionHit {
    pub name: String,
    pub offset: usize,
}

/// Section headers found in one document.
#[derive(Debug, Clone, Default)]
pub struct SectionIndex {
    /// Canonical subject names in order of first appearance.
    pub headers: Vec<String>,
    pub hits: Vec<SectionHit>,
}

impl SectionIndex {
    /// Range mapping first, then the nearest header before `offset`.
    pub fn section_for(&self, number: u32, offset: usize, profile: &ExamProfile) -> String {
        if let Some(subject) = profile.section_for(number) {
            return subject.to_string();
        }
        self.hits
            .iter()
            .take_while(|hit| hit.offset <= offset)
            .last()
            .map(|hit| hit.name.clone())
            .unwrap_or_else(|| UNKNOWN_SECTION.to_string())
    }
}

/// Canonical subject name if `line` is a section header line.
pub fn header_name(line: &str, profile: &ExamProfile) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_HEADER_CHARS || trimmed.contains('?') {
        return None;
    }
    let core = HEADER_DECORATION.replace_all(trimmed, "");
    if core.is_empty() {
        return None;
    }

    for subject in &profile.subjects {
        let exact = std::iter::once(&subject.name)
            .chain(subject.aliases.iter())
            .any(|name| core == name.as_str());
        if exact {
            return Some(subject.name.clone());
        }
    }

    if core.chars().count() < FUZZY_MIN_CHARS {
        return None;
    }
    profile
        .subjects
        .iter()
        .filter(|subject| subject.name.chars().count() >= FUZZY_MIN_CHARS)
        .map(|subject| (subject, normalized_levenshtein(&core, &subject.name)))
        .filter(|(_, score)| *score >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(subject, _)| subject.name.clone())
}

/// True for header lines carrying `제N과목` or bracket decoration.
pub fn is_decorated_header(line: &str, profile: &ExamProfile) -> bool {
    DECORATED.is_match(line) && header_name(line, profile).is_some()
}

pub fn identify_sections(text: &str, profile: &ExamProfile) -> SectionIndex {
    let mut index = SectionIndex::default();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some(name) = header_name(line, profile) {
            if !index.headers.contains(&name) {
                index.headers.push(name.clone());
            }
            index.hits.push(SectionHit { name, offset });
        }
        offset += line.len();
    }
    index
}
