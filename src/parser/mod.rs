pub mod layout_builder;
pub mod sections;
pub mod segmenter;
pub mod structure;

pub use layout_builder::LayoutAnalyzer;
pub use segmenter::RawSpan;
pub use structure::{Extraction, SplitStrategy};

use regex::Regex;

use crate::config::ExamProfile;
use crate::ocr::corrector::OcrCorrector;

pub trait QuestionExtractor {
    fn extract(&self, span: &RawSpan) -> Extraction;
}

#[derive(Debug, Default)]
pub struct HeuristicExtractor {
    corrector: OcrCorrector,
}

impl HeuristicExtractor {
    pub fn new(corrector: OcrCorrector) -> Self {
        Self { corrector }
    }
}

impl QuestionExtractor for HeuristicExtractor {
    fn extract(&self, span: &RawSpan) -> Extraction {
        structure::extract(&span.text, &self.corrector)
    }
}

/// Drops section header and page header/footer lines that landed inside a span.
///
/// Decorated headers (`제2과목 세법개론`, `[상법]`) go wherever they appear. A
/// bare subject name is only a header when it trails the span, where the next
/// section begins; inside a passage it is body text.
pub fn strip_page_furniture(text: &str, profile: &ExamProfile, page_headers: &[Regex]) -> String {
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| {
            !sections::is_decorated_header(line, profile)
                && !page_headers.iter().any(|re| re.is_match(line))
        })
        .collect();
    while lines
        .last()
        .is_some_and(|line| line.trim().is_empty() || sections::header_name(line, profile).is_some())
    {
        lines.pop();
    }
    lines.join("\n")
}
