use crate::core::geometry::BBox;
use crate::core::model::{PageLayout, SourcePage, Word};
use crate::core::page_classifier::{classify_page, ColumnSignals};

const COLUMN_SPLIT: f32 = 0.5;
const MIN_LINE_TOLERANCE: f32 = 1.0;

/// Reading-order text of one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page_idx: usize,
    /// `None` when the page carried no word boxes and its text was used as-is.
    pub layout: Option<PageLayout>,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct LayoutAnalyzer;

impl LayoutAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_page(&self, page: &SourcePage, page_idx: usize) -> PageText {
        if page.words.is_empty() {
            return PageText {
                page_idx,
                layout: None,
                text: page.text.clone().unwrap_or_default(),
            };
        }

        let width = page
            .width
            .filter(|w| *w > 0.0)
            .unwrap_or_else(|| words_extent(&page.words).x1);
        let layout = classify_page(ColumnSignals::from_words(&page.words, width));

        let text = match layout {
            PageLayout::SingleColumn => lines_to_text(&page.words.iter().collect::<Vec<_>>()),
            PageLayout::TwoColumn => {
                let split = width * COLUMN_SPLIT;
                let (left, right): (Vec<&Word>, Vec<&Word>) =
                    page.words.iter().partition(|w| w.bbox.x0 < split);
                let mut text = lines_to_text(&left);
                let right_text = lines_to_text(&right);
                if !text.is_empty() && !right_text.is_empty() {
                    text.push('\n');
                }
                text.push_str(&right_text);
                text
            }
        };

        PageText {
            page_idx,
            layout: Some(layout),
            text,
        }
    }
}

fn words_extent(words: &[Word]) -> BBox {
    words
        .iter()
        .map(|w| w.bbox)
        .reduce(|acc, b| acc.union(&b))
        .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0))
}

fn line_tolerance(words: &[&Word]) -> f32 {
    let mut heights: Vec<f32> = words.iter().map(|w| w.bbox.height()).collect();
    heights.sort_by(f32::total_cmp);
    let median = heights.get(heights.len() / 2).copied().unwrap_or(0.0);
    (median * 0.5).max(MIN_LINE_TOLERANCE)
}

/// Groups words into lines top to bottom, each line left to right.
fn lines_to_text(words: &[&Word]) -> String {
    if words.is_empty() {
        return String::new();
    }
    let tolerance = line_tolerance(words);
    let mut sorted: Vec<&Word> = words.to_vec();
    sorted.sort_by(|a, b| a.bbox.reading_cmp(&b.bbox));

    let mut lines: Vec<Vec<&Word>> = Vec::new();
    let mut anchor = f32::NEG_INFINITY;
    for word in sorted {
        match lines.last_mut() {
            Some(line) if (word.bbox.y0 - anchor).abs() <= tolerance => line.push(word),
            _ => {
                anchor = word.bbox.y0;
                lines.push(vec![word]);
            }
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            line.iter()
                .map(|w| w.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(text: &str, x0: f32, y0: f32) -> Word {
        Word::new(text, BBox::new(x0, y0, x0 + 40.0, y0 + 10.0))
    }

    fn page(words: Vec<Word>) -> SourcePage {
        SourcePage {
            words,
            width: Some(600.0),
            ..SourcePage::default()
        }
    }

    #[test]
    fn single_column_reads_top_to_bottom() {
        let page = page(vec![
            word("옳은", 120.0, 10.0),
            word("것은?", 170.0, 11.0),
            word("1.", 20.0, 10.5),
            word("①", 20.0, 30.0),
            word("자산", 70.0, 30.0),
        ]);
        let text = LayoutAnalyzer::new().analyze_page(&page, 0);
        assert_eq!(text.layout, Some(PageLayout::SingleColumn));
        assert_eq!(text.text, "1. 옳은 것은?\n① 자산");
    }

    #[test]
    fn two_column_emits_left_before_right() {
        let page = page(vec![
            word("3.", 340.0, 10.0),
            word("right-top", 380.0, 10.0),
            word("1.", 20.0, 10.0),
            word("left-top", 60.0, 10.0),
            word("4.", 340.0, 30.0),
            word("right-bottom", 380.0, 30.0),
            word("2.", 20.0, 30.0),
            word("left-bottom", 60.0, 30.0),
        ]);
        let text = LayoutAnalyzer::new().analyze_page(&page, 1);
        assert_eq!(text.layout, Some(PageLayout::TwoColumn));
        assert_eq!(
            text.text,
            "1. left-top\n2. left-bottom\n3. right-top\n4. right-bottom"
        );
    }

    #[test]
    fn empty_page_yields_empty_stream() {
        let text = LayoutAnalyzer::new().analyze_page(&SourcePage::default(), 2);
        assert_eq!(text.text, "");
        assert_eq!(text.layout, None);
    }

    #[test]
    fn missing_width_falls_back_to_word_extent() {
        let mut page = page(vec![word("a", 0.0, 0.0), word("b", 560.0, 0.0)]);
        page.width = None;
        let text = LayoutAnalyzer::new().analyze_page(&page, 0);
        // Extent gives a width of 600, which puts the words on opposite sides.
        assert_eq!(text.layout, Some(PageLayout::TwoColumn));
        assert_eq!(text.text, "a\nb");
    }
}
