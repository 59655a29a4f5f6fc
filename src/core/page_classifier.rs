use crate::core::model::{PageLayout, Word};

const LEFT_EDGE: f32 = 0.45;
const RIGHT_EDGE: f32 = 0.55;
const MIN_COLUMN_SHARE: f32 = 0.30;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSignals {
    pub total_words: usize,
    pub left_words: usize,
    pub right_words: usize,
}

impl ColumnSignals {
    pub fn from_words(words: &[Word], page_width: f32) -> Self {
        let left_limit = page_width * LEFT_EDGE;
        let right_limit = page_width * RIGHT_EDGE;
        Self {
            total_words: words.len(),
            left_words: words.iter().filter(|w| w.bbox.x0 < left_limit).count(),
            right_words: words.iter().filter(|w| w.bbox.x0 > right_limit).count(),
        }
    }

    pub fn left_share(&self) -> f32 {
        share(self.left_words, self.total_words)
    }

    pub fn right_share(&self) -> f32 {
        share(self.right_words, self.total_words)
    }
}

fn share(part: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32
    }
}

pub fn classify_page(signals: ColumnSignals) -> PageLayout {
    if signals.left_share() > MIN_COLUMN_SHARE && signals.right_share() > MIN_COLUMN_SHARE {
        PageLayout::TwoColumn
    } else {
        PageLayout::SingleColumn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_two_column_page() {
        let signals = ColumnSignals {
            total_words: 100,
            left_words: 48,
            right_words: 45,
        };
        assert_eq!(classify_page(signals), PageLayout::TwoColumn);
    }

    #[test]
    fn classifies_single_column_page() {
        let signals = ColumnSignals {
            total_words: 100,
            left_words: 70,
            right_words: 12,
        };
        assert_eq!(classify_page(signals), PageLayout::SingleColumn);
    }

    #[test]
    fn empty_page_is_single_column() {
        let signals = ColumnSignals::from_words(&[], 600.0);
        assert_eq!(classify_page(signals), PageLayout::SingleColumn);
    }
}
