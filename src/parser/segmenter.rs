use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static QUESTION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(\d{1,3})\.\s+").expect("valid question marker regex"));

/// Text belonging to one numbered question, before structural extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSpan {
    pub number: u32,
    /// Byte offset of the question marker in the document text.
    pub offset: usize,
    pub page_idx: usize,
    pub text: String,
}

struct Marker {
    number: u32,
    start: usize,
    body_start: usize,
}

/// Splits document text at line-start `N.` markers.
///
/// Numbering must strictly increase. A marker that breaks this is body text
/// (a numbered list inside a passage) and stays in the preceding span. With
/// `max_gap` set, a forward jump larger than it is body text too.
/// `page_starts` holds the byte offset at which each page begins.
pub fn segment_questions(text: &str, page_starts: &[usize], max_gap: Option<u32>) -> Vec<RawSpan> {
    let mut markers: Vec<Marker> = Vec::new();
    for caps in QUESTION_MARKER.captures_iter(text) {
        let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(number) = digits.as_str().parse::<u32>() else {
            continue;
        };
        let accepted = match markers.last() {
            None => number > 0,
            Some(prev) => {
                number > prev.number && max_gap.map_or(true, |gap| number - prev.number <= gap)
            }
        };
        if accepted {
            markers.push(Marker {
                number,
                start: whole.start(),
                body_start: whole.end(),
            });
        } else {
            debug!(
                number,
                previous = markers.last().map(|m| m.number),
                "merging out-of-sequence question marker into preceding span"
            );
        }
    }

    let mut spans = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map(|next| next.start).unwrap_or(text.len());
        spans.push(RawSpan {
            number: marker.number,
            offset: marker.start,
            page_idx: page_of(marker.body_start, page_starts),
            text: text[marker.body_start..end].trim().to_string(),
        });
    }
    spans
}

fn page_of(offset: usize, page_starts: &[usize]) -> usize {
    page_starts
        .iter()
        .rposition(|&start| start <= offset)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbers(spans: &[RawSpan]) -> Vec<u32> {
        spans.iter().map(|s| s.number).collect()
    }

    #[test]
    fn splits_on_line_start_markers() {
        let text = "1. What is X?\n① A\n② B\n2. What is Y?\n① F\n② G";
        let spans = segment_questions(text, &[0], None);
        assert_eq!(numbers(&spans), vec![1, 2]);
        assert_eq!(spans[0].text, "What is X?\n① A\n② B");
        assert_eq!(spans[1].text, "What is Y?\n① F\n② G");
    }

    #[test]
    fn tolerates_gaps() {
        let text = "3. a\n① x\n7. b\n① y";
        assert_eq!(numbers(&segment_questions(text, &[0], None)), vec![3, 7]);
    }

    #[test]
    fn merges_decreasing_numbers_into_previous_span() {
        let text = "5. 다음 절차를 보자.\n1. 첫째 단계\n2. 둘째 단계\n옳은 것은?\n① a\n6. 다음\n① b";
        let spans = segment_questions(text, &[0], None);
        assert_eq!(numbers(&spans), vec![5, 6]);
        assert!(spans[0].text.contains("1. 첫째 단계\n2. 둘째 단계"));
    }

    #[test]
    fn large_jumps_start_questions_by_default() {
        let text = "1. 옳은 것은?\n① 가 ② 나\n35. 틀린 것은?\n① 다 ② 라";
        let spans = segment_questions(text, &[0], None);
        assert_eq!(numbers(&spans), vec![1, 35]);
        assert_eq!(spans[0].text, "옳은 것은?\n① 가 ② 나");
    }

    #[test]
    fn configured_gap_limit_merges_large_jumps() {
        let text = "2. 기준\n100. 조항 인용\n3. 다음";
        let spans = segment_questions(text, &[0], Some(30));
        assert_eq!(numbers(&spans), vec![2, 3]);
        assert!(spans[0].text.contains("100. 조항"));
    }

    #[test]
    fn ignores_inline_and_decimal_numbers() {
        let text = "1. 이자율은 3.5 %이며 2. 항목은\n① a";
        let spans = segment_questions(text, &[0], None);
        assert_eq!(numbers(&spans), vec![1]);
    }

    #[test]
    fn records_page_of_each_span() {
        let text = "1. a\n① x\n2. b\n① y";
        let second_page = text.find("2.").unwrap();
        let spans = segment_questions(text, &[0, second_page], None);
        assert_eq!(spans[0].page_idx, 0);
        assert_eq!(spans[1].page_idx, 1);
    }

    #[test]
    fn no_markers_no_spans() {
        assert!(segment_questions("표지\n응시자 유의사항", &[0], None).is_empty());
    }
}
