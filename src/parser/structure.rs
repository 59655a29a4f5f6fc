//! Stem, passage and choice recovery for one question span.
//!
//! The stem is located by an ordered chain of heuristics (see
//! [`SplitStrategy`]). The choice region starts at the first ① after an
//! interrogative stem, so a stem that mentions a circled digit stays whole;
//! without one it starts at the first ① of the span. Whatever is not stem or
//! choice becomes passage material, so passage text never leaks into choices.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{Choice, PassageItem};
use crate::ocr::corrector::OcrCorrector;
use crate::ocr::hangul::{choice_number, consonant_rank, BULLET, BULLET_MARKER, CONSONANT_LABELS};

/// Korean interrogative endings, plus imperative "고르시오." style stems.
static INTERROGATIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:것은|것인가|무엇인가|얼마인가|인가|은|는|를|을|가)\s*\?|(?:고르시오|구하시오)\s*\.",
    )
    .expect("valid interrogative regex")
});

/// Consonant sub-clause inside a choice, e.g. `ㄱ: 100 ㄴ: 200`.
static SUB_CLAUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*([ㄱ-ㅇ])\s*:\s*").expect("valid sub-clause regex"));

/// Phrases that open a stem when it directly follows a passage item.
const STEM_OPENERS: &[&str] = &["다음", "위의", "위 자료", "아래", "밑줄", "<보기>", "보기"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// A terminal interrogative clause was found; it is the stem.
    Interrogative,
    /// Stem is the text before the first passage marker.
    PassageMarker,
    /// Stem is the text before the first choice glyph.
    ChoiceGlyph,
    /// Nothing to split on, the whole span is the stem.
    WholeSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub stem: String,
    pub preamble: Option<String>,
    pub passage: Vec<PassageItem>,
    pub choices: Vec<Choice>,
    pub strategy: SplitStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerKind {
    Bullet,
    Consonant(usize),
}

impl MarkerKind {
    fn label(self) -> String {
        match self {
            MarkerKind::Bullet => BULLET_MARKER.to_string(),
            MarkerKind::Consonant(rank) => CONSONANT_LABELS[rank].to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Marker {
    kind: MarkerKind,
    start: usize,
    end: usize,
}

/// Bullets and `ㄱ.` style labels. A consonant label counts only when it
/// comes later in the alphabet than the previous accepted one.
fn scan_passage_markers(text: &str) -> Vec<Marker> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut markers = Vec::new();
    let mut last_rank: Option<usize> = None;

    for (i, &(pos, c)) in chars.iter().enumerate() {
        if c == BULLET {
            markers.push(Marker {
                kind: MarkerKind::Bullet,
                start: pos,
                end: pos + c.len_utf8(),
            });
            continue;
        }
        let Some(rank) = consonant_rank(c) else {
            continue;
        };
        let starts_token = i == 0 || chars[i - 1].1.is_whitespace();
        if !starts_token || last_rank.is_some_and(|last| rank <= last) {
            continue;
        }
        let mut j = i + 1;
        while j < chars.len() && chars[j].1 == ' ' {
            j += 1;
        }
        if let Some(&(dot, '.')) = chars.get(j) {
            markers.push(Marker {
                kind: MarkerKind::Consonant(rank),
                start: pos,
                end: dot + 1,
            });
            last_rank = Some(rank);
        }
    }

    markers
}

/// Where the choice region begins at or after `from`: the first ①, or the
/// first glyph of any number when the span has no ① at all.
fn choice_region_start(text: &str, from: usize) -> Option<usize> {
    let rest = &text[from..];
    let offset = if text.contains('①') {
        rest.find('①')
    } else {
        rest.char_indices()
            .find(|(_, c)| choice_number(*c).is_some())
            .map(|(i, _)| i)
    };
    offset.map(|offset| from + offset)
}

/// Start of the stem clause that ends at `clause_end`.
fn clause_start(region: &str, clause_end: usize) -> usize {
    let head = &region[..clause_end];
    let marker_end = scan_passage_markers(head).last().map(|m| m.end);

    let chars: Vec<(usize, char)> = head.char_indices().collect();
    // Punctuation before whitespace, or a declarative "…다" closing a line.
    let sentence_end = chars
        .windows(2)
        .filter(|w| {
            (matches!(w[0].1, '.' | '?' | '!') && w[1].1.is_whitespace())
                || (w[0].1 == '다' && w[1].1 == '\n')
        })
        .map(|w| w[1].0)
        .last();

    let (boundary, after_marker) = match (marker_end, sentence_end) {
        (Some(m), Some(s)) if s > m => (s, false),
        (Some(m), _) => (m, true),
        (None, Some(s)) => (s, false),
        (None, None) => (0, false),
    };

    let clause = &head[boundary..];
    let mut start = boundary;
    if after_marker {
        let opener = STEM_OPENERS
            .iter()
            .filter_map(|opener| clause.find(opener))
            .min();
        if let Some(offset) = opener {
            start = boundary + offset;
        } else if let Some(newline) = clause.trim_start().find('\n') {
            start = boundary + (clause.len() - clause.trim_start().len()) + newline + 1;
        }
    }

    let rest = &region[start..];
    start + (rest.len() - rest.trim_start().len())
}

fn extract_passage(
    candidate: &str,
    corrector: &OcrCorrector,
) -> (Option<String>, Vec<PassageItem>) {
    let markers = scan_passage_markers(candidate);
    let lead_end = markers.first().map(|m| m.start).unwrap_or(candidate.len());
    let preamble = corrector.correct(&candidate[..lead_end]);

    let mut items = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let end = markers
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(candidate.len());
        let text = corrector.correct(&candidate[marker.end..end]);
        if !text.is_empty() {
            items.push(PassageItem {
                marker: marker.kind.label(),
                text,
            });
        }
    }

    ((!preamble.is_empty()).then_some(preamble), items)
}

fn clean_choice(text: &str, corrector: &OcrCorrector) -> String {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let split = SUB_CLAUSE.replace_all(&joined, "\n$1: ");
    split
        .lines()
        .map(|line| corrector.correct(line))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits the choice region on circled digits. Glyphs whose number does not
/// exceed the previous one are kept as choice text.
pub fn extract_choices(region: &str, corrector: &OcrCorrector) -> Vec<Choice> {
    let mut starts: Vec<(u8, usize, usize)> = Vec::new();
    for (pos, c) in region.char_indices() {
        if let Some(number) = choice_number(c) {
            if starts.last().map_or(true, |(last, _, _)| number > *last) {
                starts.push((number, pos, pos + c.len_utf8()));
            }
        }
    }

    let mut choices = Vec::with_capacity(starts.len());
    for (i, &(number, _, body_start)) in starts.iter().enumerate() {
        let end = starts
            .get(i + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(region.len());
        let text = clean_choice(&region[body_start..end], corrector);
        if !text.is_empty() {
            choices.push(Choice { number, text });
        }
    }
    choices
}

pub fn extract(text: &str, corrector: &OcrCorrector) -> Extraction {
    let has_choices = choice_region_start(text, 0).is_some();
    // The stem is the last interrogative clause that still has choices after it.
    let interrogative = INTERROGATIVE
        .find_iter(text)
        .filter(|found| !has_choices || choice_region_start(text, found.end()).is_some())
        .last();
    let glyph_at = match interrogative {
        Some(found) => choice_region_start(text, found.end()),
        None => choice_region_start(text, 0),
    };
    let (question, choice_region) = match glyph_at {
        Some(pos) => text.split_at(pos),
        None => (text, ""),
    };

    let (stem, candidate, strategy) =
        if let Some(found) = interrogative {
            let start = clause_start(question, found.start());
            let candidate = format!("{}\n{}", &question[..start], &question[found.end()..]);
            (&question[start..found.end()], candidate, SplitStrategy::Interrogative)
        } else if let Some(first) = scan_passage_markers(question).first() {
            (
                &question[..first.start],
                question[first.start..].to_string(),
                SplitStrategy::PassageMarker,
            )
        } else if glyph_at.is_some() {
            (question, String::new(), SplitStrategy::ChoiceGlyph)
        } else {
            (question, String::new(), SplitStrategy::WholeSpan)
        };

    let (preamble, passage) = extract_passage(&candidate, corrector);
    Extraction {
        stem: corrector.correct(stem),
        preamble,
        passage,
        choices: extract_choices(choice_region, corrector),
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> Extraction {
        extract(text, &OcrCorrector::default())
    }

    fn item(marker: &str, text: &str) -> PassageItem {
        PassageItem {
            marker: marker.to_string(),
            text: text.to_string(),
        }
    }

    fn texts(choices: &[Choice]) -> Vec<(u8, &str)> {
        choices.iter().map(|c| (c.number, c.text.as_str())).collect()
    }

    #[test]
    fn plain_stem_splits_at_first_glyph() {
        let e = run("What is X?\n① A\n② B\n③ C\n④ D\n⑤ E");
        assert_eq!(e.strategy, SplitStrategy::ChoiceGlyph);
        assert_eq!(e.stem, "What is X?");
        assert!(e.passage.is_empty());
        assert_eq!(
            texts(&e.choices),
            vec![(1, "A"), (2, "B"), (3, "C"), (4, "D"), (5, "E")]
        );
    }

    #[test]
    fn bullets_before_interrogative_become_passage() {
        let e = run("○ fact1 ○ fact2 다음 중 옳은 것은?\n① x ② y ③ z");
        assert_eq!(e.strategy, SplitStrategy::Interrogative);
        assert_eq!(e.stem, "다음 중 옳은 것은?");
        assert_eq!(e.passage, vec![item("○", "fact1"), item("○", "fact2")]);
        assert_eq!(e.preamble, None);
        assert_eq!(texts(&e.choices), vec![(1, "x"), (2, "y"), (3, "z")]);
    }

    #[test]
    fn consonant_items_after_stem() {
        let text = "다음 중 옳은 것만을 모두 고른 것은?\nㄱ. 자산은 증가한다.\nㄴ. 부채는 감소한다.\nㄷ. 자본은 불변이다.\n① ㄱ ② ㄴ ③ ㄱ, ㄴ ④ ㄴ, ㄷ ⑤ ㄱ, ㄴ, ㄷ";
        let e = run(text);
        assert_eq!(e.stem, "다음 중 옳은 것만을 모두 고른 것은?");
        assert_eq!(
            e.passage,
            vec![
                item("ㄱ", "자산은 증가한다."),
                item("ㄴ", "부채는 감소한다."),
                item("ㄷ", "자본은 불변이다."),
            ]
        );
        assert_eq!(e.choices.len(), 5);
        assert_eq!(e.choices[4].text, "ㄱ, ㄴ, ㄷ");
    }

    #[test]
    fn leading_prose_becomes_preamble() {
        let e = run("(주)대한의 20X1년 자료는 다음과 같다. 당기순이익은 얼마인가?\n① 100원 ② 200원");
        assert_eq!(e.stem, "당기순이익은 얼마인가?");
        assert_eq!(e.preamble.as_deref(), Some("(주)대한의 20X1 년 자료는 다음과 같다."));
        assert_eq!(texts(&e.choices), vec![(1, "100 원"), (2, "200 원")]);
    }

    #[test]
    fn out_of_order_consonants_stay_in_text() {
        let e = run("옳지 않은 것은?\nㄴ. 첫째 ㄱ. 둘째\n① a ② b");
        assert_eq!(e.passage, vec![item("ㄴ", "첫째 ㄱ. 둘째")]);
    }

    #[test]
    fn falls_back_to_marker_split_without_interrogative() {
        let e = run("다음 자료를 이용하여 답하시오 ○ 매출 100 ○ 비용 40\n① 60 ② 140");
        assert_eq!(e.strategy, SplitStrategy::PassageMarker);
        assert_eq!(e.stem, "다음 자료를 이용하여 답하시오");
        assert_eq!(e.passage, vec![item("○", "매출 100"), item("○", "비용 40")]);
        assert_eq!(texts(&e.choices), vec![(1, "60"), (2, "140")]);
    }

    #[test]
    fn no_glyphs_means_whole_span_stem() {
        let e = run("서술형 문항입니다");
        assert_eq!(e.strategy, SplitStrategy::WholeSpan);
        assert_eq!(e.stem, "서술형 문항입니다");
        assert!(e.choices.is_empty());
    }

    #[test]
    fn backward_glyph_references_stay_in_choice_text() {
        let e = run("옳은 것은?\n① 가 ② 나 ③ ①과 ② 모두");
        assert_eq!(texts(&e.choices), vec![(1, "가"), (2, "나"), (3, "①과 ② 모두")]);
    }

    #[test]
    fn stem_mentioning_a_circled_digit_stays_whole() {
        let e = run("밑줄 친 ①의 금액으로 옳은 것은?\n① 100 ② 200 ③ 300");
        assert_eq!(e.strategy, SplitStrategy::Interrogative);
        assert_eq!(e.stem, "밑줄 친 ①의 금액으로 옳은 것은?");
        assert_eq!(texts(&e.choices), vec![(1, "100"), (2, "200"), (3, "300")]);
    }

    #[test]
    fn question_marks_inside_choices_are_not_stems() {
        let e = run("옳은 것은?\n① 가 ② 무엇인가? ③ 다");
        assert_eq!(e.stem, "옳은 것은?");
        assert_eq!(texts(&e.choices), vec![(1, "가"), (2, "무엇인가?"), (3, "다")]);
    }

    #[test]
    fn sub_clauses_get_their_own_line() {
        let choices = extract_choices("① ㄱ: 100 ㄴ: 200 ② ㄱ: 300 ㄴ: 400", &OcrCorrector::default());
        assert_eq!(choices[0].text, "ㄱ: 100\nㄴ: 200");
        assert_eq!(choices[1].text, "ㄱ: 300\nㄴ: 400");
    }

    #[test]
    fn declarative_line_ends_the_preceding_sentence() {
        let e = run("다음 절차에 대한 설명이다.\n1. 식별한다\n2. 측정한다\n옳은 것은?\n① 가 ② 나");
        assert_eq!(e.stem, "옳은 것은?");
        assert_eq!(
            e.preamble.as_deref(),
            Some("다음 절차에 대한 설명이다. 1. 식별한다 2. 측정한다")
        );
    }

    #[test]
    fn marker_then_stem_on_next_line() {
        let e = run("○ 재고자산은 원가로 측정한다\n옳은 것은?\n① a ② b");
        assert_eq!(e.stem, "옳은 것은?");
        assert_eq!(e.passage, vec![item("○", "재고자산은 원가로 측정한다")]);
    }
}
