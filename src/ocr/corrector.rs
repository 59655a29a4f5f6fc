use once_cell::sync::Lazy;
use regex::Regex;

use crate::ocr::hangul::{compose_hangul, is_hangul_syllable};

/// Recurring misreadings in scanned accounting exams.
pub const BUILTIN_LEXICON: &[(&str, &str)] = &[
    ("재무제포", "재무제표"),
    ("재무상태포", "재무상태표"),
    ("손익계산사", "손익계산서"),
    ("현금흐듬표", "현금흐름표"),
    ("회게", "회계"),
    ("부체", "부채"),
    ("당기순이의", "당기순이익"),
    ("영업이의", "영업이익"),
    ("매출원기", "매출원가"),
    ("법인세비융", "법인세비용"),
    ("감가상각누게액", "감가상각누계액"),
    ("충당부체", "충당부채"),
];

static PAREN_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\s*([ㄱ-ㅎ])\s*\)").expect("valid paren label regex"));
static LABEL_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([ㄱ-ㅎ])\s+\.").expect("valid label dot regex"));

const MAX_LEXICON_PASSES: usize = 4;

#[derive(Debug, Clone)]
pub struct OcrCorrector {
    lexicon: Vec<(String, String)>,
}

impl Default for OcrCorrector {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl OcrCorrector {
    /// Built-in lexicon extended by `extra` entries, which take precedence.
    pub fn new(extra: Vec<(String, String)>) -> Self {
        let mut lexicon = extra;
        lexicon.extend(
            BUILTIN_LEXICON
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string())),
        );
        Self { lexicon }
    }

    pub fn correct(&self, text: &str) -> String {
        let text = collapse_whitespace(text);
        let text = normalize_glyphs(&text);
        let text = apply_lexicon(&text, &self.lexicon);
        space_script_boundaries(&text)
    }

    /// Line-preserving variant: each line corrected, blank lines dropped.
    pub fn correct_lines(&self, text: &str) -> String {
        text.lines()
            .map(|line| self.correct(line))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Corrects `text` with the built-in lexicon only.
pub fn correct(text: &str) -> String {
    OcrCorrector::default().correct(text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn map_glyph(c: char) -> char {
    match c {
        '（' => '(',
        '）' => ')',
        '［' | '〔' | '【' => '[',
        '］' | '〕' | '】' => ']',
        '｛' => '{',
        '｝' => '}',
        '－' | '—' | '–' | '―' | '‐' | '−' => '-',
        '～' | '∼' => '~',
        '．' => '.',
        '，' => ',',
        '：' => ':',
        '；' => ';',
        '？' => '?',
        '！' => '!',
        '％' => '%',
        '◯' | '〇' => '○',
        '０'..='９' | 'Ａ'..='Ｚ' | 'ａ'..='ｚ' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}

pub(crate) fn normalize_glyphs(text: &str) -> String {
    let mapped: String = text.chars().map(map_glyph).collect();
    let composed = compose_hangul(&mapped);
    let labels = PAREN_LABEL.replace_all(&composed, "($1)");
    LABEL_DOT.replace_all(&labels, "$1.").into_owned()
}

fn apply_lexicon(text: &str, lexicon: &[(String, String)]) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_LEXICON_PASSES {
        let mut next = current.clone();
        for (from, to) in lexicon {
            if next.contains(from.as_str()) {
                next = next.replace(from.as_str(), to);
            }
        }
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn is_latin_or_digit(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn space_script_boundaries(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    for c in text.chars() {
        if let Some(p) = prev {
            let boundary = (is_hangul_syllable(p) && is_latin_or_digit(c))
                || (is_latin_or_digit(p) && is_hangul_syllable(c));
            if boundary {
                out.push(' ');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Whether a lexicon entry keeps correction idempotent alongside `entries`.
pub fn is_stable_entry(from: &str, to: &str, entries: &[(String, String)]) -> bool {
    if from.is_empty() || from == to {
        return false;
    }
    if from.chars().any(char::is_whitespace) || to.chars().any(char::is_whitespace) {
        return false;
    }
    if normalize_glyphs(to) != to || space_script_boundaries(to) != to {
        return false;
    }
    !entries.iter().any(|(key, _)| to.contains(key.as_str()))
}
