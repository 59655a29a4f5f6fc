//! Hangul character classes and glyph tables shared by the corrector and the
//! structural extractor.

use unicode_normalization::UnicodeNormalization;

pub const BULLET: char = '○';
pub const BULLET_MARKER: &str = "○";

/// Circled digits, index + 1 is the choice number.
pub const CHOICE_GLYPHS: [char; 5] = ['①', '②', '③', '④', '⑤'];

/// Consonant labels in their fixed enumeration order.
pub const CONSONANT_LABELS: [char; 8] = ['ㄱ', 'ㄴ', 'ㄷ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅅ', 'ㅇ'];

const HANGUL_BASE: u32 = 0xAC00; // '가'
const JONGSEONG_COUNT: u32 = 28;
const JUNGSEONG_COUNT: u32 = 21;
const CHOSEONG_START: u32 = 0x1100;
const JUNGSEONG_START: u32 = 0x1161;
const JONGSEONG_START: u32 = 0x11A7;

pub fn choice_number(c: char) -> Option<u8> {
    CHOICE_GLYPHS
        .iter()
        .position(|&glyph| glyph == c)
        .map(|idx| idx as u8 + 1)
}

/// Position of a consonant label in the enumeration order.
pub fn consonant_rank(c: char) -> Option<usize> {
    CONSONANT_LABELS.iter().position(|&label| label == c)
}

pub fn is_hangul_syllable(c: char) -> bool {
    ('가'..='힣').contains(&c)
}

/// Conjoining jamo as emitted by decomposing PDF text layers.
fn is_conjoining_jamo(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x11FF | // Hangul Jamo
        0xA960..=0xA97F | // Hangul Jamo Extended-A
        0xD7B0..=0xD7FF   // Hangul Jamo Extended-B
    )
}

fn choseong_index(c: char) -> Option<u32> {
    let code = c as u32;
    (CHOSEONG_START..CHOSEONG_START + 19)
        .contains(&code)
        .then(|| code - CHOSEONG_START)
}

fn jungseong_index(c: char) -> Option<u32> {
    let code = c as u32;
    (JUNGSEONG_START..JUNGSEONG_START + JUNGSEONG_COUNT)
        .contains(&code)
        .then(|| code - JUNGSEONG_START)
}

fn jongseong_index(c: char) -> Option<u32> {
    let code = c as u32;
    (JONGSEONG_START + 1..JONGSEONG_START + JONGSEONG_COUNT)
        .contains(&code)
        .then(|| code - JONGSEONG_START)
}

fn compose_syllable(cho: u32, jung: u32, jong: u32) -> Option<char> {
    if cho >= 19 || jung >= JUNGSEONG_COUNT || jong >= JONGSEONG_COUNT {
        return None;
    }
    let code =
        HANGUL_BASE + (cho * JUNGSEONG_COUNT * JONGSEONG_COUNT) + (jung * JONGSEONG_COUNT) + jong;
    char::from_u32(code)
}

fn remove_intra_jamo_whitespace(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    for (i, c) in chars.iter().enumerate() {
        if c.is_whitespace() {
            let prev = chars[..i].iter().rev().find(|ch| !ch.is_whitespace());
            let next = chars[i + 1..].iter().find(|ch| !ch.is_whitespace());
            let between_jamos = prev
                .zip(next)
                .map(|(p, n)| is_conjoining_jamo(*p) && is_conjoining_jamo(*n))
                .unwrap_or(false);
            if between_jamos {
                continue;
            }
        }
        result.push(*c);
    }

    result
}

/// Composes decomposed Hangul into syllables.
///
/// Compatibility jamo (`ㄱ`, `ㄴ`, …) are left alone so enumeration labels
/// survive; only conjoining jamo sequences are joined.
pub fn compose_hangul(text: &str) -> String {
    let compact = remove_intra_jamo_whitespace(text);
    let chars: Vec<char> = compact.nfc().collect();
    let mut result = String::with_capacity(compact.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let pair = choseong_index(c).zip(chars.get(i + 1).copied().and_then(jungseong_index));
        if let Some((cho, jung)) = pair {
            let (jong, skip) = match chars.get(i + 2).copied().and_then(jongseong_index) {
                Some(jong) => (jong, 3),
                None => (0, 2),
            };
            if let Some(syllable) = compose_syllable(cho, jung, jong) {
                result.push(syllable);
                i += skip;
                continue;
            }
        }
        result.push(c);
        i += 1;
    }

    result
}
