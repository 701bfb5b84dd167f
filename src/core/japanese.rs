//! Script helpers for Japanese listing text.

use unicode_normalization::UnicodeNormalization;

pub fn is_hiragana(c: char) -> bool {
    matches!(c as u32, 0x3040..=0x309F)
}

pub fn is_katakana(c: char) -> bool {
    matches!(c as u32, 0x30A0..=0x30FF)
}

pub fn is_kanji(c: char) -> bool {
    matches!(c as u32, 0x4E00..=0x9FAF)
}

pub fn is_japanese(c: char) -> bool {
    is_hiragana(c) || is_katakana(c) || is_kanji(c)
}

/// Full-width digits and the separators that appear inside numbers.
fn is_fullwidth_numeric(c: char) -> bool {
    matches!(c, '０'..='９' | '，' | '．' | '：')
}

/// Folds full-width digits, comma, period and colon to ASCII via NFKC.
///
/// Only those characters are touched; a whole-string NFKC pass would also
/// rewrite unit glyphs such as `㎡` into `m2`, which the parsers rely on.
pub fn fold_fullwidth(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_fullwidth_numeric(c) {
            out.extend(std::iter::once(c).nfkc());
        } else {
            out.push(c);
        }
    }
    out
}
