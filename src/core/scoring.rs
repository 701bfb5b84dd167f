use crate::core::japanese::is_japanese;

/// Vocabulary that shows up on nearly every listing; each one present earns a
/// flat bonus.
pub const LISTING_KEYWORDS: [&str; 10] = [
    "価格", "万円", "㎡", "階", "築", "駅", "分", "所在地", "間取り", "LDK",
];

const JAPANESE_BONUS: i64 = 3;
const GARBAGE_PENALTY: i64 = 2;
const KEYWORD_BONUS: i64 = 10;
const NEIGHBOUR_WINDOW: usize = 2;

/// Heuristic quality of one OCR result. Higher means more listing-like.
pub fn score_text(text: &str) -> i64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0;
    }

    let chars: Vec<char> = text.chars().collect();
    let mut score = trimmed.chars().count() as i64;

    let japanese = chars.iter().filter(|c| is_japanese(**c)).count() as i64;
    score += japanese * JAPANESE_BONUS;

    score -= isolated_latin_count(&chars) as i64 * GARBAGE_PENALTY;

    let keywords = LISTING_KEYWORDS
        .iter()
        .filter(|keyword| text.contains(*keyword))
        .count() as i64;
    score += keywords * KEYWORD_BONUS;

    score.max(0)
}

/// Latin letters with no Japanese character within two positions either side.
fn isolated_latin_count(chars: &[char]) -> usize {
    chars
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_ascii_alphabetic())
        .filter(|(i, _)| {
            let start = i.saturating_sub(NEIGHBOUR_WINDOW);
            let end = (i + NEIGHBOUR_WINDOW + 1).min(chars.len());
            !chars[start..end].iter().any(|c| is_japanese(*c))
        })
        .count()
}
