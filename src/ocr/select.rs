use crate::core::model::OcrCandidate;

/// Highest-scoring candidate; the earliest one wins a tie. Candidates scoring
/// zero are never picked, so `None` means nothing usable was recognized.
pub fn select_best(candidates: &[OcrCandidate]) -> Option<&OcrCandidate> {
    let mut best: Option<&OcrCandidate> = None;
    let mut best_score = 0;
    for candidate in candidates {
        if candidate.score > best_score {
            best_score = candidate.score;
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::OcrAttemptConfig;

    fn candidate(text: &str, score: i64) -> OcrCandidate {
        OcrCandidate {
            variant: "original".to_string(),
            config: OcrAttemptConfig::new("jpn", 6),
            text: text.to_string(),
            score,
        }
    }

    #[test]
    fn unique_maximum_wins_at_any_position() {
        for position in 0..4 {
            let mut candidates: Vec<_> = (0..4).map(|i| candidate(&format!("c{i}"), 5)).collect();
            candidates[position] = candidate("best", 9);
            assert_eq!(select_best(&candidates).map(|c| c.text.as_str()), Some("best"));
        }
    }

    #[test]
    fn ties_keep_the_earliest() {
        let candidates = vec![candidate("a", 3), candidate("b", 7), candidate("c", 7)];
        assert_eq!(select_best(&candidates).map(|c| c.text.as_str()), Some("b"));
    }

    #[test]
    fn nothing_to_pick() {
        assert!(select_best(&[]).is_none());
        assert!(select_best(&[candidate("", 0), candidate("  ", 0)]).is_none());
    }
}
