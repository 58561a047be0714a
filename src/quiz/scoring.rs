//! Automatic answer scoring.

/// Award `points` when `answer` matches one of the comma separated
/// `accepted` answers, ignoring case and surrounding whitespace.
pub fn auto_score(answer: &str, accepted: &str, points: i64) -> i64 {
    let answer = answer.trim().to_lowercase();
    let matched = accepted
        .split(',')
        .any(|token| token.trim().to_lowercase() == answer);
    if matched {
        points
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_full_points() {
        assert_eq!(auto_score("Paris", "Paris", 3), 3);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        assert_eq!(auto_score("pArIs", "PARIS", 2), 2);
        assert_eq!(auto_score("ÉCOLE", "école", 1), 1);
    }

    #[test]
    fn test_any_token_matches() {
        assert_eq!(auto_score("gray", "grey,gray", 1), 1);
        assert_eq!(auto_score("grey", "grey, gray", 1), 1);
        assert_eq!(auto_score("gray", "grey, gray", 1), 1);
    }

    #[test]
    fn test_wrong_or_partial_answer_scores_zero() {
        assert_eq!(auto_score("Lyon", "Paris", 3), 0);
        assert_eq!(auto_score("Par", "Paris", 3), 0);
        assert_eq!(auto_score("grey,gray", "grey,gray", 1), 0);
    }

    #[test]
    fn test_empty_answer_only_matches_empty_token() {
        assert_eq!(auto_score("", "Paris", 3), 0);
        assert_eq!(auto_score("", "Paris,", 3), 3);
    }
}
