//! Text normalization shared by the grading strategies.

use std::collections::BTreeSet;

/// Lowercase, strip punctuation and collapse whitespace.
///
/// Punctuation is anything that is not alphanumeric, `_` or whitespace.
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect();
    collapse_whitespace(&stripped)
}

/// Collapse runs of whitespace (including newlines) to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-delimited token set of an already normalized string.
pub fn token_set(normalized: &str) -> BTreeSet<&str> {
    normalized.split_whitespace().collect()
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`, or 0.0 when both sets are empty.
pub fn jaccard(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_text("  The Cell's   WALL!\n"), "the cells wall");
        assert_eq!(normalize_text("x = 2"), "x 2");
        assert_eq!(normalize_text("?!."), "");
        assert_eq!(normalize_text("snake_case Über"), "snake_case über");
    }

    #[test]
    fn collapse_handles_newlines_and_tabs() {
        assert_eq!(collapse_whitespace("\t a \n\n b  c "), "a b c");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn jaccard_counts_sets_not_multisets() {
        let a = token_set("the the cat");
        let b = token_set("cat");
        assert_eq!(a.len(), 2);
        assert!((jaccard(&a, &b) - 0.5).abs() < f64::EPSILON);
        assert_eq!(jaccard(&token_set(""), &token_set("")), 0.0);
    }
}
