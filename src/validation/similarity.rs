//! String similarity used for typo-tolerant keyword matching.

use rapidfuzz::distance::indel;

/// Normalized similarity between two strings, in `[0, 1]`
pub trait Similarity {
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Longest-common-subsequence ratio: `2 * LCS / (len(a) + len(b))`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndelRatio;

impl Similarity for IndelRatio {
    fn score(&self, a: &str, b: &str) -> f64 {
        if a.is_empty() && b.is_empty() {
            return 1.0;
        }
        indel::normalized_similarity(a.chars(), b.chars())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(IndelRatio.score("npm1", "npm1"), 1.0);
    }

    #[test]
    fn test_transposition() {
        // LCS of "nmp1" and "npm1" has length 3
        let score = IndelRatio.score("nmp1", "npm1");
        assert!((score - 0.75).abs() < 1e-9, "score was {}", score);
    }

    #[test]
    fn test_scrambled_keyword_still_close() {
        assert!(IndelRatio.score("f3tl-idt", "flt3-itd") >= 0.6);
    }

    #[test]
    fn test_unrelated_strings() {
        assert!(IndelRatio.score("panel", "npm1") < 0.5);
        assert_eq!(IndelRatio.score("abc", "xyz"), 0.0);
    }
}
