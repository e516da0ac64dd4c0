use std::collections::BTreeSet;

use anyhow::Result;
use regex::Regex;

/// Token-set fuzzy string scoring.
///
/// Both inputs are lower-cased, every run of non-alphanumeric characters is
/// replaced by a single space, and the result is split into a sorted token set.
/// With `I` the intersection and `D1`/`D2` the two differences:
///
/// ```text
/// t0 = join(I)
/// t1 = t0 + " " + join(D1)
/// t2 = t0 + " " + join(D2)
/// score = max(ratio(t0, t1), ratio(t0, t2), ratio(t1, t2))
/// ```
///
/// so word order and repeated words never affect the score, and a query whose
/// words all appear in the candidate scores 100.
pub struct Matcher {
    separators: Regex,
}

impl Matcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            separators: Regex::new(r"[^\p{L}\p{N}]+")?,
        })
    }

    /// Score `a` against `b` on a 0-100 scale. Empty inputs score 0.
    pub fn token_set_ratio(&self, a: &str, b: &str) -> u8 {
        let tokens_a = self.tokens(a);
        let tokens_b = self.tokens(b);
        if tokens_a.is_empty() || tokens_b.is_empty() {
            return 0;
        }

        let common = join(tokens_a.intersection(&tokens_b));
        let only_a = join(tokens_a.difference(&tokens_b));
        let only_b = join(tokens_b.difference(&tokens_a));

        let t1 = concat(&common, &only_a);
        let t2 = concat(&common, &only_b);

        ratio(&common, &t1)
            .max(ratio(&common, &t2))
            .max(ratio(&t1, &t2))
    }

    fn tokens(&self, s: &str) -> BTreeSet<String> {
        let lowered = s.to_lowercase();
        self.separators
            .replace_all(&lowered, " ")
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }
}

fn join<'a>(tokens: impl Iterator<Item = &'a String>) -> String {
    tokens.map(String::as_str).collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    format!("{} {}", head, tail).trim().to_string()
}

/// Indel similarity: `2 * lcs / (len_a + len_b)`, scaled to 0-100.
///
/// Only insertions and deletions count, so a substitution costs 2.
fn ratio(a: &str, b: &str) -> u8 {
    // An empty intersection must not count as a perfect match against itself.
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = (a.len() + b.len()) as f64;
    (2.0 * lcs_len(&a, &b) as f64 / total * 100.0).round() as u8
}

/// Length of the longest common subsequence.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for ca in a {
        let mut diag = 0;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diag + 1
            } else {
                above.max(row[j])
            };
            diag = above;
        }
    }
    row[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m() -> Matcher {
        Matcher::new().unwrap()
    }

    #[test]
    fn test_identical_strings() {
        assert_eq!(m().token_set_ratio("gummi bears", "gummi bears"), 100);
    }

    #[test]
    fn test_order_and_duplicates_ignored() {
        assert_eq!(
            m().token_set_ratio("bears gummi gummi", "Gummi Bears"),
            100
        );
    }

    #[test]
    fn test_subset_scores_full() {
        assert_eq!(
            m().token_set_ratio(
                "albanese gummi bears",
                "ALBANESE CONFECTIONERY GROUP INC GUMMI BEARS"
            ),
            100
        );
    }

    #[test]
    fn test_punctuation_is_a_separator() {
        assert_eq!(m().token_set_ratio("trail-mix", "TRAIL MIX"), 100);
    }

    #[test]
    fn test_partial_overlap_between_bounds() {
        let score = m().token_set_ratio("omega powerhouse trail mix", "trail mix, tropical");
        assert!(score > 0 && score < 100, "score was {}", score);
    }

    #[test]
    fn test_closer_candidate_scores_higher() {
        let matcher = m();
        let close = matcher.token_set_ratio("peanut butter cups", "peanut butter cookies");
        let far = matcher.token_set_ratio("peanut butter cups", "sparkling water");
        assert!(close > far, "{} <= {}", close, far);
    }

    #[test]
    fn test_ratio_counts_substitution_as_two_edits() {
        assert_eq!(ratio("ab", "abcd"), 67);
        assert_eq!(ratio("abcd", "abxd"), 75);
        assert_eq!(m().token_set_ratio("ab", "abcd"), 67);
    }

    #[test]
    fn test_lcs_len() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(lcs_len(&chars("gummi bears"), &chars("gummy bear")), 9);
        assert_eq!(lcs_len(&chars("abc"), &chars("xyz")), 0);
        assert_eq!(lcs_len(&chars(""), &chars("abc")), 0);
    }

    #[test]
    fn test_empty_input_scores_zero() {
        assert_eq!(m().token_set_ratio("", "anything"), 0);
        assert_eq!(m().token_set_ratio("anything", "  ,, "), 0);
    }
}
