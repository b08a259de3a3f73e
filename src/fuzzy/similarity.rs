// src/fuzzy/similarity.rs
//! String-similarity scorers used by candidate matching and the learning
//! store. All functions are pure, case-insensitive, and expect trimmed
//! input (they still lowercase defensively rather than assume it).

use crate::core::types::{ScoreAlgorithm, SimilarityScore};

/// Jaro-Winkler prefix boost weight.
const PREFIX_WEIGHT: f64 = 0.1;
/// Maximum shared-prefix length the boost considers.
const MAX_PREFIX_LENGTH: usize = 4;

/// Classic single-row dynamic-programming edit distance.
///
/// Properties relied on elsewhere: distance(a, a) == 0, symmetric,
/// triangle inequality. O(m*n) time, O(min(m,n)) space.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    if a_chars == b_chars {
        return 0;
    }
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Keep the shorter string on the row axis
    let (target, source) = if a_chars.len() < b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };

    let mut row: Vec<usize> = (0..=target.len()).collect();
    for (i, &sc) in source.iter().enumerate() {
        let mut prev = row[0];
        row[0] = i + 1;
        for j in 0..target.len() {
            let cost = if sc == target[j] { 0 } else { 1 };
            let cell = (row[j + 1] + 1).min(row[j] + 1).min(prev + cost);
            prev = row[j + 1];
            row[j + 1] = cell;
        }
    }
    row[target.len()]
}

/// Edit distance normalized into [0,1]; 1.0 for two empty strings.
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Jaro similarity: matching characters within a sliding window of
/// max(m,n)/2 - 1, penalized by transpositions. Returns [0,1].
pub fn jaro_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    let a_len = a_chars.len();
    let b_len = b_chars.len();
    if a_len == 0 && b_len == 0 {
        return 1.0;
    }
    if a_len == 0 || b_len == 0 {
        return 0.0;
    }
    if a_chars == b_chars {
        return 1.0;
    }

    let match_distance = (a_len.max(b_len) / 2).saturating_sub(1);
    let mut a_matched = vec![false; a_len];
    let mut b_matched = vec![false; b_len];

    let mut matches = 0usize;
    for i in 0..a_len {
        let start = i.saturating_sub(match_distance);
        let end = (i + match_distance + 1).min(b_len);
        for j in start..end {
            if b_matched[j] || a_chars[i] != b_chars[j] {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut k = 0usize;
    for i in 0..a_len {
        if !a_matched[i] {
            continue;
        }
        while k < b_len && !b_matched[k] {
            k += 1;
        }
        if k >= b_len {
            break;
        }
        if a_chars[i] != b_chars[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;
    (m / a_len as f64 + m / b_len as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler: Jaro with a boost for up to 4 shared leading characters.
pub fn jaro_winkler_similarity(a: &str, b: &str) -> f64 {
    let jaro = jaro_similarity(a, b);
    if jaro == 0.0 {
        return 0.0;
    }

    let prefix_len = a
        .to_lowercase()
        .chars()
        .zip(b.to_lowercase().chars())
        .take(MAX_PREFIX_LENGTH)
        .take_while(|(ac, bc)| ac == bc)
        .count();

    jaro + prefix_len as f64 * PREFIX_WEIGHT * (1.0 - jaro)
}

/// Length of the longest common subsequence, space-optimized to two rows.
pub fn lcs_length(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.to_lowercase().chars().collect();
    let b_chars: Vec<char> = b.to_lowercase().chars().collect();

    let (m, n) = (a_chars.len(), b_chars.len());
    if m == 0 || n == 0 {
        return 0;
    }

    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];
    for i in 1..=m {
        for j in 1..=n {
            curr[j] = if a_chars[i - 1] == b_chars[j - 1] {
                prev[j - 1] + 1
            } else {
                prev[j].max(curr[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}

/// LCS length normalized by the longer string; 1.0 for two empty strings.
pub fn lcs_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    lcs_length(a, b) as f64 / max_len as f64
}

/// Fast-accept predicate for "J. Smith" vs "John Smith": one leading token
/// is a bare initial, the other starts with the same letter, and the
/// remaining surname parts are equal ignoring case.
pub fn initials_compatible(a: &str, b: &str) -> bool {
    let a_tokens: Vec<&str> = a.split_whitespace().collect();
    let b_tokens: Vec<&str> = b.split_whitespace().collect();
    if a_tokens.len() < 2 || b_tokens.len() < 2 {
        return false;
    }

    let lead_a = a_tokens[0];
    let lead_b = b_tokens[0];
    if !is_initial_token(lead_a) && !is_initial_token(lead_b) {
        return false;
    }

    let first_a = lead_a.chars().next();
    let first_b = lead_b.chars().next();
    match (first_a, first_b) {
        (Some(ca), Some(cb)) => {
            if !ca.eq_ignore_ascii_case(&cb) {
                return false;
            }
        }
        _ => return false,
    }

    let rest_a = a_tokens[1..].join(" ");
    let rest_b = b_tokens[1..].join(" ");
    !rest_a.is_empty() && rest_a.eq_ignore_ascii_case(&rest_b)
}

/// One alphabetic character, optionally dot-terminated ("J" or "J.").
fn is_initial_token(token: &str) -> bool {
    let stripped = token.strip_suffix('.').unwrap_or(token);
    let mut chars = stripped.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Computes the requested algorithm and tags the result.
pub fn score(algorithm: ScoreAlgorithm, a: &str, b: &str) -> SimilarityScore {
    let value = match algorithm {
        ScoreAlgorithm::JaroWinkler => jaro_winkler_similarity(a, b),
        ScoreAlgorithm::LcsRatio => lcs_ratio(a, b),
        ScoreAlgorithm::LevenshteinRatio => levenshtein_ratio(a, b),
        ScoreAlgorithm::InitialMatch => {
            if initials_compatible(a, b) {
                1.0
            } else {
                0.0
            }
        }
    };
    SimilarityScore { value, algorithm }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.001
    }

    #[test]
    fn levenshtein_identity_and_symmetry() {
        for s in ["", "Smith", "de la Vega", "Jerry A. Fodor"] {
            assert_eq!(levenshtein_distance(s, s), 0);
        }
        assert_eq!(
            levenshtein_distance("Fodor", "Fodar"),
            levenshtein_distance("Fodar", "Fodor")
        );
        assert_eq!(
            levenshtein_distance("Johnson", "Johnsen"),
            levenshtein_distance("Johnsen", "Johnson")
        );
    }

    #[test]
    fn levenshtein_examples() {
        assert_eq!(levenshtein_distance("Smith", "Smyth"), 1);
        assert_eq!(levenshtein_distance("Smith", ""), 5);
        assert_eq!(levenshtein_distance("", "Smith"), 5);
        assert_eq!(levenshtein_distance("kitten", "sitting"), 3);
    }

    #[test]
    fn levenshtein_ratio_bounds() {
        assert!(approx_eq(levenshtein_ratio("", ""), 1.0));
        assert!(approx_eq(levenshtein_ratio("Smith", "Smith"), 1.0));
        assert!(approx_eq(levenshtein_ratio("Smith", "Smyth"), 0.8));
        assert!(approx_eq(levenshtein_ratio("Smith", ""), 0.0));
    }

    #[test]
    fn jaro_examples() {
        assert!(approx_eq(jaro_similarity("", ""), 1.0));
        assert!(approx_eq(jaro_similarity("abc", "abc"), 1.0));
        assert!(approx_eq(jaro_similarity("abc", "xyz"), 0.0));
        // Classic reference values
        assert!(approx_eq(jaro_similarity("martha", "marhta"), 0.944));
        assert!(approx_eq(jaro_similarity("dwayne", "duane"), 0.822));
    }

    #[test]
    fn jaro_winkler_boosts_shared_prefix() {
        let jaro = jaro_similarity("martha", "marhta");
        let jw = jaro_winkler_similarity("martha", "marhta");
        assert!(jw > jaro);
        assert!(jw <= 1.0);
    }

    #[test]
    fn jaro_winkler_case_insensitive() {
        assert!(approx_eq(
            jaro_winkler_similarity("SMITH", "smith"),
            1.0
        ));
    }

    #[test]
    fn lcs_examples() {
        assert_eq!(lcs_length("", ""), 0);
        assert_eq!(lcs_length("Smith", "Smyth"), 4);
        assert!(approx_eq(lcs_ratio("Smith", "Smyth"), 0.8));
        assert!(approx_eq(lcs_ratio("", ""), 1.0));
    }

    #[test]
    fn initials_compatible_accepts_dotted_initial() {
        assert!(initials_compatible("J. Smith", "John Smith"));
        assert!(initials_compatible("John Smith", "J. Smith"));
        assert!(initials_compatible("j smith", "John SMITH"));
    }

    #[test]
    fn initials_compatible_rejects_mismatches() {
        assert!(!initials_compatible("J. Smith", "Mary Smith"));
        assert!(!initials_compatible("John Smith", "John Smyth"));
        assert!(!initials_compatible("John Smith", "Jane Doe"));
        // Both fully expanded, no initial anywhere
        assert!(!initials_compatible("John Smith", "Johan Smith"));
        // Bare surnames have no leading given token
        assert!(!initials_compatible("Smith", "Smyth"));
    }

    #[test]
    fn tagged_score_carries_algorithm() {
        let s = score(ScoreAlgorithm::InitialMatch, "J. Smith", "John Smith");
        assert_eq!(s.algorithm, ScoreAlgorithm::InitialMatch);
        assert!(approx_eq(s.value, 1.0));

        let s = score(ScoreAlgorithm::JaroWinkler, "Smith", "Smith");
        assert!(approx_eq(s.value, 1.0));
    }
}
