// "Did you mean ...?" corrections
//
// Plain Levenshtein distance over chars. Candidates come in priority order
// (commands, then flags, then values from history); ties on distance keep
// that order.

use serde::Serialize;
use std::collections::HashSet;

/// Never offer more than this many corrections
pub const MAX_CORRECTIONS: usize = 3;

/// A candidate replacement for a mistyped token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correction {
    pub candidate: String,
    pub distance: usize,
}

impl Correction {
    pub fn as_pair(&self) -> (&str, usize) {
        (&self.candidate, self.distance)
    }
}

/// Edit distance where insertion, deletion and substitution all cost 1
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Two rows of the DP table are enough
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            current[j + 1] = substitution.min(deletion).min(insertion);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Largest distance still considered a confident match is `threshold - 1`
pub fn correction_threshold(token: &str) -> usize {
    token.chars().count() / 2
}

/// Rank `candidates` by edit distance to `token`.
///
/// Only candidates with a distance strictly below half the token length
/// (rounded down) are kept, best first, at most [`MAX_CORRECTIONS`]. An empty
/// result means there is no confident correction.
pub fn suggest_correction<I, S>(token: &str, candidates: I) -> Vec<Correction>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let threshold = correction_threshold(token);
    if threshold == 0 {
        return Vec::new();
    }

    let needle = token.to_lowercase();
    let mut seen = HashSet::new();
    let mut matches: Vec<Correction> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let candidate = candidate.as_ref();
            if !seen.insert(candidate.to_string()) {
                return None;
            }
            let distance = edit_distance(&needle, &candidate.to_lowercase());
            (distance < threshold).then(|| Correction {
                candidate: candidate.to_string(),
                distance,
            })
        })
        .collect();

    // sort_by_key is stable, so equal distances stay in priority order
    matches.sort_by_key(|c| c.distance);
    matches.truncate(MAX_CORRECTIONS);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("serch", "search"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("same", "same"), 0);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
    }

    #[test]
    fn test_suggest_correction_example() {
        let result = suggest_correction("serch", ["search", "info", "schema"]);
        let pairs: Vec<_> = result.iter().map(Correction::as_pair).collect();
        assert_eq!(pairs, vec![("search", 1)]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // "modfy" has length 5, so only distances 0 and 1 qualify
        assert_eq!(suggest_correction("modfy", ["modify"]).len(), 1);
        // distance 2 from "delete" is not below 5 / 2
        assert!(suggest_correction("dlte", ["delete"]).is_empty());
    }

    #[test]
    fn test_short_tokens_get_nothing() {
        assert!(suggest_correction("a", ["add", "info"]).is_empty());
        assert!(suggest_correction("", ["add"]).is_empty());
    }

    #[test]
    fn test_never_at_or_above_ceil_half() {
        let candidates = ["search", "info", "compare", "schema", "add", "modify", "delete", "rename"];
        for token in ["s", "se", "sea", "sear", "serach", "xyzzy", "renmae", "comapre", "infoo"] {
            let ceil_half = (token.chars().count() + 1) / 2;
            for correction in suggest_correction(token, candidates) {
                assert!(correction.distance < ceil_half, "{} -> {:?}", token, correction);
            }
        }
    }

    #[test]
    fn test_ties_keep_priority_order() {
        // both are distance 1 from "--tre"
        let result = suggest_correction("--tre", ["--tree", "--tres"]);
        assert_eq!(result[0].candidate, "--tree");
        assert_eq!(result[1].candidate, "--tres");

        let result = suggest_correction("--tre", ["--tres", "--tree"]);
        assert_eq!(result[0].candidate, "--tres");
    }

    #[test]
    fn test_truncates_to_three() {
        let result = suggest_correction("abcdefgh", ["abcdefgx", "abcdefxh", "abcdexgh", "abcdxfgh"]);
        assert_eq!(result.len(), MAX_CORRECTIONS);
    }

    #[test]
    fn test_duplicates_counted_once() {
        let result = suggest_correction("serch", ["search", "search", "search"]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_case_insensitive() {
        let result = suggest_correction("SERCH", ["search"]);
        assert_eq!(result[0].distance, 1);
    }
}
