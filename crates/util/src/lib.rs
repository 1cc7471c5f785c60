//! Common utilities that aren't specific to one other subcrate and are
//! unlikely to change frequently.

#[cfg(any(test, feature = "test"))]
mod test_util;

#[cfg(any(test, feature = "test"))]
pub use test_util::*;

use std::fmt::{Debug, Display};
use tracing::error;

/// Extension trait for [Result], to trace errors as they pass through without
/// having to break up a chain of `?`.
pub trait ResultTraced<T, E>: Sized {
    /// If this is an error, trace it. Return the same result.
    #[must_use]
    fn traced(self) -> Self;
}

impl<T, E: Display> ResultTraced<T, E> for Result<T, E> {
    fn traced(self) -> Self {
        self.inspect_err(|err| error!(%err))
    }
}

/// Compute the Levenshtein edit distance between two strings. Used by the
/// parser to suggest a nearby catalog function name when an unknown one is
/// referenced.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (a_len, b_len) = (a.len(), b.len());

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut row: Vec<usize> = (0..=b_len).collect();
    for (i, &a_char) in a.iter().enumerate() {
        let mut prev_diag = row[0];
        row[0] = i + 1;
        for (j, &b_char) in b.iter().enumerate() {
            let cur = row[j + 1];
            row[j + 1] = if a_char == b_char {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j + 1])
            };
            prev_diag = cur;
        }
    }
    row[b_len]
}

/// Find the closest match to `target` among `candidates` within `max_distance`
/// edits, if any exists. Ties are broken by the order of `candidates`.
pub fn closest_match<'a>(
    target: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    max_distance: usize,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, levenshtein_distance(target, candidate)))
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::identical("count", "count", 0)]
    #[case::one_sub("count", "count", 1)]
    #[case::case_difference("COUNT", "count", 5)]
    #[case::empty("", "abc", 3)]
    fn test_levenshtein_distance(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: usize,
    ) {
        assert_eq!(levenshtein_distance(a, b), expected);
    }

    #[test]
    fn test_closest_match() {
        let candidates = ["COUNT", "AND", "OR", "NOT"];
        assert_eq!(
            closest_match("CONT", candidates, 3),
            Some("COUNT"),
        );
        assert_eq!(closest_match("XYZXYZ", candidates, 3), None);
    }
}
