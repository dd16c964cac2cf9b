//! Set Backward Oracle Matching.
//!
//! The text is scanned in windows of `m` symbols, `m` being the length of the
//! shortest pattern. Every window is read from right to left through a
//! [`FactorOracle`] of the reversed length-`m` suffixes of the patterns:
//!  - if the oracle gets stuck after `j` symbols, the last `j + 1` symbols of
//!    the window are not a factor of any pattern suffix, and no window
//!    overlapping them can match. The window is shifted by `m - j`.
//!  - if the whole window is read, the patterns whose seed ends at the reached
//!    state are verified against the text, and the window is shifted by one.
//!
//! Matches are discovered at their end position. They are buffered until no
//! later window can produce a match starting earlier, so that the output is
//! sorted by start position.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::{self, Debug};
use std::iter::FusedIterator;

use crate::automaton::FactorOracle;
use crate::index::PatternIndex;
use crate::pattern::{InvalidPatternSet, Pattern, PatternSet};
use crate::{PatternID, Symbol};

use super::{Matcher, PatternMatch};

/// A multi-pattern matcher using a factor oracle.
///
/// Immutable once built: it can be reused for any number of texts and shared
/// between threads.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SbomMatcher<S = u8> {
    oracle: FactorOracle<S>,
    index: PatternIndex<S>,
}

impl<S: Symbol> SbomMatcher<S> {
    /// Create a new matcher from patterns.
    ///
    /// The `i`-th pattern is given the ID `PatternID(i)`. Fails if there are
    /// no patterns or if any pattern is empty.
    pub fn try_from_patterns<P: AsRef<[S]>>(
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self, InvalidPatternSet> {
        Ok(Self::from_pattern_set(PatternSet::try_from_patterns(
            patterns,
        )?))
    }

    /// Create a new matcher from a validated pattern set.
    pub fn from_pattern_set(patterns: PatternSet<S>) -> Self {
        let n_patterns = patterns.len();
        let (oracle, index) = PatternIndex::build(patterns);
        tracing::debug!(
            n_patterns,
            window_len = oracle.window_len(),
            n_states = oracle.n_states(),
            n_transitions = oracle.n_transitions(),
            "built SBOM matcher"
        );
        Self { oracle, index }
    }

    /// Find matches of all patterns in `text`.
    ///
    /// Same as [`Matcher::find_matches`], with a nameable return type.
    pub fn find_iter<'a>(&'a self, text: &'a [S]) -> SbomMatches<'a, S> {
        SbomMatches::new(self, text)
    }

    /// Get a pattern by its ID.
    pub fn get_pattern(&self, id: PatternID) -> Option<&Pattern<S>> {
        self.index.pattern(id)
    }

    /// The factor oracle of the pattern seeds.
    pub fn oracle(&self) -> &FactorOracle<S> {
        &self.oracle
    }

    /// The index of candidate patterns.
    pub fn index(&self) -> &PatternIndex<S> {
        &self.index
    }

    /// The length of the scan window, i.e. of the shortest pattern.
    pub fn window_len(&self) -> usize {
        self.oracle.window_len()
    }

    /// Get the number of states in the automaton.
    pub fn n_states(&self) -> usize {
        self.oracle.n_states()
    }

    /// A dotstring representation of the automaton.
    ///
    /// Terminal states are labelled with the IDs of their candidate patterns.
    pub fn dot_string(&self) -> String {
        self.oracle.dot_string_with(|state| {
            let candidates = self.index.candidates(state);
            if candidates.is_empty() {
                format!("{}", state.0)
            } else {
                format!("{} {:?}", state.0, candidates)
            }
        })
    }
}

impl<S: Symbol> Matcher<S> for SbomMatcher<S> {
    fn find_matches<'a>(&'a self, text: &'a [S]) -> impl Iterator<Item = PatternMatch> + 'a {
        self.find_iter(text)
    }

    fn n_patterns(&self) -> usize {
        self.index.n_patterns()
    }
}

impl<S: Symbol> Debug for SbomMatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SbomMatcher {{ {} patterns }}", self.index.n_patterns())
    }
}

/// Counters of the work done by a scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Windows read through the oracle.
    pub windows: usize,
    /// Windows read entirely without the oracle getting stuck.
    pub full_passes: usize,
    /// Candidate patterns compared against the text.
    pub verifications: usize,
    /// Total distance the window was moved by.
    pub shifted: usize,
}

/// An iterator over the matches of an [`SbomMatcher`] in a text.
///
/// Created by [`SbomMatcher::find_iter`]. Scans the text lazily, one window at
/// a time. Cloning the iterator forks the scan.
#[derive(Clone)]
pub struct SbomMatches<'a, S> {
    oracle: &'a FactorOracle<S>,
    index: &'a PatternIndex<S>,
    text: &'a [S],
    /// Start position of the next window to scan
    window_start: usize,
    /// Verified matches that may still be preceded by undiscovered ones
    pending: BinaryHeap<Reverse<PatternMatch>>,
    stats: ScanStats,
}

impl<'a, S: Symbol> SbomMatches<'a, S> {
    fn new(matcher: &'a SbomMatcher<S>, text: &'a [S]) -> Self {
        Self {
            oracle: &matcher.oracle,
            index: &matcher.index,
            text,
            window_start: 0,
            pending: BinaryHeap::new(),
            stats: ScanStats::default(),
        }
    }

    /// The work done so far.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Whether all windows have been scanned.
    fn exhausted(&self) -> bool {
        self.window_start + self.oracle.window_len() > self.text.len()
    }

    /// Whether no match starting before `found` can be found anymore.
    fn is_settled(&self, found: &PatternMatch) -> bool {
        // Any later match ends at `window_start + window_len` or after.
        self.exhausted()
            || found.position + self.index.max_len() < self.window_start + self.oracle.window_len()
    }

    /// Scan the current window and move on to the next.
    fn scan_window(&mut self) {
        let window_len = self.oracle.window_len();
        let end = self.window_start + window_len;
        let window = &self.text[self.window_start..end];
        let walk = self.oracle.walk(window.iter().rev().copied());
        self.stats.windows += 1;

        let shift = if walk.consumed < window_len {
            window_len - walk.consumed
        } else {
            self.stats.full_passes += 1;
            for &id in self.index.candidates(walk.state) {
                self.stats.verifications += 1;
                if let Some(position) = self.index.verify(id, self.text, end, walk.all_exact) {
                    self.pending.push(Reverse(PatternMatch::new(id, position)));
                }
            }
            1
        };
        self.window_start += shift;
        self.stats.shifted += shift;

        if self.exhausted() {
            tracing::trace!(stats = ?self.stats, "text exhausted");
        }
    }
}

impl<S: Symbol> Iterator for SbomMatches<'_, S> {
    type Item = PatternMatch;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(&Reverse(first)) = self.pending.peek() {
                if self.is_settled(&first) {
                    self.pending.pop();
                    return Some(first);
                }
            }
            if self.exhausted() {
                return None;
            }
            self.scan_window();
        }
    }
}

impl<S: Symbol> FusedIterator for SbomMatches<'_, S> {}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use itertools::Itertools;
    use rstest::rstest;

    use super::*;
    use crate::matcher::tests::{all_matchers, matches};
    use crate::NaiveManyMatcher;

    fn sbom(patterns: &[&str]) -> SbomMatcher {
        SbomMatcher::try_from_patterns(patterns.iter().map(|p| p.as_bytes())).unwrap()
    }

    #[test]
    fn test_he_she_his_hers() {
        let matcher = sbom(&["he", "she", "his", "hers"]);
        let found = matcher.find_all("ahishers".as_bytes());
        assert_eq!(found, matches(&[(2, 1), (1, 3), (0, 4), (3, 4)]));
        assert_snapshot!(found.iter().join(" "), @"ID(2)@1 ID(1)@3 ID(0)@4 ID(3)@4");
    }

    #[test]
    fn test_overlapping_repeats() {
        let matcher = sbom(&["aaa", "aa"]);
        assert_eq!(matcher.window_len(), 2);
        let found = matcher.find_all("aaaa".as_bytes());
        assert_eq!(found, matches(&[(0, 0), (1, 0), (0, 1), (1, 1), (1, 2)]));
    }

    #[test]
    fn test_whole_text() {
        let matcher = sbom(&["factor oracle"]);
        let found = matcher.find_all("factor oracle".as_bytes());
        assert_eq!(found, matches(&[(0, 0)]));
    }

    #[test]
    fn test_no_match_terminates() {
        let matcher = sbom(&["xyz", "uvw"]);
        let mut iter = matcher.find_iter("abcdefghijklmnopqrst".as_bytes());
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
        // Every window fails on its first symbol
        let stats = iter.stats();
        assert_eq!(stats.full_passes, 0);
        assert_eq!(stats.windows, 6);
        // Each failed window is skipped over entirely
        assert_eq!(stats.shifted, 18);
    }

    #[rstest]
    #[case("")]
    #[case("a")]
    #[case("ab")]
    fn test_text_shorter_than_window(#[case] text: &str) {
        let matcher = sbom(&["abc", "abcd"]);
        assert!(matcher.find_all(text.as_bytes()).is_empty());
    }

    #[test]
    fn test_long_pattern_at_text_start() {
        // The long pattern's window is the first full pass, but its start
        // would be before the text
        let matcher = sbom(&["xxab", "ab"]);
        let found = matcher.find_all("abxxab".as_bytes());
        assert_eq!(found, matches(&[(1, 0), (0, 2), (1, 4)]));
    }

    #[test]
    fn test_order_with_long_patterns() {
        // "abcdef" is discovered after "cd" but starts earlier
        let matcher = sbom(&["cd", "abcdef", "ef"]);
        let mut iter = matcher.find_iter("abcdef".as_bytes());
        assert_eq!(iter.next(), Some(PatternMatch::new(PatternID(1), 0)));
        assert_eq!(iter.next(), Some(PatternMatch::new(PatternID(0), 2)));
        assert_eq!(iter.next(), Some(PatternMatch::new(PatternID(2), 4)));
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_lazy_and_restartable() {
        let matcher = sbom(&["ab"]);
        let text = "ab".repeat(100);
        let mut iter = matcher.find_iter(text.as_bytes());
        assert_eq!(iter.next(), Some(PatternMatch::new(PatternID(0), 0)));
        // Only a few windows were scanned to produce the first match
        assert!(iter.stats().windows <= 2);

        let forked = iter.clone();
        assert_eq!(iter.count(), 99);
        assert_eq!(forked.count(), 99);

        // A new scan starts from scratch
        assert_eq!(matcher.find_iter(text.as_bytes()).count(), 100);
    }

    #[test]
    fn test_full_pass_shift_is_one() {
        let matcher = sbom(&["aa"]);
        let mut iter = matcher.find_iter("aaaa".as_bytes());
        assert_eq!(iter.by_ref().count(), 3);
        assert_eq!(
            iter.stats(),
            ScanStats {
                windows: 3,
                full_passes: 3,
                verifications: 3,
                shifted: 3,
            }
        );
    }

    #[test]
    fn test_oracle_false_positive_is_verified() {
        // Windows read through oracle transitions are never reported unverified
        let matcher = sbom(&["abc", "xbc", "zzz"]);
        let text = "xbcabcabzzzbcxbc";
        let naive = NaiveManyMatcher::try_from_patterns(["abc", "xbc", "zzz"].map(str::as_bytes))
            .unwrap();
        assert_eq!(
            matcher.find_all(text.as_bytes()),
            naive.find_all(text.as_bytes())
        );
    }

    #[test]
    fn test_char_symbols() {
        let patterns = ["ßen", "straße"].map(|p| p.chars().collect_vec());
        let matcher = SbomMatcher::try_from_patterns(&patterns).unwrap();
        let text = "die straßen".chars().collect_vec();
        assert_eq!(matcher.find_all(text.as_slice()), matches(&[(1, 4), (0, 8)]));
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let err = SbomMatcher::try_from_patterns(["ab", ""].map(str::as_bytes)).unwrap_err();
        assert!(matches!(err, InvalidPatternSet::InvalidPattern(_)));
        let err = SbomMatcher::<u8>::try_from_patterns(Vec::<&[u8]>::new()).unwrap_err();
        assert_eq!(err, InvalidPatternSet::EmptySet);
    }

    #[test]
    fn test_dot_string_labels_terminals() {
        let matcher = sbom(&["ab", "cb"]);
        let dot = matcher.dot_string();
        // Seeds "ba" and "bc" end at states 2 and 3
        assert!(dot.contains("label = \"2 [0]\""));
        assert!(dot.contains("label = \"3 [1]\""));
    }

    #[test]
    fn test_shared_between_threads() {
        let matcher = &sbom(&["he", "she", "his", "hers"]);
        let texts = ["ahishers", "ushers", "this and his", "nothing"];
        let expected = texts
            .iter()
            .map(|t| matcher.find_all(t.as_bytes()))
            .collect_vec();
        std::thread::scope(|s| {
            let handles = texts
                .iter()
                .map(|t| s.spawn(move || matcher.find_all(t.as_bytes())))
                .collect_vec();
            for (handle, expected) in handles.into_iter().zip(expected) {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[rstest]
    #[case("eaaa", vec!["a", "aa", "baca", "bcee"])]
    #[case("aaac", vec!["dd", "bac"])]
    #[case("fef", vec!["ba", "fe", "ae"])]
    #[case("abe", vec!["a", "aae", "b", "aba", "cba"])]
    #[case("cbaaaaaab", vec!["c", "d", "cbaaaaaa", "baaaa"])]
    #[case("aaaaabdd", vec!["abaaa", "aaaba", "ab", "abaaa"])]
    fn test_agrees_with_naive(#[case] text: &str, #[case] patterns: Vec<&str>) {
        let (sbom, naive) = all_matchers(&patterns);
        assert_eq!(
            sbom.find_all(text.as_bytes()),
            naive.find_all(text.as_bytes())
        );
    }
}
