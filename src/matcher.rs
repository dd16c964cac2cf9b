//! The pattern matchers.
//!
//! The [`Matcher`] trait is the main interface for pattern matching. The
//! following implementations of this trait are provided:
//!  - [`SbomMatcher`], which scans the text backwards in windows using a factor
//!    oracle. The main matcher implementation of this crate.
//!  - [`NaiveManyMatcher`], matching every pattern at every position. Mostly
//!    useful as a benchmark and for testing.
//!
//! Both report matches by increasing position, and by pattern ID for matches
//! at the same position.

mod naive;
mod sbom;

use std::fmt;

pub use self::naive::NaiveManyMatcher;
pub use self::sbom::{SbomMatcher, SbomMatches, ScanStats};

use crate::{PatternID, Symbol};

/// Find occurrences of a set of patterns in texts over the alphabet `S`.
pub trait Matcher<S: Symbol = u8> {
    /// Find matches of all patterns in `text`.
    ///
    /// The iterator is lazy: dropping it stops the search.
    fn find_matches<'a>(&'a self, text: &'a [S]) -> impl Iterator<Item = PatternMatch> + 'a;

    /// Get the number of patterns in the matcher.
    fn n_patterns(&self) -> usize;

    /// Collect all matches in `text`.
    fn find_all(&self, text: &[S]) -> Vec<PatternMatch> {
        self.find_matches(text).collect()
    }

    /// Whether any pattern occurs in `text`.
    fn is_match(&self, text: &[S]) -> bool {
        self.find_matches(text).next().is_some()
    }

    /// Whether every pattern occurs at least once in `text`.
    ///
    /// Stops searching as soon as the last missing pattern is found.
    fn contains_all(&self, text: &[S]) -> bool {
        let mut missing = self.n_patterns();
        let mut found = vec![false; missing];
        for PatternMatch { pattern, .. } in self.find_matches(text) {
            if !std::mem::replace(&mut found[pattern.0], true) {
                missing -= 1;
                if missing == 0 {
                    break;
                }
            }
        }
        missing == 0
    }
}

/// A match instance returned by a [`Matcher`].
///
/// Matches are ordered by position first, then by pattern ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct PatternMatch {
    /// The 0-based offset in the text of the first symbol of the match.
    pub position: usize,
    /// The matching pattern ID.
    pub pattern: PatternID,
}

impl PatternMatch {
    /// Create a new pattern match result.
    pub fn new(pattern: PatternID, position: usize) -> Self {
        Self { position, pattern }
    }
}

impl From<(PatternID, usize)> for PatternMatch {
    fn from((pattern, position): (PatternID, usize)) -> Self {
        Self::new(pattern, position)
    }
}

impl fmt::Display for PatternMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.pattern, self.position)
    }
}
