//! A simple matcher that tries every pattern at every position.
//!
//! Quadratic, but obviously correct. Used as a baseline in benchmarking and
//! as the reference in tests.

use std::fmt::{self, Debug};

use crate::pattern::{InvalidPatternSet, PatternSet};
use crate::Symbol;

use super::{Matcher, PatternMatch};

/// A simple matcher for many patterns.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NaiveManyMatcher<S = u8> {
    patterns: PatternSet<S>,
}

impl<S: Symbol> NaiveManyMatcher<S> {
    /// Create a new matcher from patterns.
    ///
    /// Same validation as [`super::SbomMatcher::try_from_patterns`].
    pub fn try_from_patterns<P: AsRef<[S]>>(
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self, InvalidPatternSet> {
        Ok(Self::from_pattern_set(PatternSet::try_from_patterns(
            patterns,
        )?))
    }

    /// Create a new matcher from a validated pattern set.
    pub fn from_pattern_set(patterns: PatternSet<S>) -> Self {
        Self { patterns }
    }
}

impl<S: Symbol> Matcher<S> for NaiveManyMatcher<S> {
    fn find_matches<'a>(&'a self, text: &'a [S]) -> impl Iterator<Item = PatternMatch> + 'a {
        (0..text.len()).flat_map(move |position| {
            self.patterns
                .iter()
                .filter(move |(_, pattern)| text[position..].starts_with(pattern.symbols()))
                .map(move |(id, _)| PatternMatch::new(id, position))
        })
    }

    fn n_patterns(&self) -> usize {
        self.patterns.len()
    }
}

impl<S: Symbol> Debug for NaiveManyMatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NaiveManyMatcher {{ {} patterns }}", self.patterns.len())
    }
}
