//! Patterns and pattern sets.
//!
//! A [`Pattern`] is a non-empty sequence of symbols. Patterns are collected
//! into a [`PatternSet`], which assigns each of them a stable [`PatternID`]
//! given by its position in the input list.

use std::fmt::{self, Debug};
use std::hash::Hash;

use derive_more::{From, Into};
use thiserror::Error;

/// A symbol of the alphabet that patterns and texts are written in.
///
/// Implemented for every type that is cheap to copy, totally ordered and
/// hashable, most notably `u8` and `char`.
pub trait Symbol: Copy + Ord + Hash + Debug {}

impl<S: Copy + Ord + Hash + Debug> Symbol for S {}

/// Identify patterns with IDs.
///
/// The ID of a pattern is its 0-based index in the list the pattern set was
/// built from.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default, From, Into, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternID(pub usize);

impl Debug for PatternID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for PatternID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID({})", self.0)
    }
}

/// A pattern to search for.
///
/// Immutable once created. Never empty.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern<S = u8> {
    symbols: Vec<S>,
}

/// Error that can occur when creating a pattern.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidPattern {
    /// Empty patterns are not allowed.
    #[error("pattern {id} is empty")]
    EmptyPattern {
        /// The ID the empty pattern would have been given.
        id: PatternID,
    },
}

/// Error that can occur when creating a pattern set.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidPatternSet {
    /// At least one pattern is required.
    #[error("cannot build a pattern set without patterns")]
    EmptySet,
    /// One of the patterns is invalid.
    #[error(transparent)]
    InvalidPattern(#[from] InvalidPattern),
}

impl<S: Symbol> Pattern<S> {
    /// Create a pattern from a sequence of symbols.
    ///
    /// `id` is only used for error reporting.
    pub fn try_new(id: PatternID, symbols: impl Into<Vec<S>>) -> Result<Self, InvalidPattern> {
        let symbols = symbols.into();
        if symbols.is_empty() {
            return Err(InvalidPattern::EmptyPattern { id });
        }
        Ok(Self { symbols })
    }

    /// The symbols of the pattern.
    pub fn symbols(&self) -> &[S] {
        &self.symbols
    }

    /// The number of symbols in the pattern.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// The seed string of the pattern for a window of length `window_len`.
    ///
    /// This is the suffix of length `window_len`, read backwards.
    ///
    /// # Panics
    ///
    /// If `window_len` exceeds the pattern length.
    pub fn seed(&self, window_len: usize) -> impl Iterator<Item = S> + '_ {
        self.symbols[self.len() - window_len..].iter().rev().copied()
    }
}

impl<S: Debug> Debug for Pattern<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.symbols)
    }
}

/// An ordered, non-empty collection of patterns.
///
/// The minimum pattern length, i.e. the window length of the search, is
/// computed once at construction.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternSet<S = u8> {
    patterns: Vec<Pattern<S>>,
    window_len: usize,
    max_len: usize,
}

impl<S: Symbol> PatternSet<S> {
    /// Create a pattern set from a list of symbol sequences.
    ///
    /// The `i`-th sequence is given the ID `PatternID(i)`. Fails if the list
    /// is empty or if any of the sequences is empty.
    pub fn try_from_patterns<P: AsRef<[S]>>(
        patterns: impl IntoIterator<Item = P>,
    ) -> Result<Self, InvalidPatternSet> {
        let patterns: Vec<_> = patterns
            .into_iter()
            .enumerate()
            .map(|(i, p)| Pattern::try_new(PatternID(i), p.as_ref()))
            .collect::<Result<_, _>>()?;
        let (Some(window_len), Some(max_len)) = (
            patterns.iter().map(Pattern::len).min(),
            patterns.iter().map(Pattern::len).max(),
        ) else {
            return Err(InvalidPatternSet::EmptySet);
        };
        Ok(Self {
            patterns,
            window_len,
            max_len,
        })
    }

    /// The length of the shortest pattern.
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// The length of the longest pattern.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Get a pattern by its ID.
    pub fn get(&self, id: PatternID) -> Option<&Pattern<S>> {
        self.patterns.get(id.0)
    }

    /// The number of patterns in the set.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Iterate over the patterns along with their IDs, in input order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (PatternID, &Pattern<S>)> + '_ {
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (PatternID(i), p))
    }
}
