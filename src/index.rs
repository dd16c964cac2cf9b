//! Map oracle states to the patterns that may end there.
//!
//! The [`PatternIndex`] is built alongside the [`FactorOracle`]: each pattern's
//! seed string is inserted into the oracle's trie and the pattern is recorded
//! as a candidate of the trie state reached. Candidates are then verified
//! against the text symbol by symbol.

use smallvec::SmallVec;

use crate::automaton::{FactorOracle, OracleBuilder, StateID};
use crate::pattern::{Pattern, PatternID, PatternSet};
use crate::{HashMap, Symbol};

/// The candidate patterns at every terminal state of a factor oracle.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternIndex<S = u8> {
    patterns: PatternSet<S>,
    /// Pattern IDs in input order, for every state reached by a full seed.
    terminals: HashMap<StateID, SmallVec<[PatternID; 1]>>,
}

impl<S: Symbol> PatternIndex<S> {
    /// Build the factor oracle of the seed strings of `patterns`, along with
    /// the index of its terminal states.
    pub fn build(patterns: PatternSet<S>) -> (FactorOracle<S>, Self) {
        let window_len = patterns.window_len();
        // Pattern sets are non-empty and every seed has length `window_len`
        let mut builder = OracleBuilder::new(window_len);
        let mut terminals: HashMap<StateID, SmallVec<[PatternID; 1]>> = HashMap::default();
        for (id, pattern) in patterns.iter() {
            let state = builder.insert_seed(pattern.seed(window_len));
            terminals.entry(state).or_default().push(id);
        }
        let oracle = builder.finish();
        (
            oracle,
            Self {
                patterns,
                terminals,
            },
        )
    }

    /// The patterns whose seed string ends at `state`, in input order.
    ///
    /// Empty if `state` is not terminal.
    pub fn candidates(&self, state: StateID) -> &[PatternID] {
        self.terminals
            .get(&state)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
    }

    /// Whether a seed string ends at `state`.
    pub fn is_terminal(&self, state: StateID) -> bool {
        self.terminals.contains_key(&state)
    }

    /// Get a pattern by its ID.
    pub fn pattern(&self, id: PatternID) -> Option<&Pattern<S>> {
        self.patterns.get(id)
    }

    /// The indexed patterns.
    pub fn patterns(&self) -> &PatternSet<S> {
        &self.patterns
    }

    /// The length of the shortest pattern.
    pub fn window_len(&self) -> usize {
        self.patterns.window_len()
    }

    /// The length of the longest pattern.
    pub fn max_len(&self) -> usize {
        self.patterns.max_len()
    }

    /// Get the number of patterns in the index.
    pub fn n_patterns(&self) -> usize {
        self.patterns.len()
    }

    /// Check whether pattern `id` occurs in `text`, ending right before `end`.
    ///
    /// If `window_matched` is true, the caller guarantees that the window
    /// `text[end - window_len..end]` spells the pattern's seed, so that only
    /// the symbols before the window are compared.
    ///
    /// Return the start position of the occurrence.
    pub fn verify(
        &self,
        id: PatternID,
        text: &[S],
        end: usize,
        window_matched: bool,
    ) -> Option<usize> {
        let pattern = self.pattern(id)?.symbols();
        let start = end.checked_sub(pattern.len())?;
        let compared = if window_matched {
            pattern.len() - self.window_len()
        } else {
            pattern.len()
        };
        let text = text.get(start..start + compared)?;
        (text == &pattern[..compared]).then_some(start)
    }
}
