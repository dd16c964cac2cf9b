use std::collections::VecDeque;

use smallvec::SmallVec;
use thiserror::Error;

use crate::Symbol;

use super::{FactorOracle, State, StateID, Transition};

/// Create factor oracles from seed strings.
///
/// Seeds are first inserted into a trie rooted at [`StateID::ROOT`]
/// ([`OracleBuilder::add_seed`]). [`OracleBuilder::build`] then adds the
/// transitions required for the oracle property, propagating them along
/// supply links much like failure links in an Aho-Corasick automaton.
#[derive(Clone, Debug)]
pub struct OracleBuilder<S = u8> {
    states: Vec<State<S>>,
    /// Parent state and edge symbol of every trie state. None for the root.
    parents: Vec<Option<(StateID, S)>>,
    window_len: usize,
    n_seeds: usize,
}

/// Error that can occur when building a factor oracle.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidSeed {
    /// Seeds must have at least one symbol.
    #[error("window length must be positive")]
    ZeroWindow,
    /// All seeds must have the length of the window.
    #[error("seed of length {len} does not fit a window of length {window_len}")]
    LengthMismatch {
        /// The length of the rejected seed.
        len: usize,
        /// The expected length.
        window_len: usize,
    },
    /// At least one seed is required.
    #[error("cannot build a factor oracle without seeds")]
    NoSeeds,
}

impl<S: Symbol> OracleBuilder<S> {
    /// An empty builder for seed strings of length `window_len`.
    pub fn new(window_len: usize) -> Self {
        Self {
            states: vec![State::new()],
            parents: vec![None],
            window_len,
            n_seeds: 0,
        }
    }

    /// Insert a seed string into the trie.
    ///
    /// Return the state reached at the end of the seed. Seeds that share a
    /// prefix share the corresponding trie states; inserting the same seed
    /// twice returns the same state. Fails if the seed is not exactly
    /// `window_len` symbols long; the builder is left unchanged.
    pub fn add_seed(
        &mut self,
        seed: impl IntoIterator<Item = S>,
    ) -> Result<StateID, InvalidSeed> {
        if self.window_len == 0 {
            return Err(InvalidSeed::ZeroWindow);
        }
        let seed: SmallVec<[S; 16]> = seed.into_iter().collect();
        if seed.len() != self.window_len {
            return Err(InvalidSeed::LengthMismatch {
                len: seed.len(),
                window_len: self.window_len,
            });
        }
        Ok(self.insert_seed(seed))
    }

    /// Insert a seed already known to have length `window_len`.
    pub(crate) fn insert_seed(&mut self, seed: impl IntoIterator<Item = S>) -> StateID {
        self.n_seeds += 1;
        let mut state = StateID::ROOT;
        for symbol in seed {
            state = match self.next_state(state, symbol) {
                Some(Transition { target, .. }) => target,
                None => self.add_child(state, symbol),
            };
        }
        state
    }

    /// Add the oracle transitions and return the finished automaton.
    ///
    /// Fails if no seed was added.
    pub fn build(self) -> Result<FactorOracle<S>, InvalidSeed> {
        if self.window_len == 0 {
            return Err(InvalidSeed::ZeroWindow);
        }
        if self.n_seeds == 0 {
            return Err(InvalidSeed::NoSeeds);
        }
        Ok(self.finish())
    }

    /// Add the oracle transitions to a non-empty set of seeds.
    pub(crate) fn finish(mut self) -> FactorOracle<S> {
        for state in self.trie_order() {
            let Some((parent, symbol)) = self.parents[state.0] else {
                continue;
            };
            let mut supply = self.states[parent.0].supply;
            while let Some(k) = supply {
                if self.next_state(k, symbol).is_some() {
                    break;
                }
                self.set_transition(
                    k,
                    symbol,
                    Transition {
                        target: state,
                        exact: false,
                    },
                );
                supply = self.states[k.0].supply;
            }
            self.states[state.0].supply = match supply {
                Some(k) => self.next_state(k, symbol).map(|t| t.target),
                None => Some(StateID::ROOT),
            };
        }

        FactorOracle {
            states: self.states,
            window_len: self.window_len,
        }
    }

    /// The non-root trie states in breadth-first order.
    ///
    /// Must be called before any oracle transition is added.
    fn trie_order(&self) -> Vec<StateID> {
        let mut order = Vec::with_capacity(self.states.len());
        let mut queue = VecDeque::from([StateID::ROOT]);
        while let Some(state) = queue.pop_front() {
            let children = self.states[state.0].transitions.iter().map(|(_, t)| t.target);
            order.extend(children.clone());
            queue.extend(children);
        }
        order
    }

    fn next_state(&self, state: StateID, symbol: S) -> Option<Transition> {
        self.states[state.0].transition(&symbol)
    }

    fn add_child(&mut self, parent: StateID, symbol: S) -> StateID {
        let child = StateID(self.states.len());
        self.states.push(State::new());
        self.parents.push(Some((parent, symbol)));
        self.set_transition(
            parent,
            symbol,
            Transition {
                target: child,
                exact: true,
            },
        );
        child
    }

    fn set_transition(&mut self, state: StateID, symbol: S, transition: Transition) {
        self.states[state.0].set_transition(symbol, transition);
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_trie_order() {
        let mut builder = OracleBuilder::new(3);
        let cba = builder.add_seed(*b"cba").unwrap();
        let aab = builder.add_seed(*b"aab").unwrap();
        let cab = builder.add_seed(*b"cab").unwrap();
        assert_eq!(builder.add_seed(*b"cab"), Ok(cab));
        assert_eq!((cba, aab, cab), (StateID(3), StateID(6), StateID(8)));

        // Ascending depth, children in symbol order
        let depths = builder
            .trie_order()
            .into_iter()
            .map(|s| {
                let mut depth = 0;
                let mut state = s;
                while let Some((parent, _)) = builder.parents[state.0] {
                    depth += 1;
                    state = parent;
                }
                depth
            })
            .collect_vec();
        assert_eq!(depths, [1, 1, 2, 2, 2, 3, 3, 3]);
    }

    #[test]
    fn test_supply_of_depth_one_is_root() {
        let mut builder = OracleBuilder::new(2);
        builder.add_seed(*b"ab").unwrap();
        builder.add_seed(*b"ba").unwrap();
        let oracle = builder.build().unwrap();
        for s in [StateID(1), StateID(3)] {
            assert_eq!(oracle.supply(s), Some(StateID::ROOT));
        }
        // The root already knows both symbols, no oracle transition is added
        assert!(oracle.transitions().all(|(_, _, t)| t.exact));
    }

    #[test]
    fn test_no_seeds_is_rejected() {
        assert_eq!(
            OracleBuilder::<u8>::new(3).build().unwrap_err(),
            InvalidSeed::NoSeeds
        );
        assert_eq!(
            OracleBuilder::<u8>::new(0).build().unwrap_err(),
            InvalidSeed::ZeroWindow
        );
    }

    #[test]
    fn test_seed_length_must_match_window() {
        let mut builder = OracleBuilder::new(3);
        assert_eq!(
            builder.add_seed(*b"ab"),
            Err(InvalidSeed::LengthMismatch {
                len: 2,
                window_len: 3
            })
        );
        assert!(builder.add_seed(*b"abcd").is_err());
        // Rejected seeds leave no trace in the trie
        assert_eq!(builder.states.len(), 1);
        assert_eq!(builder.clone().build().unwrap_err(), InvalidSeed::NoSeeds);

        builder.add_seed(*b"abc").unwrap();
        let oracle = builder.build().unwrap();
        assert_eq!(oracle.window_len(), 3);
        assert_eq!(oracle.n_states(), 4);

        let mut builder = OracleBuilder::<u8>::new(0);
        assert_eq!(builder.add_seed([]), Err(InvalidSeed::ZeroWindow));
    }
}
