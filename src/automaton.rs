//! The factor oracle automaton.
//!
//! Use [OracleBuilder] to construct an automaton from seed strings.
//!
//! A factor oracle over a set of strings accepts every factor (substring) of
//! those strings, but may accept a few more. This over-approximation keeps the
//! automaton linear in the total length of the strings, which makes it a
//! cheap and safe filter: if the oracle rejects a word, then the word is
//! certainly not a factor of any of the strings.

mod builder;

use std::fmt::Debug;

use derive_more::{From, Into};
use itertools::Itertools;
use petgraph::dot::Dot;
use petgraph::graph::DiGraph;
use smallvec::SmallVec;

use crate::Symbol;
pub use builder::{InvalidSeed, OracleBuilder};

/// A state ID in a factor oracle.
///
/// States are numbered in order of creation, the root being state 0.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, From, Into, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateID(pub usize);

impl StateID {
    /// The initial state of every factor oracle.
    pub const ROOT: StateID = StateID(0);
}

/// An outgoing transition of a state.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    /// The state the transition leads to.
    pub target: StateID,
    /// Whether the transition is an edge of the trie of seed strings, as
    /// opposed to a transition added to obtain the oracle property.
    pub exact: bool,
}

/// A factor oracle over a set of seed strings of equal length.
///
/// The automaton is immutable once built and can be shared between any number
/// of concurrent readers.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorOracle<S = u8> {
    states: Vec<State<S>>,
    /// The length of every seed string
    window_len: usize,
}

/// A node in the automaton
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct State<S> {
    /// Outgoing transitions, sorted by symbol. At most one per symbol.
    transitions: SmallVec<[(S, Transition); 2]>,
    /// The supply state used during construction. Only the root has none.
    supply: Option<StateID>,
}

impl<S: Ord> State<S> {
    fn new() -> Self {
        Self {
            transitions: SmallVec::new(),
            supply: None,
        }
    }

    #[inline]
    fn transition(&self, symbol: &S) -> Option<Transition> {
        let pos = self
            .transitions
            .binary_search_by(|(s, _)| s.cmp(symbol))
            .ok()?;
        Some(self.transitions[pos].1)
    }

    /// Insert a transition, keeping transitions sorted by symbol.
    fn set_transition(&mut self, symbol: S, transition: Transition) {
        match self.transitions.binary_search_by(|(s, _)| s.cmp(&symbol)) {
            Ok(pos) => self.transitions[pos].1 = transition,
            Err(pos) => self.transitions.insert(pos, (symbol, transition)),
        }
    }
}

/// The result of running a word through the automaton.
///
/// See [`FactorOracle::walk`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Walk {
    /// The last state reached.
    pub state: StateID,
    /// The number of symbols consumed before the first missing transition.
    pub consumed: usize,
    /// Whether all transitions taken were exact trie edges.
    pub all_exact: bool,
}

impl<S: Symbol> FactorOracle<S> {
    /// The root state.
    pub fn root(&self) -> StateID {
        StateID::ROOT
    }

    /// The length of the seed strings, i.e. of the search window.
    pub fn window_len(&self) -> usize {
        self.window_len
    }

    /// Get the number of states in the automaton.
    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    /// Get the number of transitions in the automaton.
    pub fn n_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    /// Iterate over all state IDs.
    pub fn states(&self) -> impl ExactSizeIterator<Item = StateID> {
        (0..self.states.len()).map(StateID)
    }

    /// The transition out of `state` on `symbol`, if any.
    ///
    /// None if `state` is not a state of the automaton.
    #[inline]
    pub fn next_state(&self, state: StateID, symbol: S) -> Option<Transition> {
        self.states.get(state.0)?.transition(&symbol)
    }

    /// The supply state of `state`, as computed during construction.
    ///
    /// None for the root and for IDs that are not states of the automaton.
    pub fn supply(&self, state: StateID) -> Option<StateID> {
        self.states.get(state.0)?.supply
    }

    /// All transitions of the automaton, as `(source, symbol, transition)`.
    pub fn transitions(&self) -> impl Iterator<Item = (StateID, S, Transition)> + '_ {
        self.states.iter().enumerate().flat_map(|(i, state)| {
            state
                .transitions
                .iter()
                .map(move |&(symbol, t)| (StateID(i), symbol, t))
        })
    }

    /// Run `symbols` through the automaton from the root.
    ///
    /// Stops at the first symbol that has no transition.
    #[inline]
    pub fn walk(&self, symbols: impl IntoIterator<Item = S>) -> Walk {
        let mut walk = Walk {
            state: self.root(),
            consumed: 0,
            all_exact: true,
        };
        for symbol in symbols {
            let Some(t) = self.next_state(walk.state, symbol) else {
                break;
            };
            walk.state = t.target;
            walk.consumed += 1;
            walk.all_exact &= t.exact;
        }
        walk
    }

    /// Whether the automaton accepts `word`, i.e. there is a path spelling
    /// `word` from the root.
    pub fn accepts(&self, word: &[S]) -> bool {
        self.walk(word.iter().copied()).consumed == word.len()
    }

    /// Get its dot string representation
    pub fn dot_string(&self) -> String {
        self.dot_string_with(|state| format!("{}", state.0))
    }

    /// Dot string representation with custom state labels.
    pub(crate) fn dot_string_with(&self, state_label: impl Fn(StateID) -> String) -> String {
        let mut graph = DiGraph::<String, String>::with_capacity(
            self.n_states(),
            self.n_transitions(),
        );
        let nodes = self
            .states()
            .map(|state| graph.add_node(state_label(state)))
            .collect_vec();
        for (src, symbol, t) in self.transitions() {
            let label = if t.exact {
                format!("{symbol:?}")
            } else {
                format!("{symbol:?} (oracle)")
            };
            graph.add_edge(nodes[src.0], nodes[t.target.0], label);
        }
        format!("{}", Dot::new(&graph))
    }
}

impl<S: Symbol> Debug for FactorOracle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dot_string())
    }
}
