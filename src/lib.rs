#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod automaton;
pub mod index;
pub mod matcher;
pub mod pattern;

pub use automaton::{FactorOracle, InvalidSeed, OracleBuilder, StateID};
pub use index::PatternIndex;
pub use matcher::{Matcher, NaiveManyMatcher, PatternMatch, SbomMatcher, SbomMatches, ScanStats};
pub use pattern::{InvalidPattern, InvalidPatternSet, Pattern, PatternID, PatternSet, Symbol};

pub(crate) type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
