//! # libautomata
//!
//! Finite automata kernel for approximate string matching.
//!
//! This library builds deterministic finite automata that accept
//! exactly the strings within a bounded edit distance of a query word,
//! and executes them against candidate strings in time linear in the
//! candidate length. It is the matching core of a fuzzy-search index:
//! one automaton is compiled per query, then millions of candidates
//! are tested against it. The Levenshtein construction follows:
//!
//! > Schulz, Klaus U., and Stoyan Mihov. "Fast string correction with
//! > Levenshtein automata." International Journal on Document Analysis
//! > and Recognition 5.1 (2002): 67-85.
//!
//! ## Pipeline
//!
//! ```text
//! word → LevenshteinAutomata → Automaton → determinize → minimize
//!      → CompiledAutomaton → matches(candidate)
//! ```
//!
//! Each stage is usable on its own: the [`automaton`] module carries a
//! general automaton store plus the usual algebra (union,
//! intersection, concatenation, reverse, complement, …), subset
//! determinization, and Hopcroft minimization.
//!
//! ## Example
//!
//! ```rust
//! use libautomata::prelude::*;
//!
//! let automata = LevenshteinAutomata::new("kitten", true).unwrap();
//! let dfa = minimize(&automata.to_automaton(2).unwrap()).unwrap();
//! let matcher = CompiledAutomaton::new(&dfa).unwrap();
//!
//! assert!(matcher.matches("kitten"));
//! assert!(matcher.matches("mitten"));
//! assert!(!matcher.matches("sitting"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod automaton;
pub mod distance;
pub mod error;
pub mod levenshtein;
pub(crate) mod util;

pub use util::{BitSet, SetBits};

/// Common imports for convenient usage.
pub mod prelude {
    pub use crate::automaton::compiled::CompiledAutomaton;
    pub use crate::automaton::determinize::determinize;
    pub use crate::automaton::minimize::minimize;
    pub use crate::automaton::operations::{run, run_symbols};
    pub use crate::automaton::{Automaton, Transition, ALPHA_MAX};
    pub use crate::error::AutomatonError;
    pub use crate::levenshtein::{LevenshteinAutomata, MAXIMUM_SUPPORTED_DISTANCE};
}
