//! Levenshtein automata for approximate string matching.
//!
//! Builds, per query word, a deterministic automaton accepting exactly
//! the strings within edit distance `n ∈ {0, 1, 2}` of the word —
//! optionally counting adjacent-character transpositions as single
//! edits — following:
//!
//! > Schulz, Klaus U., and Stoyan Mihov. "Fast string correction with
//! > Levenshtein automata." International Journal on Document Analysis
//! > and Recognition 5.1 (2002): 67-85.
//!
//! The per-word construction only consults the parametric description
//! tables ([`parametric`]): each table state is copied once per word
//! offset, transitions are labeled with the word's own characters, and
//! every character absent from the word shares the all-zero
//! characteristic vector, so the complement of the word's alphabet is
//! covered by a handful of interval transitions.

pub(crate) mod generator;
pub(crate) mod parametric;

use crate::automaton::{factory, Automaton, ALPHA_MAX};
use crate::error::{AutomatonError, Result};
use parametric::ParametricDescription;

/// Highest edit distance the parametric tables cover.
pub const MAXIMUM_SUPPORTED_DISTANCE: u32 = 2;

/// Per-word builder of Levenshtein automata.
///
/// # Example
///
/// ```rust
/// use libautomata::levenshtein::LevenshteinAutomata;
/// use libautomata::automaton::operations::run;
///
/// let automata = LevenshteinAutomata::new("food", false).unwrap();
/// let dfa = automata.to_automaton(1).unwrap();
/// assert!(run(&dfa, "good"));
/// assert!(!run(&dfa, "goods"));
/// ```
#[derive(Debug, Clone)]
pub struct LevenshteinAutomata {
    word: Vec<i32>,
    alpha_max: i32,
    /// Sorted distinct symbols of the word.
    alphabet: Vec<i32>,
    /// Complementary intervals covering `[0, alpha_max] ∖ alphabet`.
    range_lower: Vec<i32>,
    range_upper: Vec<i32>,
    with_transpositions: bool,
}

impl LevenshteinAutomata {
    /// Builder for `input`, treated as a sequence of 16-bit code
    /// units, over the default alphabet ceiling.
    pub fn new(input: &str, with_transpositions: bool) -> Result<Self> {
        let word: Vec<i32> = input.encode_utf16().map(i32::from).collect();
        Self::from_symbols(word, ALPHA_MAX, with_transpositions)
    }

    /// Builder for an explicit symbol sequence over `[0, alpha_max]`.
    pub fn from_symbols(word: Vec<i32>, alpha_max: i32, with_transpositions: bool) -> Result<Self> {
        for &symbol in &word {
            if symbol < 0 || symbol > alpha_max {
                return Err(AutomatonError::SymbolOutOfRange { symbol, alpha_max });
            }
        }
        let mut alphabet = word.clone();
        alphabet.sort_unstable();
        alphabet.dedup();

        // Complementary ranges between consecutive alphabet symbols.
        let mut range_lower = Vec::with_capacity(alphabet.len() + 1);
        let mut range_upper = Vec::with_capacity(alphabet.len() + 1);
        let mut lower = 0;
        for &higher in &alphabet {
            if higher > lower {
                range_lower.push(lower);
                range_upper.push(higher - 1);
            }
            lower = higher + 1;
        }
        if lower <= alpha_max {
            range_lower.push(lower);
            range_upper.push(alpha_max);
        }

        Ok(Self {
            word,
            alpha_max,
            alphabet,
            range_lower,
            range_upper,
            with_transpositions,
        })
    }

    /// Automaton accepting strings within distance `n` of the word.
    pub fn to_automaton(&self, n: u32) -> Result<Automaton> {
        self.build(n, &[])
    }

    /// Automaton accepting `prefix` followed by a string within
    /// distance `n` of the word; the prefix itself matches exactly.
    pub fn to_automaton_with_prefix(&self, n: u32, prefix: &str) -> Result<Automaton> {
        let prefix: Vec<i32> = prefix.encode_utf16().map(i32::from).collect();
        self.build(n, &prefix)
    }

    /// Characteristic vector of `symbol` against `word[pos..end)`,
    /// packed first-position-highest.
    fn get_vector(&self, symbol: i32, pos: usize, end: usize) -> u32 {
        let mut vector = 0;
        for &ch in &self.word[pos..end] {
            vector <<= 1;
            if ch == symbol {
                vector |= 1;
            }
        }
        vector
    }

    fn build(&self, n: u32, prefix: &[i32]) -> Result<Automaton> {
        if n == 0 {
            // Degenerate case: prefix plus the word, matched exactly.
            let mut symbols = prefix.to_vec();
            symbols.extend_from_slice(&self.word);
            return factory::make_string_symbols(&symbols);
        }
        let template = parametric::template_for(n, self.with_transpositions)?;
        let w = self.word.len() as i32;
        let description = ParametricDescription::new(template, w);
        let range = (2 * n + 1) as usize;
        let num_states = description.size();

        let mut a = Automaton::with_capacity(
            (num_states as usize) + prefix.len() + 1,
            (num_states as usize) * (self.alphabet.len() + self.range_lower.len()),
        );

        // Literal prefix chain; its last state doubles as parametric
        // state 0.
        let mut last_state = a.create_state();
        for &symbol in prefix {
            if symbol < 0 || symbol > self.alpha_max {
                return Err(AutomatonError::SymbolOutOfRange {
                    symbol,
                    alpha_max: self.alpha_max,
                });
            }
            let state = a.create_state();
            a.add_transition(last_state, state, symbol, symbol)?;
            last_state = state;
        }

        let state_offset = last_state;
        a.set_accept(last_state, description.is_accept(0));
        for i in 1..num_states {
            let state = a.create_state();
            a.set_accept(state, description.is_accept(i));
        }

        for k in 0..num_states {
            let xpos = description.get_position(k);
            if xpos < 0 {
                continue;
            }
            let end = (self.word.len()).min(xpos as usize + range);
            for x in 0..self.alphabet.len() {
                let ch = self.alphabet[x];
                let cvec = self.get_vector(ch, xpos as usize, end);
                let dest = description.transition(k, xpos, cvec);
                if dest >= 0 {
                    a.add_transition(state_offset + k, state_offset + dest, ch, ch)?;
                }
            }
            // Every character outside the word's alphabet has the
            // all-zero characteristic vector.
            let dest = description.transition(k, xpos, 0);
            if dest >= 0 {
                for r in 0..self.range_lower.len() {
                    a.add_transition(
                        state_offset + k,
                        state_offset + dest,
                        self.range_lower[r],
                        self.range_upper[r],
                    )?;
                }
            }
        }

        a.finish_state();
        debug_assert!(a.is_deterministic());
        Ok(a)
    }
}
