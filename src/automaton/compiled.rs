//! Table-driven execution of a deterministic automaton.
//!
//! Construction collapses the alphabet into the automaton's start-point
//! classes and precomputes a dense state × class transition table, so
//! matching costs one table lookup per input symbol. Symbols up to 256
//! resolve their class through a direct-indexed map; larger symbols
//! binary-search the start points.

use super::Automaton;
use crate::error::{AutomatonError, Result};
use crate::util::BitSet;

/// Direct-indexed class map covers symbols `0..=256`.
const CLASSMAP_SIZE: usize = 257;

/// An immutable, thread-safe matcher compiled from a deterministic
/// automaton.
///
/// Safe to share across any number of threads; a typical fuzzy-search
/// driver compiles one matcher per query and fans candidate strings
/// out over a thread pool.
#[derive(Debug, Clone)]
pub struct CompiledAutomaton {
    /// Sorted start points of the alphabet partition.
    points: Vec<i32>,
    /// Accept bit per state.
    accept: BitSet,
    /// `num_states · points.len()` destinations, −1 for "no transition".
    transitions: Vec<i32>,
    /// For `v ≤ 256`, the index `k` with `points[k] ≤ v < points[k+1]`.
    classmap: Vec<i32>,
}

impl CompiledAutomaton {
    /// Compile `a`, which must be deterministic.
    pub fn new(a: &Automaton) -> Result<Self> {
        if !a.is_deterministic() {
            return Err(AutomatonError::NondeterministicInput);
        }
        let points = a.get_start_points();
        let num_points = points.len();
        let size = (a.num_states().max(1)) as usize;

        let mut accept = BitSet::with_capacity(size);
        let mut transitions = vec![-1i32; size * num_points];
        for n in 0..a.num_states() {
            if a.is_accept(n) {
                accept.set(n as usize);
            }
            for (c, &point) in points.iter().enumerate() {
                let dest = a.step(n, point);
                debug_assert!(dest < a.num_states());
                transitions[n as usize * num_points + c] = dest;
            }
        }

        let mut classmap = vec![0i32; CLASSMAP_SIZE];
        let mut class = 0usize;
        for (symbol, slot) in classmap.iter_mut().enumerate() {
            if class + 1 < num_points && symbol as i32 == points[class + 1] {
                class += 1;
            }
            *slot = class as i32;
        }

        Ok(Self {
            points,
            accept,
            transitions,
            classmap,
        })
    }

    /// Index of the alphabet class containing `symbol`: the largest
    /// `k` with `points[k] ≤ symbol`.
    #[inline]
    fn char_class(&self, symbol: i32) -> usize {
        match self.points.binary_search(&symbol) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }

    /// Destination of `state` on `symbol`, or −1.
    #[inline]
    pub fn step(&self, state: i32, symbol: i32) -> i32 {
        debug_assert!(symbol >= 0);
        let class = if (symbol as usize) < CLASSMAP_SIZE {
            self.classmap[symbol as usize] as usize
        } else {
            self.char_class(symbol)
        };
        self.transitions[state as usize * self.points.len() + class]
    }

    /// Whether `state` is accepting.
    #[inline]
    pub fn is_accept(&self, state: i32) -> bool {
        self.accept.get(state as usize)
    }

    /// Run a symbol sequence through the matcher.
    pub fn matches_symbols(&self, symbols: &[i32]) -> bool {
        let mut state = 0;
        for &symbol in symbols {
            state = self.step(state, symbol);
            if state == -1 {
                return false;
            }
        }
        self.accept.get(state as usize)
    }

    /// Run the 16-bit code units of `text` through the matcher.
    pub fn matches(&self, text: &str) -> bool {
        let mut state = 0;
        for unit in text.encode_utf16() {
            state = self.step(state, i32::from(unit));
            if state == -1 {
                return false;
            }
        }
        self.accept.get(state as usize)
    }
}
