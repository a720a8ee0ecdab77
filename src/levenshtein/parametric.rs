//! Bit-packed parametric description tables.
//!
//! A parametric description encodes a Levenshtein automaton abstractly:
//! states are pairs `(state_index, offset)` packed as
//! `abs_state = state_index · (w + 1) + offset` for word length `w`,
//! and transitions are table lookups keyed by how many word characters
//! remain (capped at `2n + 1`) and the characteristic vector of the
//! consumed input character. The tables store one `toState` and one
//! `offsetIncr` field per (vector, state) slot, bit-packed at the
//! narrowest width that fits the level.
//!
//! The four descriptions (distance 1 and 2, with and without
//! transpositions) are materialized once per process on first use and
//! shared as immutable constants afterwards.

use super::generator::{enumerate_states, min_errors, required_tail, transition, State};
use crate::error::{AutomatonError, Result};
use crate::util::bits::{pack, unpack};
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// Values stored at a fixed bit width in 64-bit words.
#[derive(Debug)]
pub(crate) struct PackedTable {
    data: Vec<u64>,
    bits: u32,
}

impl PackedTable {
    fn new(values: &[u32], bits: u32) -> Self {
        Self {
            data: pack(values, bits),
            bits,
        }
    }

    #[inline]
    fn get(&self, index: usize) -> u32 {
        unpack(&self.data, index, self.bits)
    }

    #[cfg(test)]
    pub(crate) fn bits(&self) -> u32 {
        self.bits
    }
}

/// Transition tables for one remaining-character level: `2^vector_len`
/// characteristic vectors × `num_states` states, indexed
/// `vector · num_states + state`.
#[derive(Debug)]
pub(crate) struct LevelTable {
    /// States valid at this level; they occupy a prefix of the global
    /// state numbering.
    num_states: u32,
    /// Characteristic-vector length at this level.
    vector_len: u32,
    /// Successor state + 1 per slot, 0 meaning "dead".
    to_states: PackedTable,
    /// Offset increment per slot.
    offset_incrs: PackedTable,
}

impl LevelTable {
    #[cfg(test)]
    pub(crate) fn widths(&self) -> (u32, u32) {
        (self.to_states.bits(), self.offset_incrs.bits())
    }
}

/// The word-length-independent part of a parametric description.
#[derive(Debug)]
pub(crate) struct ParametricTemplate {
    n: i32,
    num_states: usize,
    min_errors: Vec<i32>,
    /// One table per remaining-character count `0 ..= 2n + 1`; the
    /// last level covers every longer tail.
    levels: Vec<LevelTable>,
}

fn bits_required(max_value: u32) -> u32 {
    (32 - max_value.leading_zeros()).max(1)
}

impl ParametricTemplate {
    fn build(n: i32, transpose: bool) -> Self {
        let states = enumerate_states(n, transpose);
        let index: FxHashMap<State, usize> = states
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let max_len = 2 * n + 1;

        let mut levels = Vec::with_capacity(max_len as usize + 1);
        for len in 0..=max_len {
            let k = states.iter().filter(|s| required_tail(s) <= len).count();
            let num_vectors = 1usize << len;
            let mut to_states = vec![0u32; num_vectors * k];
            let mut offset_incrs = vec![0u32; num_vectors * k];
            let mut max_incr = 0u32;
            for (si, state) in states[..k].iter().enumerate() {
                for vector in 0..num_vectors {
                    if let Some((incr, successor)) =
                        transition(state, len, vector as u32, n, transpose)
                    {
                        let loc = vector * k + si;
                        to_states[loc] = index[&successor] as u32 + 1;
                        offset_incrs[loc] = incr as u32;
                        max_incr = max_incr.max(incr as u32);
                    }
                }
            }
            levels.push(LevelTable {
                num_states: k as u32,
                vector_len: len as u32,
                to_states: PackedTable::new(&to_states, bits_required(k as u32)),
                offset_incrs: PackedTable::new(&offset_incrs, bits_required(max_incr)),
            });
        }

        Self {
            n,
            num_states: states.len(),
            min_errors: states.iter().map(|s| min_errors(s, n)).collect(),
            levels,
        }
    }

    pub(crate) fn num_states(&self) -> usize {
        self.num_states
    }

    #[cfg(test)]
    pub(crate) fn level(&self, len: usize) -> &LevelTable {
        &self.levels[len]
    }
}

/// A parametric description bound to a concrete word length.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ParametricDescription<'a> {
    template: &'a ParametricTemplate,
    w: i32,
}

impl<'a> ParametricDescription<'a> {
    pub(crate) fn new(template: &'a ParametricTemplate, w: i32) -> Self {
        Self { template, w }
    }

    /// Total number of packed `(state_index, offset)` states.
    pub(crate) fn size(&self) -> i32 {
        self.template.num_states as i32 * (self.w + 1)
    }

    /// Whether `abs_state` accepts: the word tail past its offset can
    /// be deleted within the remaining error budget.
    pub(crate) fn is_accept(&self, abs_state: i32) -> bool {
        let state = abs_state / (self.w + 1);
        let offset = abs_state % (self.w + 1);
        self.w - offset + self.template.min_errors[state as usize] <= self.template.n
    }

    /// Word offset of `abs_state`.
    pub(crate) fn get_position(&self, abs_state: i32) -> i32 {
        abs_state % (self.w + 1)
    }

    /// Successor of `abs_state` at word `position` on an input
    /// character with characteristic vector `vector`, or −1 if dead.
    pub(crate) fn transition(&self, abs_state: i32, position: i32, vector: u32) -> i32 {
        let mut state = abs_state / (self.w + 1);
        let mut offset = abs_state % (self.w + 1);
        debug_assert!(offset >= 0);

        let level = (self.w - position).min(2 * self.template.n + 1) as usize;
        let table = &self.template.levels[level];
        debug_assert_eq!(table.vector_len, (self.w - position).min(2 * self.template.n + 1) as u32);
        if state < table.num_states as i32 {
            let loc = vector as usize * table.num_states as usize + state as usize;
            offset += table.offset_incrs.get(loc) as i32;
            state = table.to_states.get(loc) as i32 - 1;
        }

        if state == -1 {
            -1
        } else {
            state * (self.w + 1) + offset
        }
    }
}

static LEV1: OnceLock<ParametricTemplate> = OnceLock::new();
static LEV1T: OnceLock<ParametricTemplate> = OnceLock::new();
static LEV2: OnceLock<ParametricTemplate> = OnceLock::new();
static LEV2T: OnceLock<ParametricTemplate> = OnceLock::new();

/// Process-wide description table for distance `n`, materialized on
/// first use.
pub(crate) fn template_for(n: u32, transpose: bool) -> Result<&'static ParametricTemplate> {
    match (n, transpose) {
        (1, false) => Ok(LEV1.get_or_init(|| ParametricTemplate::build(1, false))),
        (1, true) => Ok(LEV1T.get_or_init(|| ParametricTemplate::build(1, true))),
        (2, false) => Ok(LEV2.get_or_init(|| ParametricTemplate::build(2, false))),
        (2, true) => Ok(LEV2T.get_or_init(|| ParametricTemplate::build(2, true))),
        _ => Err(AutomatonError::DistanceTooLarge { n }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lev1_level_shapes_and_widths() {
        let template = template_for(1, false).unwrap();
        assert_eq!(template.num_states(), 5);
        // States valid per level: 2 / 3 / 5 / 5, packed at the same
        // widths the distance-1 description has always used:
        // toStates 2/2/3/3 bits, offsetIncrs 1/1/2/2 bits.
        let shapes: Vec<(u32, u32, u32)> = (0..=3)
            .map(|len| {
                let level = template.level(len);
                let (to_bits, incr_bits) = level.widths();
                (level.num_states, to_bits, incr_bits)
            })
            .collect();
        assert_eq!(
            shapes,
            vec![(2, 2, 1), (3, 2, 1), (5, 3, 2), (5, 3, 2)]
        );
    }

    #[test]
    fn test_lev1_transpose_shapes() {
        let template = template_for(1, true).unwrap();
        assert_eq!(template.num_states(), 6);
        assert_eq!(template.level(2).num_states, 6);
        assert_eq!(template.level(3).num_states, 6);
        // Six states need 3 toState bits at the wide levels.
        assert_eq!(template.level(2).widths().0, 3);
    }

    #[test]
    fn test_lev2_shapes() {
        let template = template_for(2, false).unwrap();
        assert_eq!(template.num_states(), 30);
        // 30 states fit in 5 bits.
        assert_eq!(template.level(5).widths().0, 5);
        assert_eq!(template.level(5).num_states, 30);
    }

    #[test]
    fn test_distance_above_maximum_rejected() {
        assert_eq!(
            template_for(3, false).unwrap_err(),
            AutomatonError::DistanceTooLarge { n: 3 }
        );
    }

    #[test]
    fn test_description_walks_exact_word() {
        // Word "abc" (w = 3), distance 1: walking the exact word stays
        // on parametric state 0 and lands accepting.
        let template = template_for(1, false).unwrap();
        let description = ParametricDescription::new(template, 3);
        assert_eq!(description.size(), 5 * 4);
        assert!(!description.is_accept(0));

        // Characteristic vector for the matching character at each
        // position: first-position bit set.
        let mut state = 0;
        for position in 0..3 {
            let len = (3 - position).min(3);
            let vector = 1 << (len - 1);
            state = description.transition(state, position, vector);
            assert!(state >= 0);
            assert_eq!(description.get_position(state), position + 1);
        }
        assert!(description.is_accept(state));
    }

    #[test]
    fn test_description_dead_on_exhausted_budget() {
        let template = template_for(1, false).unwrap();
        let description = ParametricDescription::new(template, 2);
        // Two mismatches in a row from the start exhaust distance 1.
        let state = description.transition(0, 0, 0);
        assert!(state >= 0);
        let state = description.transition(state, description.get_position(state), 0);
        assert_eq!(state, -1);
    }
}
