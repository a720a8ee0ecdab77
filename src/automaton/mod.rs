//! Finite automata over integer symbol intervals.
//!
//! An [`Automaton`] is a labeled directed graph: states are dense
//! integers starting at 0 (state 0 is always the initial state), and
//! each transition carries an inclusive symbol interval `[min, max]`.
//! The whole graph lives in two flat `i32` buffers — per-state
//! (offset, count) pairs and 3-slot transition records — so sweeps,
//! sorts, and the downstream determinizer/minimizer/compiler all work
//! on contiguous memory.
//!
//! Building is two-phase: transitions for a state must be added
//! contiguously, and the store finishes a state (sorting and
//! coalescing its transitions) as soon as a different source state is
//! touched. [`Builder`] lifts that restriction by buffering
//! transitions in any order and replaying them sorted.

pub mod compiled;
pub mod determinize;
pub mod factory;
pub(crate) mod int_set;
pub mod minimize;
pub mod operations;

use crate::error::{AutomatonError, Result};
use crate::util::bits::grow_i32;
use crate::util::sorter::{sort, SortOps};
use crate::util::BitSet;
use std::cmp::Ordering;

/// Inclusive ceiling of the symbol space.
///
/// Symbols are non-negative integers; text input is treated as a
/// sequence of 16-bit code units, so the default alphabet is
/// `[0, 0xFFFF]`. All other code is width-agnostic.
pub const ALPHA_MAX: i32 = 0xFFFF;

/// One transition plus an iteration cursor.
///
/// Reused across calls to avoid allocation: [`Automaton::init_transition`]
/// parks the cursor at a state's first transition and
/// [`Automaton::next_transition`] advances it in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transition {
    /// Source state.
    pub source: i32,
    /// Destination state.
    pub dest: i32,
    /// Inclusive interval lower bound.
    pub min: i32,
    /// Inclusive interval upper bound.
    pub max: i32,
    /// Cursor into the flat transition buffer.
    upto: i32,
}

impl Transition {
    /// Create an empty transition cursor.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mutable automaton graph with a two-phase build protocol.
#[derive(Debug, Clone)]
pub struct Automaton {
    /// Two slots per state: transition-buffer offset (or −1 if the
    /// state has no transitions yet) and transition count.
    states: Vec<i32>,
    /// Three slots per transition: dest, min, max.
    transitions: Vec<i32>,
    accept: BitSet,
    deterministic: bool,
    /// State currently accepting transitions, −1 if none.
    curr_state: i32,
    num_states: i32,
}

impl Default for Automaton {
    fn default() -> Self {
        Self::new()
    }
}

impl Automaton {
    /// Create an empty automaton.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            transitions: Vec::new(),
            accept: BitSet::new(),
            deterministic: true,
            curr_state: -1,
            num_states: 0,
        }
    }

    /// Create an empty automaton with room for `num_states` states and
    /// `num_transitions` transitions.
    pub fn with_capacity(num_states: usize, num_transitions: usize) -> Self {
        Self {
            states: Vec::with_capacity(2 * num_states),
            transitions: Vec::with_capacity(3 * num_transitions),
            accept: BitSet::with_capacity(num_states),
            deterministic: true,
            curr_state: -1,
            num_states: 0,
        }
    }

    /// Add a new state and return its number.
    pub fn create_state(&mut self) -> i32 {
        let state = self.num_states;
        let len = self.states.len();
        grow_i32(&mut self.states, len + 2, 0);
        self.states.truncate(len + 2);
        self.states[len] = -1;
        self.states[len + 1] = 0;
        self.num_states += 1;
        state
    }

    /// Number of states.
    #[inline]
    pub fn num_states(&self) -> i32 {
        self.num_states
    }

    /// Number of transitions leaving `state`.
    #[inline]
    pub fn num_transitions(&self, state: i32) -> i32 {
        self.states[2 * state as usize + 1]
    }

    /// Mark `state` as accepting or not.
    pub fn set_accept(&mut self, state: i32, accept: bool) {
        assert!(
            state >= 0 && state < self.num_states,
            "state {} out of bounds (num_states={})",
            state,
            self.num_states
        );
        if accept {
            self.accept.set(state as usize);
        } else {
            self.accept.clear(state as usize);
        }
    }

    /// Whether `state` is accepting.
    #[inline]
    pub fn is_accept(&self, state: i32) -> bool {
        self.accept.get(state as usize)
    }

    /// The set of accept states.
    pub fn accept_states(&self) -> &BitSet {
        &self.accept
    }

    /// Conservative determinism flag: `true` only if no state has two
    /// outgoing transitions with overlapping intervals. Once cleared
    /// it is never re-asserted.
    #[inline]
    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Add a transition `source --[min, max]--> dest`.
    ///
    /// Transitions for a state must be added contiguously; the first
    /// transition naming a new `source` implicitly finishes the
    /// previous current state. Returns
    /// [`AutomatonError::TransitionAfterFinish`] if `source` was
    /// already finished, [`AutomatonError::StateOutOfRange`] /
    /// [`AutomatonError::InvalidRange`] on bad arguments.
    pub fn add_transition(&mut self, source: i32, dest: i32, min: i32, max: i32) -> Result<()> {
        if min > max || min < 0 {
            return Err(AutomatonError::InvalidRange { min, max });
        }
        if source < 0 || source >= self.num_states {
            return Err(AutomatonError::StateOutOfRange {
                state: source,
                num_states: self.num_states,
            });
        }
        if dest < 0 || dest >= self.num_states {
            return Err(AutomatonError::StateOutOfRange {
                state: dest,
                num_states: self.num_states,
            });
        }

        if self.curr_state != source {
            if self.curr_state != -1 {
                self.finish_current_state();
            }
            self.curr_state = source;
            if self.states[2 * source as usize] != -1 {
                return Err(AutomatonError::TransitionAfterFinish { state: source });
            }
            debug_assert_eq!(self.states[2 * source as usize + 1], 0);
            self.states[2 * source as usize] = self.transitions.len() as i32;
        }

        let len = self.transitions.len();
        grow_i32(&mut self.transitions, len + 3, 0);
        self.transitions.truncate(len + 3);
        self.transitions[len] = dest;
        self.transitions[len + 1] = min;
        self.transitions[len + 2] = max;
        self.states[2 * self.curr_state as usize + 1] += 1;
        Ok(())
    }

    /// Add a single-symbol transition.
    pub fn add_transition_symbol(&mut self, source: i32, dest: i32, symbol: i32) -> Result<()> {
        self.add_transition(source, dest, symbol, symbol)
    }

    /// Virtual epsilon transition: copies every outgoing transition of
    /// `dest` onto `source` and propagates the accept flag.
    ///
    /// `dest` must already be finished; `source` is subject to the
    /// usual build protocol.
    pub fn add_epsilon(&mut self, source: i32, dest: i32) -> Result<()> {
        let mut t = Transition::new();
        let count = self.init_transition(dest, &mut t);
        for _ in 0..count {
            self.next_transition(&mut t);
            self.add_transition(source, t.dest, t.min, t.max)?;
        }
        if self.is_accept(dest) {
            self.set_accept(source, true);
        }
        Ok(())
    }

    /// Finish the current state. Must be called once after the final
    /// state's last transition; harmless if no state is in progress.
    pub fn finish_state(&mut self) {
        if self.curr_state != -1 {
            self.finish_current_state();
            self.curr_state = -1;
        }
    }

    /// Sort the current state's transitions by (dest, min, max), merge
    /// same-destination runs whose intervals touch or overlap, re-sort
    /// by (min, max, dest), and clear the determinism flag if two
    /// remaining intervals overlap.
    fn finish_current_state(&mut self) {
        let state = self.curr_state as usize;
        let num_transitions = self.states[2 * state + 1];
        debug_assert!(num_transitions > 0);
        let offset = self.states[2 * state] as usize;
        let start = offset / 3;

        sort(
            &mut DestMinMaxSorter(&mut self.transitions),
            start,
            start + num_transitions as usize,
        );

        // Coalesce adjacent or overlapping intervals with the same
        // destination.
        let mut upto = 0usize;
        let mut dest = -1;
        let mut min = -1;
        let mut max = -1;
        for i in 0..num_transitions as usize {
            let t_dest = self.transitions[offset + 3 * i];
            let t_min = self.transitions[offset + 3 * i + 1];
            let t_max = self.transitions[offset + 3 * i + 2];
            if dest == t_dest && t_min <= max + 1 {
                if t_max > max {
                    max = t_max;
                }
            } else {
                if dest != -1 {
                    self.transitions[offset + 3 * upto] = dest;
                    self.transitions[offset + 3 * upto + 1] = min;
                    self.transitions[offset + 3 * upto + 2] = max;
                    upto += 1;
                }
                dest = t_dest;
                min = t_min;
                max = t_max;
            }
        }
        if dest != -1 {
            self.transitions[offset + 3 * upto] = dest;
            self.transitions[offset + 3 * upto + 1] = min;
            self.transitions[offset + 3 * upto + 2] = max;
            upto += 1;
        }
        self.transitions.truncate(offset + 3 * upto);
        self.states[2 * state + 1] = upto as i32;

        sort(
            &mut MinMaxDestSorter(&mut self.transitions),
            start,
            start + upto,
        );

        if self.deterministic && upto > 1 {
            let mut last_max = self.transitions[offset + 2];
            for i in 1..upto {
                let t_min = self.transitions[offset + 3 * i + 1];
                if t_min <= last_max {
                    self.deterministic = false;
                    break;
                }
                last_max = self.transitions[offset + 3 * i + 2];
            }
        }
    }

    /// Park the cursor at `state`'s first transition; returns the
    /// transition count.
    pub fn init_transition(&self, state: i32, t: &mut Transition) -> i32 {
        t.source = state;
        t.upto = self.states[2 * state as usize];
        self.states[2 * state as usize + 1]
    }

    /// Load the cursor's current transition and advance it.
    pub fn next_transition(&self, t: &mut Transition) {
        debug_assert!(t.upto != -1);
        let upto = t.upto as usize;
        t.dest = self.transitions[upto];
        t.min = self.transitions[upto + 1];
        t.max = self.transitions[upto + 2];
        t.upto += 3;
    }

    /// Load the `index`-th transition of `state` into `t`.
    pub fn get_transition(&self, state: i32, index: i32, t: &mut Transition) {
        let offset = (self.states[2 * state as usize] + 3 * index) as usize;
        t.source = state;
        t.dest = self.transitions[offset];
        t.min = self.transitions[offset + 1];
        t.max = self.transitions[offset + 2];
        t.upto = offset as i32 + 3;
    }

    /// Append every state of `other`, renumbered sequentially after
    /// this automaton's existing states.
    pub fn copy(&mut self, other: &Automaton) {
        let state_offset = self.num_states;
        let trans_offset = self.transitions.len() as i32;

        for s in 0..other.num_states {
            let new_state = self.create_state();
            if other.is_accept(s) {
                self.accept.set(new_state as usize);
            }
            let offset = other.states[2 * s as usize];
            self.states[2 * new_state as usize] = if offset == -1 {
                -1
            } else {
                offset + trans_offset
            };
            self.states[2 * new_state as usize + 1] = other.states[2 * s as usize + 1];
        }

        self.transitions.reserve(other.transitions.len());
        for chunk in other.transitions.chunks_exact(3) {
            self.transitions.push(chunk[0] + state_offset);
            self.transitions.push(chunk[1]);
            self.transitions.push(chunk[2]);
        }

        if !other.deterministic {
            self.deterministic = false;
        }
    }

    /// Destination of the transition of `state` accepting `label`, or
    /// −1 if none. After determinization at most one transition
    /// matches; under non-determinism the first match in
    /// (min, max, dest) order is returned.
    pub fn step(&self, state: i32, label: i32) -> i32 {
        let offset = self.states[2 * state as usize];
        if offset == -1 {
            return -1;
        }
        let count = self.states[2 * state as usize + 1] as usize;
        let offset = offset as usize;
        for i in 0..count {
            let min = self.transitions[offset + 3 * i + 1];
            if min > label {
                break;
            }
            let max = self.transitions[offset + 3 * i + 2];
            if label <= max {
                return self.transitions[offset + 3 * i];
            }
        }
        -1
    }

    /// Sorted ascending sequence of every interval `min`, every
    /// `max + 1` that does not overflow [`ALPHA_MAX`], and the
    /// sentinel 0. Consecutive start points bound a symbol class over
    /// which every state transitions uniformly.
    pub fn get_start_points(&self) -> Vec<i32> {
        let mut points: Vec<i32> = Vec::with_capacity(self.transitions.len() / 3 * 2 + 1);
        points.push(0);
        for chunk in self.transitions.chunks_exact(3) {
            points.push(chunk[1]);
            if chunk[2] < ALPHA_MAX {
                points.push(chunk[2] + 1);
            }
        }
        points.sort_unstable();
        points.dedup();
        points
    }

    /// Collect `state`'s transitions into a vector. The state must be
    /// finished; records come back in (min, max, dest) order.
    pub(crate) fn transitions_of(&self, state: i32) -> Vec<Transition> {
        let count = self.num_transitions(state);
        let mut out = Vec::with_capacity(count as usize);
        let mut t = Transition::new();
        self.init_transition(state, &mut t);
        for _ in 0..count {
            self.next_transition(&mut t);
            out.push(t);
        }
        out
    }
}

/// Sorts 3-slot transition records by (dest, min, max).
struct DestMinMaxSorter<'a>(&'a mut Vec<i32>);

impl SortOps for DestMinMaxSorter<'_> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        let a = &self.0[3 * i..3 * i + 3];
        let b = &self.0[3 * j..3 * j + 3];
        a[0].cmp(&b[0])
            .then_with(|| a[1].cmp(&b[1]))
            .then_with(|| a[2].cmp(&b[2]))
    }
    fn swap(&mut self, i: usize, j: usize) {
        for k in 0..3 {
            self.0.swap(3 * i + k, 3 * j + k);
        }
    }
}

/// Sorts 3-slot transition records by (min, max, dest).
struct MinMaxDestSorter<'a>(&'a mut Vec<i32>);

impl SortOps for MinMaxDestSorter<'_> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        let a = &self.0[3 * i..3 * i + 3];
        let b = &self.0[3 * j..3 * j + 3];
        a[1].cmp(&b[1])
            .then_with(|| a[2].cmp(&b[2]))
            .then_with(|| a[0].cmp(&b[0]))
    }
    fn swap(&mut self, i: usize, j: usize) {
        for k in 0..3 {
            self.0.swap(3 * i + k, 3 * j + k);
        }
    }
}

/// Out-of-order automaton builder.
///
/// Buffers `(source, dest, min, max)` quadruples, then materializes an
/// [`Automaton`] at [`finish`](Builder::finish) by sorting on
/// (source, min, max, dest) and replaying through the build protocol.
/// Needed by algorithms that produce transitions in destination order
/// (reverse, repeat, determinize).
#[derive(Debug, Default)]
pub struct Builder {
    /// Four slots per buffered transition: source, dest, min, max.
    transitions: Vec<i32>,
    accept: BitSet,
    num_states: i32,
}

impl Builder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new state and return its number.
    pub fn create_state(&mut self) -> i32 {
        let state = self.num_states;
        self.num_states += 1;
        state
    }

    /// Number of states created so far.
    pub fn num_states(&self) -> i32 {
        self.num_states
    }

    /// Mark `state` as accepting or not.
    pub fn set_accept(&mut self, state: i32, accept: bool) {
        assert!(
            state >= 0 && state < self.num_states,
            "state {} out of bounds (num_states={})",
            state,
            self.num_states
        );
        if accept {
            self.accept.set(state as usize);
        } else {
            self.accept.clear(state as usize);
        }
    }

    /// Whether `state` is accepting.
    pub fn is_accept(&self, state: i32) -> bool {
        self.accept.get(state as usize)
    }

    /// Buffer a transition; any order is fine.
    pub fn add_transition(&mut self, source: i32, dest: i32, min: i32, max: i32) {
        self.transitions.reserve(4);
        self.transitions.push(source);
        self.transitions.push(dest);
        self.transitions.push(min);
        self.transitions.push(max);
    }

    /// Append every state of `other`, renumbered after the states
    /// created so far.
    pub fn copy(&mut self, other: &Automaton) {
        let offset = self.num_states;
        let num = other.num_states();
        let mut t = Transition::new();
        for s in 0..num {
            let state = self.create_state();
            self.set_accept(state, other.is_accept(s));
            let count = other.init_transition(s, &mut t);
            for _ in 0..count {
                other.next_transition(&mut t);
                self.add_transition(state, offset + t.dest, t.min, t.max);
            }
        }
    }

    /// Sort the buffered transitions and replay them into a fresh
    /// automaton.
    pub fn finish(self) -> Result<Automaton> {
        let Builder {
            mut transitions,
            accept,
            num_states,
        } = self;
        let num_transitions = transitions.len() / 4;
        sort(
            &mut SrcMinMaxDestSorter(&mut transitions),
            0,
            num_transitions,
        );

        let mut a = Automaton::with_capacity(num_states as usize, num_transitions);
        for _ in 0..num_states {
            a.create_state();
        }
        for bit in accept.iter_set() {
            a.set_accept(bit as i32, true);
        }
        for chunk in transitions.chunks_exact(4) {
            a.add_transition(chunk[0], chunk[1], chunk[2], chunk[3])?;
        }
        a.finish_state();
        Ok(a)
    }
}

/// Sorts 4-slot buffered records by (source, min, max, dest).
struct SrcMinMaxDestSorter<'a>(&'a mut Vec<i32>);

impl SortOps for SrcMinMaxDestSorter<'_> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        let a = &self.0[4 * i..4 * i + 4];
        let b = &self.0[4 * j..4 * j + 4];
        a[0].cmp(&b[0])
            .then_with(|| a[2].cmp(&b[2]))
            .then_with(|| a[3].cmp(&b[3]))
            .then_with(|| a[1].cmp(&b[1]))
    }
    fn swap(&mut self, i: usize, j: usize) {
        for k in 0..4 {
            self.0.swap(4 * i + k, 4 * j + k);
        }
    }
}
