//! Hopcroft partition-refinement minimization.
//!
//! The input is determinized and totalized first, then states are
//! split into equivalence classes: start from {accepting} /
//! {non-accepting} and refine against each (block, symbol-class) pair
//! until no block distinguishes two of its members. The alphabet is
//! the start-point partition of the automaton, so each "symbol" is a
//! whole interval class.

use super::determinize::determinize;
use super::operations::{remove_dead_states, totalize};
use super::{Automaton, Transition, ALPHA_MAX};
use crate::error::Result;
use crate::util::BitSet;
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

/// Doubly-linked membership lists, one per (block, symbol class).
///
/// A state has at most one node per symbol class, so nodes live in a
/// flat arena indexed by `state · sigma_len + class`; heads live in a
/// parallel arena indexed by `block · sigma_len + class`.
struct ActiveLists {
    sigma_len: usize,
    first: Vec<i32>,
    last: Vec<i32>,
    size: Vec<i32>,
    next: Vec<i32>,
    prev: Vec<i32>,
    /// Owning block per node, −1 when the node is unlinked.
    owner: Vec<i32>,
}

impl ActiveLists {
    fn new(states_len: usize, sigma_len: usize) -> Self {
        let heads = states_len * sigma_len;
        Self {
            sigma_len,
            first: vec![-1; heads],
            last: vec![-1; heads],
            size: vec![0; heads],
            next: vec![-1; heads],
            prev: vec![-1; heads],
            owner: vec![-1; heads],
        }
    }

    #[inline]
    fn head(&self, block: usize, class: usize) -> usize {
        block * self.sigma_len + class
    }

    #[inline]
    fn node(&self, state: usize, class: usize) -> usize {
        state * self.sigma_len + class
    }

    fn size_of(&self, block: usize, class: usize) -> i32 {
        self.size[self.head(block, class)]
    }

    fn first_node(&self, block: usize, class: usize) -> i32 {
        self.first[self.head(block, class)]
    }

    fn next_node(&self, node: i32) -> i32 {
        self.next[node as usize]
    }

    fn node_state(&self, node: i32) -> i32 {
        (node as usize / self.sigma_len) as i32
    }

    fn owner_of(&self, state: usize, class: usize) -> i32 {
        self.owner[self.node(state, class)]
    }

    fn add(&mut self, block: usize, class: usize, state: i32) {
        let n = self.node(state as usize, class);
        let h = self.head(block, class);
        self.owner[n] = block as i32;
        self.next[n] = -1;
        self.prev[n] = self.last[h];
        if self.last[h] == -1 {
            self.first[h] = n as i32;
        } else {
            self.next[self.last[h] as usize] = n as i32;
        }
        self.last[h] = n as i32;
        self.size[h] += 1;
    }

    fn remove(&mut self, state: usize, class: usize) {
        let n = self.node(state, class);
        let block = self.owner[n];
        debug_assert!(block != -1);
        let h = self.head(block as usize, class);
        self.size[h] -= 1;
        if self.prev[n] == -1 {
            self.first[h] = self.next[n];
        } else {
            self.next[self.prev[n] as usize] = self.next[n];
        }
        if self.next[n] == -1 {
            self.last[h] = self.prev[n];
        } else {
            self.prev[self.next[n] as usize] = self.prev[n];
        }
        self.owner[n] = -1;
    }
}

/// Minimize `a` into an equivalent automaton with the fewest states.
///
/// The result is deterministic, has no dead states, and no two of its
/// states accept the same language.
pub fn minimize(a: &Automaton) -> Result<Automaton> {
    if a.num_states() == 0 || (!a.is_accept(0) && a.num_transitions(0) == 0) {
        // Fast path: the empty language.
        return Ok(Automaton::new());
    }
    let a = determinize(a)?;
    if a.num_transitions(0) == 1 {
        let mut t = Transition::new();
        a.get_transition(0, 0, &mut t);
        if t.dest == 0 && t.min == 0 && t.max == ALPHA_MAX && a.is_accept(0) {
            // Fast path: accepts every string, already minimal.
            return Ok(a);
        }
    }
    let a = totalize(&a)?;

    let sigma = a.get_start_points();
    let sigma_len = sigma.len();
    let states_len = a.num_states() as usize;

    let mut reverse: Vec<Vec<i32>> = vec![Vec::new(); states_len * sigma_len];
    let mut partition: Vec<FxHashSet<i32>> = vec![FxHashSet::default(); states_len];
    let mut splitblock: Vec<Vec<i32>> = vec![Vec::new(); states_len];
    let mut block: Vec<i32> = vec![0; states_len];
    let mut active = ActiveLists::new(states_len, sigma_len);
    let mut pending: VecDeque<(usize, usize)> = VecDeque::new();
    let mut pending_bits = BitSet::with_capacity(states_len * sigma_len);
    let mut split = BitSet::with_capacity(states_len);
    let mut refine = BitSet::with_capacity(states_len);
    let mut refine2 = BitSet::with_capacity(states_len);

    // Initial partition {accepting, non-accepting} and reverse edges
    // per symbol class.
    for q in 0..states_len {
        let j = if a.is_accept(q as i32) { 0 } else { 1 };
        partition[j].insert(q as i32);
        block[q] = j as i32;
        for (x, &point) in sigma.iter().enumerate() {
            let dest = a.step(q as i32, point);
            debug_assert!(dest >= 0, "totalized automaton has a hole");
            reverse[dest as usize * sigma_len + x].push(q as i32);
        }
    }

    // Active lists: members of each block with at least one inbound
    // transition on the class.
    for j in 0..=1usize {
        for x in 0..sigma_len {
            for &q in &partition[j] {
                if !reverse[q as usize * sigma_len + x].is_empty() {
                    active.add(j, x, q);
                }
            }
        }
    }

    // Seed the queue with the smaller side for every class.
    for x in 0..sigma_len {
        let j = if active.size_of(0, x) <= active.size_of(1, x) {
            0
        } else {
            1
        };
        pending.push_back((j, x));
        pending_bits.set(x * states_len + j);
    }

    let mut k = 2usize;
    while let Some((p, x)) = pending.pop_front() {
        pending_bits.clear(x * states_len + p);

        // Mark every state with a transition on x into block p.
        let mut m = active.first_node(p, x);
        while m != -1 {
            let q = active.node_state(m);
            for &i in &reverse[q as usize * sigma_len + x] {
                if !split.get(i as usize) {
                    split.set(i as usize);
                    let j = block[i as usize] as usize;
                    splitblock[j].push(i);
                    if !refine2.get(j) {
                        refine2.set(j);
                        refine.set(j);
                    }
                }
            }
            m = active.next_node(m);
        }

        // Split every block that was only partially marked.
        let mut next_j = refine.next_set_bit(0);
        while let Some(j) = next_j {
            if splitblock[j].len() < partition[j].len() {
                for idx in 0..splitblock[j].len() {
                    let s = splitblock[j][idx];
                    partition[j].remove(&s);
                    partition[k].insert(s);
                    block[s as usize] = k as i32;
                    for c in 0..sigma_len {
                        if active.owner_of(s as usize, c) == j as i32 {
                            active.remove(s as usize, c);
                            active.add(k, c, s);
                        }
                    }
                }
                // The smaller piece goes on the queue for every class.
                for c in 0..sigma_len {
                    let aj = active.size_of(j, c);
                    let ak = active.size_of(k, c);
                    let ofs = c * states_len;
                    if !pending_bits.get(ofs + j) && 0 < aj && aj <= ak {
                        pending_bits.set(ofs + j);
                        pending.push_back((j, c));
                    } else {
                        pending_bits.set(ofs + k);
                        pending.push_back((k, c));
                    }
                }
                k += 1;
            }
            refine2.clear(j);
            for &s in &splitblock[j] {
                split.clear(s as usize);
            }
            splitblock[j].clear();
            next_j = refine.next_set_bit(j + 1);
        }
        refine.clear_all();
    }

    // One state per class, transitions from a representative member.
    let mut result = Automaton::new();
    let mut state_map = vec![-1i32; states_len];
    let mut state_rep = vec![0i32; k];
    result.create_state();
    for n in 0..k {
        let is_initial = partition[n].contains(&0);
        let new_state = if is_initial { 0 } else { result.create_state() };
        for &q in &partition[n] {
            state_map[q as usize] = new_state;
            result.set_accept(new_state, a.is_accept(q));
            state_rep[new_state as usize] = q;
        }
    }
    let mut t = Transition::new();
    for n in 0..k as i32 {
        let count = a.init_transition(state_rep[n as usize], &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            result.add_transition(n, state_map[t.dest as usize], t.min, t.max)?;
        }
    }
    result.finish_state();
    remove_dead_states(&result)
}
