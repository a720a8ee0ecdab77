//! Automaton algebra.
//!
//! Every operation here builds a fresh automaton; inputs are never
//! mutated. Determinism of the results is tracked conservatively by
//! the store's finish logic.

use super::{determinize::determinize, factory, Automaton, Builder, Transition, ALPHA_MAX};
use crate::error::{AutomatonError, Result};
use crate::util::BitSet;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Concatenate the languages of `l` in order.
///
/// Accept states of automaton `i` splice in the outgoing transitions
/// of automaton `i + 1`'s initial state, chaining further while the
/// spliced initial states accept the empty string.
pub fn concatenate(l: &[&Automaton]) -> Result<Automaton> {
    let mut result = Automaton::new();

    // First pass: create all states up front.
    for a in l {
        if a.num_states() == 0 {
            // One empty language empties the whole concatenation.
            result.finish_state();
            return Ok(result);
        }
        for _ in 0..a.num_states() {
            result.create_state();
        }
    }

    // Second pass: add transitions, stitching accept states of each
    // automaton into the start of the next.
    let mut state_offset = 0;
    let mut t = Transition::new();
    for (i, a) in l.iter().enumerate() {
        let num_states = a.num_states();
        for s in 0..num_states {
            let count = a.init_transition(s, &mut t);
            for _ in 0..count {
                a.next_transition(&mut t);
                result.add_transition(state_offset + s, state_offset + t.dest, t.min, t.max)?;
            }
            if a.is_accept(s) {
                let mut follow_offset = state_offset + num_states;
                let mut upto = i + 1;
                loop {
                    if upto < l.len() {
                        let follow = l[upto];
                        let count = follow.init_transition(0, &mut t);
                        for _ in 0..count {
                            follow.next_transition(&mut t);
                            result.add_transition(
                                state_offset + s,
                                follow_offset + t.dest,
                                t.min,
                                t.max,
                            )?;
                        }
                        if follow.is_accept(0) {
                            follow_offset += follow.num_states();
                            upto += 1;
                        } else {
                            break;
                        }
                    } else {
                        result.set_accept(state_offset + s, true);
                        break;
                    }
                }
            }
        }
        state_offset += num_states;
    }

    if result.num_states() == 0 {
        result.create_state();
    }
    result.finish_state();
    Ok(result)
}

/// Union of the languages of `l`: a fresh initial state with epsilon
/// transitions into each input's initial state. Dead states are
/// dropped from the result.
pub fn union(l: &[&Automaton]) -> Result<Automaton> {
    let mut result = Automaton::new();
    result.create_state();
    for a in l {
        result.copy(a);
    }
    let mut state_offset = 1;
    for a in l {
        if a.num_states() == 0 {
            continue;
        }
        result.add_epsilon(0, state_offset)?;
        state_offset += a.num_states();
    }
    result.finish_state();
    remove_dead_states(&result)
}

/// Language of `a` plus the empty string.
pub fn optional(a: &Automaton) -> Result<Automaton> {
    let mut result = Automaton::new();
    result.create_state();
    result.set_accept(0, true);
    if a.num_states() > 0 {
        result.copy(a);
        result.add_epsilon(0, 1)?;
    }
    result.finish_state();
    Ok(result)
}

/// Kleene star: zero or more repetitions of `a`.
pub fn repeat(a: &Automaton) -> Result<Automaton> {
    if a.num_states() == 0 {
        // Zero repetitions of the empty language is the empty string.
        return Ok(factory::make_empty_string());
    }
    let mut builder = Builder::new();
    builder.create_state();
    builder.set_accept(0, true);
    builder.copy(a);

    let mut t = Transition::new();
    let count = a.init_transition(0, &mut t);
    for _ in 0..count {
        a.next_transition(&mut t);
        builder.add_transition(0, t.dest + 1, t.min, t.max);
    }

    for s in 0..a.num_states() {
        if a.is_accept(s) {
            let count = a.init_transition(0, &mut t);
            for _ in 0..count {
                a.next_transition(&mut t);
                builder.add_transition(s + 1, t.dest + 1, t.min, t.max);
            }
        }
    }

    builder.finish()
}

/// `min` or more repetitions of `a`.
pub fn repeat_min(a: &Automaton, min: u32) -> Result<Automaton> {
    if min == 0 {
        return repeat(a);
    }
    let star = repeat(a)?;
    let mut list: Vec<&Automaton> = Vec::with_capacity(min as usize + 1);
    for _ in 0..min {
        list.push(a);
    }
    list.push(&star);
    concatenate(&list)
}

/// Product construction: strings accepted by both `a1` and `a2`.
/// Dead states are dropped from the result.
pub fn intersection(a1: &Automaton, a2: &Automaton) -> Result<Automaton> {
    if a1.num_states() == 0 {
        return Ok(a1.clone());
    }
    if a2.num_states() == 0 {
        return Ok(a2.clone());
    }
    let transitions1 = sorted_transitions(a1);
    let transitions2 = sorted_transitions(a2);

    let mut c = Automaton::new();
    c.create_state();
    let mut worklist: VecDeque<(i32, i32)> = VecDeque::new();
    let mut newstates: FxHashMap<(i32, i32), i32> = FxHashMap::default();
    worklist.push_back((0, 0));
    newstates.insert((0, 0), 0);

    while let Some((s1, s2)) = worklist.pop_front() {
        let state = newstates[&(s1, s2)];
        c.set_accept(state, a1.is_accept(s1) && a2.is_accept(s2));
        let t1 = &transitions1[s1 as usize];
        let t2 = &transitions2[s2 as usize];
        let mut b2 = 0usize;
        for n1 in t1 {
            while b2 < t2.len() && t2[b2].max < n1.min {
                b2 += 1;
            }
            for n2 in t2[b2..].iter().take_while(|n2| n1.max >= n2.min) {
                if n2.max >= n1.min {
                    let pair = (n1.dest, n2.dest);
                    let dest = match newstates.get(&pair) {
                        Some(&q) => q,
                        None => {
                            let q = c.create_state();
                            worklist.push_back(pair);
                            newstates.insert(pair, q);
                            q
                        }
                    };
                    let min = n1.min.max(n2.min);
                    let max = n1.max.min(n2.max);
                    c.add_transition(state, dest, min, max)?;
                }
            }
        }
    }
    c.finish_state();
    remove_dead_states(&c)
}

/// Language of all reversed strings of `a`.
pub fn reverse(a: &Automaton) -> Result<Automaton> {
    Ok(reverse_with_initials(a)?.0)
}

/// [`reverse`], also returning the states of the result that
/// correspond to accept states of the input (reachable from the fresh
/// initial state by epsilon).
pub fn reverse_with_initials(a: &Automaton) -> Result<(Automaton, Vec<i32>)> {
    if is_empty(a) {
        return Ok((Automaton::new(), Vec::new()));
    }
    let num_states = a.num_states();

    let mut builder = Builder::new();
    // State 0 is the fresh initial state; old state s becomes s + 1.
    builder.create_state();
    for _ in 0..num_states {
        builder.create_state();
    }
    builder.set_accept(1, true);

    let mut t = Transition::new();
    for s in 0..num_states {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            builder.add_transition(t.dest + 1, s + 1, t.min, t.max);
        }
    }
    let mut result = builder.finish()?;

    let mut initials = Vec::new();
    for s in a.accept_states().iter_set() {
        let s = s as i32;
        if s >= num_states {
            break;
        }
        result.add_epsilon(0, s + 1)?;
        initials.push(s + 1);
    }
    result.finish_state();
    Ok((result, initials))
}

/// Make the transition relation total: a fresh sink state receives
/// every `(state, symbol)` pair the input leaves undefined, and loops
/// on the full symbol range.
pub fn totalize(a: &Automaton) -> Result<Automaton> {
    let mut result = Automaton::new();
    let num_states = a.num_states();
    for i in 0..num_states {
        result.create_state();
        result.set_accept(i, a.is_accept(i));
    }
    let dead = result.create_state();
    result.add_transition(dead, dead, 0, ALPHA_MAX)?;

    let mut t = Transition::new();
    for i in 0..num_states {
        let mut max_i = 0;
        let count = a.init_transition(i, &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            result.add_transition(i, t.dest, t.min, t.max)?;
            if t.min > max_i {
                result.add_transition(i, dead, max_i, t.min - 1)?;
            }
            if t.max + 1 > max_i {
                max_i = t.max + 1;
            }
        }
        if max_i <= ALPHA_MAX {
            result.add_transition(i, dead, max_i, ALPHA_MAX)?;
        }
    }
    result.finish_state();
    Ok(result)
}

/// Complement over the full symbol range: determinize, totalize, flip
/// accept bits, drop dead states.
pub fn complement(a: &Automaton) -> Result<Automaton> {
    let mut result = totalize(&determinize(a)?)?;
    for p in 0..result.num_states() {
        let accept = result.is_accept(p);
        result.set_accept(p, !accept);
    }
    remove_dead_states(&result)
}

/// Language of `a1` minus the language of `a2`. Both inputs must be
/// deterministic in the sense required by [`complement`]'s pipeline.
pub fn minus(a1: &Automaton, a2: &Automaton) -> Result<Automaton> {
    if is_empty(a1) {
        return Ok(factory::make_empty());
    }
    if is_empty(a2) {
        return Ok(a1.clone());
    }
    intersection(a1, &complement(a2)?)
}

/// States reachable from the initial state.
fn live_states_from_initial(a: &Automaton) -> BitSet {
    let num_states = a.num_states();
    let mut live = BitSet::with_capacity(num_states as usize);
    if num_states == 0 {
        return live;
    }
    let mut worklist = VecDeque::new();
    live.set(0);
    worklist.push_back(0);
    let mut t = Transition::new();
    while let Some(s) = worklist.pop_front() {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            if !live.get(t.dest as usize) {
                live.set(t.dest as usize);
                worklist.push_back(t.dest);
            }
        }
    }
    live
}

/// States from which some accept state is reachable, found by BFS over
/// a reversed copy of the transition graph.
fn live_states_to_accept(a: &Automaton) -> Result<BitSet> {
    let num_states = a.num_states();
    let mut builder = Builder::new();
    for _ in 0..num_states {
        builder.create_state();
    }
    let mut t = Transition::new();
    for s in 0..num_states {
        let count = a.init_transition(s, &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            builder.add_transition(t.dest, s, t.min, t.max);
        }
    }
    let reversed = builder.finish()?;

    let mut live = BitSet::with_capacity(num_states as usize);
    let mut worklist = VecDeque::new();
    for s in a.accept_states().iter_set() {
        if s as i32 >= num_states {
            break;
        }
        live.set(s);
        worklist.push_back(s as i32);
    }
    while let Some(s) = worklist.pop_front() {
        let count = reversed.init_transition(s, &mut t);
        for _ in 0..count {
            reversed.next_transition(&mut t);
            if !live.get(t.dest as usize) {
                live.set(t.dest as usize);
                worklist.push_back(t.dest);
            }
        }
    }
    Ok(live)
}

/// Remove states that are unreachable from the initial state or from
/// which no accept state is reachable, renumbering the survivors
/// densely. An empty language yields a zero-state automaton.
pub fn remove_dead_states(a: &Automaton) -> Result<Automaton> {
    let num_states = a.num_states();
    let from_initial = live_states_from_initial(a);
    let to_accept = live_states_to_accept(a)?;

    let mut live = BitSet::with_capacity(num_states as usize);
    for s in from_initial.iter_set() {
        if to_accept.get(s) {
            live.set(s);
        }
    }

    let mut map = vec![-1i32; num_states as usize];
    let mut result = Automaton::new();
    for i in 0..num_states {
        if live.get(i as usize) {
            map[i as usize] = result.create_state();
            result.set_accept(map[i as usize], a.is_accept(i));
        }
    }
    let mut t = Transition::new();
    for i in 0..num_states {
        if live.get(i as usize) {
            let count = a.init_transition(i, &mut t);
            for _ in 0..count {
                a.next_transition(&mut t);
                if live.get(t.dest as usize) {
                    result.add_transition(map[i as usize], map[t.dest as usize], t.min, t.max)?;
                }
            }
        }
    }
    result.finish_state();
    Ok(result)
}

/// Whether `a` accepts no strings at all.
pub fn is_empty(a: &Automaton) -> bool {
    if a.num_states() == 0 {
        return true;
    }
    if !a.is_accept(0) && a.num_transitions(0) == 0 {
        return true;
    }
    if a.is_accept(0) {
        return false;
    }
    let mut worklist = VecDeque::new();
    let mut seen = BitSet::with_capacity(a.num_states() as usize);
    worklist.push_back(0);
    seen.set(0);
    let mut t = Transition::new();
    while let Some(state) = worklist.pop_front() {
        if a.is_accept(state) {
            return false;
        }
        let count = a.init_transition(state, &mut t);
        for _ in 0..count {
            a.next_transition(&mut t);
            if !seen.get(t.dest as usize) {
                worklist.push_back(t.dest);
                seen.set(t.dest as usize);
            }
        }
    }
    true
}

/// Whether `a` accepts a finite set of strings. A transition reaching
/// a state on the current DFS path closes a cycle, making the language
/// infinite (assuming no dead states on that cycle).
pub fn is_finite(a: &Automaton) -> bool {
    if a.num_states() == 0 {
        return true;
    }
    let mut path = BitSet::with_capacity(a.num_states() as usize);
    let mut visited = BitSet::with_capacity(a.num_states() as usize);
    is_finite_from(a, 0, &mut path, &mut visited)
}

fn is_finite_from(a: &Automaton, state: i32, path: &mut BitSet, visited: &mut BitSet) -> bool {
    path.set(state as usize);
    let count = a.num_transitions(state);
    let mut t = Transition::new();
    for i in 0..count {
        a.get_transition(state, i, &mut t);
        if path.get(t.dest as usize)
            || (!visited.get(t.dest as usize) && !is_finite_from(a, t.dest, path, visited))
        {
            return false;
        }
    }
    path.clear(state as usize);
    visited.set(state as usize);
    true
}

/// Whether the language of `a1` is a subset of the language of `a2`.
///
/// Both inputs must be deterministic and free of dead states.
pub fn subset_of(a1: &Automaton, a2: &Automaton) -> Result<bool> {
    if !a1.is_deterministic() || !a2.is_deterministic() {
        return Err(AutomatonError::NondeterministicInput);
    }
    if a1.num_states() == 0 {
        // The empty language is a subset of every language.
        return Ok(true);
    }
    if a2.num_states() == 0 {
        return Ok(is_empty(a1));
    }

    let transitions1 = sorted_transitions(a1);
    let transitions2 = sorted_transitions(a2);
    let mut worklist: VecDeque<(i32, i32)> = VecDeque::new();
    let mut visited: FxHashSet<(i32, i32)> = FxHashSet::default();
    worklist.push_back((0, 0));
    visited.insert((0, 0));

    while let Some((s1, s2)) = worklist.pop_front() {
        if a1.is_accept(s1) && !a2.is_accept(s2) {
            return Ok(false);
        }
        let t1 = &transitions1[s1 as usize];
        let t2 = &transitions2[s2 as usize];
        let mut b2 = 0usize;
        for n1 in t1 {
            while b2 < t2.len() && t2[b2].max < n1.min {
                b2 += 1;
            }
            // min1..=max1 tracks the part of n1 not yet covered by a2.
            let mut min1 = n1.min;
            let mut max1 = n1.max;
            for n2 in t2[b2..].iter().take_while(|n2| n1.max >= n2.min) {
                if n2.min > min1 {
                    return Ok(false);
                }
                if n2.max < ALPHA_MAX {
                    min1 = n2.max + 1;
                } else {
                    min1 = ALPHA_MAX;
                    max1 = 0;
                }
                let pair = (n1.dest, n2.dest);
                if visited.insert(pair) {
                    worklist.push_back(pair);
                }
            }
            if min1 <= max1 {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// Whether `a1` and `a2` accept exactly the same language.
pub fn same_language(a1: &Automaton, a2: &Automaton) -> Result<bool> {
    let d1 = remove_dead_states(&determinize(a1)?)?;
    let d2 = remove_dead_states(&determinize(a2)?)?;
    Ok(subset_of(&d1, &d2)? && subset_of(&d2, &d1)?)
}

/// Walk `symbols` through `a` from state 0; `true` if the walk ends in
/// an accept state. The input must be deterministic.
pub fn run_symbols(a: &Automaton, symbols: &[i32]) -> bool {
    debug_assert!(a.is_deterministic());
    if a.num_states() == 0 {
        return false;
    }
    let mut state = 0;
    for &symbol in symbols {
        state = a.step(state, symbol);
        if state == -1 {
            return false;
        }
    }
    a.is_accept(state)
}

/// [`run_symbols`] over the 16-bit code units of `text`.
pub fn run(a: &Automaton, text: &str) -> bool {
    debug_assert!(a.is_deterministic());
    if a.num_states() == 0 {
        return false;
    }
    let mut state = 0;
    for unit in text.encode_utf16() {
        state = a.step(state, i32::from(unit));
        if state == -1 {
            return false;
        }
    }
    a.is_accept(state)
}

/// Longest symbol sequence that every accepted string starts with:
/// follow unique single-symbol transitions from state 0 while the
/// current state is non-accepting and not yet visited.
pub fn get_common_prefix(a: &Automaton) -> Vec<i32> {
    let mut prefix = Vec::new();
    let mut visited: FxHashSet<i32> = FxHashSet::default();
    let mut s = 0;
    if a.num_states() == 0 {
        return prefix;
    }
    let mut t = Transition::new();
    loop {
        visited.insert(s);
        if a.is_accept(s) || a.num_transitions(s) != 1 {
            break;
        }
        a.get_transition(s, 0, &mut t);
        if t.min != t.max || visited.contains(&t.dest) {
            break;
        }
        prefix.push(t.min);
        s = t.dest;
    }
    prefix
}

/// Per-state transition lists in (min, max, dest) order.
pub(crate) fn sorted_transitions(a: &Automaton) -> Vec<Vec<Transition>> {
    (0..a.num_states()).map(|s| a.transitions_of(s)).collect()
}
