//! Subset construction.
//!
//! Converts any automaton into a deterministic equivalent. Instead of
//! stepping one symbol at a time, each subset's outgoing transitions
//! are collated into start/end events at their interval endpoints and
//! swept left to right; between two consecutive points the set of live
//! destination states is constant, so one DFA transition covers the
//! whole gap.

use super::int_set::{FrozenIntSet, SortedIntSet};
use super::{Automaton, Builder, Transition};
use crate::error::Result;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

/// Point count at which the event container switches from a linear
/// array to a hash map, mirroring the `SortedIntSet` cutover.
const POINT_MAP_CUTOVER: usize = 30;

/// Start/end events at one sweep point.
#[derive(Debug, Default)]
struct PointTransitions {
    point: i32,
    /// Destinations of transitions whose interval ends at `point - 1`.
    ends: Vec<i32>,
    /// Destinations of transitions whose interval starts at `point`.
    starts: Vec<i32>,
}

/// Pooled set of sweep points for one subset.
#[derive(Debug, Default)]
struct PointTransitionSet {
    points: Vec<PointTransitions>,
    count: usize,
    map: FxHashMap<i32, usize>,
    use_hash: bool,
}

impl PointTransitionSet {
    fn len(&self) -> usize {
        self.count
    }

    fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn point(&self, i: usize) -> i32 {
        self.points[i].point
    }

    fn ends(&self, i: usize) -> &[i32] {
        &self.points[i].ends
    }

    fn starts(&self, i: usize) -> &[i32] {
        &self.points[i].starts
    }

    /// Claim the next pooled slot for `point`.
    fn next_slot(&mut self, point: i32) -> usize {
        let i = self.count;
        if i == self.points.len() {
            self.points.push(PointTransitions::default());
        }
        let slot = &mut self.points[i];
        slot.point = point;
        slot.ends.clear();
        slot.starts.clear();
        self.count += 1;
        i
    }

    fn find(&mut self, point: i32) -> usize {
        if self.use_hash {
            if let Some(&i) = self.map.get(&point) {
                return i;
            }
            let i = self.next_slot(point);
            self.map.insert(point, i);
            i
        } else {
            for i in 0..self.count {
                if self.points[i].point == point {
                    return i;
                }
            }
            let i = self.next_slot(point);
            if self.count == POINT_MAP_CUTOVER {
                self.map.clear();
                for (j, p) in self.points[..self.count].iter().enumerate() {
                    self.map.insert(p.point, j);
                }
                self.use_hash = true;
            }
            i
        }
    }

    /// Record `t` as a start event at `t.min` and an end event at
    /// `t.max + 1`.
    fn add(&mut self, t: &Transition) {
        let dest = t.dest;
        let start = self.find(t.min);
        self.points[start].starts.push(dest);
        let end = self.find(t.max + 1);
        self.points[end].ends.push(dest);
    }

    fn sort(&mut self) {
        self.points[..self.count].sort_unstable_by_key(|p| p.point);
    }

    /// Clear for the next subset, keeping the pooled slots.
    fn reset(&mut self) {
        if self.use_hash {
            self.map.clear();
            self.use_hash = false;
        }
        self.count = 0;
    }
}

/// Determinize `a` via subset construction. An already-deterministic
/// automaton (or one with at most one state) is returned unchanged.
pub fn determinize(a: &Automaton) -> Result<Automaton> {
    if a.is_deterministic() || a.num_states() <= 1 {
        return Ok(a.clone());
    }

    let mut b = Builder::new();
    b.create_state();
    b.set_accept(0, a.is_accept(0));

    let initial = FrozenIntSet::single(0, 0);
    let mut worklist: VecDeque<FrozenIntSet> = VecDeque::new();
    let mut newstate: FxHashMap<FrozenIntSet, i32> = FxHashMap::default();
    worklist.push_back(initial.clone());
    newstate.insert(initial, 0);

    let mut points = PointTransitionSet::default();
    let mut states_set = SortedIntSet::with_capacity(5);
    let mut t = Transition::new();

    while let Some(s) = worklist.pop_front() {
        let r = s.state();

        // Collate every outgoing transition of the subset into
        // start/end events.
        for &s0 in s.values() {
            let count = a.init_transition(s0, &mut t);
            for _ in 0..count {
                a.next_transition(&mut t);
                points.add(&t);
            }
        }
        if points.is_empty() {
            continue;
        }
        points.sort();

        let mut last_point = -1;
        let mut acc_count = 0i32;
        for i in 0..points.len() {
            let point = points.point(i);

            if !states_set.is_empty() {
                debug_assert!(last_point != -1);
                states_set.compute_hash();
                let frozen = states_set.freeze(b.num_states());
                let q = match newstate.get(&frozen) {
                    Some(&q) => {
                        debug_assert_eq!(acc_count > 0, b.is_accept(q));
                        q
                    }
                    None => {
                        let q = b.create_state();
                        debug_assert_eq!(q, frozen.state());
                        b.set_accept(q, acc_count > 0);
                        worklist.push_back(frozen.clone());
                        newstate.insert(frozen, q);
                        q
                    }
                };
                b.add_transition(r, q, last_point, point - 1);
            }

            // Close intervals ending here before opening the ones
            // starting here.
            for &dest in points.ends(i) {
                states_set.decr(dest);
                if a.is_accept(dest) {
                    acc_count -= 1;
                }
            }
            for &dest in points.starts(i) {
                states_set.incr(dest);
                if a.is_accept(dest) {
                    acc_count += 1;
                }
            }
            last_point = point;
        }
        points.reset();
        assert!(
            states_set.is_empty(),
            "determinize: live set non-empty after subset sweep"
        );
        assert_eq!(acc_count, 0, "determinize: accept count out of balance");
    }

    let result = b.finish()?;
    debug_assert!(result.is_deterministic());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::operations::{run, run_symbols, same_language, union};
    use crate::automaton::factory::make_string;

    fn assert_disjoint_sorted(a: &Automaton) {
        for s in 0..a.num_states() {
            let ts = a.transitions_of(s);
            for w in ts.windows(2) {
                assert!(
                    w[0].max < w[1].min,
                    "state {} has overlapping or unsorted intervals",
                    s
                );
            }
        }
    }

    #[test]
    fn test_determinize_overlapping_intervals() {
        // 0 --[a-c]--> 1, 0 --[b-d]--> 0, accept {1}: the language is
        // [b-d]* [a-c].
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let s1 = a.create_state();
        a.set_accept(s1, true);
        a.add_transition(s0, s1, 'a' as i32, 'c' as i32).unwrap();
        a.add_transition(s0, s0, 'b' as i32, 'd' as i32).unwrap();
        a.finish_state();
        assert!(!a.is_deterministic());

        let d = determinize(&a).unwrap();
        assert!(d.is_deterministic());
        assert_disjoint_sorted(&d);

        assert!(run(&d, "a"));
        assert!(run(&d, "ba"));
        assert!(run(&d, "dbc"));
        assert!(!run(&d, "ab"));
        assert!(!run(&d, "d"));
        assert!(!run(&d, ""));
    }

    #[test]
    fn test_determinize_union() {
        let u = union(&[
            &make_string("ab").unwrap(),
            &make_string("ac").unwrap(),
            &make_string("b").unwrap(),
        ])
        .unwrap();
        let d = determinize(&u).unwrap();
        assert!(d.is_deterministic());
        assert_disjoint_sorted(&d);
        for (text, expected) in [("ab", true), ("ac", true), ("b", true), ("a", false), ("bc", false)] {
            assert_eq!(run(&d, text), expected, "input {:?}", text);
        }
        assert!(same_language(&u, &d).unwrap());
    }

    #[test]
    fn test_determinize_deterministic_input_unchanged() {
        let a = make_string("abc").unwrap();
        let d = determinize(&a).unwrap();
        assert_eq!(d.num_states(), a.num_states());
        assert!(run(&d, "abc"));
    }

    #[test]
    fn test_determinize_wide_alphabet() {
        // Many distinct symbols from one subset exercises the
        // point-container hash cutover.
        let mut a = Automaton::new();
        let s0 = a.create_state();
        let mut dests = Vec::new();
        for i in 0..40 {
            let d = a.create_state();
            a.set_accept(d, true);
            dests.push((d, 100 + 10 * i));
        }
        for &(d, sym) in &dests {
            a.add_transition(s0, d, sym, sym + 15).unwrap();
        }
        a.finish_state();
        assert!(!a.is_deterministic());

        let d = determinize(&a).unwrap();
        assert_disjoint_sorted(&d);
        for &(_, sym) in &dests {
            assert!(run_symbols(&d, &[sym]));
            assert!(run_symbols(&d, &[sym + 12]));
        }
        assert!(!run_symbols(&d, &[99]));
        assert!(!run_symbols(&d, &[100 + 10 * 40 + 20]));
    }
}
