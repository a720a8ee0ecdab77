//! Algebraic laws over the automaton operations.

use libautomata::automaton::compiled::CompiledAutomaton;
use libautomata::automaton::determinize::determinize;
use libautomata::automaton::factory::{make_char_range, make_string};
use libautomata::automaton::minimize::minimize;
use libautomata::automaton::operations::{
    complement, concatenate, intersection, is_empty, is_finite, optional, remove_dead_states,
    repeat, reverse, run, same_language, subset_of, totalize, union,
};
use libautomata::automaton::Automaton;
use std::collections::HashSet;

/// A mildly interesting fixture: (ab|abc|cd)* ∪ x?
fn fixture() -> Automaton {
    let ab = make_string("ab").unwrap();
    let abc = make_string("abc").unwrap();
    let cd = make_string("cd").unwrap();
    let u = union(&[&ab, &abc, &cd]).unwrap();
    let star = repeat(&u).unwrap();
    let x = optional(&make_string("x").unwrap()).unwrap();
    union(&[&star, &x]).unwrap()
}

fn sample_inputs() -> Vec<String> {
    ["", "ab", "abc", "cd", "x", "ba", "abab", "abccd", "cdab", "xx", "abx"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn determinize_is_idempotent_on_language() {
    let a = fixture();
    let d1 = determinize(&a).unwrap();
    let d2 = determinize(&d1).unwrap();
    assert!(d1.is_deterministic());
    assert!(d2.is_deterministic());
    assert!(same_language(&a, &d1).unwrap());
    assert!(same_language(&d1, &d2).unwrap());
}

#[test]
fn minimize_preserves_language() {
    let a = fixture();
    let m = minimize(&a).unwrap();
    assert!(same_language(&a, &m).unwrap());
    let d = determinize(&a).unwrap();
    for input in sample_inputs() {
        assert_eq!(run(&m, &input), run(&d, &input), "input {:?}", input);
    }
}

/// Whether two states of a deterministic automaton accept the same
/// language, by a product walk over the start-point classes. State −1
/// is the implicit dead sink.
fn states_equivalent(a: &Automaton, s1: i32, s2: i32) -> bool {
    let points = a.get_start_points();
    let mut seen: HashSet<(i32, i32)> = HashSet::new();
    let mut stack = vec![(s1, s2)];
    while let Some((p, q)) = stack.pop() {
        if !seen.insert((p, q)) {
            continue;
        }
        let p_accepts = p != -1 && a.is_accept(p);
        let q_accepts = q != -1 && a.is_accept(q);
        if p_accepts != q_accepts {
            return false;
        }
        if p == -1 && q == -1 {
            continue;
        }
        for &point in &points {
            let pd = if p == -1 { -1 } else { a.step(p, point) };
            let qd = if q == -1 { -1 } else { a.step(q, point) };
            if (pd, qd) != (-1, -1) {
                stack.push((pd, qd));
            }
        }
    }
    true
}

#[test]
fn minimize_leaves_no_equivalent_state_pair() {
    for a in [
        fixture(),
        union(&[
            &make_string("ab").unwrap(),
            &make_string("ab").unwrap(),
            &make_string("ac").unwrap(),
        ])
        .unwrap(),
    ] {
        let m = minimize(&a).unwrap();
        for s1 in 0..m.num_states() {
            for s2 in (s1 + 1)..m.num_states() {
                assert!(
                    !states_equivalent(&m, s1, s2),
                    "states {} and {} accept the same language",
                    s1,
                    s2
                );
            }
        }
    }
}

#[test]
fn reverse_twice_is_identity_on_language() {
    let a = fixture();
    let back = reverse(&reverse(&a).unwrap()).unwrap();
    assert!(same_language(&a, &back).unwrap());
}

#[test]
fn reverse_flips_concatenation() {
    let ab = make_string("ab").unwrap();
    let cd = make_string("cd").unwrap();
    let abcd = concatenate(&[&ab, &cd]).unwrap();
    let dcba = determinize(&reverse(&abcd).unwrap()).unwrap();
    assert!(run(&dcba, "dcba"));
    assert!(!run(&dcba, "abcd"));
}

#[test]
fn subset_and_same_language_are_reflexive() {
    let d = remove_dead_states(&determinize(&fixture()).unwrap()).unwrap();
    assert!(subset_of(&d, &d).unwrap());
    assert!(same_language(&d, &d).unwrap());
}

#[test]
fn complement_partitions_the_universe() {
    let a = fixture();
    let not_a = complement(&a).unwrap();
    assert!(is_empty(&intersection(&a, &not_a).unwrap()));
    let d = determinize(&a).unwrap();
    for input in sample_inputs() {
        assert_ne!(run(&d, &input), run(&not_a, &input), "input {:?}", input);
    }
}

#[test]
fn totalize_preserves_language() {
    let a = determinize(&fixture()).unwrap();
    let total = totalize(&a).unwrap();
    assert!(same_language(&a, &total).unwrap());
}

#[test]
fn compiled_matcher_equals_run() {
    let d = determinize(&fixture()).unwrap();
    let compiled = CompiledAutomaton::new(&d).unwrap();
    for input in sample_inputs() {
        assert_eq!(compiled.matches(&input), run(&d, &input), "input {:?}", input);
    }
}

#[test]
fn finiteness_follows_structure() {
    assert!(is_finite(&make_string("finite").unwrap()));
    assert!(!is_finite(&repeat(&make_string("ab").unwrap()).unwrap()));
    let finite_union = union(&[&make_string("a").unwrap(), &make_string("bc").unwrap()]).unwrap();
    assert!(is_finite(&finite_union));
}

#[test]
fn char_range_respects_bounds() {
    let digits = make_char_range('0' as i32, '9' as i32).unwrap();
    assert!(run(&digits, "5"));
    assert!(!run(&digits, "a"));
    assert!(!run(&digits, "55"));
}
