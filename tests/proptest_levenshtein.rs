//! Property-based tests cross-validating the Levenshtein automata
//! against the dynamic-programming distances.
//!
//! Small alphabets are deliberate: with only three distinct symbols,
//! random word/candidate pairs land within distance 2 of each other
//! often enough to exercise both accept and reject paths, and repeated
//! characters stress the characteristic-vector handling.

use libautomata::automaton::compiled::CompiledAutomaton;
use libautomata::automaton::determinize::determinize;
use libautomata::automaton::minimize::minimize;
use libautomata::automaton::operations::{run, same_language};
use libautomata::distance::{standard_distance, transposition_distance};
use libautomata::levenshtein::LevenshteinAutomata;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn accepts_iff_within_standard_distance(
        word in "[a-c]{0,7}",
        candidate in "[a-c]{0,9}",
        n in 1u32..=2,
    ) {
        let automata = LevenshteinAutomata::new(&word, false).unwrap();
        let dfa = automata.to_automaton(n).unwrap();
        let expected = standard_distance(&word, &candidate) <= n as usize;
        prop_assert_eq!(
            run(&dfa, &candidate),
            expected,
            "word={:?} candidate={:?} n={}",
            word,
            candidate,
            n
        );
    }

    #[test]
    fn accepts_iff_within_transposition_distance(
        word in "[a-c]{0,7}",
        candidate in "[a-c]{0,9}",
        n in 1u32..=2,
    ) {
        let automata = LevenshteinAutomata::new(&word, true).unwrap();
        let dfa = automata.to_automaton(n).unwrap();
        let expected = transposition_distance(&word, &candidate) <= n as usize;
        prop_assert_eq!(
            run(&dfa, &candidate),
            expected,
            "word={:?} candidate={:?} n={}",
            word,
            candidate,
            n
        );
    }

    #[test]
    fn word_always_matches_itself(
        word in "[a-e]{0,8}",
        n in 0u32..=2,
        transpositions: bool,
    ) {
        let automata = LevenshteinAutomata::new(&word, transpositions).unwrap();
        let dfa = automata.to_automaton(n).unwrap();
        prop_assert!(run(&dfa, &word));
    }

    #[test]
    fn pipeline_stages_agree(
        word in "[a-c]{0,6}",
        candidate in "[a-c]{0,8}",
        n in 1u32..=2,
        transpositions: bool,
    ) {
        let automata = LevenshteinAutomata::new(&word, transpositions).unwrap();
        let raw = automata.to_automaton(n).unwrap();
        let minimal = minimize(&raw).unwrap();
        let compiled = CompiledAutomaton::new(&minimal).unwrap();
        let expected = run(&raw, &candidate);
        prop_assert_eq!(run(&minimal, &candidate), expected);
        prop_assert_eq!(compiled.matches(&candidate), expected);
    }

    #[test]
    fn determinize_preserves_random_unions(
        words in prop::collection::vec("[a-b]{0,4}", 1..5),
    ) {
        use libautomata::automaton::factory::make_string;
        use libautomata::automaton::operations::union;

        let built: Vec<_> = words.iter().map(|w| make_string(w).unwrap()).collect();
        let refs: Vec<_> = built.iter().collect();
        let u = union(&refs).unwrap();
        let d = determinize(&u).unwrap();
        prop_assert!(d.is_deterministic());
        prop_assert!(same_language(&u, &d).unwrap());
        for word in &words {
            prop_assert!(run(&d, word));
        }
    }

    #[test]
    fn distance_zero_is_exact(
        word in "[a-c]{0,6}",
        candidate in "[a-c]{0,6}",
    ) {
        let automata = LevenshteinAutomata::new(&word, false).unwrap();
        let dfa = automata.to_automaton(0).unwrap();
        prop_assert_eq!(run(&dfa, &candidate), word == candidate);
    }
}
