//! Compile-and-match benchmarks.
//!
//! Two costs matter in practice: compiling one automaton per query,
//! and testing millions of candidates against it. The candidate set
//! below mixes early rejections with full walks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use libautomata::automaton::compiled::CompiledAutomaton;
use libautomata::automaton::minimize::minimize;
use libautomata::levenshtein::LevenshteinAutomata;

fn candidates() -> Vec<String> {
    let stems = [
        "information", "informatoin", "infomration", "informal", "informant", "transformation",
        "misinformation", "info", "formation", "informative", "xyzzy", "informatio",
    ];
    let mut out = Vec::with_capacity(stems.len() * 8);
    for _ in 0..8 {
        out.extend(stems.iter().map(|s| s.to_string()));
    }
    out
}

fn bench_compile(c: &mut Criterion) {
    let automata = LevenshteinAutomata::new("information", true).unwrap();
    c.bench_function("compile_lev1_dfa", |b| {
        b.iter(|| {
            let dfa = automata.to_automaton(black_box(1)).unwrap();
            black_box(dfa.num_states())
        })
    });
    c.bench_function("compile_lev2_minimal_matcher", |b| {
        b.iter(|| {
            let dfa = automata.to_automaton(black_box(2)).unwrap();
            let minimal = minimize(&dfa).unwrap();
            black_box(CompiledAutomaton::new(&minimal).unwrap())
        })
    });
}

fn bench_match(c: &mut Criterion) {
    let automata = LevenshteinAutomata::new("information", true).unwrap();
    let dfa = minimize(&automata.to_automaton(2).unwrap()).unwrap();
    let matcher = CompiledAutomaton::new(&dfa).unwrap();
    let candidates = candidates();
    c.bench_function("match_candidate_batch", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for candidate in &candidates {
                if matcher.matches(black_box(candidate)) {
                    hits += 1;
                }
            }
            black_box(hits)
        })
    });
}

criterion_group!(benches, bench_compile, bench_match);
criterion_main!(benches);
