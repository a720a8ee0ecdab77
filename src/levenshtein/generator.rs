//! Parametric-state enumeration for the Levenshtein descriptions.
//!
//! A parametric state is a subsumption-reduced set of positions
//! `(index, errors)` relative to a base offset in the query word, plus
//! a transposition-in-progress flag on positions of the transposing
//! variants. Enumerating every reachable state once per distance
//! `n ∈ {1, 2}` (and per transpose flag) yields the finite tables the
//! word-specific automaton builder consults; the word length only
//! scales the offset arithmetic.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// One Levenshtein position relative to the state's base offset.
///
/// `special` marks a transposition in progress: the first character of
/// a swapped pair has been consumed and the position completes by
/// matching `word[index]` next, jumping two word characters at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Position {
    /// Word characters consumed, relative to the base offset.
    pub index: i32,
    /// Accumulated edit operations.
    pub errors: i32,
    /// Transposition in progress.
    pub special: bool,
}

impl Position {
    fn new(index: i32, errors: i32) -> Self {
        Self {
            index,
            errors,
            special: false,
        }
    }

    fn new_special(index: i32, errors: i32) -> Self {
        Self {
            index,
            errors,
            special: true,
        }
    }
}

/// A subsumption-reduced, sorted set of positions.
pub(crate) type State = SmallVec<[Position; 8]>;

/// Whether every candidate reachable from `rhs` is also reachable from
/// `lhs`, so `rhs` can be dropped from any state containing `lhs`.
///
/// The cross-type rules are strict in the error count: a transposition
/// in progress and a normal position with the same error count follow
/// different continuations, so neither may swallow the other.
fn subsumes(lhs: Position, rhs: Position, n: i32) -> bool {
    let (i, e) = (lhs.index, lhs.errors);
    let (j, f) = (rhs.index, rhs.errors);
    if e > f {
        return false;
    }
    match (lhs.special, rhs.special) {
        (false, false) => (i - j).abs() <= f - e,
        (true, true) => i == j,
        (false, true) => {
            let adjusted = if j < i { i - j - 1 } else { j - i + 1 };
            e < f && adjusted <= f - e
        }
        (true, false) => e < f && i == j && f == n,
    }
}

/// Insert `position` into the sorted state unless it is subsumed;
/// evict anything it subsumes.
fn insert(state: &mut State, position: Position, n: i32) {
    for existing in state.iter() {
        if subsumes(*existing, position, n) {
            return;
        }
    }
    state.retain(|p| !subsumes(position, *p, n));
    let at = state.binary_search(&position).unwrap_or_else(|at| at);
    state.insert(at, position);
}

/// Characteristic-vector bit `j`: 1 iff `word[base + j]` equals the
/// consumed input character. Bits are packed first-position-highest;
/// out-of-window indices read as 0.
#[inline]
fn chi(vector: u32, len: i32, j: i32) -> bool {
    j >= 0 && j < len && (vector >> (len - 1 - j)) & 1 != 0
}

/// Smallest remaining-character count at which a state is meaningful:
/// every normal position must fit in the word tail, and a pending
/// transposition needs two characters.
pub(crate) fn required_tail(state: &State) -> i32 {
    state
        .iter()
        .map(|p| if p.special { p.index + 2 } else { p.index })
        .max()
        .unwrap_or(0)
}

/// Minimum of `errors − index` over the normal positions, or `n + 1`
/// if the state has none. A state at offset `o` in a word of length
/// `w` accepts iff `w − o + min_errors ≤ n` (the word tail can be
/// deleted within budget).
pub(crate) fn min_errors(state: &State, n: i32) -> i32 {
    state
        .iter()
        .filter(|p| !p.special)
        .map(|p| p.errors - p.index)
        .min()
        .unwrap_or(n + 1)
}

/// Transition a state on one input character.
///
/// `len` is the characteristic-vector length: the number of word
/// characters visible from the base offset, capped at `2n + 1`.
/// Returns the offset increment and the normalized successor, or
/// `None` when every position dies.
pub(crate) fn transition(
    state: &State,
    len: i32,
    vector: u32,
    n: i32,
    transpose: bool,
) -> Option<(i32, State)> {
    let mut next = State::new();
    for &p in state {
        let (i, e) = (p.index, p.errors);
        if p.special {
            // Complete the swap: the input character must match the
            // earlier of the two transposed word characters.
            if chi(vector, len, i) {
                insert(&mut next, Position::new(i + 2, e), n);
            }
            continue;
        }
        if chi(vector, len, i) {
            insert(&mut next, Position::new(i + 1, e), n);
        }
        if e < n {
            // Insertion: absorb the input character, stay put.
            insert(&mut next, Position::new(i, e + 1), n);
            if i < len {
                insert(&mut next, Position::new(i + 1, e + 1), n);
            }
            // Delete j word characters, then match.
            for j in 1..=(n - e) {
                if chi(vector, len, i + j) {
                    insert(&mut next, Position::new(i + j + 1, e + j), n);
                }
            }
            if transpose && chi(vector, len, i + 1) {
                insert(&mut next, Position::new_special(i, e + 1), n);
            }
        }
    }
    if next.is_empty() {
        return None;
    }
    let incr = next.iter().map(|p| p.index).min().unwrap_or(0);
    if incr > 0 {
        for p in next.iter_mut() {
            p.index -= incr;
        }
    }
    Some((incr, next))
}

/// Enumerate every reachable parametric state for distance `n`,
/// ordered so the states valid with `d` characters remaining occupy a
/// prefix of the numbering (`required_tail` ascending, discovery order
/// within ties).
pub(crate) fn enumerate_states(n: i32, transpose: bool) -> Vec<State> {
    let max_len = 2 * n + 1;
    let mut states: Vec<State> = Vec::new();
    let mut seen: FxHashSet<State> = FxHashSet::default();

    let start: State = SmallVec::from_slice(&[Position::new(0, 0)]);
    seen.insert(start.clone());
    states.push(start);

    let mut at = 0;
    while at < states.len() {
        let state = states[at].clone();
        at += 1;
        let req = required_tail(&state);
        for len in req..=max_len {
            for vector in 0..(1u32 << len) {
                if let Some((_, successor)) = transition(&state, len, vector, n, transpose) {
                    if seen.insert(successor.clone()) {
                        states.push(successor);
                    }
                }
            }
        }
    }

    // Stable sort keeps discovery order within each tail class, so the
    // start state stays at index 0.
    states.sort_by_key(required_tail);
    states
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normal(index: i32, errors: i32) -> Position {
        Position::new(index, errors)
    }

    fn state_of(positions: &[Position]) -> State {
        let mut state = State::new();
        for &p in positions {
            state.push(p);
        }
        state
    }

    #[test]
    fn test_subsumption_standard() {
        let n = 2;
        assert!(subsumes(normal(5, 2), normal(5, 3), n));
        assert!(subsumes(normal(5, 2), normal(4, 3), n));
        assert!(subsumes(normal(3, 2), normal(3, 2), n));
        assert!(!subsumes(normal(3, 3), normal(5, 2), n));
        assert!(!subsumes(normal(0, 0), normal(2, 1), n));
    }

    #[test]
    fn test_subsumption_transposition() {
        let n = 2;
        // Both special: same index only.
        assert!(subsumes(Position::new_special(5, 1), Position::new_special(5, 2), n));
        assert!(!subsumes(Position::new_special(5, 1), Position::new_special(6, 2), n));
        // Normal over special: strict error gap with the shifted index rule.
        assert!(subsumes(normal(5, 1), Position::new_special(4, 2), n));
        assert!(!subsumes(normal(5, 1), Position::new_special(6, 2), n));
        // Equal error counts never cross the type boundary.
        assert!(!subsumes(normal(1, 1), Position::new_special(0, 1), n));
        assert!(!subsumes(Position::new_special(0, 1), normal(0, 1), n));
        // Special over normal: only at the error ceiling, same index.
        assert!(subsumes(Position::new_special(3, 1), normal(3, 2), 2));
        assert!(!subsumes(Position::new_special(3, 1), normal(4, 2), 2));
    }

    #[test]
    fn test_transition_match_collapses_to_start() {
        // From {(0,0)} at n=1, any vector with the first bit set
        // returns the start state shifted by one.
        let start = state_of(&[normal(0, 0)]);
        for vector in [0b100, 0b101, 0b110, 0b111] {
            let (incr, next) = transition(&start, 3, vector, 1, false).unwrap();
            assert_eq!(incr, 1);
            assert_eq!(next, start);
        }
    }

    #[test]
    fn test_transition_mismatch_and_deletion() {
        let start = state_of(&[normal(0, 0)]);
        // No match anywhere: insertion + substitution survive.
        let (incr, next) = transition(&start, 3, 0b000, 1, false).unwrap();
        assert_eq!(incr, 0);
        assert_eq!(next, state_of(&[normal(0, 1), normal(1, 1)]));
        // Match one past the cursor: the deletion position appears too.
        let (incr, next) = transition(&start, 3, 0b010, 1, false).unwrap();
        assert_eq!(incr, 0);
        assert_eq!(next, state_of(&[normal(0, 1), normal(1, 1), normal(2, 1)]));
    }

    #[test]
    fn test_transition_at_word_end() {
        // One character remaining, no match: only insertion survives.
        let start = state_of(&[normal(0, 0)]);
        let (incr, next) = transition(&start, 1, 0b0, 1, false).unwrap();
        assert_eq!(incr, 0);
        assert_eq!(next, state_of(&[normal(0, 1), normal(1, 1)]));

        // Zero characters remaining: insertion only, and at the error
        // ceiling the state dies.
        let exhausted = state_of(&[normal(0, 1)]);
        assert!(transition(&exhausted, 0, 0, 1, false).is_none());
        let (_, next) = transition(&state_of(&[normal(0, 0)]), 0, 0, 1, false).unwrap();
        assert_eq!(next, state_of(&[normal(0, 1)]));
    }

    #[test]
    fn test_transposition_creates_and_completes_special() {
        let start = state_of(&[normal(0, 0)]);
        // Next word character matches: a swap may have started.
        let (incr, next) = transition(&start, 3, 0b010, 1, true).unwrap();
        assert_eq!(incr, 0);
        assert!(next.contains(&Position::new_special(0, 1)));
        // Completing the swap consumes two word characters at cost 1.
        let (incr, done) = transition(&next, 3, 0b100, 1, true).unwrap();
        assert!(done.contains(&normal(2 - incr, 1)));
    }

    #[test]
    fn test_enumerate_lev1_matches_known_layout() {
        let states = enumerate_states(1, false);
        let expected: Vec<State> = vec![
            state_of(&[normal(0, 0)]),
            state_of(&[normal(0, 1)]),
            state_of(&[normal(0, 1), normal(1, 1)]),
            state_of(&[normal(0, 1), normal(1, 1), normal(2, 1)]),
            state_of(&[normal(0, 1), normal(2, 1)]),
        ];
        assert_eq!(states, expected);
        // Tail-class sizes 2 / 3 / 5 / 5.
        let counts: Vec<usize> = (0..=3)
            .map(|d| states.iter().filter(|s| required_tail(s) <= d).count())
            .collect();
        assert_eq!(counts, vec![2, 3, 5, 5]);
        // minErrors per state: 0, 1, 0, −1, −1.
        let errs: Vec<i32> = states.iter().map(|s| min_errors(s, 1)).collect();
        assert_eq!(errs, vec![0, 1, 0, -1, -1]);
    }

    #[test]
    fn test_enumerate_lev1_transpose_layout() {
        let states = enumerate_states(1, true);
        assert_eq!(states.len(), 6);
        // The one extra state holds a pending transposition.
        assert_eq!(
            states.iter().filter(|s| s.iter().any(|p| p.special)).count(),
            1
        );
        let counts: Vec<usize> = (0..=3)
            .map(|d| states.iter().filter(|s| required_tail(s) <= d).count())
            .collect();
        assert_eq!(counts, vec![2, 3, 6, 6]);
    }

    #[test]
    fn test_enumerate_lev2_sizes() {
        let standard = enumerate_states(2, false);
        assert_eq!(standard.len(), 30);
        let transposing = enumerate_states(2, true);
        assert!(transposing.len() > standard.len());
        assert!(transposing.len() <= 100);
        // Start state first in both.
        assert_eq!(standard[0], state_of(&[normal(0, 0)]));
        assert_eq!(transposing[0], state_of(&[normal(0, 0)]));
    }

    #[test]
    fn test_successors_stay_enumerated() {
        // Closure check: every transition from every state at every
        // level lands on an enumerated state.
        for (n, transpose) in [(1, false), (1, true), (2, false), (2, true)] {
            let states = enumerate_states(n, transpose);
            let known: FxHashSet<State> = states.iter().cloned().collect();
            for state in &states {
                for len in required_tail(state)..=(2 * n + 1) {
                    for vector in 0..(1u32 << len) {
                        if let Some((incr, successor)) =
                            transition(state, len, vector, n, transpose)
                        {
                            assert!(known.contains(&successor));
                            assert!(incr >= 0 && incr <= len);
                            if len < 2 * n + 1 {
                                // Successors fit in the shrunken tail.
                                assert!(required_tail(&successor) <= len - incr);
                            }
                        }
                    }
                }
            }
        }
    }
}
