//! Constructors for primitive automata.

use super::{Automaton, ALPHA_MAX};
use crate::error::Result;

/// Automaton accepting no strings at all.
pub fn make_empty() -> Automaton {
    let mut a = Automaton::new();
    a.create_state();
    a.finish_state();
    a
}

/// Automaton accepting only the empty string.
pub fn make_empty_string() -> Automaton {
    let mut a = Automaton::new();
    let s = a.create_state();
    a.set_accept(s, true);
    a.finish_state();
    a
}

/// Automaton accepting every string, including the empty one.
pub fn make_any_string() -> Result<Automaton> {
    let mut a = Automaton::new();
    let s = a.create_state();
    a.set_accept(s, true);
    a.add_transition(s, s, 0, ALPHA_MAX)?;
    a.finish_state();
    Ok(a)
}

/// Automaton accepting any single symbol.
pub fn make_any_char() -> Result<Automaton> {
    make_char_range(0, ALPHA_MAX)
}

/// Automaton accepting exactly the one-symbol string `c`.
pub fn make_char(c: i32) -> Result<Automaton> {
    make_char_range(c, c)
}

/// Automaton accepting any one-symbol string in `[min, max]`.
pub fn make_char_range(min: i32, max: i32) -> Result<Automaton> {
    if min > max {
        return Ok(make_empty());
    }
    let mut a = Automaton::new();
    let s0 = a.create_state();
    let s1 = a.create_state();
    a.set_accept(s1, true);
    a.add_transition(s0, s1, min, max)?;
    a.finish_state();
    Ok(a)
}

/// Automaton accepting exactly the given symbol sequence.
pub fn make_string_symbols(symbols: &[i32]) -> Result<Automaton> {
    let mut a = Automaton::with_capacity(symbols.len() + 1, symbols.len());
    let mut last = a.create_state();
    for &symbol in symbols {
        let next = a.create_state();
        a.add_transition(last, next, symbol, symbol)?;
        last = next;
    }
    a.set_accept(last, true);
    a.finish_state();
    Ok(a)
}

/// Automaton accepting exactly `text`, treated as a sequence of 16-bit
/// code units.
pub fn make_string(text: &str) -> Result<Automaton> {
    let symbols: Vec<i32> = text.encode_utf16().map(i32::from).collect();
    make_string_symbols(&symbols)
}
