//! Low-level building blocks: packed-field access, bitsets, sorting.

pub(crate) mod bits;
mod bitset;
pub(crate) mod sorter;

pub use bitset::{BitSet, SetBits};
