//! Integer multisets keyed by a shared hash protocol.
//!
//! The determinizer tracks the set of live NFA states as a sorted
//! multiset ([`SortedIntSet`]) and keys its subset→DFA-state table by
//! immutable snapshots ([`FrozenIntSet`]). Both hash by the same rule
//! — start from the element count, then fold `h = 683·h + v` over the
//! elements in ascending order — so a live set can be matched against
//! previously frozen ones.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// Distinct-element count at which the multiset switches from the
/// sorted-array representation to an ordered map.
const MAP_CUTOVER: usize = 30;

/// Multiplier of the integer-set hash protocol.
const HASH_PRIME: u64 = 683;

/// A mutable sorted multiset of state numbers.
///
/// Small sets (fewer than 30 distinct elements) are parallel sorted
/// `(value, count)` arrays; larger sets use a `BTreeMap`. Emptying the
/// map representation reverts to the arrays.
#[derive(Debug, Default)]
pub(crate) struct SortedIntSet {
    values: Vec<i32>,
    counts: Vec<i32>,
    map: BTreeMap<i32, i32>,
    use_map: bool,
    hash: u64,
}

impl SortedIntSet {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            counts: Vec::with_capacity(capacity),
            map: BTreeMap::new(),
            use_map: false,
            hash: 0,
        }
    }

    /// Number of distinct elements.
    pub(crate) fn len(&self) -> usize {
        if self.use_map {
            self.map.len()
        } else {
            self.values.len()
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `v` or bump its count.
    pub(crate) fn incr(&mut self, v: i32) {
        if self.use_map {
            *self.map.entry(v).or_insert(0) += 1;
            return;
        }
        match self.values.binary_search(&v) {
            Ok(i) => self.counts[i] += 1,
            Err(i) => {
                self.values.insert(i, v);
                self.counts.insert(i, 1);
                if self.values.len() == MAP_CUTOVER {
                    self.switch_to_map();
                }
            }
        }
    }

    /// Decrement `v`'s count, erasing it at zero. Decrementing an
    /// absent value is a contract violation.
    pub(crate) fn decr(&mut self, v: i32) {
        if self.use_map {
            let count = self
                .map
                .get_mut(&v)
                .unwrap_or_else(|| panic!("decr of absent value {}", v));
            *count -= 1;
            if *count == 0 {
                self.map.remove(&v);
                if self.map.is_empty() {
                    // Back to the array representation once drained.
                    self.use_map = false;
                    self.values.clear();
                    self.counts.clear();
                }
            }
            return;
        }
        match self.values.binary_search(&v) {
            Ok(i) => {
                self.counts[i] -= 1;
                if self.counts[i] == 0 {
                    self.values.remove(i);
                    self.counts.remove(i);
                }
            }
            Err(_) => panic!("decr of absent value {}", v),
        }
    }

    fn switch_to_map(&mut self) {
        debug_assert!(!self.use_map);
        self.map.clear();
        for (&v, &c) in self.values.iter().zip(self.counts.iter()) {
            self.map.insert(v, c);
        }
        self.values.clear();
        self.counts.clear();
        self.use_map = true;
    }

    /// Iterate distinct elements in ascending order.
    fn iter(&self) -> Box<dyn Iterator<Item = i32> + '_> {
        if self.use_map {
            Box::new(self.map.keys().copied())
        } else {
            Box::new(self.values.iter().copied())
        }
    }

    /// Recompute and return the protocol hash over the current
    /// distinct elements.
    pub(crate) fn compute_hash(&mut self) -> u64 {
        let mut hash = self.len() as u64;
        for v in self.iter() {
            hash = hash.wrapping_mul(HASH_PRIME).wrapping_add(v as u64);
        }
        self.hash = hash;
        hash
    }

    /// Snapshot the current element set, associated with DFA state
    /// `state`. [`compute_hash`](Self::compute_hash) must have been
    /// called since the last mutation.
    pub(crate) fn freeze(&self, state: i32) -> FrozenIntSet {
        FrozenIntSet {
            values: self.iter().collect(),
            state,
            hash: self.hash,
        }
    }

    /// Element-wise equality against a frozen snapshot; the mirror of
    /// `FrozenIntSet == SortedIntSet`.
    pub(crate) fn equals_frozen(&self, other: &FrozenIntSet) -> bool {
        self.len() == other.values.len() && self.iter().zip(other.values.iter()).all(|(a, &b)| a == b)
    }
}

/// An immutable sorted set of state numbers with its protocol hash and
/// the DFA state it was interned as.
#[derive(Debug, Clone)]
pub(crate) struct FrozenIntSet {
    values: Vec<i32>,
    state: i32,
    hash: u64,
}

impl FrozenIntSet {
    /// Single-element set, used for the initial subset `{0}`.
    pub(crate) fn single(value: i32, state: i32) -> Self {
        let hash = HASH_PRIME.wrapping_add(value as u64);
        Self {
            values: vec![value],
            state,
            hash,
        }
    }

    pub(crate) fn state(&self) -> i32 {
        self.state
    }

    pub(crate) fn values(&self) -> &[i32] {
        &self.values
    }
}

impl PartialEq for FrozenIntSet {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for FrozenIntSet {}

impl Hash for FrozenIntSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
