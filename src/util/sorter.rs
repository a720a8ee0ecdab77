//! In-place sorting over a compare/swap capability pair.
//!
//! The automaton store keeps transitions in flat parallel `i32`
//! buffers (three or four slots per record). Sorting those by tuple
//! keys without unpacking them into structs needs a sorter that only
//! ever asks "compare record i with record j" and "swap record i with
//! record j" — the [`SortOps`] trait below.

use std::cmp::Ordering;

/// Compare/swap capabilities over an indexed sequence of records.
pub(crate) trait SortOps {
    /// Compare the records at indices `i` and `j`.
    fn compare(&self, i: usize, j: usize) -> Ordering;
    /// Swap the records at indices `i` and `j`.
    fn swap(&mut self, i: usize, j: usize);
}

const INSERTION_SORT_THRESHOLD: usize = 20;

/// Sort records in `[from, to)` in place.
pub(crate) fn sort<S: SortOps>(ops: &mut S, from: usize, to: usize) {
    if to.saturating_sub(from) > 1 {
        quicksort(ops, from, to - 1);
    }
}

fn insertion_sort<S: SortOps>(ops: &mut S, lo: usize, hi: usize) {
    for i in (lo + 1)..=hi {
        let mut j = i;
        while j > lo && ops.compare(j - 1, j) == Ordering::Greater {
            ops.swap(j - 1, j);
            j -= 1;
        }
    }
}

fn quicksort<S: SortOps>(ops: &mut S, lo: usize, hi: usize) {
    if hi - lo < INSERTION_SORT_THRESHOLD {
        insertion_sort(ops, lo, hi);
        return;
    }
    // Median-of-three pivot, moved to lo.
    let mid = lo + (hi - lo) / 2;
    if ops.compare(lo, mid) == Ordering::Greater {
        ops.swap(lo, mid);
    }
    if ops.compare(mid, hi) == Ordering::Greater {
        ops.swap(mid, hi);
        if ops.compare(lo, mid) == Ordering::Greater {
            ops.swap(lo, mid);
        }
    }
    ops.swap(lo, mid);

    let mut lt = lo;
    let mut gt = hi;
    let mut i = lo + 1;
    // Three-way partition around the pivot at lt.
    while i <= gt {
        match ops.compare(i, lt) {
            Ordering::Less => {
                ops.swap(lt, i);
                lt += 1;
                i += 1;
            }
            Ordering::Greater => {
                ops.swap(i, gt);
                if gt == 0 {
                    break;
                }
                gt -= 1;
            }
            Ordering::Equal => i += 1,
        }
    }
    if lt > lo {
        quicksort(ops, lo, lt - 1);
    }
    if gt < hi {
        quicksort(ops, gt + 1, hi);
    }
}
