//! Binary search over timestamp-sorted entries
//!
//! Both searches are O(log n) and assume the array is sorted by `ts`.
//! An unsorted array gives unspecified (but memory safe) results.

use crate::data::Entry;

/// Index of the first entry with `ts >= time`, or `entries.len()` if none
pub fn lower_bound(entries: &[Entry], time: u64) -> usize {
    entries.partition_point(|e| e.ts < time)
}

/// Index of the first entry with `ts > time`, or `entries.len()` if none
pub fn upper_bound(entries: &[Entry], time: u64) -> usize {
    entries.partition_point(|e| e.ts <= time)
}
