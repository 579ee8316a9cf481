//! Entry requests and lookup outcomes
//!
//! An [`EntryRequest`] describes a bounded linear scan over the entry array.
//! A *front* request covers `[first, first + n)` and walks forward; a *back*
//! request covers `(first - n, first]` and walks backward. Both the model and
//! the collections describe their scans with it.

use crate::data::{Entry, VisMask};
use crate::index::Matcher;

/// Outcome of a predicate lookup
///
/// `Filtered` means matching data exists but none of it passed the
/// visibility mask; it is a valid result, distinct from `NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    Filtered,
    NotFound,
}

impl<T> Lookup<T> {
    /// The found value, if any
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, Lookup::Filtered)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Lookup::NotFound)
    }

    /// Transform the found value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Lookup::Found(v) => Lookup::Found(f(v)),
            Lookup::Filtered => Lookup::Filtered,
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

/// Descriptor of a directional, predicate-filtered scan
#[derive(Debug, Clone, Copy)]
pub struct EntryRequest {
    /// Index the scan starts from
    pub first: usize,
    /// Number of entries to look at
    pub n: usize,
    pub matcher: Matcher,
    pub value: i32,
    /// Report matches failing `vis_mask` as [`Lookup::Filtered`]
    pub vis_only: bool,
    pub vis_mask: VisMask,
}

impl EntryRequest {
    /// Create a request that accepts matches regardless of visibility
    pub fn new(first: usize, n: usize, matcher: Matcher, value: i32) -> Self {
        Self {
            first,
            n,
            matcher,
            value,
            vis_only: false,
            vis_mask: VisMask::GRAPH_VIEW,
        }
    }

    /// Builder method: only accept matches visible under `mask`
    pub fn visible_only(mut self, vis_only: bool, mask: VisMask) -> Self {
        self.vis_only = vis_only;
        self.vis_mask = mask;
        self
    }

    /// Copy of this request over a different range
    pub fn with_range(&self, first: usize, n: usize) -> Self {
        Self { first, n, ..*self }
    }

    /// Inclusive index range covered when scanning forward
    pub fn front_span(&self) -> Option<(usize, usize)> {
        if self.n == 0 {
            return None;
        }
        Some((self.first, self.first.saturating_add(self.n - 1)))
    }

    /// Inclusive index range covered when scanning backward
    pub fn back_span(&self) -> Option<(usize, usize)> {
        if self.n == 0 {
            return None;
        }
        Some((self.first.saturating_sub(self.n - 1), self.first))
    }

    #[inline]
    fn check(&self, entry: &Entry, index: usize, filtered: &mut bool) -> Option<usize> {
        if !self.matcher.matches(entry, self.value) {
            return None;
        }

        if self.vis_only && !entry.is_visible(self.vis_mask) {
            *filtered = true;
            return None;
        }

        Some(index)
    }

    /// Scan forward from `first`
    ///
    /// Indexes past the end of `entries` are ignored.
    pub fn scan_front(&self, entries: &[Entry]) -> Lookup<usize> {
        let Some((lo, hi)) = self.front_span() else {
            return Lookup::NotFound;
        };

        let end = hi.saturating_add(1).min(entries.len());
        let mut filtered = false;
        for i in lo..end {
            if let Some(found) = self.check(&entries[i], i, &mut filtered) {
                return Lookup::Found(found);
            }
        }

        if filtered {
            Lookup::Filtered
        } else {
            Lookup::NotFound
        }
    }

    /// Scan backward from `first`
    ///
    /// Indexes past the end of `entries` are ignored.
    pub fn scan_back(&self, entries: &[Entry]) -> Lookup<usize> {
        let Some((lo, hi)) = self.back_span() else {
            return Lookup::NotFound;
        };

        if lo >= entries.len() {
            return Lookup::NotFound;
        }

        let hi = hi.min(entries.len() - 1);
        let mut filtered = false;
        for i in (lo..=hi).rev() {
            if let Some(found) = self.check(&entries[i], i, &mut filtered) {
                return Lookup::Found(found);
            }
        }

        if filtered {
            Lookup::Filtered
        } else {
            Lookup::NotFound
        }
    }
}

/// Walk a request chain forward, stopping at the first visible match
///
/// A filtered match does not stop the walk, so the outcome is the same as
/// one scan over the union of the chain.
pub fn scan_chain_front(chain: &[EntryRequest], entries: &[Entry]) -> Lookup<usize> {
    scan_chain(chain, |req| req.scan_front(entries))
}

/// Walk a request chain backward, stopping at the first visible match
pub fn scan_chain_back(chain: &[EntryRequest], entries: &[Entry]) -> Lookup<usize> {
    scan_chain(chain, |req| req.scan_back(entries))
}

fn scan_chain<F>(chain: &[EntryRequest], mut scan: F) -> Lookup<usize>
where
    F: FnMut(&EntryRequest) -> Lookup<usize>,
{
    let mut filtered = false;
    for req in chain {
        match scan(req) {
            Lookup::Found(i) => return Lookup::Found(i),
            Lookup::Filtered => filtered = true,
            Lookup::NotFound => {}
        }
    }

    if filtered {
        Lookup::Filtered
    } else {
        Lookup::NotFound
    }
}
