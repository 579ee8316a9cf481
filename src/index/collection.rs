//! Interval Collection - sparse index of predicate matches
//!
//! A collection remembers which stretches of the entry array can contain
//! entries matching `(matcher, value)`. It is stored as two parallel arrays
//! of inclusive index bounds:
//!
//! ```text
//! entries:   . . x x . . . . . . . x . . . . x x x . .
//! margin 1:    [       ]         [   ]     [         ]
//! resume:      1                 10        15
//! break:           5                 12              19
//! ```
//!
//! Lookups restricted to a collection first map the request onto these
//! intervals, then scan only inside them. A collection never changes the
//! result of a lookup, only its cost.
//!
//! # Invariants
//! - `resume_points.len() == break_points.len()`
//! - `resume_points[k] <= break_points[k] < resume_points[k + 1]`
//! - every matching index of the scanned span lies inside an interval

use crate::data::{Entry, TraceResult};
use crate::index::request::{scan_chain_back, scan_chain_front};
use crate::index::{EntryRequest, Lookup, Matcher, MatcherKey};
use std::ops::Range;

/// Sparse interval index for one `(matcher, value)` pair
#[derive(Debug, Clone)]
pub struct Collection {
    matcher: Matcher,
    value: i32,
    margin: usize,
    /// Index range the collection was built over
    span: Range<usize>,
    resume_points: Vec<usize>,
    break_points: Vec<usize>,
}

/// Accumulates merged, ordered intervals during a build
struct IntervalBuilder {
    resume_points: Vec<usize>,
    break_points: Vec<usize>,
}

impl IntervalBuilder {
    fn new() -> Self {
        Self {
            resume_points: Vec::new(),
            break_points: Vec::new(),
        }
    }

    /// Add `[lo, hi]`, merging with the previous interval when they touch
    fn push(&mut self, lo: usize, hi: usize) -> TraceResult<()> {
        if let Some(last) = self.break_points.last_mut() {
            if lo <= last.saturating_add(1) {
                *last = (*last).max(hi);
                return Ok(());
            }
        }

        self.resume_points.try_reserve(1)?;
        self.break_points.try_reserve(1)?;
        self.resume_points.push(lo);
        self.break_points.push(hi);
        Ok(())
    }
}

impl Collection {
    /// Build a collection over `entries[first..first + count]`
    ///
    /// Every match is padded with `margin` entries on both sides. With a
    /// non-zero margin the first and last `margin` entries of the span are
    /// always included. The span is clipped to the array length.
    pub fn build(
        entries: &[Entry],
        first: usize,
        count: usize,
        matcher: Matcher,
        value: i32,
        margin: usize,
    ) -> TraceResult<Self> {
        let first = first.min(entries.len());
        let end = first.saturating_add(count).min(entries.len());

        let mut builder = IntervalBuilder::new();

        if end > first {
            let last = end - 1;
            let len = end - first;

            if margin != 0 && len <= margin.saturating_mul(2) {
                builder.push(first, last)?;
            } else {
                if margin != 0 {
                    builder.push(first, first + margin - 1)?;
                }

                for i in (first + margin)..(end - margin) {
                    let entry = &entries[i];
                    if !matcher.matches(entry, value) {
                        continue;
                    }

                    let lo = i.saturating_sub(margin).max(first);
                    let mut hi = i.saturating_add(margin).min(last);

                    // Keep everything up to a non-matching linked successor.
                    if let Some(next) = entry.next {
                        if next > i && next < end && !matcher.matches(&entries[next], value) {
                            hi = hi.max(next);
                        }
                    }

                    builder.push(lo, hi)?;
                }

                if margin != 0 {
                    builder.push(end - margin, last)?;
                }
            }
        }

        let collection = Self {
            matcher,
            value,
            margin,
            span: first..end,
            resume_points: builder.resume_points,
            break_points: builder.break_points,
        };

        tracing::debug!(
            "Built {} collection for value {} over [{}, {}): {} intervals",
            matcher.key(),
            value,
            first,
            end,
            collection.len()
        );

        Ok(collection)
    }

    pub fn matcher(&self) -> Matcher {
        self.matcher
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Registry key of this collection
    pub fn key(&self) -> (MatcherKey, i32) {
        (self.matcher.key(), self.value)
    }

    pub fn margin(&self) -> usize {
        self.margin
    }

    /// Index range the collection covers
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Number of intervals
    pub fn len(&self) -> usize {
        self.resume_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resume_points.is_empty()
    }

    pub fn resume_points(&self) -> &[usize] {
        &self.resume_points
    }

    pub fn break_points(&self) -> &[usize] {
        &self.break_points
    }

    /// Inclusive `(resume, break)` pairs in order
    pub fn intervals(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.resume_points
            .iter()
            .copied()
            .zip(self.break_points.iter().copied())
    }

    /// Total number of entries inside the intervals
    pub fn covered(&self) -> usize {
        self.intervals().map(|(r, b)| b - r + 1).sum()
    }

    /// Whether `index` lies inside one of the intervals
    pub fn contains(&self, index: usize) -> bool {
        let k = self.break_points.partition_point(|&bp| bp < index);
        k < self.len() && self.resume_points[k] <= index
    }

    /// Drop the interval arrays
    ///
    /// A reset collection covers nothing, so requests mapped through it are
    /// scanned in full.
    pub fn reset(&mut self) {
        self.resume_points = Vec::new();
        self.break_points = Vec::new();
        self.span = self.span.start..self.span.start;
    }

    /// Split a front request into requests that each lie inside one interval
    ///
    /// Parts of the request outside the collection span are kept as they
    /// are. The chain is ordered by increasing index.
    pub fn map_front(&self, req: &EntryRequest) -> Vec<EntryRequest> {
        let mut chain = Vec::new();
        let Some((lo, hi)) = req.front_span() else {
            return chain;
        };

        let Range { start, end } = self.span;

        if lo < start {
            let top = hi.min(start - 1);
            chain.push(req.with_range(lo, top - lo + 1));
        }

        if end > start {
            let a = lo.max(start);
            let b = hi.min(end - 1);
            if a <= b {
                let mut k = self.break_points.partition_point(|&bp| bp < a);
                while k < self.len() && self.resume_points[k] <= b {
                    let from = self.resume_points[k].max(a);
                    let to = self.break_points[k].min(b);
                    chain.push(req.with_range(from, to - from + 1));
                    k += 1;
                }
            }
        }

        if hi >= end {
            let from = lo.max(end);
            chain.push(req.with_range(from, hi - from + 1));
        }

        chain
    }

    /// Split a back request into requests that each lie inside one interval
    ///
    /// The chain is ordered by decreasing index.
    pub fn map_back(&self, req: &EntryRequest) -> Vec<EntryRequest> {
        let mut chain = Vec::new();
        let Some((lo, hi)) = req.back_span() else {
            return chain;
        };

        let Range { start, end } = self.span;

        if hi >= end {
            let bottom = lo.max(end);
            chain.push(req.with_range(hi, hi - bottom + 1));
        }

        if end > start {
            let a = lo.max(start);
            let b = hi.min(end - 1);
            if a <= b {
                let mut k = self.resume_points.partition_point(|&rp| rp <= b);
                while k > 0 {
                    k -= 1;
                    if self.break_points[k] < a {
                        break;
                    }

                    let top = self.break_points[k].min(b);
                    let bottom = self.resume_points[k].max(a);
                    chain.push(req.with_range(top, top - bottom + 1));
                }
            }
        }

        if lo < start {
            let top = hi.min(start - 1);
            chain.push(req.with_range(top, top - lo + 1));
        }

        chain
    }

    /// First match of a front request, scanning only inside the intervals
    pub fn entry_front(&self, req: &EntryRequest, entries: &[Entry]) -> Lookup<usize> {
        scan_chain_front(&self.map_front(req), entries)
    }

    /// First match of a back request, scanning only inside the intervals
    pub fn entry_back(&self, req: &EntryRequest, entries: &[Entry]) -> Lookup<usize> {
        scan_chain_back(&self.map_back(req), entries)
    }
}
