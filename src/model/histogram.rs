//! Time-Bucket Model - binned view of a time window
//!
//! Partitions `[min, max]` into `n_bins` equal bins and records, for every
//! bin, the index of its first entry and its entry count. Entries outside
//! the window are parked in the two overflow bins, so the bins always cover
//! the whole array.
//!
//! # Bin ranges
//! ```text
//!   Lower      0        1               n-1        Upper
//! ──────────┬────────┬────────┬ ... ┬──────────┬──────────
//!   ts<min  │[min,   │        │     │[.., max] │  ts>max
//!           min+bs)                 (inclusive)
//! ```
//!
//! The last regular bin is closed on the right so an entry sitting exactly
//! on `max` stays in the window.
//!
//! # Performance
//! - fill: O(n_bins * log n)
//! - shift by s bins: O(s * log n), surviving bins are moved, not searched
//! - lookups: O(bin size), or O(log k + m) through a collection

use crate::data::{lower_bound, time_bounds, upper_bound, Entry, EntryArray, TraceResult};
use crate::model::Bin;
use std::ops::Range;

/// Lifecycle state of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// No binning
    Empty,
    /// Binning set, bins not computed
    Bound,
    /// Bins computed from data
    Filled,
}

/// Window geometry produced by a binning request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Binning {
    min: u64,
    max: u64,
    bin_size: u64,
}

impl Binning {
    /// Compute the bin size and pad the range symmetrically when it does
    /// not divide evenly. `None` when the request is degenerate.
    fn compute(n: usize, min: u64, max: u64) -> Option<Self> {
        let n64 = n as u64;
        let range = max.checked_sub(min)?;
        if n == 0 || range < n64 {
            return None;
        }

        if range % n64 == 0 {
            return Some(Self {
                min,
                max,
                bin_size: range / n64,
            });
        }

        let bin_size = range / n64 + 1;
        let corrected = bin_size.checked_mul(n64)?;
        let delta = corrected - range;
        let min = min.saturating_sub(delta / 2);
        let max = min.checked_add(corrected)?;

        Some(Self { min, max, bin_size })
    }

    /// Slide the window, keeping its size, into `[first, last]`
    fn clamp_to(self, first: u64, last: u64) -> Self {
        let span = self.max - self.min;
        if self.min < first {
            Self {
                min: first,
                max: first.saturating_add(span),
                ..self
            }
        } else if self.max > last {
            let min = last.saturating_sub(span);
            Self {
                min,
                max: min + span,
                ..self
            }
        } else {
            self
        }
    }
}

/// Binned model over a shared entry array
///
/// Slots `0..n_bins` hold the regular bins, slot `n_bins` the Upper Overflow
/// and slot `n_bins + 1` the Lower Overflow. The slot layout is private;
/// callers address bins through [`Bin`].
#[derive(Debug, Clone, Default)]
pub struct TraceHistogram {
    data: Option<EntryArray>,
    /// First entry index of each slot, `None` when the slot is empty
    map: Vec<Option<usize>>,
    /// Number of entries in each slot
    bin_count: Vec<usize>,
    min: u64,
    max: u64,
    bin_size: u64,
    n_bins: usize,
    filled: bool,
}

impl TraceHistogram {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the binning; the bound data is kept
    pub fn clear(&mut self) {
        self.map = Vec::new();
        self.bin_count = Vec::new();
        self.min = 0;
        self.max = 0;
        self.bin_size = 0;
        self.n_bins = 0;
        self.filled = false;
    }

    pub fn state(&self) -> ModelState {
        if self.n_bins == 0 {
            ModelState::Empty
        } else if self.filled {
            ModelState::Filled
        } else {
            ModelState::Bound
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn bin_size(&self) -> u64 {
        self.bin_size
    }

    /// The entry array the model was last filled with
    pub fn data(&self) -> Option<&EntryArray> {
        self.data.as_ref()
    }

    fn data_bounds(&self) -> Option<(u64, u64)> {
        self.data.as_deref().and_then(time_bounds)
    }

    /// Allocate fresh slots for `binning`; on failure the model is untouched
    fn allocate(&mut self, n: usize, binning: Binning) -> TraceResult<()> {
        let mut map = Vec::new();
        map.try_reserve_exact(n + 2)?;
        map.resize(n + 2, None);

        let mut bin_count = Vec::new();
        bin_count.try_reserve_exact(n + 2)?;
        bin_count.resize(n + 2, 0);

        self.map = map;
        self.bin_count = bin_count;
        self.n_bins = n;
        self.min = binning.min;
        self.max = binning.max;
        self.bin_size = binning.bin_size;
        self.filled = false;
        Ok(())
    }

    /// Set `n` bins over `[min, max]`
    ///
    /// A degenerate request (`n == 0`, `max < min` or `max - min < n`)
    /// leaves the model `Empty` and is not an error. The only error is a
    /// failed allocation, in which case the previous binning is kept.
    pub fn set_binning(&mut self, n: usize, min: u64, max: u64) -> TraceResult<()> {
        match Binning::compute(n, min, max) {
            Some(binning) => self.allocate(n, binning),
            None => {
                tracing::debug!("Rejected binning of {} bins over [{}, {}]", n, min, max);
                self.clear();
                Ok(())
            }
        }
    }

    /// Like [`set_binning`](Self::set_binning), but keeps the padded window
    /// inside the time span of the bound data
    pub fn set_in_range_binning(&mut self, n: usize, min: u64, max: u64) -> TraceResult<()> {
        match self.in_range_binning(n, min, max) {
            Some(binning) => self.allocate(n, binning),
            None => {
                tracing::debug!("Rejected in-range binning of {} bins over [{}, {}]", n, min, max);
                self.clear();
                Ok(())
            }
        }
    }

    fn in_range_binning(&self, n: usize, min: u64, max: u64) -> Option<Binning> {
        let binning = Binning::compute(n, min, max)?;
        Some(match self.data_bounds() {
            Some((first, last)) => binning.clamp_to(first, last),
            None => binning,
        })
    }

    /// Rebin and refill, or do nothing when the new window is degenerate
    fn rebin(&mut self, binning: Option<Binning>, data: EntryArray) -> TraceResult<()> {
        let Some(binning) = binning else {
            tracing::debug!("Rebinning skipped, window too small");
            return Ok(());
        };

        let n = self.n_bins;
        self.allocate(n, binning)?;
        self.fill(data);
        Ok(())
    }

    /// Compute all bins from `data`
    ///
    /// An unbound model or an empty array leaves the model `Empty`.
    pub fn fill(&mut self, data: EntryArray) {
        let empty = data.is_empty();
        self.data = Some(data);

        if self.n_bins == 0 || self.bin_size == 0 || empty {
            self.clear();
            return;
        }

        let Some(data) = self.data.clone() else {
            return;
        };

        let n = self.n_bins;
        self.set_lower_edge(&data);

        // Start of every regular bin plus the start of the Upper Overflow.
        let mut start = lower_bound(&data, self.min);
        for b in 0..n {
            let end = if b + 1 == n {
                upper_bound(&data, self.max)
            } else {
                lower_bound(&data, self.bin_ts(b + 1))
            };
            self.set_slot(b, start, end);
            start = end;
        }

        self.set_upper_edge(&data);
        self.filled = true;

        tracing::debug!(
            "Filled {} bins of {} over [{}, {}]",
            n,
            self.bin_size,
            self.min,
            self.max
        );
    }

    fn set_slot(&mut self, slot: usize, start: usize, end: usize) {
        let count = end.saturating_sub(start);
        self.map[slot] = if count > 0 { Some(start) } else { None };
        self.bin_count[slot] = count;
    }

    fn set_lower_edge(&mut self, data: &[Entry]) {
        let end = lower_bound(data, self.min);
        self.set_slot(self.n_bins + 1, 0, end);
    }

    fn set_upper_edge(&mut self, data: &[Entry]) {
        let start = upper_bound(data, self.max);
        self.set_slot(self.n_bins, start, data.len());
    }

    /// Recompute one regular bin from scratch
    fn recompute_bin(&mut self, data: &[Entry], b: usize) {
        let start = lower_bound(data, self.bin_ts(b));
        let end = if b + 1 == self.n_bins {
            upper_bound(data, self.max)
        } else {
            lower_bound(data, self.bin_ts(b + 1))
        };
        self.set_slot(b, start, end);
    }

    /// Number of entries in `bin`; 0 for bins out of range
    pub fn bin_count(&self, bin: Bin) -> usize {
        bin.slot(self.n_bins)
            .map(|slot| self.bin_count[slot])
            .unwrap_or(0)
    }

    /// Index of the first entry in `bin`; `None` for empty bins
    pub fn first_index_at(&self, bin: Bin) -> Option<usize> {
        bin.slot(self.n_bins).and_then(|slot| self.map[slot])
    }

    /// Index range of the entries in `bin`
    pub fn bin_range(&self, bin: Bin) -> Option<Range<usize>> {
        let first = self.first_index_at(bin)?;
        Some(first..first + self.bin_count(bin))
    }

    /// Start timestamp of regular bin `b`
    pub fn bin_ts(&self, b: usize) -> u64 {
        self.min + b as u64 * self.bin_size
    }

    /// Bin a timestamp falls into; `None` for an empty model
    pub fn bin_of_ts(&self, ts: u64) -> Option<Bin> {
        if self.n_bins == 0 {
            return None;
        }

        Some(if ts < self.min {
            Bin::LowerOverflow
        } else if ts > self.max {
            Bin::UpperOverflow
        } else {
            let b = ((ts - self.min) / self.bin_size) as usize;
            Bin::Regular(b.min(self.n_bins - 1))
        })
    }

    /// `(bin, first index, count)` of every regular bin
    pub fn regular_bins(&self) -> impl Iterator<Item = (usize, Option<usize>, usize)> + '_ {
        (0..self.n_bins).map(move |b| (b, self.map[b], self.bin_count[b]))
    }

    fn filled_data(&self) -> Option<EntryArray> {
        if self.filled {
            self.data.clone()
        } else {
            None
        }
    }

    /// Move the window `n` bins towards later timestamps
    ///
    /// Does nothing when the Upper Overflow bin is empty. Bins that stay in
    /// the window are moved without being searched again.
    pub fn shift_forward(&mut self, n: usize) -> TraceResult<()> {
        let Some(data) = self.filled_data() else {
            return Ok(());
        };

        if n == 0 {
            return Ok(());
        }

        if self.bin_count(Bin::UpperOverflow) == 0 {
            tracing::debug!("Shift forward ignored, already at the upper edge");
            return Ok(());
        }

        let Some(delta) = (n as u64).checked_mul(self.bin_size) else {
            return Ok(());
        };
        let (Some(min), Some(max)) = (self.min.checked_add(delta), self.max.checked_add(delta)) else {
            return Ok(());
        };

        let nb = self.n_bins;
        if n >= nb {
            return self.rebin(Binning::compute(nb, min, max), data);
        }

        self.min = min;
        self.max = max;

        // Old bins n..nb-1 become bins 0..nb-1-n. The old last bin is
        // excluded: its right edge was closed and is open now.
        self.map.copy_within(n..nb - 1, 0);
        self.bin_count.copy_within(n..nb - 1, 0);

        for b in (nb - 1 - n)..nb {
            self.recompute_bin(&data, b);
        }

        self.set_lower_edge(&data);
        self.set_upper_edge(&data);
        Ok(())
    }

    /// Move the window `n` bins towards earlier timestamps
    ///
    /// Does nothing when the Lower Overflow bin is empty. A shift past time
    /// zero is shortened to the largest whole-bin shift that fits.
    pub fn shift_backward(&mut self, n: usize) -> TraceResult<()> {
        let Some(data) = self.filled_data() else {
            return Ok(());
        };

        if self.bin_count(Bin::LowerOverflow) == 0 {
            tracing::debug!("Shift backward ignored, already at the lower edge");
            return Ok(());
        }

        let n = n.min((self.min / self.bin_size) as usize);
        if n == 0 {
            return Ok(());
        }

        let delta = n as u64 * self.bin_size;
        let min = self.min - delta;
        let max = self.max - delta;

        let nb = self.n_bins;
        if n >= nb {
            return self.rebin(Binning::compute(nb, min, max), data);
        }

        self.min = min;
        self.max = max;

        // Old bins 0..nb-1-n become bins n..nb-1. The new last bin gets a
        // closed right edge and is recomputed.
        self.map.copy_within(0..nb - 1 - n, n);
        self.bin_count.copy_within(0..nb - 1 - n, n);

        for b in 0..n {
            self.recompute_bin(&data, b);
        }
        self.recompute_bin(&data, nb - 1);

        self.set_lower_edge(&data);
        self.set_upper_edge(&data);
        Ok(())
    }

    /// Recenter the window on `ts` unless it is already strictly inside
    pub fn jump_to(&mut self, ts: u64) -> TraceResult<()> {
        let Some(data) = self.filled_data() else {
            return Ok(());
        };

        if ts > self.min && ts < self.max {
            return Ok(());
        }

        let Some((first, last)) = time_bounds(&data) else {
            return Ok(());
        };

        let span = self.max - self.min;
        let mut min = ts.saturating_sub(span / 2);
        if min < first {
            min = first;
        }
        if min > last.saturating_sub(span) {
            min = last.saturating_sub(span);
        }

        let nb = self.n_bins;
        self.rebin(Binning::compute(nb, min, min.saturating_add(span)), data)
    }

    fn focus_bin(&self, focus: Option<usize>) -> usize {
        focus.unwrap_or(self.n_bins / 2).min(self.n_bins - 1)
    }

    /// Widen the window by `ratio` of its size around `focus`
    ///
    /// `focus` defaults to the centre bin. The result is clamped to the
    /// time span of the data.
    pub fn zoom_out(&mut self, ratio: f64, focus: Option<usize>) -> TraceResult<()> {
        let Some(data) = self.filled_data() else {
            return Ok(());
        };

        if !ratio.is_finite() || ratio <= 0.0 {
            return Ok(());
        }

        let Some((first, last)) = time_bounds(&data) else {
            return Ok(());
        };

        let nb = self.n_bins;
        let mark = self.focus_bin(focus);
        let range = self.max - self.min;
        let delta_tot = (range as f64 * ratio) as u64;
        let delta_min = (delta_tot as f64 * mark as f64 / nb as f64) as u64;

        let min = self.min.saturating_sub(delta_min).max(first);
        let max = self
            .max
            .saturating_add(delta_tot - delta_min)
            .min(last);

        let binning = self.in_range_binning(nb, min, max);
        self.rebin(binning, data)
    }

    /// Shrink the window by `ratio` of its size around `focus`
    ///
    /// Refused when the new window would be shorter than `4 * n_bins`.
    pub fn zoom_in(&mut self, ratio: f64, focus: Option<usize>) -> TraceResult<()> {
        let Some(data) = self.filled_data() else {
            return Ok(());
        };

        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Ok(());
        }

        let nb = self.n_bins;
        let mark = self.focus_bin(focus);
        let range = self.max - self.min;
        let delta_tot = (range as f64 * ratio) as u64;

        if range - delta_tot < 4 * nb as u64 {
            tracing::debug!("Zoom in refused, window would drop below {} units", 4 * nb);
            return Ok(());
        }

        let delta_min = if mark == nb - 1 {
            delta_tot
        } else if mark == 0 {
            0
        } else {
            (delta_tot as f64 * mark as f64 / nb as f64) as u64
        };

        let min = self.min + delta_min;
        let max = self.max - delta_tot + delta_min;

        let binning = self.in_range_binning(nb, min, max);
        self.rebin(binning, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::freeze;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_step(count: u64, start: u64) -> EntryArray {
        freeze((0..count).map(|i| Entry::new(start + i, 0, 0, 0)).collect())
    }

    fn random_walk(rng: &mut StdRng, count: usize) -> EntryArray {
        let mut ts = 1000;
        let entries: Vec<Entry> = (0..count)
            .map(|_| {
                // Duplicates and gaps so that some bins end up empty
                ts += if rng.random_bool(0.05) {
                    rng.random_range(50..300)
                } else {
                    rng.random_range(0..4)
                };
                Entry::new(ts, rng.random_range(0..4), rng.random_range(0..8), 0)
            })
            .collect();
        freeze(entries)
    }

    fn filled(n: usize, min: u64, max: u64, data: &EntryArray) -> TraceHistogram {
        let mut model = TraceHistogram::new();
        model.set_binning(n, min, max).unwrap();
        model.fill(data.clone());
        model
    }

    fn assert_same_bins(a: &TraceHistogram, b: &TraceHistogram) {
        assert_eq!((a.min, a.max, a.bin_size), (b.min, b.max, b.bin_size));
        assert_eq!(a.map, b.map);
        assert_eq!(a.bin_count, b.bin_count);
    }

    /// Lower, regular bins and Upper must tile `[0, len)` in order
    fn assert_coverage(model: &TraceHistogram) {
        let data = model.data().unwrap();
        let mut cursor = 0;

        let mut order = vec![Bin::LowerOverflow];
        order.extend((0..model.n_bins()).map(Bin::Regular));
        order.push(Bin::UpperOverflow);

        for bin in order {
            let count = model.bin_count(bin);
            match model.first_index_at(bin) {
                Some(first) => {
                    assert!(count > 0, "bin {} has a start but no entries", bin);
                    assert_eq!(first, cursor, "gap or overlap before bin {}", bin);
                    cursor += count;
                }
                None => assert_eq!(count, 0, "empty bin {} has entries", bin),
            }
        }

        assert_eq!(cursor, data.len());
    }

    fn assert_bins_match_time(model: &TraceHistogram) {
        let data = model.data().unwrap();
        for (b, _, _) in model.regular_bins() {
            if let Some(range) = model.bin_range(Bin::Regular(b)) {
                for i in range {
                    assert_eq!(model.bin_of_ts(data[i].ts), Some(Bin::Regular(b)));
                }
            }
        }
    }

    #[test]
    fn test_dividing_range() {
        let data = unit_step(1000, 1000);
        let model = filled(100, 1000, 2000, &data);

        assert_eq!(model.bin_size(), 10);
        assert_eq!((model.min(), model.max()), (1000, 2000));
        for b in 0..100 {
            assert_eq!(model.first_index_at(Bin::Regular(b)), Some(b * 10));
            assert_eq!(model.bin_count(Bin::Regular(b)), 10);
        }
        assert_eq!(model.first_index_at(Bin::UpperOverflow), None);
        assert_eq!(model.first_index_at(Bin::LowerOverflow), None);
        assert_eq!(model.bin_count(Bin::UpperOverflow), 0);
        assert_eq!(model.bin_count(Bin::LowerOverflow), 0);
    }

    #[test]
    fn test_non_dividing_range_is_padded() {
        let mut model = TraceHistogram::new();
        model.set_binning(100, 1000, 1994).unwrap();

        assert_eq!(model.bin_size(), 10);
        assert_eq!((model.min(), model.max()), (997, 1997));
        assert_eq!(model.state(), ModelState::Bound);
    }

    #[test]
    fn test_degenerate_binning_leaves_empty() {
        let mut model = TraceHistogram::new();

        model.set_binning(0, 0, 100).unwrap();
        assert_eq!(model.state(), ModelState::Empty);

        model.set_binning(10, 100, 105).unwrap();
        assert_eq!(model.state(), ModelState::Empty);

        model.set_binning(10, 200, 100).unwrap();
        assert_eq!(model.state(), ModelState::Empty);

        // Exactly one unit per bin is still valid
        model.set_binning(10, 100, 110).unwrap();
        assert_eq!(model.bin_size(), 1);
    }

    #[test]
    fn test_state_transitions() {
        let data = unit_step(100, 0);
        let mut model = TraceHistogram::new();
        assert_eq!(model.state(), ModelState::Empty);

        model.set_binning(10, 0, 100).unwrap();
        assert_eq!(model.state(), ModelState::Bound);

        model.fill(data.clone());
        assert_eq!(model.state(), ModelState::Filled);

        model.set_binning(10, 0, 50).unwrap();
        assert_eq!(model.state(), ModelState::Bound);

        model.clear();
        assert_eq!(model.state(), ModelState::Empty);
        assert_eq!(model.n_bins(), 0);
    }

    #[test]
    fn test_fill_empty_data_clears() {
        let mut model = TraceHistogram::new();
        model.set_binning(10, 0, 100).unwrap();
        model.fill(freeze(Vec::new()));
        assert_eq!(model.state(), ModelState::Empty);
    }

    #[test]
    fn test_fill_without_binning_stays_empty() {
        let mut model = TraceHistogram::new();
        model.fill(unit_step(10, 0));
        assert_eq!(model.state(), ModelState::Empty);
        assert_eq!(model.bin_count(Bin::Regular(0)), 0);
    }

    #[test]
    fn test_overflow_bins() {
        let data = unit_step(1000, 1000);
        let model = filled(10, 1200, 1300, &data);

        assert_eq!(model.first_index_at(Bin::LowerOverflow), Some(0));
        assert_eq!(model.bin_count(Bin::LowerOverflow), 200);
        // ts 1300 belongs to the last bin, the Upper Overflow starts after it
        assert_eq!(model.first_index_at(Bin::UpperOverflow), Some(301));
        assert_eq!(model.bin_count(Bin::UpperOverflow), 699);
        assert_eq!(model.bin_count(Bin::Regular(9)), 11);
        assert_coverage(&model);
    }

    #[test]
    fn test_last_entry_on_max_stays_in_window() {
        let data = unit_step(101, 0);
        let model = filled(10, 0, 100, &data);

        assert_eq!(model.bin_count(Bin::Regular(9)), 11);
        assert_eq!(model.bin_count(Bin::UpperOverflow), 0);
        assert_coverage(&model);
    }

    #[test]
    fn test_empty_bins_use_sentinel() {
        let data = freeze(vec![Entry::new(0, 0, 0, 0), Entry::new(95, 0, 0, 0)]);
        let model = filled(10, 0, 100, &data);

        assert_eq!(model.first_index_at(Bin::Regular(0)), Some(0));
        for b in 1..9 {
            assert_eq!(model.first_index_at(Bin::Regular(b)), None);
            assert_eq!(model.bin_count(Bin::Regular(b)), 0);
        }
        assert_eq!(model.first_index_at(Bin::Regular(9)), Some(1));
        assert_coverage(&model);
    }

    #[test]
    fn test_out_of_range_bins() {
        let data = unit_step(100, 0);
        let model = filled(10, 0, 100, &data);
        assert_eq!(model.bin_count(Bin::Regular(10)), 0);
        assert_eq!(model.first_index_at(Bin::Regular(500)), None);
        assert!(model.bin_range(Bin::Regular(10)).is_none());
    }

    #[test]
    fn test_random_coverage_and_monotonicity() {
        let mut rng = StdRng::seed_from_u64(11);
        let data = random_walk(&mut rng, 20_000);
        let (first, last) = time_bounds(&data).unwrap();

        for _ in 0..30 {
            let n = rng.random_range(1..200);
            let min = rng.random_range(first.saturating_sub(500)..last);
            let max = rng.random_range(min + n as u64..last + 500);
            let model = filled(n, min, max, &data);

            assert_coverage(&model);
            assert_bins_match_time(&model);

            let starts: Vec<usize> = model.regular_bins().filter_map(|(_, m, _)| m).collect();
            assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn test_fill_is_idempotent() {
        let mut rng = StdRng::seed_from_u64(3);
        let data = random_walk(&mut rng, 5000);
        let mut model = filled(64, 2000, 6000, &data);
        let before = model.clone();

        model.fill(data.clone());
        assert_same_bins(&before, &model);
    }

    #[test]
    fn test_shift_forward_matches_fresh_fill() {
        let mut rng = StdRng::seed_from_u64(5);
        let data = random_walk(&mut rng, 20_000);

        for s in [1, 7, 25, 49] {
            let mut shifted = filled(50, 2000, 4000, &data);
            let bs = shifted.bin_size();
            shifted.shift_forward(s).unwrap();

            let fresh = filled(50, 2000 + s as u64 * bs, 4000 + s as u64 * bs, &data);
            assert_same_bins(&shifted, &fresh);
            assert_coverage(&shifted);
        }
    }

    #[test]
    fn test_shift_backward_matches_fresh_fill() {
        let mut rng = StdRng::seed_from_u64(6);
        let data = random_walk(&mut rng, 20_000);

        for s in [1, 3, 24, 49] {
            let mut shifted = filled(50, 12_000, 14_000, &data);
            let bs = shifted.bin_size();
            shifted.shift_backward(s).unwrap();

            let fresh = filled(50, 12_000 - s as u64 * bs, 14_000 - s as u64 * bs, &data);
            assert_same_bins(&shifted, &fresh);
            assert_coverage(&shifted);
        }
    }

    #[test]
    fn test_shift_keeps_surviving_bins() {
        let data = unit_step(10_000, 0);
        let mut model = filled(100, 1000, 2000, &data);
        let before = model.clone();

        model.shift_forward(10).unwrap();
        for b in 0..89 {
            assert_eq!(model.map[b], before.map[b + 10]);
            assert_eq!(model.bin_count[b], before.bin_count[b + 10]);
        }
    }

    #[test]
    fn test_large_shift_rebins() {
        let data = unit_step(10_000, 0);
        let mut model = filled(10, 1000, 2000, &data);

        model.shift_forward(25).unwrap();
        assert_same_bins(&model, &filled(10, 3500, 4500, &data));

        model.shift_backward(30).unwrap();
        assert_same_bins(&model, &filled(10, 500, 1500, &data));
    }

    #[test]
    fn test_shift_at_edges_is_noop() {
        let data = unit_step(1000, 1000);
        let mut model = filled(100, 1000, 2000, &data);
        let before = model.clone();

        model.shift_forward(5).unwrap();
        assert_same_bins(&before, &model);

        model.shift_backward(5).unwrap();
        assert_same_bins(&before, &model);
    }

    #[test]
    fn test_shift_backward_stops_at_zero() {
        let data = unit_step(1000, 0);
        let mut model = filled(10, 30, 130, &data);

        model.shift_backward(8).unwrap();
        assert_eq!((model.min(), model.max()), (0, 100));
        assert_coverage(&model);
    }

    #[test]
    fn test_jump_inside_window_is_noop() {
        let data = unit_step(10_000, 0);
        let mut model = filled(10, 1000, 2000, &data);
        let before = model.clone();

        model.jump_to(1500).unwrap();
        assert_same_bins(&before, &model);
    }

    #[test]
    fn test_jump_recenters() {
        let data = unit_step(10_000, 0);
        let mut model = filled(10, 1000, 2000, &data);

        model.jump_to(5000).unwrap();
        assert_eq!((model.min(), model.max()), (4500, 5500));
        assert_eq!(model.bin_size(), 100);
        assert_coverage(&model);
    }

    #[test]
    fn test_jump_is_clamped_to_data() {
        let data = unit_step(10_000, 0);
        let mut model = filled(10, 1000, 2000, &data);

        model.jump_to(9990).unwrap();
        assert_eq!((model.min(), model.max()), (8999, 9999));

        model.jump_to(0).unwrap();
        assert_eq!((model.min(), model.max()), (0, 1000));
    }

    #[test]
    fn test_zoom_in_keeps_focus_entry() {
        let data = freeze((0..10_000).map(|i| Entry::new(i * 10, 0, 0, 0)).collect());

        for focus in [0, 10, 50, 99] {
            let mut model = filled(100, 0, 100_000, &data);
            let index = model.first_index_at(Bin::Regular(focus)).unwrap();
            let ts = data[index].ts;

            model.zoom_in(0.5, Some(focus)).unwrap();
            assert!(model.max() - model.min() < 100_000);

            let bin = model.bin_of_ts(ts).unwrap();
            assert!(!bin.is_overflow(), "focus {} left the window", focus);
            assert!(model.bin_range(bin).unwrap().contains(&index));
            assert_coverage(&model);
        }
    }

    #[test]
    fn test_zoom_in_refuses_tiny_window() {
        let data = unit_step(1000, 0);
        let mut model = filled(100, 0, 500, &data);
        let before = model.clone();

        model.zoom_in(0.5, None).unwrap();
        assert_same_bins(&before, &model);
    }

    #[test]
    fn test_zoom_out_is_clamped_to_data() {
        let data = unit_step(10_000, 0);
        let mut model = filled(100, 4000, 5000, &data);

        model.zoom_out(1.0, None).unwrap();
        assert_eq!((model.min(), model.max()), (3500, 5500));

        model.zoom_out(100.0, None).unwrap();
        assert_eq!((model.min(), model.max()), (0, 10_000));
        assert_eq!(model.bin_count(Bin::LowerOverflow), 0);
        assert_coverage(&model);
    }

    #[test]
    fn test_zoom_round_trip_stays_valid() {
        let mut rng = StdRng::seed_from_u64(9);
        let data = random_walk(&mut rng, 10_000);
        let (first, last) = time_bounds(&data).unwrap();
        let mut model = filled(200, first, last, &data);

        for _ in 0..20 {
            let focus = rng.random_range(0..200);
            if rng.random_bool(0.5) {
                model.zoom_in(0.3, Some(focus)).unwrap();
            } else {
                model.zoom_out(0.3, Some(focus)).unwrap();
            }
            assert_eq!(model.state(), ModelState::Filled);
            assert_coverage(&model);
        }
    }

    #[test]
    fn test_rebinning_needs_data() {
        let mut model = TraceHistogram::new();
        model.set_binning(10, 0, 100).unwrap();

        model.shift_forward(1).unwrap();
        model.zoom_in(0.5, None).unwrap();
        model.jump_to(1000).unwrap();
        assert_eq!(model.state(), ModelState::Bound);
        assert_eq!(model.min(), 0);
    }

    #[test]
    fn test_bin_of_ts() {
        let data = unit_step(1000, 1000);
        let model = filled(100, 1000, 2000, &data);

        assert_eq!(model.bin_of_ts(999), Some(Bin::LowerOverflow));
        assert_eq!(model.bin_of_ts(1000), Some(Bin::Regular(0)));
        assert_eq!(model.bin_of_ts(1015), Some(Bin::Regular(1)));
        assert_eq!(model.bin_of_ts(2000), Some(Bin::Regular(99)));
        assert_eq!(model.bin_of_ts(2001), Some(Bin::UpperOverflow));
        assert_eq!(TraceHistogram::new().bin_of_ts(5), None);
    }
}
