//! Per-bin entry lookups
//!
//! Every lookup builds an [`EntryRequest`] over exactly the entries of one
//! bin and scans it, directly or through a [`Collection`]. Both paths give
//! the same answer; the collection only skips entries that cannot match.

use crate::data::VisMask;
use crate::index::{Collection, EntryRequest, Lookup, Matcher};
use crate::model::{Bin, TraceHistogram};

impl TraceHistogram {
    /// Request covering `bin`, anchored at its first (front) or last (back)
    /// entry
    fn bin_request(
        &self,
        bin: Bin,
        back: bool,
        vis_only: bool,
        matcher: Matcher,
        value: i32,
    ) -> Option<EntryRequest> {
        let range = self.bin_range(bin)?;
        let first = if back { range.end - 1 } else { range.start };

        Some(
            EntryRequest::new(first, range.len(), matcher, value)
                .visible_only(vis_only, VisMask::GRAPH_VIEW),
        )
    }

    /// First entry of `bin` matching `matcher(value)`
    pub fn get_entry_front(
        &self,
        bin: Bin,
        vis_only: bool,
        matcher: Matcher,
        value: i32,
    ) -> Lookup<usize> {
        match (self.data(), self.bin_request(bin, false, vis_only, matcher, value)) {
            (Some(data), Some(req)) => req.scan_front(data),
            _ => Lookup::NotFound,
        }
    }

    /// Last entry of `bin` matching `matcher(value)`
    pub fn get_entry_back(
        &self,
        bin: Bin,
        vis_only: bool,
        matcher: Matcher,
        value: i32,
    ) -> Lookup<usize> {
        match (self.data(), self.bin_request(bin, true, vis_only, matcher, value)) {
            (Some(data), Some(req)) => req.scan_back(data),
            _ => Lookup::NotFound,
        }
    }

    /// [`get_entry_front`](Self::get_entry_front) through a collection
    ///
    /// `col` must have been built over the data this model was filled with.
    pub fn get_collection_entry_front(
        &self,
        bin: Bin,
        vis_only: bool,
        matcher: Matcher,
        value: i32,
        col: &Collection,
    ) -> Lookup<usize> {
        match (self.data(), self.bin_request(bin, false, vis_only, matcher, value)) {
            (Some(data), Some(req)) => col.entry_front(&req, data),
            _ => Lookup::NotFound,
        }
    }

    /// [`get_entry_back`](Self::get_entry_back) through a collection
    pub fn get_collection_entry_back(
        &self,
        bin: Bin,
        vis_only: bool,
        matcher: Matcher,
        value: i32,
        col: &Collection,
    ) -> Lookup<usize> {
        match (self.data(), self.bin_request(bin, true, vis_only, matcher, value)) {
            (Some(data), Some(req)) => col.entry_back(&req, data),
            _ => Lookup::NotFound,
        }
    }

    fn pid_of(&self, index: Lookup<usize>) -> Lookup<i32> {
        match self.data() {
            Some(data) => index.map(|i| data[i].pid),
            None => Lookup::NotFound,
        }
    }

    fn cpu_of(&self, index: Lookup<usize>) -> Lookup<i32> {
        match self.data() {
            Some(data) => index.map(|i| data[i].cpu),
            None => Lookup::NotFound,
        }
    }

    /// Task of the first entry of `bin` recorded on `cpu`
    pub fn get_pid_front(&self, bin: Bin, cpu: i32, vis_only: bool) -> Lookup<i32> {
        self.pid_of(self.get_entry_front(bin, vis_only, Matcher::Cpu, cpu))
    }

    /// Task of the last entry of `bin` recorded on `cpu`
    pub fn get_pid_back(&self, bin: Bin, cpu: i32, vis_only: bool) -> Lookup<i32> {
        self.pid_of(self.get_entry_back(bin, vis_only, Matcher::Cpu, cpu))
    }

    pub fn get_collection_pid_front(
        &self,
        bin: Bin,
        cpu: i32,
        vis_only: bool,
        col: &Collection,
    ) -> Lookup<i32> {
        self.pid_of(self.get_collection_entry_front(bin, vis_only, Matcher::Cpu, cpu, col))
    }

    pub fn get_collection_pid_back(
        &self,
        bin: Bin,
        cpu: i32,
        vis_only: bool,
        col: &Collection,
    ) -> Lookup<i32> {
        self.pid_of(self.get_collection_entry_back(bin, vis_only, Matcher::Cpu, cpu, col))
    }

    /// CPU task `pid` was running on in `bin`
    ///
    /// The Lower Overflow bin is scanned backwards, so it reports the CPU
    /// closest to the window; every other bin is scanned forwards.
    pub fn get_cpu(&self, bin: Bin, pid: i32, vis_only: bool) -> Lookup<i32> {
        let index = if bin == Bin::LowerOverflow {
            self.get_entry_back(bin, vis_only, Matcher::Pid, pid)
        } else {
            self.get_entry_front(bin, vis_only, Matcher::Pid, pid)
        };
        self.cpu_of(index)
    }

    pub fn get_collection_cpu(
        &self,
        bin: Bin,
        pid: i32,
        vis_only: bool,
        col: &Collection,
    ) -> Lookup<i32> {
        let index = if bin == Bin::LowerOverflow {
            self.get_collection_entry_back(bin, vis_only, Matcher::Pid, pid, col)
        } else {
            self.get_collection_entry_front(bin, vis_only, Matcher::Pid, pid, col)
        };
        self.cpu_of(index)
    }

    /// Index of the first visible entry of `bin` on `cpu`
    pub fn first_index_at_cpu(&self, bin: Bin, cpu: i32) -> Lookup<usize> {
        self.get_entry_front(bin, true, Matcher::Cpu, cpu)
    }

    /// Index of the first visible entry of `bin` belonging to `pid`
    pub fn first_index_at_pid(&self, bin: Bin, pid: i32) -> Lookup<usize> {
        self.get_entry_front(bin, true, Matcher::Pid, pid)
    }
}
