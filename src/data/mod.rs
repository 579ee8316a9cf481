//! Trace Data
//!
//! The immutable entry array every other component reads from:
//!
//! - **Entry**: one trace record (timestamp, CPU, task, event, visibility)
//! - **search**: binary search over the timestamp-sorted array
//! - **filter**: show/hide task and event filters producing visibility bits
//! - **loader**: CSV import of entry arrays
//!
//! # Ownership
//!
//! ```text
//! Vec<Entry> ──filter──▶ Vec<Entry> ──freeze──▶ EntryArray (Arc<[Entry]>)
//!                                                   │
//!                          ┌────────────────────────┼──────────────────┐
//!                          ▼                        ▼                  ▼
//!                   TraceHistogram           TraceHistogram       Collection
//!                   (graph view)             (search, transient)
//! ```
//!
//! Once frozen the array is never mutated; models and collections only
//! keep indexes into it.

pub mod error;
pub mod filter;
pub mod loader;
pub mod search;

pub use error::{TraceError, TraceResult};
pub use filter::{EntryFilter, FilterKind};
pub use loader::{check_sorted, load_csv, read_csv};
pub use search::{lower_bound, upper_bound};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared, immutable, timestamp-sorted entry array
pub type EntryArray = Arc<[Entry]>;

/// Visibility bits of an entry
///
/// Each bit gates visibility in a different consumer. A bit that is set
/// means "visible" for that consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisMask(pub u8);

impl VisMask {
    /// Text (list) view
    pub const TEXT_VIEW: VisMask = VisMask(1 << 0);
    /// Graph view
    pub const GRAPH_VIEW: VisMask = VisMask(1 << 1);
    /// Event-type filter
    pub const EVENT_VIEW: VisMask = VisMask(1 << 2);
    /// Visible everywhere
    pub const ALL: VisMask = VisMask(0xFF);

    /// Raw bits
    pub fn bits(self) -> u8 {
        self.0
    }

    /// True if any bit of `other` is also set here
    pub fn intersects(self, other: VisMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for VisMask {
    type Output = VisMask;

    fn bitor(self, rhs: VisMask) -> VisMask {
        VisMask(self.0 | rhs.0)
    }
}

fn default_visible() -> u8 {
    VisMask::ALL.bits()
}

/// A single trace record
///
/// Produced by an external parser; immutable once the array is frozen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Timestamp in nanoseconds
    pub ts: u64,
    /// CPU the event was recorded on
    pub cpu: i32,
    /// Process (task) identifier
    pub pid: i32,
    /// Event kind identifier
    pub event_id: i32,
    /// Byte offset of the record in the original trace file
    #[serde(default)]
    pub offset: u64,
    /// Source stream, for merged multi-source traces
    #[serde(default)]
    pub stream_id: u16,
    /// Visibility bitmask, see [`VisMask`]
    #[serde(default = "default_visible")]
    pub visible: u8,
    /// Index of the next related entry in the same array
    #[serde(default)]
    pub next: Option<usize>,
}

impl Entry {
    /// Create a fully visible entry with no forward link
    pub fn new(ts: u64, cpu: i32, pid: i32, event_id: i32) -> Self {
        Self {
            ts,
            cpu,
            pid,
            event_id,
            offset: 0,
            stream_id: 0,
            visible: default_visible(),
            next: None,
        }
    }

    /// Builder method: set the visibility bits
    pub fn visible(mut self, mask: VisMask) -> Self {
        self.visible = mask.bits();
        self
    }

    /// Builder method: set the forward link
    pub fn next(mut self, next: usize) -> Self {
        self.next = Some(next);
        self
    }

    /// Builder method: set the source stream
    pub fn stream(mut self, stream_id: u16) -> Self {
        self.stream_id = stream_id;
        self
    }

    /// Builder method: set the file offset
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Check the entry against a visibility mask
    pub fn is_visible(&self, mask: VisMask) -> bool {
        VisMask(self.visible).intersects(mask)
    }
}

/// Freeze a vector of entries into a shared array
pub fn freeze(entries: Vec<Entry>) -> EntryArray {
    entries.into()
}

/// Timestamps of the first and last entry, if any
pub fn time_bounds(entries: &[Entry]) -> Option<(u64, u64)> {
    match (entries.first(), entries.last()) {
        (Some(first), Some(last)) => Some((first.ts, last.ts)),
        _ => None,
    }
}

/// Split a nanosecond timestamp into seconds and microseconds
pub fn convert_nano(ts: u64) -> (u64, u64) {
    (ts / 1_000_000_000, (ts / 1000) % 1_000_000)
}
