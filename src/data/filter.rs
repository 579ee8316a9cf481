//! Entry visibility filter
//!
//! Holds show/hide sets for task and event identifiers and applies them to
//! the `visible` bits of an entry vector before it is frozen.
//!
//! # Semantics
//! An entry is shown when its task passes the task filters *and* its event
//! passes the event filters. A show set only restricts when it is non-empty;
//! a hide set always excludes its members. Hidden entries get the filter's
//! mask bits cleared; shown entries are reset to fully visible.

use crate::data::{Entry, VisMask};
use std::collections::HashSet;

/// Which of the four id sets to address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    ShowEvent,
    HideEvent,
    ShowTask,
    HideTask,
}

/// Show/hide filters over task and event ids
#[derive(Debug, Clone)]
pub struct EntryFilter {
    show_tasks: HashSet<i32>,
    hide_tasks: HashSet<i32>,
    show_events: HashSet<i32>,
    hide_events: HashSet<i32>,
    /// Bits cleared on entries that do not pass
    mask: VisMask,
}

impl Default for EntryFilter {
    fn default() -> Self {
        Self::new(VisMask::GRAPH_VIEW | VisMask::TEXT_VIEW)
    }
}

impl EntryFilter {
    /// Create an empty filter clearing `mask` on hidden entries
    pub fn new(mask: VisMask) -> Self {
        Self {
            show_tasks: HashSet::new(),
            hide_tasks: HashSet::new(),
            show_events: HashSet::new(),
            hide_events: HashSet::new(),
            mask,
        }
    }

    fn set_mut(&mut self, kind: FilterKind) -> &mut HashSet<i32> {
        match kind {
            FilterKind::ShowEvent => &mut self.show_events,
            FilterKind::HideEvent => &mut self.hide_events,
            FilterKind::ShowTask => &mut self.show_tasks,
            FilterKind::HideTask => &mut self.hide_tasks,
        }
    }

    /// Add an id to one of the sets
    pub fn add_id(&mut self, kind: FilterKind, id: i32) {
        self.set_mut(kind).insert(id);
    }

    /// Empty one of the sets
    pub fn clear(&mut self, kind: FilterKind) {
        self.set_mut(kind).clear();
    }

    /// Whether any set is non-empty
    pub fn is_set(&self) -> bool {
        !(self.show_tasks.is_empty()
            && self.hide_tasks.is_empty()
            && self.show_events.is_empty()
            && self.hide_events.is_empty())
    }

    fn passes(show: &HashSet<i32>, hide: &HashSet<i32>, id: i32) -> bool {
        (show.is_empty() || show.contains(&id)) && !hide.contains(&id)
    }

    /// Whether an entry with this task and event is shown
    pub fn shows(&self, pid: i32, event_id: i32) -> bool {
        Self::passes(&self.show_tasks, &self.hide_tasks, pid)
            && Self::passes(&self.show_events, &self.hide_events, event_id)
    }

    /// Recompute the visibility bits of every entry
    ///
    /// Returns the number of entries that were filtered out.
    pub fn apply(&self, entries: &mut [Entry]) -> usize {
        let mut count = 0;
        for entry in entries.iter_mut() {
            entry.visible = VisMask::ALL.bits();
            if !self.shows(entry.pid, entry.event_id) {
                entry.visible &= !self.mask.bits();
                count += 1;
            }
        }

        tracing::debug!("Filter hid {} of {} entries", count, entries.len());
        count
    }
}
