//! Collection Registry - one collection per `(matcher, value)`
//!
//! Callers look a collection up by key and memoize the reference; the
//! registry guarantees repeated lookups return the same instance and that
//! two collections never share a key.

use crate::data::{Entry, TraceResult};
use crate::index::{Collection, Matcher, MatcherKey};

/// Decides whether a collection is worth keeping populated
///
/// Collections pay off on large traces and on sparse matches. For small,
/// dense ones a direct scan is as fast, so the collection is reset but kept
/// registered to avoid rebuilding it on every redraw.
#[derive(Debug, Clone, Copy)]
pub struct CollectionPolicy {
    /// Context entries kept around every match
    pub margin: usize,
    /// Traces at least this long always keep their collections
    pub min_rows: usize,
    /// Minimum entries per interval for smaller traces
    pub min_density: usize,
}

impl Default for CollectionPolicy {
    fn default() -> Self {
        Self {
            margin: 25,
            min_rows: 1_000_000,
            min_density: 100,
        }
    }
}

impl CollectionPolicy {
    /// Whether `col` should stay populated for a trace of `data_len` entries
    pub fn worth_keeping(&self, data_len: usize, col: &Collection) -> bool {
        if col.is_empty() {
            return true;
        }

        data_len >= self.min_rows || data_len / col.len() >= self.min_density
    }
}

/// Registry of all collections of a session
#[derive(Debug, Default)]
pub struct CollectionRegistry {
    collections: Vec<Collection>,
}

impl CollectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: MatcherKey, value: i32) -> Option<usize> {
        self.collections
            .iter()
            .position(|c| c.key() == (key, value))
    }

    /// Build a collection over the whole array and register it
    ///
    /// An existing collection with the same key is rebuilt in place.
    pub fn register(
        &mut self,
        entries: &[Entry],
        matcher: Matcher,
        value: i32,
        margin: usize,
    ) -> TraceResult<&Collection> {
        let col = Collection::build(entries, 0, entries.len(), matcher, value, margin)?;

        let pos = match self.position(matcher.key(), value) {
            Some(pos) => {
                tracing::debug!("Rebuilding {} collection for value {}", matcher.key(), value);
                self.collections[pos] = col;
                pos
            }
            None => {
                tracing::info!(
                    "Registered {} collection for value {} ({} intervals)",
                    matcher.key(),
                    value,
                    col.len()
                );
                self.collections.push(col);
                self.collections.len() - 1
            }
        };

        Ok(&self.collections[pos])
    }

    /// Find a collection by key
    pub fn find(&self, matcher: Matcher, value: i32) -> Option<&Collection> {
        self.position(matcher.key(), value)
            .map(|pos| &self.collections[pos])
    }

    /// Find a collection by key, mutably
    pub fn find_mut(&mut self, matcher: Matcher, value: i32) -> Option<&mut Collection> {
        self.position(matcher.key(), value)
            .map(move |pos| &mut self.collections[pos])
    }

    /// Return the registered collection, building it first if needed
    pub fn find_or_register(
        &mut self,
        entries: &[Entry],
        matcher: Matcher,
        value: i32,
        margin: usize,
    ) -> TraceResult<&Collection> {
        if let Some(pos) = self.position(matcher.key(), value) {
            return Ok(&self.collections[pos]);
        }

        self.register(entries, matcher, value, margin)
    }

    /// Find or build a collection and apply `policy` to it
    pub fn acquire(
        &mut self,
        entries: &[Entry],
        matcher: Matcher,
        value: i32,
        policy: &CollectionPolicy,
    ) -> TraceResult<&Collection> {
        let pos = match self.position(matcher.key(), value) {
            Some(pos) => pos,
            None => {
                self.register(entries, matcher, value, policy.margin)?;
                self.collections.len() - 1
            }
        };

        let col = &mut self.collections[pos];
        if !policy.worth_keeping(entries.len(), col) {
            tracing::debug!(
                "Collection {} for value {} too dense, resetting",
                matcher.key(),
                value
            );
            col.reset();
        }

        Ok(&self.collections[pos])
    }

    /// Remove a collection; returns whether one was registered
    pub fn unregister(&mut self, matcher: Matcher, value: i32) -> bool {
        match self.position(matcher.key(), value) {
            Some(pos) => {
                self.collections.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Clear a collection's intervals but keep it registered
    pub fn reset(&mut self, matcher: Matcher, value: i32) -> bool {
        match self.find_mut(matcher, value) {
            Some(col) => {
                col.reset();
                true
            }
            None => false,
        }
    }

    /// Remove all collections
    pub fn clear(&mut self) {
        self.collections.clear();
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entry> {
        (0..100)
            .map(|i| Entry::new(i, (i % 4) as i32, if i % 10 == 0 { 1 } else { 2 }, 0))
            .collect()
    }

    #[test]
    fn test_register_and_find_same_instance() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();

        let first = registry.register(&entries, Matcher::Pid, 1, 0).unwrap() as *const Collection;
        let found = registry.find(Matcher::Pid, 1).unwrap() as *const Collection;
        let again = registry.find(Matcher::Pid, 1).unwrap() as *const Collection;

        assert_eq!(first, found);
        assert_eq!(found, again);
        assert!(registry.find(Matcher::Pid, 2).is_none());
        assert!(registry.find(Matcher::Cpu, 1).is_none());
    }

    #[test]
    fn test_register_twice_keeps_one() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();

        registry.register(&entries, Matcher::Pid, 1, 0).unwrap();
        let col = registry.register(&entries, Matcher::Pid, 1, 3).unwrap();
        assert_eq!(col.margin(), 3);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_find_or_register() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();

        let col = registry.find_or_register(&entries, Matcher::Cpu, 2, 0).unwrap();
        assert_eq!(col.len(), 25);

        let col = registry.find_or_register(&entries, Matcher::Cpu, 2, 10).unwrap();
        assert_eq!(col.margin(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();
        registry.register(&entries, Matcher::Pid, 1, 0).unwrap();
        registry.register(&entries, Matcher::Pid, 2, 0).unwrap();

        assert!(registry.unregister(Matcher::Pid, 1));
        assert!(!registry.unregister(Matcher::Pid, 1));
        assert_eq!(registry.len(), 1);
        assert!(registry.find(Matcher::Pid, 2).is_some());

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reset_keeps_registration() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();
        registry.register(&entries, Matcher::Pid, 1, 0).unwrap();

        assert!(registry.reset(Matcher::Pid, 1));
        let col = registry.find(Matcher::Pid, 1).unwrap();
        assert!(col.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(!registry.reset(Matcher::Pid, 9));
    }

    #[test]
    fn test_acquire_resets_dense_collections() {
        let entries = sample();
        let mut registry = CollectionRegistry::new();
        let policy = CollectionPolicy {
            margin: 0,
            min_rows: 1_000_000,
            min_density: 100,
        };

        // 10 intervals over 100 rows: 10 rows per interval is too dense
        let col = registry.acquire(&entries, Matcher::Pid, 1, &policy).unwrap();
        assert!(col.is_empty());
        assert_eq!(registry.len(), 1);

        let sparse = CollectionPolicy {
            min_density: 5,
            ..policy
        };
        let col = registry.acquire(&entries, Matcher::Pid, 2, &sparse).unwrap();
        assert!(!col.is_empty());
    }

    #[test]
    fn test_custom_matchers_keyed_by_name() {
        fn even_ts(e: &Entry, _: i32) -> bool {
            e.ts % 2 == 0
        }
        fn odd_ts(e: &Entry, _: i32) -> bool {
            e.ts % 2 == 1
        }

        let entries = sample();
        let mut registry = CollectionRegistry::new();
        registry.register(&entries, Matcher::custom("even", even_ts), 0, 0).unwrap();
        registry.register(&entries, Matcher::custom("odd", odd_ts), 0, 0).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.find(Matcher::custom("even", even_ts), 0).is_some());
    }
}
