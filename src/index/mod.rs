//! Tracescope Index Structures
//!
//! Sparse indexes that let repeated predicate-restricted lookups skip long
//! stretches of non-matching entries:
//!
//! - **Matcher**: predicate identity plus evaluation
//! - **EntryRequest**: bounded, directional scan descriptor
//! - **Collection**: `(resume, break)` intervals holding every match
//! - **CollectionRegistry**: one collection per `(matcher, value)`
//!
//! # Query Path
//!
//! ```text
//! Lookup: "first entry of task 42 in bin 17"
//!        ↓
//! EntryRequest: [map[17], map[17] + count[17])
//!        ↓
//! Collection(pid, 42): binary search → split into per-interval requests
//!        ↓
//! Scan only inside the intervals → O(log k + m) instead of O(n)
//! ```

mod collection;
mod matcher;
mod registry;
pub mod request;

pub use collection::Collection;
pub use matcher::{CustomMatcher, MatchFn, Matcher, MatcherKey};
pub use registry::{CollectionPolicy, CollectionRegistry};
pub use request::{EntryRequest, Lookup};
