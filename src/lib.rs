//! # Tracescope
//!
//! Windowing and indexing engine for kernel trace visualization. Turns a
//! large, timestamp-sorted array of trace entries into a fixed number of
//! time bins and answers "first/last entry of X in bin B" quickly.
//!
//! ## Features
//!
//! - **Binned windows**: equal-width bins plus overflow bins over any window
//! - **Cheap navigation**: shifts reuse surviving bins, zoom keeps the focus
//! - **Sparse indexes**: interval collections skip non-matching stretches
//! - **Visibility-aware lookups**: filtered matches are reported as such
//!
//! ## Modules
//!
//! - [`data`]: entry array, binary search, filters, CSV loading
//! - [`index`]: matchers, entry requests, interval collections
//! - [`model`]: the time-bucket model and its lookups
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tracescope::data::{freeze, load_csv};
//! use tracescope::index::{CollectionRegistry, Matcher};
//! use tracescope::model::{Bin, TraceHistogram};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let data = freeze(load_csv("trace.csv".as_ref())?);
//!
//!     let mut model = TraceHistogram::new();
//!     model.set_binning(1000, data[0].ts, data[data.len() - 1].ts)?;
//!     model.fill(data.clone());
//!
//!     let mut registry = CollectionRegistry::new();
//!     let col = registry.register(&data, Matcher::Pid, 42, 25)?;
//!
//!     let first = model.get_collection_entry_front(Bin::Regular(10), true, Matcher::Pid, 42, col);
//!     println!("First entry of task 42 in bin 10: {:?}", first);
//!
//!     model.shift_forward(10)?;
//!     model.zoom_in(0.5, None)?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod index;
pub mod model;

// Re-export top-level types for convenience
pub use data::{Entry, EntryArray, EntryFilter, TraceError, TraceResult, VisMask};

pub use index::{Collection, CollectionPolicy, CollectionRegistry, EntryRequest, Lookup, Matcher};

pub use model::{Bin, ModelState, TraceHistogram};

pub use config::{CollectionConfig, Config, ConfigError, LoggingConfig, ModelConfig};
