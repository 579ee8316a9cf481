//! Time-Bucket Model
//!
//! The visualization model behind a trace graph:
//!
//! - **Bin**: address of a regular or overflow bin
//! - **TraceHistogram**: binning, fill, shift, zoom and jump
//! - **lookup**: per-bin predicate lookups, optionally collection-aware
//!
//! # Navigation
//!
//! ```text
//!            shift_backward(s)          shift_forward(s)
//!                 ◀────                      ────▶
//! Lower │ 0 │ 1 │ 2 │ ... │ n-1 │ Upper
//!                 ◀── zoom_out ──▶
//!                    ──▶ zoom_in ◀──
//! ```
//!
//! Shifts reuse every bin that stays in the window; zoom and jump rebin and
//! refill from scratch.

mod bin;
mod histogram;
mod lookup;

pub use bin::Bin;
pub use histogram::{ModelState, TraceHistogram};
