//! The datasift engine: fit tabular data into a token budget, then pick a
//! bounded, diverse subset of rows.
//!
//! ```text
//! Table ─▶ Profiler ─▶ ReductionEngine ─▶ Selector
//!             │              │                 │
//!        ColumnSchema   ReductionOutcome   SelectionOutcome
//! ```
//!
//! [`TokenEstimator`] is shared by every stage. [`Pipeline`] runs the
//! stages in order; each can also be driven on its own.

pub mod pipeline;
pub mod profile;
pub mod reduce;
pub mod select;
pub mod token;

pub use pipeline::{Pipeline, PipelineOutcome};
pub use profile::{CategoryRule, CategoryRules, Profiler, merge};
pub use reduce::ReductionEngine;
pub use select::Selector;
pub use token::{Footprint, TokenEstimator};
