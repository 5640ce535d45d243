//! # datasift Core
//!
//! Domain types and error definitions for the datasift reduction and
//! selection engine. This crate holds **no algorithms**: it defines the
//! data model that the engine, the configuration layer and the CLI all
//! share.
//!
//! ## Data flow
//!
//! ```text
//! Table ─▶ ColumnSchema ─▶ reduced Table + [ReductionStep] ─▶ selected rows + SelectionReport
//! ```
//!
//! Tables and schemas are immutable once built; every stage returns new
//! values instead of editing its input.

pub mod budget;
pub mod error;
pub mod reduction;
pub mod schema;
pub mod selection;
pub mod table;
pub mod value;

// Re-export key types at crate root for ergonomics
pub use budget::TokenBudget;
pub use error::{Error, Result};
pub use reduction::{
    BudgetStatus, OverBudgetPolicy, ReductionOutcome, ReductionStep, Strategy, TimeBucket,
};
pub use schema::{
    BusinessCategory, BusinessEnrichment, Cardinality, ColumnProfile, ColumnSchema,
    EnrichmentEntry, ImportanceTier, InferredType,
};
pub use selection::{
    DiversityDimension, ExclusionReason, Pick, SelectionCriteria, SelectionOutcome,
    SelectionReport, SelectionScore, SelectionWeights, Thresholds,
};
pub use table::{Row, Table};
pub use value::Value;
