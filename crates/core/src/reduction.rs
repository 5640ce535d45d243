//! Reduction strategies and the reduction audit trail.

use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Granularity of a time bucket used by temporal narrowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Day,
    /// ISO-8601 week.
    Week,
    #[default]
    Month,
}

/// One size-reduction strategy with its parameters.
///
/// The engine walks a `Vec<Strategy>` in order; there is no dynamic
/// dispatch, each variant is matched in a flat loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Strategy {
    /// Keep only the most recent `window` buckets of a date column.
    TemporalNarrowing {
        column: String,
        bucket: TimeBucket,
        /// Descending candidate window sizes, in buckets.
        windows: Vec<usize>,
    },
    /// Keep only the top entities ranked by a metric column.
    EntityNarrowing {
        column: String,
        metric: String,
        /// Descending candidate entity counts.
        candidates: Vec<usize>,
    },
    /// Drop tier-3, then tier-2 columns until the table fits.
    ColumnPruning {
        /// Columns that must survive regardless of tier.
        #[serde(default)]
        protected: Vec<String>,
    },
}

impl Strategy {
    pub const TEMPORAL_NARROWING: &'static str = "temporal_narrowing";
    pub const ENTITY_NARROWING: &'static str = "entity_narrowing";
    pub const COLUMN_PRUNING: &'static str = "column_pruning";

    /// All strategy names, in the default order.
    pub const NAMES: [&'static str; 3] = [
        Self::TEMPORAL_NARROWING,
        Self::ENTITY_NARROWING,
        Self::COLUMN_PRUNING,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::TemporalNarrowing { .. } => Self::TEMPORAL_NARROWING,
            Self::EntityNarrowing { .. } => Self::ENTITY_NARROWING,
            Self::ColumnPruning { .. } => Self::COLUMN_PRUNING,
        }
    }
}

/// An append-only audit entry for one fired strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReductionStep {
    pub strategy_name: String,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub tokens_before: usize,
    pub tokens_after: usize,
    /// What the strategy chose, e.g. "kept 3 of 12 month buckets".
    pub detail: String,
}

/// Terminal state of a reduction run. Neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    WithinBudget,
    OverBudget,
}

/// What a pipeline does when reduction ends over budget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverBudgetPolicy {
    /// Select from the best-effort reduced table.
    #[default]
    Proceed,
    /// Skip selection and return the reduction outcome alone.
    Abort,
}

/// Result of a reduction run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReductionOutcome {
    pub table: Table,
    pub steps: Vec<ReductionStep>,
    pub status: BudgetStatus,
    pub initial_tokens: usize,
    pub final_tokens: usize,
    pub effective_budget: usize,
}

impl ReductionOutcome {
    pub fn is_within_budget(&self) -> bool {
        self.status == BudgetStatus::WithinBudget
    }

    /// One line per step, for transparency messages.
    pub fn audit_lines(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| {
                format!(
                    "{}: rows {}→{}, columns {}→{}, tokens {}→{} ({})",
                    s.strategy_name,
                    s.rows_before,
                    s.rows_after,
                    s.columns_before,
                    s.columns_after,
                    s.tokens_before,
                    s.tokens_after,
                    s.detail
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_match_constants() {
        let s = Strategy::ColumnPruning { protected: vec![] };
        assert_eq!(s.name(), "column_pruning");
        assert_eq!(Strategy::NAMES[0], "temporal_narrowing");
    }

    #[test]
    fn strategy_serializes_tagged() {
        let s = Strategy::EntityNarrowing {
            column: "store".into(),
            metric: "sales".into(),
            candidates: vec![10, 5],
        };
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"strategy\":\"entity_narrowing\""));
    }
}
