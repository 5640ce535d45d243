//! Progressive reduction: shrink a table until it fits a token budget.
//!
//! Strategies run in the configured order:
//!
//! | Strategy | Narrows | Candidate policy |
//! |----------|---------|------------------|
//! | `temporal_narrowing` | rows, to the most recent N time buckets | first window that fits, else the smallest |
//! | `entity_narrowing` | rows, to the top M entities by a metric | first count that fits, else the smallest |
//! | `column_pruning` | columns, tier 3 then tier 2 | drop one at a time until it fits |
//!
//! Before each strategy the current estimate is checked; once it fits the
//! run stops ("within budget") without touching the remaining strategies.
//! Running out of strategies while still too large ends in "over budget",
//! which is reported, not raised.
//!
//! # Determinism
//!
//! Identical inputs always yield an identical table and step log: all
//! grouping uses ordered maps and every ranking has a total tie-break.

mod entity;
mod pruning;
mod temporal;

use crate::token::TokenEstimator;
use datasift_core::{
    BudgetStatus, ColumnSchema, Error, InferredType, ReductionOutcome, ReductionStep, Result,
    Strategy, Table, TokenBudget,
};
use tracing::{debug, info, warn};

/// What one strategy produced.
pub(crate) struct Applied {
    pub table: Table,
    pub detail: String,
}

/// The reduction engine. Stateless; create one and reuse it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReductionEngine {
    estimator: TokenEstimator,
}

impl ReductionEngine {
    pub fn new(estimator: TokenEstimator) -> Self {
        Self { estimator }
    }

    pub fn estimator(&self) -> &TokenEstimator {
        &self.estimator
    }

    /// Reduce `table` until it fits `budget`, trying `strategies` in order.
    ///
    /// Configuration problems (bad budget, unknown column, malformed
    /// candidate list) fail before any work is done. The input table is
    /// never modified.
    pub fn reduce(
        &self,
        table: &Table,
        schema: &ColumnSchema,
        budget: &TokenBudget,
        strategies: &[Strategy],
    ) -> Result<ReductionOutcome> {
        budget.validate()?;
        table.ensure_has_columns()?;
        schema.ensure_matches(table)?;
        for strategy in strategies {
            validate_strategy(strategy, schema)?;
        }

        let limit = budget.effective();
        let initial_tokens = self.estimator.estimate(table)?;
        let mut current = table.clone();
        let mut tokens = initial_tokens;
        let mut steps: Vec<ReductionStep> = Vec::new();

        for strategy in strategies {
            if tokens <= limit {
                break;
            }

            let applied = match strategy {
                Strategy::TemporalNarrowing {
                    column,
                    bucket,
                    windows,
                } => temporal::apply(&current, &self.estimator, limit, column, *bucket, windows)?,
                Strategy::EntityNarrowing {
                    column,
                    metric,
                    candidates,
                } => entity::apply(&current, &self.estimator, limit, column, metric, candidates)?,
                Strategy::ColumnPruning { protected } => {
                    pruning::apply(&current, schema, &self.estimator, limit, protected)?
                }
            };

            let tokens_after = self.estimator.estimate(&applied.table)?;
            let step = ReductionStep {
                strategy_name: strategy.name().to_string(),
                rows_before: current.num_rows(),
                rows_after: applied.table.num_rows(),
                columns_before: current.num_columns(),
                columns_after: applied.table.num_columns(),
                tokens_before: tokens,
                tokens_after,
                detail: applied.detail,
            };
            info!(
                strategy = %step.strategy_name,
                rows = step.rows_after,
                columns = step.columns_after,
                tokens_before = step.tokens_before,
                tokens_after = step.tokens_after,
                "Reduction step: {}",
                step.detail
            );
            steps.push(step);
            current = applied.table;
            tokens = tokens_after;
        }

        let status = if tokens <= limit {
            BudgetStatus::WithinBudget
        } else {
            warn!(
                tokens,
                budget = limit,
                "Still over budget after {} reduction steps",
                steps.len()
            );
            BudgetStatus::OverBudget
        };
        debug!(initial_tokens, final_tokens = tokens, ?status, "Reduction finished");

        Ok(ReductionOutcome {
            table: current,
            steps,
            status,
            initial_tokens,
            final_tokens: tokens,
            effective_budget: limit,
        })
    }
}

/// First candidate that fits, else the last (most aggressive) one.
pub(crate) fn choose_candidate(candidates: &[usize], fits: impl Fn(usize) -> bool) -> usize {
    candidates
        .iter()
        .copied()
        .find(|&c| fits(c))
        .or_else(|| candidates.last().copied())
        .unwrap_or(0)
}

fn validate_candidates(strategy: &str, what: &str, candidates: &[usize]) -> Result<()> {
    if candidates.is_empty() {
        return Err(Error::config(format!("{strategy}: {what} list is empty")));
    }
    if candidates.contains(&0) {
        return Err(Error::config(format!("{strategy}: {what} must be positive")));
    }
    if candidates.windows(2).any(|w| w[0] <= w[1]) {
        return Err(Error::config(format!(
            "{strategy}: {what} must be strictly descending, got {candidates:?}"
        )));
    }
    Ok(())
}

fn validate_strategy(strategy: &Strategy, schema: &ColumnSchema) -> Result<()> {
    let name = strategy.name();
    match strategy {
        Strategy::TemporalNarrowing {
            column, windows, ..
        } => {
            let profile = schema.require(column, name)?;
            if profile.inferred_type != InferredType::Datetime {
                return Err(Error::config(format!(
                    "{name}: column '{column}' is not a date column"
                )));
            }
            validate_candidates(name, "windows", windows)
        }
        Strategy::EntityNarrowing {
            column,
            metric,
            candidates,
        } => {
            schema.require(column, name)?;
            let profile = schema.require(metric, name)?;
            if profile.inferred_type != InferredType::Numeric {
                return Err(Error::config(format!(
                    "{name}: metric column '{metric}' is not numeric"
                )));
            }
            validate_candidates(name, "candidates", candidates)
        }
        Strategy::ColumnPruning { protected } => {
            for column in protected {
                schema.require(column, name)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Profiler;
    use chrono::NaiveDate;
    use datasift_core::{TimeBucket, Value};

    /// 4 stores × 6 months, with a wide notes column.
    fn monthly_sales() -> Table {
        let mut rows = Vec::new();
        for month in 1..=6u32 {
            for store in 1..=4i64 {
                rows.push(vec![
                    Value::Text(format!("store-{store}")),
                    Value::Date(NaiveDate::from_ymd_opt(2024, month, 1).unwrap()),
                    Value::Int(store * 100 + month as i64),
                    Value::Text(format!(
                        "Narrative commentary on store {store} performance for month {month}, lots of words"
                    )),
                ]);
            }
        }
        Table::from_parts(&["store_id", "month", "sales", "notes"], rows).unwrap()
    }

    fn default_strategies() -> Vec<Strategy> {
        vec![
            Strategy::TemporalNarrowing {
                column: "month".into(),
                bucket: TimeBucket::Month,
                windows: vec![6, 3, 1],
            },
            Strategy::EntityNarrowing {
                column: "store_id".into(),
                metric: "sales".into(),
                candidates: vec![4, 2, 1],
            },
            Strategy::ColumnPruning { protected: vec![] },
        ]
    }

    fn run(table: &Table, max_tokens: usize) -> ReductionOutcome {
        let schema = Profiler::default().profile(table, None).unwrap();
        ReductionEngine::default()
            .reduce(
                table,
                &schema,
                &TokenBudget::new(max_tokens, 0).unwrap(),
                &default_strategies(),
            )
            .unwrap()
    }

    #[test]
    fn short_circuits_when_already_within_budget() {
        let table = monthly_sales();
        let outcome = run(&table, 1_000_000);
        assert!(outcome.steps.is_empty());
        assert_eq!(outcome.table, table);
        assert!(outcome.is_within_budget());
    }

    #[test]
    fn temporal_narrowing_alone_can_satisfy_budget() {
        let table = monthly_sales();
        let full = ReductionEngine::default().estimator().estimate(&table).unwrap();
        let outcome = run(&table, full / 2 + 10);
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.steps[0].strategy_name, "temporal_narrowing");
        assert_eq!(outcome.table.num_rows(), 12);
        assert!(outcome.is_within_budget());
    }

    #[test]
    fn steps_never_grow_the_table() {
        let outcome = run(&monthly_sales(), 20);
        assert!(!outcome.steps.is_empty());
        for step in &outcome.steps {
            assert!(step.tokens_after <= step.tokens_before);
            assert!(step.rows_after <= step.rows_before);
            assert!(step.columns_after <= step.columns_before);
        }
    }

    #[test]
    fn impossible_budget_ends_over_budget_not_error() {
        let outcome = run(&monthly_sales(), 5);
        assert_eq!(outcome.status, BudgetStatus::OverBudget);
        assert_eq!(outcome.steps.len(), 3);
        assert!(outcome.final_tokens > 5);
        // tier-1 columns survive pruning
        assert!(outcome.table.column_index("store_id").is_some());
        assert!(outcome.table.column_index("sales").is_some());
        assert!(outcome.table.column_index("notes").is_none());
    }

    #[test]
    fn reduction_is_deterministic() {
        let table = monthly_sales();
        let a = run(&table, 120);
        let b = run(&table, 120);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a.table).unwrap(),
            serde_json::to_string(&b.table).unwrap()
        );
    }

    #[test]
    fn idempotent_once_within_budget() {
        let table = monthly_sales();
        let first = run(&table, 200);
        assert!(first.is_within_budget());
        let second = run(&first.table, 200);
        assert!(second.steps.is_empty());
        assert_eq!(second.table, first.table);
    }

    #[test]
    fn unknown_column_is_config_error() {
        let table = monthly_sales();
        let schema = Profiler::default().profile(&table, None).unwrap();
        let err = ReductionEngine::default()
            .reduce(
                &table,
                &schema,
                &TokenBudget::new(10, 0).unwrap(),
                &[Strategy::EntityNarrowing {
                    column: "location".into(),
                    metric: "sales".into(),
                    candidates: vec![2],
                }],
            )
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn non_descending_windows_rejected() {
        let table = monthly_sales();
        let schema = Profiler::default().profile(&table, None).unwrap();
        let err = ReductionEngine::default()
            .reduce(
                &table,
                &schema,
                &TokenBudget::new(10, 0).unwrap(),
                &[Strategy::TemporalNarrowing {
                    column: "month".into(),
                    bucket: TimeBucket::Month,
                    windows: vec![1, 3],
                }],
            )
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn temporal_column_must_be_dates() {
        let table = monthly_sales();
        let schema = Profiler::default().profile(&table, None).unwrap();
        let err = ReductionEngine::default()
            .reduce(
                &table,
                &schema,
                &TokenBudget::new(10, 0).unwrap(),
                &[Strategy::TemporalNarrowing {
                    column: "sales".into(),
                    bucket: TimeBucket::Month,
                    windows: vec![3],
                }],
            )
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn mismatched_schema_is_invalid_input() {
        let table = monthly_sales();
        let other = Table::from_parts(&["x"], vec![]).unwrap();
        let schema = Profiler::default().profile(&other, None).unwrap();
        let err = ReductionEngine::default()
            .reduce(&table, &schema, &TokenBudget::new(10, 0).unwrap(), &[])
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn choose_candidate_policy() {
        assert_eq!(choose_candidate(&[6, 3, 1], |c| c <= 3), 3);
        assert_eq!(choose_candidate(&[6, 3, 1], |_| false), 1);
    }
}
