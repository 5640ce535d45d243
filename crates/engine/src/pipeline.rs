//! The full run: profile → reduce → project schema → select.

use crate::profile::Profiler;
use crate::reduce::ReductionEngine;
use crate::select::Selector;
use datasift_core::{
    BusinessEnrichment, ColumnSchema, OverBudgetPolicy, ReductionOutcome, Result,
    SelectionOutcome, SelectionWeights, Strategy, Table, Thresholds, TokenBudget,
};
use serde::Serialize;
use tracing::{info, warn};

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineOutcome {
    /// Schema of the reduced table.
    pub schema: ColumnSchema,
    pub reduction: ReductionOutcome,
    /// `None` when the run stopped after reduction under
    /// [`OverBudgetPolicy::Abort`].
    pub selection: Option<SelectionOutcome>,
}

/// Wires the stages together. Every stage is stateless, so one pipeline
/// can be reused across datasets.
#[derive(Debug, Clone)]
pub struct Pipeline {
    profiler: Profiler,
    engine: ReductionEngine,
    selector: Selector,
    budget: TokenBudget,
    strategies: Vec<Strategy>,
    target_count: usize,
    weights: SelectionWeights,
    thresholds: Thresholds,
    on_over_budget: OverBudgetPolicy,
}

impl Pipeline {
    pub fn new(
        budget: TokenBudget,
        strategies: Vec<Strategy>,
        selector: Selector,
        target_count: usize,
    ) -> Self {
        Self {
            profiler: Profiler::default(),
            engine: ReductionEngine::default(),
            selector,
            budget,
            strategies,
            target_count,
            weights: SelectionWeights::default(),
            thresholds: Thresholds::default(),
            on_over_budget: OverBudgetPolicy::default(),
        }
    }

    pub fn with_profiler(mut self, profiler: Profiler) -> Self {
        self.profiler = profiler;
        self
    }

    pub fn with_engine(mut self, engine: ReductionEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_weights(mut self, weights: SelectionWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_over_budget(mut self, policy: OverBudgetPolicy) -> Self {
        self.on_over_budget = policy;
        self
    }

    /// Strategies as run, with the selector's columns added to every
    /// pruning step's protected list.
    fn effective_strategies(&self) -> Vec<Strategy> {
        let needed = self.selector.referenced_columns(&self.thresholds);
        self.strategies
            .iter()
            .map(|s| match s {
                Strategy::ColumnPruning { protected } => {
                    let mut protected = protected.clone();
                    for col in &needed {
                        if !protected.contains(col) {
                            protected.push(col.clone());
                        }
                    }
                    Strategy::ColumnPruning { protected }
                }
                other => other.clone(),
            })
            .collect()
    }

    /// Selection settings are checked against the input header before any
    /// stage runs, whatever the over-budget policy.
    pub fn run(
        &self,
        table: &Table,
        enrichment: Option<&BusinessEnrichment>,
    ) -> Result<PipelineOutcome> {
        table.ensure_has_columns()?;
        self.selector.validate(
            table.columns(),
            self.target_count,
            &self.weights,
            &self.thresholds,
        )?;

        let schema = self.profiler.profile(table, enrichment)?;
        let strategies = self.effective_strategies();
        let reduction = self
            .engine
            .reduce(table, &schema, &self.budget, &strategies)?;
        let schema = schema.project(&reduction.table)?;

        if !reduction.is_within_budget() && self.on_over_budget == OverBudgetPolicy::Abort {
            warn!(
                tokens = reduction.final_tokens,
                budget = reduction.effective_budget,
                "Over budget after reduction; skipping selection"
            );
            return Ok(PipelineOutcome {
                schema,
                reduction,
                selection: None,
            });
        }

        let selection = self.selector.select(
            &reduction.table,
            &schema,
            self.target_count,
            &self.weights,
            &self.thresholds,
        )?;
        info!(
            rows_in = table.num_rows(),
            rows_reduced = reduction.table.num_rows(),
            selected = selection.report.selected_count,
            "Pipeline finished"
        );
        Ok(PipelineOutcome {
            schema,
            reduction,
            selection: Some(selection),
        })
    }
}
