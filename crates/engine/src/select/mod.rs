//! Multi-criteria selection of a bounded, diverse subset of rows.
//!
//! 1. Hard eligibility filter, first failed check wins
//!    (completeness → priority → volume → explicit exclusion → duplicate).
//! 2. Priority and volume are min–max normalized over the surviving rows.
//! 3. A greedy loop picks the best composite each round. The
//!    representative sub-score depends on what has already been picked,
//!    so it is refreshed after every pick.
//! 4. The report records coverage per diversity dimension, exclusion
//!    counts, and whether the target was under-filled.
//!
//! Ties on the composite go to the higher raw priority, then to the row
//! that came first in the input.

mod diversity;
mod eligibility;

use datasift_core::{
    ColumnSchema, Error, Pick, Result, SelectionCriteria, SelectionOutcome, SelectionReport,
    SelectionScore, SelectionWeights, Table, Thresholds,
};
use diversity::DiversityTracker;
use eligibility::Checks;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// Scores and picks rows. Holds only configuration.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    criteria: SelectionCriteria,
}

impl Selector {
    pub fn new(criteria: SelectionCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &SelectionCriteria {
        &self.criteria
    }

    /// Columns the selector reads; reduction must keep these.
    pub fn referenced_columns(&self, thresholds: &Thresholds) -> Vec<String> {
        let mut cols = vec![
            self.criteria.priority_column.clone(),
            self.criteria.volume_column.clone(),
        ];
        cols.extend(self.criteria.diversity.iter().map(|d| d.column.clone()));
        cols.extend(thresholds.exclusion_column.iter().cloned());
        cols.extend(thresholds.required_fields.iter().cloned());
        cols.sort();
        cols.dedup();
        cols
    }

    /// Check the selection settings against a header without touching any
    /// rows. Every failure is a configuration error.
    pub fn validate(
        &self,
        columns: &[String],
        target_count: usize,
        weights: &SelectionWeights,
        thresholds: &Thresholds,
    ) -> Result<()> {
        weights.validate()?;
        if target_count == 0 {
            return Err(Error::config("target_count must be greater than zero"));
        }
        if let Some(min) = thresholds.min_completeness
            && !(0.0..=1.0).contains(&min)
        {
            return Err(Error::config(format!(
                "min_completeness must be within [0, 1], got {min}"
            )));
        }
        if let Some(dim) = self.criteria.diversity.iter().find(|d| d.buckets == Some(0)) {
            return Err(Error::config(format!(
                "diversity dimension '{}' needs at least one bucket",
                dim.name
            )));
        }
        if let Some(missing) = self
            .referenced_columns(thresholds)
            .into_iter()
            .find(|c| !columns.contains(c))
        {
            return Err(Error::config(format!(
                "column '{missing}' not present in table"
            )));
        }
        Ok(())
    }

    /// Pick up to `target_count` rows.
    ///
    /// Fewer eligible rows than requested is not an error: every eligible
    /// row is returned and `report.shortfall` is set.
    pub fn select(
        &self,
        table: &Table,
        schema: &ColumnSchema,
        target_count: usize,
        weights: &SelectionWeights,
        thresholds: &Thresholds,
    ) -> Result<SelectionOutcome> {
        table.ensure_has_columns()?;
        schema.ensure_matches(table)?;
        self.validate(table.columns(), target_count, weights, thresholds)?;

        let priority_idx = table.require_column(&self.criteria.priority_column)?;
        let volume_idx = table.require_column(&self.criteria.volume_column)?;
        let dimensions = self
            .criteria
            .diversity
            .iter()
            .map(|dim| Ok((table.require_column(&dim.column)?, dim)))
            .collect::<Result<Vec<_>>>()?;
        let checks = Checks::resolve(table, thresholds, priority_idx, volume_idx)?;

        info!(
            rows = table.num_rows(),
            target_count,
            dimensions = dimensions.len(),
            "Selecting rows"
        );

        let eligibility = eligibility::filter(table, &checks);
        let eligible = eligibility.eligible;
        let raw_priority = raw_metric(table, priority_idx);
        let priority = normalize(&raw_priority, &eligible);
        let volume = normalize(&raw_metric(table, volume_idx), &eligible);
        let mut tracker = DiversityTracker::new(table, &dimensions, &eligible);

        let mut remaining = eligible.clone();
        let mut picks: Vec<Pick> = Vec::with_capacity(target_count.min(eligible.len()));
        while picks.len() < target_count && !remaining.is_empty() {
            let mut best: Option<(usize, SelectionScore)> = None;
            for (pos, &row) in remaining.iter().enumerate() {
                let representative = tracker.representative(row);
                let score = SelectionScore {
                    representative,
                    priority: priority[row],
                    volume: volume[row],
                    composite: weights.composite(representative, priority[row], volume[row]),
                };
                let better = match &best {
                    None => true,
                    Some((best_pos, best_score)) => {
                        let best_row = remaining[*best_pos];
                        match score.composite.total_cmp(&best_score.composite) {
                            Ordering::Greater => true,
                            Ordering::Less => false,
                            Ordering::Equal => {
                                priority_rank(raw_priority[row])
                                    .total_cmp(&priority_rank(raw_priority[best_row]))
                                    == Ordering::Greater
                            }
                        }
                    }
                };
                if better {
                    best = Some((pos, score));
                }
            }

            let Some((pos, score)) = best else { break };
            let row = remaining.remove(pos);
            tracker.record(row);
            let rank = picks.len() + 1;
            debug!(row, rank, composite = score.composite, "Picked row");
            picks.push(Pick {
                row_index: row,
                rank,
                score,
            });
        }

        let selected: Vec<usize> = picks.iter().map(|p| p.row_index).collect();
        let report = SelectionReport {
            original_count: table.num_rows(),
            eligible_count: eligible.len(),
            selected_count: picks.len(),
            target_count,
            shortfall: picks.len() < target_count,
            weights_used: *weights,
            coverage_metrics: tracker.coverage(),
            excluded_reason_counts: eligibility.excluded,
            rationale: rationale(table.num_rows(), eligible.len(), picks.len()),
        };
        if report.shortfall {
            warn!(
                selected = report.selected_count,
                target_count, "Fewer eligible rows than requested"
            );
        }
        info!("{}", report.rationale);

        Ok(SelectionOutcome {
            rows: table.with_rows(&selected),
            picks,
            report,
        })
    }
}

fn raw_metric(table: &Table, idx: usize) -> Vec<Option<f64>> {
    table.column_values(idx).map(|v| v.as_f64()).collect()
}

/// Min–max normalize over the eligible rows. Missing values score 0; a
/// constant column scores 1 everywhere.
fn normalize(raw: &[Option<f64>], eligible: &[usize]) -> Vec<f64> {
    let present = eligible.iter().filter_map(|&r| raw[r]);
    let (min, max) = present.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let span = max - min;
    raw.iter()
        .map(|v| match v {
            None => 0.0,
            Some(_) if !span.is_finite() || span <= 0.0 => 1.0,
            Some(v) => ((v - min) / span).clamp(0.0, 1.0),
        })
        .collect()
}

fn priority_rank(raw: Option<f64>) -> f64 {
    raw.unwrap_or(f64::NEG_INFINITY)
}

fn rationale(original: usize, eligible: usize, selected: usize) -> String {
    let pct = if original == 0 {
        0.0
    } else {
        selected as f64 * 100.0 / original as f64
    };
    format!("selected {selected} of {original} rows ({pct:.1}%), {eligible} eligible")
}
