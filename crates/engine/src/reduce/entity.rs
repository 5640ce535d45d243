//! Entity narrowing: keep the top M entities ranked by a metric.

use super::{Applied, choose_candidate};
use crate::token::TokenEstimator;
use datasift_core::{Result, Table};
use std::collections::{BTreeMap, HashSet};

/// Entities ordered by summed metric descending, ties by key ascending.
fn rank_entities(table: &Table, entity_idx: usize, metric_idx: usize) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in table.rows() {
        if row[entity_idx].is_null() {
            continue;
        }
        let metric = row[metric_idx].as_f64().unwrap_or(0.0);
        *totals.entry(row[entity_idx].render()).or_insert(0.0) += metric;
    }
    let mut ranked: Vec<(String, f64)> = totals.into_iter().collect();
    // stable sort keeps BTreeMap key order among equal totals
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

pub(super) fn apply(
    table: &Table,
    estimator: &TokenEstimator,
    limit: usize,
    column: &str,
    metric: &str,
    candidates: &[usize],
) -> Result<Applied> {
    let entity_idx = table.require_column(column)?;
    let metric_idx = table.require_column(metric)?;
    let ranked = rank_entities(table, entity_idx, metric_idx);
    let keys: Vec<String> = table.column_values(entity_idx).map(|v| v.render()).collect();
    let nulls: Vec<bool> = table.column_values(entity_idx).map(|v| v.is_null()).collect();

    let footprint = estimator.footprint(table)?;
    let kept_rows = |m: usize| -> Option<Vec<usize>> {
        if m >= ranked.len() {
            return None;
        }
        let top: HashSet<&str> = ranked[..m].iter().map(|(k, _)| k.as_str()).collect();
        Some(
            (0..keys.len())
                .filter(|&i| !nulls[i] && top.contains(keys[i].as_str()))
                .collect(),
        )
    };
    let fits = |m: usize| match kept_rows(m) {
        Some(rows) => estimator.tokens(footprint.rows_chars(rows)) <= limit,
        None => estimator.tokens(footprint.total_chars()) <= limit,
    };

    let m = choose_candidate(candidates, fits);
    Ok(match kept_rows(m) {
        Some(rows) => Applied {
            table: table.with_rows(&rows),
            detail: format!(
                "kept top {m} of {} '{column}' entities by {metric}",
                ranked.len()
            ),
        },
        None => Applied {
            table: table.clone(),
            detail: format!(
                "top {m} covers all {} '{column}' entities",
                ranked.len()
            ),
        },
    })
}
