//! Diversity buckets and the running "already represented" counts.

use datasift_core::{DiversityDimension, Table, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Bucket label shared by every missing value.
pub(super) const NULL_BUCKET: &str = "(null)";

struct Dimension {
    name: String,
    /// Bucket of every row in the input table.
    keys: Vec<String>,
    /// Buckets present among eligible rows.
    universe: BTreeSet<String>,
    selected: BTreeMap<String, usize>,
}

/// Tracks how often each bucket of each dimension has been picked.
pub(super) struct DiversityTracker {
    dims: Vec<Dimension>,
}

impl DiversityTracker {
    /// Bucket every row; quantile edges come from the eligible rows only.
    /// Column positions are resolved by the caller.
    pub fn new(table: &Table, dimensions: &[(usize, &DiversityDimension)], eligible: &[usize]) -> Self {
        let dims = dimensions
            .iter()
            .map(|&(idx, dim)| {
                let keys = match dim.buckets {
                    Some(n) => quantile_keys(table, idx, n, eligible),
                    None => table.column_values(idx).map(distinct_key).collect(),
                };
                let universe = eligible.iter().map(|&r| keys[r].clone()).collect();
                Dimension {
                    name: dim.name.clone(),
                    keys,
                    universe,
                    selected: BTreeMap::new(),
                }
            })
            .collect();
        Self { dims }
    }

    /// Mean over dimensions of `1 / (1 + times this row's bucket was already
    /// picked)`. Zero when no dimensions are configured.
    pub fn representative(&self, row: usize) -> f64 {
        if self.dims.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .dims
            .iter()
            .map(|d| {
                let seen = d.selected.get(&d.keys[row]).copied().unwrap_or(0);
                1.0 / (1.0 + seen as f64)
            })
            .sum();
        total / self.dims.len() as f64
    }

    pub fn record(&mut self, row: usize) {
        for d in &mut self.dims {
            *d.selected.entry(d.keys[row].clone()).or_insert(0) += 1;
        }
    }

    /// Dimension name → share of its eligible buckets that were picked.
    pub fn coverage(&self) -> BTreeMap<String, f64> {
        self.dims
            .iter()
            .map(|d| {
                let ratio = if d.universe.is_empty() {
                    0.0
                } else {
                    d.selected.len() as f64 / d.universe.len() as f64
                };
                (d.name.clone(), ratio)
            })
            .collect()
    }
}

fn distinct_key(value: &Value) -> String {
    if value.is_null() {
        NULL_BUCKET.to_string()
    } else {
        value.render()
    }
}

/// Equal-frequency buckets `q0..q{n-1}`; non-numeric values share the null
/// bucket. `n` never exceeds the number of eligible values.
fn quantile_keys(table: &Table, idx: usize, buckets: usize, eligible: &[usize]) -> Vec<String> {
    let mut sorted: Vec<f64> = eligible
        .iter()
        .filter_map(|&r| table.rows()[r][idx].as_f64())
        .collect();
    sorted.sort_by(f64::total_cmp);
    let buckets = buckets.min(sorted.len());

    let edges: Vec<f64> = if sorted.is_empty() {
        Vec::new()
    } else {
        (1..buckets)
            .map(|i| sorted[i * sorted.len() / buckets])
            .collect()
    };

    table
        .column_values(idx)
        .map(|v| match v.as_f64() {
            Some(x) => format!("q{}", edges.iter().filter(|&&e| x >= e).count()),
            None => NULL_BUCKET.to_string(),
        })
        .collect()
}
