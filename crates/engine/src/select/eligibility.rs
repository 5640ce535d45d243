//! Hard eligibility filter applied before scoring.

use datasift_core::{ExclusionReason, Result, Row, Table, Thresholds};
use std::collections::{BTreeMap, HashSet};

/// Rows that survived, plus how many were dropped for each reason.
#[derive(Debug, Default)]
pub(super) struct Eligibility {
    pub eligible: Vec<usize>,
    pub excluded: BTreeMap<ExclusionReason, usize>,
}

/// Column positions the checks read, resolved once up front.
pub(super) struct Checks<'a> {
    pub thresholds: &'a Thresholds,
    pub required: Vec<usize>,
    pub priority: usize,
    pub volume: usize,
    pub exclusion: Option<usize>,
}

impl<'a> Checks<'a> {
    pub fn resolve(
        table: &Table,
        thresholds: &'a Thresholds,
        priority: usize,
        volume: usize,
    ) -> Result<Self> {
        let required = if thresholds.required_fields.is_empty() {
            (0..table.num_columns()).collect()
        } else {
            thresholds
                .required_fields
                .iter()
                .map(|f| table.require_column(f))
                .collect::<Result<Vec<_>>>()?
        };
        let exclusion = thresholds
            .exclusion_column
            .as_deref()
            .map(|c| table.require_column(c))
            .transpose()?;
        Ok(Self {
            thresholds,
            required,
            priority,
            volume,
            exclusion,
        })
    }

    /// First failed check, in the fixed order completeness → priority →
    /// volume → explicit exclusion.
    fn first_failure(&self, row: &Row) -> Option<ExclusionReason> {
        if let Some(min) = self.thresholds.min_completeness {
            let filled = self.required.iter().filter(|&&i| !row[i].is_null()).count();
            let completeness = if self.required.is_empty() {
                1.0
            } else {
                filled as f64 / self.required.len() as f64
            };
            if completeness < min {
                return Some(ExclusionReason::Completeness);
            }
        }
        if below(row, self.priority, self.thresholds.min_priority) {
            return Some(ExclusionReason::Priority);
        }
        if below(row, self.volume, self.thresholds.min_volume) {
            return Some(ExclusionReason::Volume);
        }
        if self.exclusion.is_some_and(|i| row[i].is_truthy_flag()) {
            return Some(ExclusionReason::ExplicitExclusion);
        }
        None
    }
}

/// A missing or non-numeric value fails any configured minimum.
fn below(row: &Row, idx: usize, min: Option<f64>) -> bool {
    match min {
        Some(min) => row[idx].as_f64().is_none_or(|v| v < min),
        None => false,
    }
}

/// Apply every check to every row; duplicates of an earlier eligible row
/// are dropped last.
pub(super) fn filter(table: &Table, checks: &Checks<'_>) -> Eligibility {
    let mut out = Eligibility::default();
    let mut seen: HashSet<Vec<String>> = HashSet::new();

    for (idx, row) in table.rows().iter().enumerate() {
        let reason = checks.first_failure(row).or_else(|| {
            let signature: Vec<String> = row.iter().map(|v| v.render()).collect();
            (!seen.insert(signature)).then_some(ExclusionReason::Duplicate)
        });
        match reason {
            Some(reason) => *out.excluded.entry(reason).or_insert(0) += 1,
            None => out.eligible.push(idx),
        }
    }
    out
}
