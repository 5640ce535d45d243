//! Selection configuration, scores, and the selection report.

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerance when checking that weights sum to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Relative weight of each sub-score in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionWeights {
    pub representative: f64,
    pub priority: f64,
    pub volume: f64,
}

impl SelectionWeights {
    pub fn new(representative: f64, priority: f64, volume: f64) -> Result<Self> {
        let w = Self {
            representative,
            priority,
            volume,
        };
        w.validate()?;
        Ok(w)
    }

    /// Weights must be finite, non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        let all = [self.representative, self.priority, self.volume];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(Error::config(format!(
                "selection weights must be non-negative, got {all:?}"
            )));
        }
        let sum: f64 = all.iter().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(Error::config(format!(
                "selection weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }

    pub fn composite(&self, representative: f64, priority: f64, volume: f64) -> f64 {
        self.representative * representative + self.priority * priority + self.volume * volume
    }
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            representative: 0.4,
            priority: 0.4,
            volume: 0.2,
        }
    }
}

/// Hard eligibility thresholds. `None` disables a check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Minimum non-null fraction over `required_fields`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_completeness: Option<f64>,
    /// Fields checked for completeness; empty means every column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_priority: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_volume: Option<f64>,
    /// Boolean-ish column whose truthy value excludes the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_column: Option<String>,
}

/// A dimension along which the selection should stay diverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversityDimension {
    /// Report label, e.g. "region" or "performance".
    pub name: String,
    pub column: String,
    /// Quantile bucket count for numeric columns; `None` uses distinct values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buckets: Option<usize>,
}

impl DiversityDimension {
    pub fn distinct(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            buckets: None,
        }
    }

    pub fn quantiles(name: impl Into<String>, column: impl Into<String>, buckets: usize) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            buckets: Some(buckets),
        }
    }
}

/// Which columns feed the sub-scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    pub priority_column: String,
    pub volume_column: String,
    #[serde(default)]
    pub diversity: Vec<DiversityDimension>,
}

/// First failed check for an excluded row, in check order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Completeness,
    Priority,
    Volume,
    ExplicitExclusion,
    Duplicate,
}

/// Sub-scores of one row at the moment it was picked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionScore {
    pub representative: f64,
    pub priority: f64,
    pub volume: f64,
    pub composite: f64,
}

/// One selected row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pick {
    /// Index of the row in the input table.
    pub row_index: usize,
    /// 1-based pick order.
    pub rank: usize,
    pub score: SelectionScore,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionReport {
    pub original_count: usize,
    pub eligible_count: usize,
    pub selected_count: usize,
    pub target_count: usize,
    /// `selected_count < target_count`.
    pub shortfall: bool,
    pub weights_used: SelectionWeights,
    /// Dimension name → fraction of its eligible buckets represented.
    pub coverage_metrics: BTreeMap<String, f64>,
    pub excluded_reason_counts: BTreeMap<ExclusionReason, usize>,
    pub rationale: String,
}

/// Selected rows in pick order, with per-pick scores and the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionOutcome {
    pub rows: Table,
    pub picks: Vec<Pick>,
    pub report: SelectionReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_must_sum_to_one() {
        let err = SelectionWeights::new(0.5, 0.5, 0.5).unwrap_err();
        assert!(err.is_config());
        assert!(SelectionWeights::new(0.0, 0.5, 0.5).is_ok());
        assert!(SelectionWeights::default().validate().is_ok());
    }

    #[test]
    fn negative_weight_rejected() {
        assert!(SelectionWeights::new(-0.5, 1.0, 0.5).is_err());
        assert!(SelectionWeights::new(f64::NAN, 0.5, 0.5).is_err());
    }

    #[test]
    fn composite_is_weighted_sum() {
        let w = SelectionWeights::new(0.2, 0.5, 0.3).unwrap();
        assert!((w.composite(1.0, 0.5, 0.0) - 0.45).abs() < 1e-12);
    }

    #[test]
    fn reason_counts_serialize_as_map() {
        let mut counts = BTreeMap::new();
        counts.insert(ExclusionReason::ExplicitExclusion, 2usize);
        let json = serde_json::to_string(&counts).unwrap();
        assert_eq!(json, r#"{"explicit_exclusion":2}"#);
    }
}
