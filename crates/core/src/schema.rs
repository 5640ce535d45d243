//! Column metadata and the business enrichment overlay.

use crate::error::{Error, Result};
use crate::table::Table;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

// ── Column facts ──────────────────────────────────────────────────────────

/// Storage-level type inferred from sampled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferredType {
    Numeric,
    Datetime,
    Boolean,
    Categorical,
    Text,
}

/// Analytical role of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessCategory {
    Identifier,
    Metric,
    Date,
    Categorical,
    Text,
    Other,
}

impl std::fmt::Display for BusinessCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier => write!(f, "identifier"),
            Self::Metric => write!(f, "metric"),
            Self::Date => write!(f, "date"),
            Self::Categorical => write!(f, "categorical"),
            Self::Text => write!(f, "text"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// 1 = critical, 2 = important, 3 = supplementary.
///
/// Pruning removes tier 3 before tier 2 and never touches tier 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ImportanceTier {
    Critical = 1,
    Important = 2,
    Supplementary = 3,
}

impl TryFrom<u8> for ImportanceTier {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Critical),
            2 => Ok(Self::Important),
            3 => Ok(Self::Supplementary),
            other => Err(format!("importance tier must be 1, 2 or 3, got {other}")),
        }
    }
}

impl From<ImportanceTier> for u8 {
    fn from(tier: ImportanceTier) -> Self {
        tier as u8
    }
}

/// Distinct-value count, capped to bound profiling cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    Exact(usize),
    /// More distinct values than the profiler's cap.
    High,
}

impl Cardinality {
    pub fn is_high(&self) -> bool {
        matches!(self, Self::High)
    }
}

impl Serialize for Cardinality {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Exact(n) => serializer.serialize_u64(*n as u64),
            Self::High => serializer.serialize_str("high"),
        }
    }
}

// ── Profiles ──────────────────────────────────────────────────────────────

/// Everything known about one column after profiling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    pub business_category: BusinessCategory,
    pub importance_tier: ImportanceTier,
    /// Non-null fraction in `[0, 1]`.
    pub completeness: f64,
    pub cardinality: Cardinality,
    pub business_purpose: String,
    pub semantic_tags: Vec<String>,
    pub sample_values: Vec<String>,
    /// Whether a business enrichment entry covered this column.
    pub enriched: bool,
}

/// Per-column metadata for one table, in table column order.
///
/// Derived once per pipeline run and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ColumnSchema {
    columns: Vec<ColumnProfile>,
}

impl ColumnSchema {
    pub fn new(columns: Vec<ColumnProfile>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnProfile] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Fail with a configuration error when a referenced column is unknown.
    pub fn require(&self, name: &str, role: &str) -> Result<&ColumnProfile> {
        self.get(name).ok_or_else(|| {
            Error::config(format!("{role} column '{name}' is not present in the schema"))
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Fail with [`Error::InvalidInput`] unless the schema describes exactly
    /// the table's columns, in order.
    pub fn ensure_matches(&self, table: &Table) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::invalid_input("schema has no columns"));
        }
        if !self.names().eq(table.columns().iter().map(String::as_str)) {
            return Err(Error::invalid_input(
                "schema columns do not match the table header",
            ));
        }
        Ok(())
    }

    /// Restrict the schema to the columns still present in `table`.
    pub fn project(&self, table: &Table) -> Result<Self> {
        table
            .columns()
            .iter()
            .map(|name| {
                self.get(name).cloned().ok_or_else(|| {
                    Error::invalid_input(format!("column '{name}' has no profile"))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }

    /// Mean completeness across columns; 0.0 for an empty schema.
    pub fn data_quality_score(&self) -> f64 {
        if self.columns.is_empty() {
            return 0.0;
        }
        self.columns.iter().map(|c| c.completeness).sum::<f64>() / self.columns.len() as f64
    }

    /// Columns no enrichment entry described, candidates for new config.
    pub fn unmapped_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| !c.enriched)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Column names grouped by tier.
    pub fn by_tier(&self) -> BTreeMap<u8, Vec<&str>> {
        let mut out: BTreeMap<u8, Vec<&str>> = BTreeMap::new();
        for c in &self.columns {
            out.entry(c.importance_tier.into())
                .or_default()
                .push(c.name.as_str());
        }
        out
    }
}

// ── Enrichment overlay ────────────────────────────────────────────────────

/// Advisory business metadata for one column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<ImportanceTier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<BusinessCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Column name → enrichment entry. Never the sole source of truth.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessEnrichment {
    #[serde(default)]
    pub fields: BTreeMap<String, EnrichmentEntry>,
}

impl BusinessEnrichment {
    pub fn get(&self, column: &str) -> Option<&EnrichmentEntry> {
        self.fields.get(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, entry: EnrichmentEntry) {
        self.fields.insert(column.into(), entry);
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn profile(name: &str, tier: ImportanceTier, completeness: f64) -> ColumnProfile {
        ColumnProfile {
            name: name.into(),
            inferred_type: InferredType::Numeric,
            business_category: BusinessCategory::Metric,
            importance_tier: tier,
            completeness,
            cardinality: Cardinality::Exact(3),
            business_purpose: String::new(),
            semantic_tags: vec![],
            sample_values: vec![],
            enriched: name == "sales",
        }
    }

    #[test]
    fn tier_rejects_out_of_range() {
        assert!(ImportanceTier::try_from(4).is_err());
        assert_eq!(ImportanceTier::try_from(3).unwrap(), ImportanceTier::Supplementary);
    }

    #[test]
    fn high_cardinality_sorts_last() {
        assert!(Cardinality::Exact(usize::MAX) < Cardinality::High);
        assert!(Cardinality::Exact(2) < Cardinality::Exact(3));
    }

    #[test]
    fn quality_score_and_unmapped() {
        let schema = ColumnSchema::new(vec![
            profile("sales", ImportanceTier::Critical, 1.0),
            profile("notes", ImportanceTier::Supplementary, 0.5),
        ]);
        assert!((schema.data_quality_score() - 0.75).abs() < 1e-9);
        assert_eq!(schema.unmapped_columns(), vec!["notes"]);
        assert_eq!(schema.by_tier()[&3], vec!["notes"]);
    }

    #[test]
    fn project_follows_table_columns() {
        let schema = ColumnSchema::new(vec![
            profile("sales", ImportanceTier::Critical, 1.0),
            profile("notes", ImportanceTier::Supplementary, 0.5),
        ]);
        let table = Table::from_parts(&["sales"], vec![vec![Value::Int(1)]]).unwrap();
        let projected = schema.project(&table).unwrap();
        assert_eq!(projected.len(), 1);
        projected.ensure_matches(&table).unwrap();
        assert!(schema.ensure_matches(&table).is_err());
    }

    #[test]
    fn cardinality_serializes_sentinel() {
        assert_eq!(serde_json::to_string(&Cardinality::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Cardinality::Exact(7)).unwrap(), "7");
    }
}
