//! Column profiling.
//!
//! Derives per-column facts from the data (type, completeness, cardinality),
//! classifies each column through the [`CategoryRules`] table, then lays the
//! business enrichment over the result with [`merge`]. Columns are never
//! dropped here: unknown columns get category `other` and tier 2.

pub mod merge;
pub mod rules;

pub use merge::merge;
pub use rules::{CategoryRule, CategoryRules, suggest_purpose};

use datasift_core::{
    BusinessEnrichment, Cardinality, ColumnProfile, ColumnSchema, InferredType, Result, Table,
    Value,
};
use std::collections::HashSet;
use tracing::debug;

pub const DEFAULT_SAMPLE_SIZE: usize = 200;
pub const DEFAULT_CARDINALITY_CAP: usize = 1000;
pub const DEFAULT_SAMPLE_VALUES: usize = 3;

/// Average length above which text is treated as narrative.
const NARRATIVE_AVG_LEN: usize = 40;

/// Stateless column profiler. Create one and reuse it.
#[derive(Debug, Clone)]
pub struct Profiler {
    rules: CategoryRules,
    sample_size: usize,
    cardinality_cap: usize,
    sample_values: usize,
}

impl Profiler {
    pub fn new(rules: CategoryRules) -> Self {
        Self {
            rules,
            sample_size: DEFAULT_SAMPLE_SIZE,
            cardinality_cap: DEFAULT_CARDINALITY_CAP,
            sample_values: DEFAULT_SAMPLE_VALUES,
        }
    }

    /// Number of non-null values used for type inference (at least 1).
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size.max(1);
        self
    }

    /// Distinct-value count beyond which cardinality is reported as high.
    pub fn with_cardinality_cap(mut self, cap: usize) -> Self {
        self.cardinality_cap = cap;
        self
    }

    /// Number of example values kept per column.
    pub fn with_sample_values(mut self, n: usize) -> Self {
        self.sample_values = n;
        self
    }

    /// Profile every column of `table`, in column order.
    ///
    /// Fails with `InvalidInput` when the table has no columns.
    pub fn profile(
        &self,
        table: &Table,
        enrichment: Option<&BusinessEnrichment>,
    ) -> Result<ColumnSchema> {
        table.ensure_has_columns()?;

        let columns: Vec<ColumnProfile> = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let derived = self.derive(name, table, idx);
                merge(derived, enrichment.and_then(|e| e.get(name)))
            })
            .collect();

        let schema = ColumnSchema::new(columns);
        debug!(
            columns = schema.len(),
            rows = table.num_rows(),
            quality = schema.data_quality_score(),
            unmapped = schema.unmapped_columns().len(),
            "Profiled table"
        );
        Ok(schema)
    }

    /// Data-derived profile of one column, before enrichment.
    fn derive(&self, name: &str, table: &Table, idx: usize) -> ColumnProfile {
        let inferred_type = infer_type(table.column_values(idx), self.sample_size);
        let completeness = completeness(table.column_values(idx), table.num_rows());
        let cardinality = cardinality(table.column_values(idx), self.cardinality_cap);
        let business_category = self.rules.categorize(name, inferred_type);
        let importance_tier =
            self.rules
                .default_tier(name, business_category, inferred_type, cardinality);

        let mut semantic_tags = vec![business_category.to_string()];
        if cardinality.is_high() {
            semantic_tags.push("high_cardinality".into());
        }

        ColumnProfile {
            name: name.to_string(),
            inferred_type,
            business_category,
            importance_tier,
            completeness,
            cardinality,
            business_purpose: suggest_purpose(name),
            semantic_tags,
            sample_values: sample_values(table.column_values(idx), self.sample_values),
            enriched: false,
        }
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new(CategoryRules::default())
    }
}

/// Majority vote over the first `sample_size` non-null values.
///
/// Ties resolve in the order numeric, datetime, boolean, categorical/text.
fn infer_type<'a>(values: impl Iterator<Item = &'a Value>, sample_size: usize) -> InferredType {
    let (mut numeric, mut datetime, mut boolean) = (0usize, 0usize, 0usize);
    let mut texts: Vec<&str> = Vec::new();

    for value in values.filter(|v| !v.is_null()).take(sample_size) {
        match value {
            Value::Int(_) | Value::Float(_) => numeric += 1,
            Value::Date(_) | Value::DateTime(_) => datetime += 1,
            Value::Bool(_) => boolean += 1,
            Value::Text(t) => texts.push(t),
            Value::Null => {}
        }
    }

    let candidates = [
        (InferredType::Numeric, numeric),
        (InferredType::Datetime, datetime),
        (InferredType::Boolean, boolean),
        (textual_kind(&texts), texts.len()),
    ];
    let mut best = (InferredType::Text, 0usize);
    for (kind, votes) in candidates {
        if votes > best.1 {
            best = (kind, votes);
        }
    }
    best.0
}

/// Narrative text versus a categorical label column.
fn textual_kind(texts: &[&str]) -> InferredType {
    if texts.is_empty() {
        return InferredType::Text;
    }
    let avg_len = texts.iter().map(|t| t.len()).sum::<usize>() / texts.len();
    if avg_len > NARRATIVE_AVG_LEN {
        return InferredType::Text;
    }
    let distinct: HashSet<&str> = texts.iter().copied().collect();
    let mostly_unique = distinct.len() * 2 >= texts.len();
    let mostly_phrases = texts.iter().filter(|t| t.contains(' ')).count() * 2 >= texts.len();
    if mostly_unique && mostly_phrases {
        InferredType::Text
    } else {
        InferredType::Categorical
    }
}

fn completeness<'a>(values: impl Iterator<Item = &'a Value>, rows: usize) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    values.filter(|v| !v.is_null()).count() as f64 / rows as f64
}

/// Distinct non-null values, stopping once `cap` is exceeded.
fn cardinality<'a>(values: impl Iterator<Item = &'a Value>, cap: usize) -> Cardinality {
    let mut seen: HashSet<String> = HashSet::new();
    for value in values.filter(|v| !v.is_null()) {
        seen.insert(value.render());
        if seen.len() > cap {
            return Cardinality::High;
        }
    }
    Cardinality::Exact(seen.len())
}

/// First `n` distinct rendered values, in row order.
fn sample_values<'a>(values: impl Iterator<Item = &'a Value>, n: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.filter(|v| !v.is_null()) {
        if out.len() >= n {
            break;
        }
        let rendered = value.render();
        if !out.contains(&rendered) {
            out.push(rendered);
        }
    }
    out
}
