//! Column pruning: drop low-importance columns until the table fits.

use super::Applied;
use crate::token::TokenEstimator;
use datasift_core::{ColumnSchema, ImportanceTier, Result, Table};
use std::cmp::Reverse;

/// Droppable columns in drop order: tier 3 before tier 2, then ascending
/// cardinality, then name.
fn drop_order<'a>(
    table: &'a Table,
    schema: &ColumnSchema,
    protected: &[String],
) -> Result<Vec<(usize, &'a str)>> {
    let mut droppable = Vec::new();
    for (idx, name) in table.columns().iter().enumerate() {
        let profile = schema.require(name, "column_pruning")?;
        if profile.importance_tier == ImportanceTier::Critical || protected.contains(name) {
            continue;
        }
        droppable.push((
            Reverse(profile.importance_tier),
            profile.cardinality,
            name.as_str(),
            idx,
        ));
    }
    droppable.sort();
    Ok(droppable
        .into_iter()
        .map(|(_, _, name, idx)| (idx, name))
        .collect())
}

pub(super) fn apply(
    table: &Table,
    schema: &ColumnSchema,
    estimator: &TokenEstimator,
    limit: usize,
    protected: &[String],
) -> Result<Applied> {
    let footprint = estimator.footprint(table)?;
    let mut kept: Vec<usize> = (0..table.num_columns()).collect();
    let mut dropped: Vec<String> = Vec::new();

    for (idx, name) in drop_order(table, schema, protected)? {
        if estimator.tokens(footprint.columns_chars(&kept)) <= limit || kept.len() <= 1 {
            break;
        }
        kept.retain(|&k| k != idx);
        dropped.push(name.to_string());
    }

    let detail = if dropped.is_empty() {
        "no droppable columns".to_string()
    } else {
        format!("dropped {} columns: {}", dropped.len(), dropped.join(", "))
    };
    Ok(Applied {
        table: table.without_columns(&dropped),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasift_core::{
        BusinessCategory, Cardinality, ColumnProfile, InferredType, Value,
    };

    fn profile(name: &str, tier: ImportanceTier, cardinality: usize) -> ColumnProfile {
        ColumnProfile {
            name: name.into(),
            inferred_type: InferredType::Categorical,
            business_category: BusinessCategory::Other,
            importance_tier: tier,
            completeness: 1.0,
            cardinality: Cardinality::Exact(cardinality),
            business_purpose: String::new(),
            semantic_tags: vec![],
            sample_values: vec![],
            enriched: false,
        }
    }

    fn fixture() -> (Table, ColumnSchema) {
        let table = Table::from_parts(
            &["id", "zeta", "alpha", "beta", "notes"],
            vec![vec![Value::Int(1), "z".into(), "a".into(), "b".into(), "long text".into()]; 3],
        )
        .unwrap();
        let schema = ColumnSchema::new(vec![
            profile("id", ImportanceTier::Critical, 3),
            profile("zeta", ImportanceTier::Important, 1),
            profile("alpha", ImportanceTier::Important, 1),
            profile("beta", ImportanceTier::Important, 0),
            profile("notes", ImportanceTier::Supplementary, 3),
        ]);
        (table, schema)
    }

    #[test]
    fn drop_order_is_tier_then_cardinality_then_name() {
        let (table, schema) = fixture();
        let order: Vec<&str> = drop_order(&table, &schema, &[])
            .unwrap()
            .into_iter()
            .map(|(_, n)| n)
            .collect();
        assert_eq!(order, vec!["notes", "beta", "alpha", "zeta"]);
    }

    #[test]
    fn never_drops_tier_one_or_protected() {
        let (table, schema) = fixture();
        let out = apply(&table, &schema, &TokenEstimator::default(), 0, &["alpha".into()]).unwrap();
        assert_eq!(out.table.columns(), &["id".to_string(), "alpha".to_string()]);
    }

    #[test]
    fn stops_as_soon_as_it_fits() {
        let (table, schema) = fixture();
        let est = TokenEstimator::new(1).unwrap();
        let without_notes = est.estimate(&table.without_columns(&["notes".into()])).unwrap();
        let out = apply(&table, &schema, &est, without_notes, &[]).unwrap();
        assert_eq!(out.table.num_columns(), 4);
        assert_eq!(out.detail, "dropped 1 columns: notes");
    }
}
