//! Enrichment overlay: `effective = merge(data_derived, override)`.

use datasift_core::{ColumnProfile, EnrichmentEntry};

/// Apply an enrichment entry on top of a data-derived profile.
///
/// Override fields win when present; everything the entry leaves unset
/// keeps its data-derived value. Data facts (type, completeness,
/// cardinality, samples) are never overridden.
pub fn merge(derived: ColumnProfile, overlay: Option<&EnrichmentEntry>) -> ColumnProfile {
    let Some(entry) = overlay else {
        return derived;
    };

    let mut semantic_tags = derived.semantic_tags;
    for tag in &entry.tags {
        if !semantic_tags.contains(tag) {
            semantic_tags.push(tag.clone());
        }
    }

    ColumnProfile {
        business_category: entry.category.unwrap_or(derived.business_category),
        importance_tier: entry.tier.unwrap_or(derived.importance_tier),
        business_purpose: entry
            .purpose
            .clone()
            .unwrap_or(derived.business_purpose),
        semantic_tags,
        enriched: true,
        ..derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datasift_core::{BusinessCategory, Cardinality, ImportanceTier, InferredType};

    fn derived() -> ColumnProfile {
        ColumnProfile {
            name: "store_notes".into(),
            inferred_type: InferredType::Text,
            business_category: BusinessCategory::Text,
            importance_tier: ImportanceTier::Supplementary,
            completeness: 0.8,
            cardinality: Cardinality::High,
            business_purpose: "Analysis field for store_notes".into(),
            semantic_tags: vec!["free_text".into()],
            sample_values: vec!["late delivery".into()],
            enriched: false,
        }
    }

    #[test]
    fn no_overlay_is_identity() {
        assert_eq!(merge(derived(), None), derived());
    }

    #[test]
    fn overlay_fields_take_precedence() {
        let entry = EnrichmentEntry {
            tier: Some(ImportanceTier::Critical),
            category: None,
            purpose: Some("Manager commentary".into()),
            tags: vec!["qualitative".into(), "free_text".into()],
        };
        let merged = merge(derived(), Some(&entry));
        assert_eq!(merged.importance_tier, ImportanceTier::Critical);
        assert_eq!(merged.business_category, BusinessCategory::Text);
        assert_eq!(merged.business_purpose, "Manager commentary");
        assert_eq!(merged.semantic_tags, vec!["free_text", "qualitative"]);
        assert!(merged.enriched);
        // data facts untouched
        assert_eq!(merged.cardinality, Cardinality::High);
        assert!((merged.completeness - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_entry_still_marks_enriched() {
        let merged = merge(derived(), Some(&EnrichmentEntry::default()));
        assert!(merged.enriched);
        assert_eq!(merged.importance_tier, ImportanceTier::Supplementary);
    }
}
