//! Name-pattern rule tables for business category, importance and purpose.

use datasift_core::{BusinessCategory, Cardinality, Error, ImportanceTier, InferredType, Result};
use regex_lite::Regex;

/// One row of the category rule table.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pattern: Regex,
    /// When non-empty, the column's inferred type must be one of these.
    types: Vec<InferredType>,
    category: BusinessCategory,
}

impl CategoryRule {
    /// Compile a rule; an invalid pattern is a configuration error.
    pub fn new(pattern: &str, types: &[InferredType], category: BusinessCategory) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| Error::config(format!("invalid category pattern '{pattern}': {e}")))?;
        Ok(Self {
            pattern,
            types: types.to_vec(),
            category,
        })
    }

    fn matches(&self, lowered_name: &str, inferred: InferredType) -> bool {
        (self.types.is_empty() || self.types.contains(&inferred))
            && self.pattern.is_match(lowered_name)
    }
}

/// Measures whose metric columns default to tier 1.
const CRITICAL_MEASURES: [&str; 5] = ["sales", "revenue", "priority", "location", "store"];

const RETAIL_RULES: [(&str, &[InferredType], BusinessCategory); 4] = [
    (
        r"(^id$|_id$|^id_|(^|_)(code|key|sku|uuid|number|no)$)",
        &[],
        BusinessCategory::Identifier,
    ),
    (
        r"(sales|revenue|volume|units|amount|count|score|priority|margin|rate|pct|percent|growth|qty|quantity|price|cost|spend|traffic|change)",
        &[InferredType::Numeric],
        BusinessCategory::Metric,
    ),
    (
        r"(date|time|day|week|month|year|period)",
        &[
            InferredType::Datetime,
            InferredType::Numeric,
            InferredType::Categorical,
        ],
        BusinessCategory::Date,
    ),
    (
        r"(store|location|region|area|district|category|segment|type|status|channel|tier|bucket|brand|format|cluster|trend|pattern)",
        &[
            InferredType::Categorical,
            InferredType::Text,
            InferredType::Boolean,
        ],
        BusinessCategory::Categorical,
    ),
];

/// Ordered rule table; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Retail-analytics defaults.
    pub fn retail() -> Self {
        let rules = RETAIL_RULES
            .iter()
            .filter_map(|(pattern, types, category)| {
                CategoryRule::new(pattern, types, *category).ok()
            })
            .collect();
        Self { rules }
    }

    /// Custom rules checked before the retail defaults.
    pub fn with_custom(custom: Vec<CategoryRule>) -> Self {
        let mut rules = custom;
        rules.extend(Self::retail().rules);
        Self { rules }
    }

    /// Category from name patterns, then from the inferred type alone.
    pub fn categorize(&self, name: &str, inferred: InferredType) -> BusinessCategory {
        let lowered = name.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&lowered, inferred)) {
            return rule.category;
        }
        match inferred {
            InferredType::Datetime => BusinessCategory::Date,
            InferredType::Text => BusinessCategory::Text,
            _ => BusinessCategory::Other,
        }
    }

    /// Default tier when no enrichment states one.
    pub fn default_tier(
        &self,
        name: &str,
        category: BusinessCategory,
        inferred: InferredType,
        cardinality: Cardinality,
    ) -> ImportanceTier {
        if inferred == InferredType::Text && cardinality.is_high() {
            return ImportanceTier::Supplementary;
        }
        match category {
            BusinessCategory::Identifier => ImportanceTier::Critical,
            BusinessCategory::Metric if is_critical_measure(name) => ImportanceTier::Critical,
            BusinessCategory::Metric => ImportanceTier::Important,
            BusinessCategory::Date | BusinessCategory::Categorical => ImportanceTier::Important,
            BusinessCategory::Text => ImportanceTier::Supplementary,
            BusinessCategory::Other => ImportanceTier::Important,
        }
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::retail()
    }
}

fn is_critical_measure(name: &str) -> bool {
    let lowered = name.to_lowercase();
    CRITICAL_MEASURES.iter().any(|m| lowered.contains(m))
}

/// Suggested business purpose from common retail field names.
pub fn suggest_purpose(name: &str) -> String {
    let lowered = name.to_lowercase();
    let has = |keys: &[&str]| keys.iter().any(|k| lowered.contains(k));
    if has(&["sales", "revenue"]) {
        "Sales performance and revenue tracking".into()
    } else if has(&["location", "store"]) {
        "Location identification and geographic analysis".into()
    } else if has(&["priority", "score"]) {
        "Business priority and performance scoring".into()
    } else if has(&["date", "time"]) {
        "Temporal analysis and trend tracking".into()
    } else if has(&["category", "product"]) {
        "Product categorization and inventory analysis".into()
    } else if has(&["customer", "cust"]) {
        "Customer behavior and demographic analysis".into()
    } else if has(&["trend", "change"]) {
        "Performance trend and change analysis".into()
    } else {
        format!("Analysis field for {name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_match_regardless_of_type() {
        let rules = CategoryRules::retail();
        assert_eq!(
            rules.categorize("store_id", InferredType::Numeric),
            BusinessCategory::Identifier
        );
        assert_eq!(
            rules.categorize("SKU", InferredType::Categorical),
            BusinessCategory::Identifier
        );
    }

    #[test]
    fn metric_requires_numeric() {
        let rules = CategoryRules::retail();
        assert_eq!(
            rules.categorize("weekly_sales", InferredType::Numeric),
            BusinessCategory::Metric
        );
        assert_eq!(
            rules.categorize("fiscal_year", InferredType::Numeric),
            BusinessCategory::Date
        );
        assert_eq!(
            rules.categorize("net_sales", InferredType::Numeric),
            BusinessCategory::Metric
        );
        assert_eq!(
            rules.categorize("net_sales", InferredType::Text),
            BusinessCategory::Text
        );
    }

    #[test]
    fn unmapped_numeric_is_other() {
        let rules = CategoryRules::retail();
        assert_eq!(
            rules.categorize("zzz", InferredType::Numeric),
            BusinessCategory::Other
        );
        assert_eq!(
            rules.default_tier(
                "zzz",
                BusinessCategory::Other,
                InferredType::Numeric,
                Cardinality::Exact(4)
            ),
            ImportanceTier::Important
        );
    }

    #[test]
    fn critical_metrics_are_tier_one() {
        let rules = CategoryRules::retail();
        let tier = |name: &str| {
            rules.default_tier(
                name,
                BusinessCategory::Metric,
                InferredType::Numeric,
                Cardinality::Exact(10),
            )
        };
        assert_eq!(tier("net_sales"), ImportanceTier::Critical);
        assert_eq!(tier("margin_pct"), ImportanceTier::Important);
    }

    #[test]
    fn high_cardinality_text_is_supplementary() {
        let rules = CategoryRules::retail();
        assert_eq!(
            rules.default_tier(
                "store_notes",
                BusinessCategory::Categorical,
                InferredType::Text,
                Cardinality::High
            ),
            ImportanceTier::Supplementary
        );
    }

    #[test]
    fn retail_rules_all_compile() {
        assert_eq!(CategoryRules::retail().rules.len(), RETAIL_RULES.len());
    }

    #[test]
    fn custom_rules_take_precedence() {
        let custom = CategoryRule::new("^notes$", &[], BusinessCategory::Metric).unwrap();
        let rules = CategoryRules::with_custom(vec![custom]);
        assert_eq!(
            rules.categorize("notes", InferredType::Text),
            BusinessCategory::Metric
        );
    }

    #[test]
    fn invalid_custom_pattern_is_config_error() {
        let err = CategoryRule::new("(", &[], BusinessCategory::Other).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn purpose_suggestions() {
        assert!(suggest_purpose("Total_Revenue").contains("revenue"));
        assert_eq!(suggest_purpose("xyz"), "Analysis field for xyz");
    }
}
