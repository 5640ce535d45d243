//! `datasift reduce`: Shrink the input to the token budget.

use super::{CommandResult, estimator, load_config, load_enrichment_opt, print_json, profiler};
use crate::loader::load_tables;
use datasift_engine::ReductionEngine;
use std::path::{Path, PathBuf};

pub fn run(
    config: Option<&Path>,
    inputs: &[PathBuf],
    enrichment: Option<&Path>,
    max_tokens: Option<usize>,
) -> CommandResult {
    let mut config = load_config(config)?;
    if let Some(max_tokens) = max_tokens {
        config.budget.max_tokens = max_tokens;
        config.validate()?;
    }

    let table = load_tables(inputs)?;
    let enrichment = load_enrichment_opt(enrichment)?;
    let schema = profiler(&config)?.profile(&table, enrichment.as_ref())?;
    let outcome = ReductionEngine::new(estimator(&config)?).reduce(
        &table,
        &schema,
        &config.budget.to_budget()?,
        &config.reduction.strategies()?,
    )?;

    print_json(&serde_json::json!({
        "audit": outcome.audit_lines(),
        "reduction": outcome,
    }))
}
