//! `datasift profile`: Column schema of the input.

use super::{CommandResult, load_config, load_enrichment_opt, print_json, profiler};
use crate::loader::load_tables;
use std::path::{Path, PathBuf};

pub fn run(config: Option<&Path>, inputs: &[PathBuf], enrichment: Option<&Path>) -> CommandResult {
    let config = load_config(config)?;
    let table = load_tables(inputs)?;
    let enrichment = load_enrichment_opt(enrichment)?;
    let schema = profiler(&config)?.profile(&table, enrichment.as_ref())?;

    print_json(&serde_json::json!({
        "rows": table.num_rows(),
        "columns": schema,
        "data_quality_score": schema.data_quality_score(),
        "tiers": schema.by_tier(),
        "unmapped_columns": schema.unmapped_columns(),
    }))
}
