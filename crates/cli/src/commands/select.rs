//! `datasift select`: Pick rows without reducing first.

use super::{CommandResult, load_config, load_enrichment_opt, print_json, profiler, selector};
use crate::loader::load_tables;
use std::path::{Path, PathBuf};

pub fn run(
    config: Option<&Path>,
    inputs: &[PathBuf],
    enrichment: Option<&Path>,
    target: Option<usize>,
) -> CommandResult {
    let mut config = load_config(config)?;
    if let Some(target) = target {
        config.selection.target_count = target;
        config.validate()?;
    }

    let table = load_tables(inputs)?;
    let enrichment = load_enrichment_opt(enrichment)?;
    let schema = profiler(&config)?.profile(&table, enrichment.as_ref())?;
    let outcome = selector(&config).select(
        &table,
        &schema,
        config.selection.target_count,
        &config.selection.weights,
        &config.selection.thresholds,
    )?;
    print_json(&outcome)
}
