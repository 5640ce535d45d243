//! `datasift run`: Profile, reduce, and select.

use super::{CommandResult, load_config, load_enrichment_opt, pipeline, print_json};
use crate::loader::load_tables;
use std::path::{Path, PathBuf};

pub fn run(config: Option<&Path>, inputs: &[PathBuf], enrichment: Option<&Path>) -> CommandResult {
    let config = load_config(config)?;
    let table = load_tables(inputs)?;
    let enrichment = load_enrichment_opt(enrichment)?;
    let outcome = pipeline(&config)?.run(&table, enrichment.as_ref())?;

    print_json(&serde_json::json!({
        "audit": outcome.reduction.audit_lines(),
        "outcome": outcome,
    }))
}
