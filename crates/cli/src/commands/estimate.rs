//! `datasift estimate`: Token cost of the input against the budget.

use super::{CommandResult, estimator, load_config, print_json};
use crate::loader::load_tables;
use std::path::{Path, PathBuf};

pub fn run(config: Option<&Path>, inputs: &[PathBuf]) -> CommandResult {
    let config = load_config(config)?;
    let table = load_tables(inputs)?;
    let estimator = estimator(&config)?;
    let footprint = estimator.footprint(&table)?;
    let tokens = footprint.tokens(estimator.chars_per_token());
    let budget = config.budget.to_budget()?;

    print_json(&serde_json::json!({
        "rows": table.num_rows(),
        "columns": table.num_columns(),
        "chars": footprint.total_chars(),
        "chars_per_token": estimator.chars_per_token(),
        "tokens": tokens,
        "effective_budget": budget.effective(),
        "fits": budget.fits(tokens),
    }))
}
