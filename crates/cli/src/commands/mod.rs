//! Subcommand implementations and the wiring they share.

pub mod config_cmd;
pub mod estimate;
pub mod profile;
pub mod reduce;
pub mod run;
pub mod select;

use datasift_config::{AppConfig, ConfigError, load_enrichment};
use datasift_core::{BusinessEnrichment, Result};
use datasift_engine::{
    CategoryRule, CategoryRules, Pipeline, Profiler, ReductionEngine, Selector, TokenEstimator,
};
use serde::Serialize;
use std::path::Path;

pub type CommandResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Load the configuration from `--config` or the default location, with
/// environment overrides applied.
pub fn load_config(path: Option<&Path>) -> std::result::Result<AppConfig, ConfigError> {
    match path {
        Some(path) => {
            let mut config = AppConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            Ok(config)
        }
        None => AppConfig::load(),
    }
}

pub fn load_enrichment_opt(path: Option<&Path>) -> Result<Option<BusinessEnrichment>> {
    path.map(|p| load_enrichment(p).map_err(Into::into)).transpose()
}

pub fn estimator(config: &AppConfig) -> Result<TokenEstimator> {
    TokenEstimator::new(config.budget.chars_per_token)
}

pub fn profiler(config: &AppConfig) -> Result<Profiler> {
    let custom = config
        .profiler
        .rules
        .iter()
        .map(|r| CategoryRule::new(&r.pattern, &r.types, r.category))
        .collect::<Result<Vec<_>>>()?;
    Ok(Profiler::new(CategoryRules::with_custom(custom))
        .with_sample_size(config.profiler.sample_size)
        .with_cardinality_cap(config.profiler.cardinality_cap)
        .with_sample_values(config.profiler.sample_values))
}

pub fn selector(config: &AppConfig) -> Selector {
    Selector::new(config.selection.criteria())
}

pub fn pipeline(config: &AppConfig) -> Result<Pipeline> {
    Ok(Pipeline::new(
        config.budget.to_budget()?,
        config.reduction.strategies()?,
        selector(config),
        config.selection.target_count,
    )
    .with_profiler(profiler(config)?)
    .with_engine(ReductionEngine::new(estimator(config)?))
    .with_weights(config.selection.weights)
    .with_thresholds(config.selection.thresholds.clone())
    .with_over_budget(config.pipeline.on_over_budget))
}

/// Pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
