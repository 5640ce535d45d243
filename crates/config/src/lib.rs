//! Configuration loading, validation, and management for datasift.
//!
//! Loads configuration from `~/.datasift/config.toml` with environment
//! variable overrides. Validates all settings at load time, so the engine
//! never starts with an inconsistent budget, weight set, or strategy list.

pub mod enrichment;

pub use enrichment::{load_enrichment, parse_enrichment};

use datasift_core::{
    BusinessCategory, DiversityDimension, Error, InferredType, OverBudgetPolicy,
    SelectionCriteria, SelectionWeights, Strategy, Thresholds, TimeBucket, TokenBudget,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.datasift/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Token budget and estimator tuning
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Column profiler settings
    #[serde(default)]
    pub profiler: ProfilerConfig,

    /// Reduction strategy order and parameters
    #[serde(default)]
    pub reduction: ReductionConfig,

    /// Row selection settings
    #[serde(default)]
    pub selection: SelectionConfig,

    /// What a full run does with an over-budget table
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Safety margin subtracted from `max_tokens`
    #[serde(default = "default_buffer")]
    pub buffer: usize,

    /// Characters per estimated token
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,
}

fn default_max_tokens() -> usize {
    20_000
}
fn default_buffer() -> usize {
    1_000
}
fn default_chars_per_token() -> usize {
    4
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            buffer: default_buffer(),
            chars_per_token: default_chars_per_token(),
        }
    }
}

impl BudgetConfig {
    pub fn to_budget(&self) -> Result<TokenBudget, ConfigError> {
        TokenBudget::new(self.max_tokens, self.buffer).map_err(ConfigError::from_core)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilerConfig {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    #[serde(default = "default_cardinality_cap")]
    pub cardinality_cap: usize,

    #[serde(default = "default_sample_values")]
    pub sample_values: usize,

    /// Extra name rules, tried before the built-in retail rules
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CategoryRuleConfig>,
}

fn default_sample_size() -> usize {
    200
}
fn default_cardinality_cap() -> usize {
    1_000
}
fn default_sample_values() -> usize {
    3
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            cardinality_cap: default_cardinality_cap(),
            sample_values: default_sample_values(),
            rules: vec![],
        }
    }
}

/// A custom business-category rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRuleConfig {
    /// Case-insensitive regex matched against the column name
    pub pattern: String,
    pub category: BusinessCategory,
    /// Inferred types the rule applies to; empty means any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<InferredType>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionConfig {
    /// Strategy names in the order they run. When absent, every strategy
    /// whose section is configured runs in the default order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<TemporalConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityConfig>,

    #[serde(default)]
    pub pruning: PruningConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalConfig {
    pub column: String,
    #[serde(default)]
    pub bucket: TimeBucket,
    /// Candidate windows, strictly descending
    pub windows: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    pub column: String,
    pub metric: String,
    /// Candidate entity counts, strictly descending
    pub candidates: Vec<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PruningConfig {
    /// Columns never pruned regardless of tier
    #[serde(default)]
    pub protected: Vec<String>,
}

impl ReductionConfig {
    /// Resolve the configured order into concrete strategies.
    pub fn strategies(&self) -> Result<Vec<Strategy>, ConfigError> {
        match &self.order {
            Some(order) => order.iter().map(|name| self.strategy(name)).collect(),
            None => Ok(Strategy::NAMES
                .iter()
                .filter_map(|name| self.strategy(name).ok())
                .collect()),
        }
    }

    fn strategy(&self, name: &str) -> Result<Strategy, ConfigError> {
        let missing = || {
            ConfigError::ValidationError(format!(
                "strategy '{name}' is listed in reduction.order but [reduction.{}] is missing",
                name.trim_end_matches("_narrowing")
            ))
        };
        match name {
            Strategy::TEMPORAL_NARROWING => {
                let t = self.temporal.as_ref().ok_or_else(missing)?;
                Ok(Strategy::TemporalNarrowing {
                    column: t.column.clone(),
                    bucket: t.bucket,
                    windows: t.windows.clone(),
                })
            }
            Strategy::ENTITY_NARROWING => {
                let e = self.entity.as_ref().ok_or_else(missing)?;
                Ok(Strategy::EntityNarrowing {
                    column: e.column.clone(),
                    metric: e.metric.clone(),
                    candidates: e.candidates.clone(),
                })
            }
            Strategy::COLUMN_PRUNING => Ok(Strategy::ColumnPruning {
                protected: self.pruning.protected.clone(),
            }),
            other => Err(ConfigError::ValidationError(format!(
                "unknown reduction strategy '{other}', expected one of: {}",
                Strategy::NAMES.join(", ")
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    #[serde(default = "default_priority_column")]
    pub priority_column: String,

    #[serde(default = "default_volume_column")]
    pub volume_column: String,

    #[serde(default)]
    pub weights: SelectionWeights,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diversity: Vec<DiversityDimension>,
}

fn default_target_count() -> usize {
    25
}
fn default_priority_column() -> String {
    "priority_score".into()
}
fn default_volume_column() -> String {
    "sales_volume".into()
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            priority_column: default_priority_column(),
            volume_column: default_volume_column(),
            weights: SelectionWeights::default(),
            thresholds: Thresholds::default(),
            diversity: vec![],
        }
    }
}

impl SelectionConfig {
    pub fn criteria(&self) -> SelectionCriteria {
        SelectionCriteria {
            priority_column: self.priority_column.clone(),
            volume_column: self.volume_column.clone(),
            diversity: self.diversity.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub on_over_budget: OverBudgetPolicy,
}

impl AppConfig {
    /// Load configuration from the default path (~/.datasift/config.toml).
    ///
    /// Environment overrides:
    /// - `DATASIFT_MAX_TOKENS`
    /// - `DATASIFT_TARGET_COUNT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `DATASIFT_*` overrides read through `lookup`, then revalidate.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("DATASIFT_MAX_TOKENS") {
            self.budget.max_tokens = parse_env("DATASIFT_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("DATASIFT_TARGET_COUNT") {
            self.selection.target_count = parse_env("DATASIFT_TARGET_COUNT", &v)?;
        }
        self.validate()
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".datasift")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.budget.to_budget()?;
        if self.budget.chars_per_token == 0 {
            return Err(ConfigError::ValidationError(
                "budget.chars_per_token must be positive".into(),
            ));
        }
        if self.profiler.sample_size == 0 {
            return Err(ConfigError::ValidationError(
                "profiler.sample_size must be positive".into(),
            ));
        }

        if let Some(t) = &self.reduction.temporal {
            check_descending("reduction.temporal.windows", &t.windows)?;
        }
        if let Some(e) = &self.reduction.entity {
            check_descending("reduction.entity.candidates", &e.candidates)?;
        }
        self.reduction.strategies()?;

        let selection = &self.selection;
        if selection.target_count == 0 {
            return Err(ConfigError::ValidationError(
                "selection.target_count must be greater than zero".into(),
            ));
        }
        selection
            .weights
            .validate()
            .map_err(ConfigError::from_core)?;
        if let Some(min) = selection.thresholds.min_completeness
            && !(0.0..=1.0).contains(&min)
        {
            return Err(ConfigError::ValidationError(format!(
                "selection.thresholds.min_completeness must be within [0, 1], got {min}"
            )));
        }
        if let Some(dim) = selection.diversity.iter().find(|d| d.buckets == Some(0)) {
            return Err(ConfigError::ValidationError(format!(
                "diversity dimension '{}' needs at least one bucket",
                dim.name
            )));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn parse_env(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse().map_err(|_| {
        ConfigError::ValidationError(format!("{key} must be a non-negative integer, got '{value}'"))
    })
}

fn check_descending(field: &str, candidates: &[usize]) -> Result<(), ConfigError> {
    if candidates.is_empty() || candidates.contains(&0) {
        return Err(ConfigError::ValidationError(format!(
            "{field} must list positive values"
        )));
    }
    if candidates.windows(2).any(|w| w[0] <= w[1]) {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be strictly descending, got {candidates:?}"
        )));
    }
    Ok(())
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    fn from_core(err: Error) -> Self {
        match err {
            Error::Config { message } => Self::ValidationError(message),
            other => Self::ValidationError(other.to_string()),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.budget.max_tokens, 20_000);
        assert_eq!(config.budget.buffer, 1_000);
        assert_eq!(config.selection.target_count, 25);
        assert_eq!(config.pipeline.on_over_budget, OverBudgetPolicy::Proceed);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn default_order_skips_unconfigured_strategies() {
        let strategies = AppConfig::default().reduction.strategies().unwrap();
        assert_eq!(strategies.len(), 1);
        assert_eq!(strategies[0].name(), "column_pruning");
    }

    #[test]
    fn full_document_parses() {
        let toml_str = r#"
[budget]
max_tokens = 5000
buffer = 500

[reduction]
order = ["entity_narrowing", "temporal_narrowing", "column_pruning"]

[reduction.temporal]
column = "week_start"
bucket = "week"
windows = [12, 4, 1]

[reduction.entity]
column = "location_name"
metric = "sales_volume"
candidates = [50, 20, 5]

[reduction.pruning]
protected = ["location_name"]

[selection]
target_count = 10

[selection.weights]
representative = 0.5
priority = 0.3
volume = 0.2

[selection.thresholds]
min_priority = 100
min_volume = 500
exclusion_column = "is_closed"

[[selection.diversity]]
name = "region"
column = "region"

[[selection.diversity]]
name = "performance"
column = "sales_volume"
buckets = 4

[pipeline]
on_over_budget = "abort"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        let names: Vec<&str> = config
            .reduction
            .strategies()
            .unwrap()
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(
            names,
            vec!["entity_narrowing", "temporal_narrowing", "column_pruning"]
        );
        assert_eq!(config.selection.diversity[1].buckets, Some(4));
        assert_eq!(config.selection.thresholds.min_priority, Some(100.0));
        assert_eq!(config.pipeline.on_over_budget, OverBudgetPolicy::Abort);
        assert_eq!(config.budget.to_budget().unwrap().effective(), 4500);
    }

    #[test]
    fn unknown_strategy_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
[reduction]
order = ["random_sampling"]
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("random_sampling"));
    }

    #[test]
    fn listed_strategy_without_section_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
[reduction]
order = ["temporal_narrowing"]
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn ascending_windows_rejected() {
        let config: AppConfig = toml::from_str(
            r#"
[reduction.temporal]
column = "week_start"
windows = [1, 4]
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn weights_must_sum_to_one() {
        let mut config = AppConfig::default();
        config.selection.weights = SelectionWeights {
            representative: 0.5,
            priority: 0.5,
            volume: 0.5,
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
        // converts into the shared configuration error
        assert!(Error::from(err).is_config());
    }

    #[test]
    fn buffer_must_be_below_max() {
        let mut config = AppConfig::default();
        config.budget.buffer = config.budget.max_tokens;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_overrides_apply_and_validate() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| match key {
                "DATASIFT_MAX_TOKENS" => Some("8000".into()),
                "DATASIFT_TARGET_COUNT" => Some("5".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.budget.max_tokens, 8000);
        assert_eq!(config.selection.target_count, 5);

        let err = config
            .apply_env_overrides(|key| (key == "DATASIFT_TARGET_COUNT").then(|| "lots".into()))
            .unwrap_err();
        assert!(err.to_string().contains("DATASIFT_TARGET_COUNT"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[budget]\nmax_tokens = 3000\nbuffer = 0").unwrap();
        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.budget.max_tokens, 3000);
        assert_eq!(config.budget.chars_per_token, 4);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[budget\nmax_tokens = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn custom_rules_parse() {
        let config: AppConfig = toml::from_str(
            r#"
[[profiler.rules]]
pattern = "^footfall"
category = "metric"
types = ["numeric"]
"#,
        )
        .unwrap();
        assert_eq!(config.profiler.rules[0].category, BusinessCategory::Metric);
        assert_eq!(config.profiler.rules[0].types, vec![InferredType::Numeric]);
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("max_tokens = 20000"));
        assert!(toml_str.contains("priority_score"));
    }
}
