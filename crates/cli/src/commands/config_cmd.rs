//! `datasift config`: Configuration management commands.

use super::{CommandResult, load_config};
use datasift_config::AppConfig;
use std::path::{Path, PathBuf};

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"))
}

pub fn validate(explicit: Option<&Path>) -> CommandResult {
    println!("Validating configuration...");

    match load_config(explicit) {
        Ok(config) => {
            println!("   Config parsed successfully");

            let mut warnings = Vec::new();
            let order = config.reduction.strategies()?;
            if order.len() == 1 {
                warnings.push("Only column pruning is configured; add [reduction.temporal] or [reduction.entity] to narrow rows");
            }
            if config.selection.diversity.is_empty() {
                warnings.push("No [[selection.diversity]] dimensions; representative score is always 0");
            }

            if warnings.is_empty() {
                println!("   All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   warning: {w}");
                }
            }

            let names: Vec<&str> = order.iter().map(|s| s.name()).collect();
            println!();
            println!(
                "   Budget:     {} tokens ({} buffer)",
                config.budget.max_tokens, config.budget.buffer
            );
            println!("   Strategies: {}", names.join(" → "));
            println!("   Target:     {} rows", config.selection.target_count);
            println!(
                "   Weights:    representative {} / priority {} / volume {}",
                config.selection.weights.representative,
                config.selection.weights.priority,
                config.selection.weights.volume
            );
        }
        Err(e) => {
            println!("   Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub fn show(explicit: Option<&Path>) -> CommandResult {
    let config = load_config(explicit).map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

pub fn path(explicit: Option<&Path>) -> CommandResult {
    println!("{}", config_path(explicit).display());
    Ok(())
}

pub fn init(explicit: Option<&Path>, force: bool) -> CommandResult {
    let path = config_path(explicit);
    if path.exists() && !force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )
        .into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, AppConfig::default_toml())?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
