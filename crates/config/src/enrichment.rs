//! Business enrichment documents.
//!
//! ```toml
//! [fields.weekly_sales]
//! tier = 1
//! category = "metric"
//! purpose = "Revenue for the trading week"
//! tags = ["kpi"]
//! ```
//!
//! Every key is optional. The document only overlays what the profiler
//! derives from the data; columns it does not mention are still profiled.

use crate::ConfigError;
use datasift_core::BusinessEnrichment;
use std::path::Path;

/// Read an enrichment document from disk.
pub fn load_enrichment(path: &Path) -> Result<BusinessEnrichment, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let enrichment = parse_enrichment(&content).map_err(|reason| ConfigError::ParseError {
        path: path.to_path_buf(),
        reason,
    })?;
    tracing::debug!(
        fields = enrichment.fields.len(),
        "Loaded business enrichment from {}",
        path.display()
    );
    Ok(enrichment)
}

/// Parse an enrichment document; the error is the parser's message.
pub fn parse_enrichment(content: &str) -> Result<BusinessEnrichment, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}
