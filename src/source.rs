//! Source configuration documents.
//!
//! A source names a data provider and carries the lookup table for the
//! provider's parameter codes. Sources live as `<name>.json` files in a
//! sources directory, and the name of the source to process comes from the
//! command line, the `SOURCE` environment variable, or a queue event.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::lookup::{Lookups, ValidationMode};
use crate::measurand::{build_index, MeasurandError, MeasurandIndex};

/// Environment variable naming the source to process
pub const SOURCE_ENV_VAR: &str = "SOURCE";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while locating or reading a source
#[derive(Debug, Error)]
pub enum SourceError {
    /// No source name was supplied anywhere
    #[error("SOURCE env var or event required")]
    MissingSourceName,

    /// Source name would resolve outside the sources directory
    #[error("Invalid source name '{0}': must be a plain file stem")]
    InvalidSourceName(String),

    /// Event payload is not a queue event with a record body
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Failed to read the source file
    #[error("Failed to read source file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Source file is not valid JSON
    #[error("Failed to parse source file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Source document is missing a required field
    #[error("Invalid source '{name}': {reason}")]
    InvalidSource { name: String, reason: String },

    /// Parameter lookup table is malformed
    #[error(transparent)]
    Lookup(#[from] MeasurandError),
}

// ============================================================================
// Source name resolution
// ============================================================================

/// Pick the source name: explicit argument first, then environment, then event.
pub fn resolve_source_name(
    explicit: Option<&str>,
    env: Option<&str>,
    event: Option<&Value>,
) -> Result<String, SourceError> {
    let non_empty = |n: &&str| !n.is_empty();
    if let Some(name) = explicit.filter(non_empty).or(env.filter(non_empty)) {
        return Ok(name.to_string());
    }

    match event {
        Some(event) => source_name_from_event(event),
        None => Err(SourceError::MissingSourceName),
    }
}

/// Extract the source name from the first record body of a queue event
pub fn source_name_from_event(event: &Value) -> Result<String, SourceError> {
    let record = event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .ok_or_else(|| SourceError::InvalidEvent("no Records".to_string()))?;

    match record.get("body").and_then(Value::as_str) {
        Some(body) if !body.is_empty() => Ok(body.to_string()),
        _ => Err(SourceError::InvalidEvent(
            "first record has no body".to_string(),
        )),
    }
}

/// Check that a source name is a bare file stem.
///
/// Names come from events and the environment, so anything that could
/// escape the sources directory is rejected.
pub fn validate_source_name(name: &str) -> Result<(), SourceError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || Path::new(name).is_absolute();
    if invalid {
        return Err(SourceError::InvalidSourceName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Source documents
// ============================================================================

/// A named provider configuration
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceConfig {
    pub name: String,
    /// Provider adapter responsible for fetching this source
    pub provider: String,
    /// Provider code lookup table
    pub parameters: Lookups,
    /// Provider-specific settings, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SourceConfig {
    /// Path of a named source inside a sources directory
    pub fn path_for(sources_dir: &Path, name: &str) -> PathBuf {
        sources_dir.join(format!("{}.json", name))
    }

    /// Read `<sources_dir>/<name>.json`
    pub fn load(sources_dir: &Path, name: &str, mode: ValidationMode) -> Result<Self, SourceError> {
        validate_source_name(name)?;
        let path = Self::path_for(sources_dir, name);
        let content = std::fs::read_to_string(&path).map_err(|source| SourceError::Read {
            path: path.clone(),
            source,
        })?;
        let value: Value =
            serde_json::from_str(&content).map_err(|source| SourceError::Parse {
                path: path.clone(),
                source,
            })?;

        let config = Self::from_value(name, value, mode)?;
        tracing::info!(
            "Loaded source '{}' (provider {}, {} parameters) from {:?}",
            config.name,
            config.provider,
            config.parameters.len(),
            path
        );
        Ok(config)
    }

    /// Build a source from a parsed document.
    ///
    /// `fallback_name` is used when the document has no `name` field.
    pub fn from_value(
        fallback_name: &str,
        value: Value,
        mode: ValidationMode,
    ) -> Result<Self, SourceError> {
        let Value::Object(mut fields) = value else {
            return Err(SourceError::InvalidSource {
                name: fallback_name.to_string(),
                reason: "expected an object".to_string(),
            });
        };

        let name = match fields.remove("name") {
            Some(Value::String(name)) => name,
            _ => fallback_name.to_string(),
        };
        let provider = match fields.remove("provider") {
            Some(Value::String(provider)) => provider,
            _ => {
                return Err(SourceError::InvalidSource {
                    name,
                    reason: "missing provider".to_string(),
                })
            }
        };
        let parameters = match fields.remove("parameters") {
            Some(table) => Lookups::from_json(&table, mode)?,
            None => Lookups::new(),
        };

        Ok(Self {
            name,
            provider,
            parameters,
            extra: fields,
        })
    }

    /// Measurand index for this source's parameters
    pub fn measurands(&self) -> MeasurandIndex {
        build_index(&self.parameters)
    }
}
