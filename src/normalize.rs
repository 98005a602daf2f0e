//! Reading normalization against a measurand index.
//!
//! Providers hand over readings keyed by their own parameter codes and in
//! their own units. This module maps each reading onto its canonical
//! parameter and normalized unit, converting the value on the way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::measurand::MeasurandIndex;

/// Keys written by [`Measurement`] itself; provider fields with these names
/// are dropped so they cannot shadow the canonical ones.
const RESERVED_KEYS: [&str; 3] = ["parameter", "unit", "value"];

/// A reading as reported by a provider
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Provider code of the measurand (e.g. "CO")
    pub parameter: String,
    /// Value in the provider's unit; providers send `null` for missing samples
    #[serde(default)]
    pub value: Option<f64>,
    /// Any other fields the provider attached (location, timestamps, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RawReading {
    pub fn new(parameter: impl Into<String>, value: f64) -> Self {
        Self {
            parameter: parameter.into(),
            value: Some(value),
            extra: Map::new(),
        }
    }
}

/// A reading expressed with canonical naming and units
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    /// Canonical parameter (e.g. "co")
    pub parameter: String,
    /// Normalized unit (e.g. "ppm")
    pub unit: String,
    /// Converted value
    pub value: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of normalizing a batch of readings
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NormalizedBatch {
    pub measurements: Vec<Measurement>,
    /// Provider codes with no entry in the index, once each, in first-seen order
    pub unknown_parameters: Vec<String>,
    /// Number of readings dropped, for any reason
    pub skipped: usize,
    /// Readings dropped because they carried no value
    pub missing_values: usize,
}

/// Normalize a single reading.
///
/// Returns `None` if the provider code is unknown or the reading has no value.
pub fn normalize_reading(index: &MeasurandIndex, reading: &RawReading) -> Option<Measurement> {
    let descriptor = index.get(&reading.parameter)?;
    let value = reading.value?;

    if let Some(Value::String(unit)) = reading.extra.get("unit") {
        if *unit != descriptor.unit {
            tracing::debug!(
                "Reading for '{}' labelled '{}', source configured as '{}'",
                reading.parameter,
                unit,
                descriptor.unit
            );
        }
    }

    let mut extra = reading.extra.clone();
    for key in RESERVED_KEYS {
        extra.remove(key);
    }

    Some(Measurement {
        parameter: descriptor.parameter.clone(),
        unit: descriptor.normalized_unit().to_string(),
        value: descriptor.normalize_value(value),
        extra,
    })
}

/// Normalize a batch of readings, keeping input order.
///
/// Readings whose provider code is not in the index are skipped and their
/// codes reported in [`NormalizedBatch::unknown_parameters`]. Readings
/// without a value are skipped and counted in
/// [`NormalizedBatch::missing_values`].
pub fn normalize_readings<'a>(
    index: &MeasurandIndex,
    readings: impl IntoIterator<Item = &'a RawReading>,
) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for reading in readings {
        if let Some(measurement) = normalize_reading(index, reading) {
            batch.measurements.push(measurement);
            continue;
        }

        batch.skipped += 1;
        if !index.contains_key(&reading.parameter) {
            if !batch.unknown_parameters.contains(&reading.parameter) {
                tracing::warn!("No measurand for provider code '{}'", reading.parameter);
                batch.unknown_parameters.push(reading.parameter.clone());
            }
        } else {
            batch.missing_values += 1;
        }
    }

    tracing::info!(
        "Normalized {} readings ({} skipped)",
        batch.measurements.len(),
        batch.skipped
    );
    batch
}
