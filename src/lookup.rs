//! Provider lookup tables.
//!
//! A lookup table maps the code a data provider uses for a measurand to the
//! canonical parameter and the unit the provider reports it in, e.g.
//! `{"CO": ["co", "ppb"]}`. Tables usually come from a source configuration
//! document, so they can be read from JSON with shape checks that name the
//! offending key.

use std::collections::HashMap;

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::measurand::MeasurandError;

/// How strictly a lookup table read from JSON is checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every well-shaped entry is assumed to be supported. Extra tuple
    /// elements are ignored.
    #[default]
    Permissive,
    /// Tuples must have exactly two elements and neither string may be empty.
    Strict,
}

/// A single provider code mapping
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupEntry {
    pub provider_code: String,
    pub parameter: String,
    pub unit: String,
}

/// Ordered lookup table with unique provider codes.
///
/// Iteration follows insertion order. Inserting a provider code that is
/// already present replaces its entry in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Lookups {
    entries: Vec<LookupEntry>,
    positions: HashMap<String, usize>,
}

impl Lookups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a mapping. Returns the previous entry for the code, if any.
    pub fn insert(
        &mut self,
        provider_code: impl Into<String>,
        parameter: impl Into<String>,
        unit: impl Into<String>,
    ) -> Option<LookupEntry> {
        let entry = LookupEntry {
            provider_code: provider_code.into(),
            parameter: parameter.into(),
            unit: unit.into(),
        };

        match self.positions.get(&entry.provider_code) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], entry)),
            None => {
                self.positions
                    .insert(entry.provider_code.clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get(&self, provider_code: &str) -> Option<&LookupEntry> {
        self.positions
            .get(provider_code)
            .map(|&pos| &self.entries[pos])
    }

    pub fn contains_key(&self, provider_code: &str) -> bool {
        self.positions.contains_key(provider_code)
    }

    /// Provider codes in table order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.provider_code.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LookupEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a lookup table from a JSON object of `code -> [parameter, unit]`.
    ///
    /// Object order is preserved. A value that is not an array starting with
    /// two strings is rejected in every mode; a missing unit never reaches
    /// the conversion table.
    pub fn from_json(value: &Value, mode: ValidationMode) -> Result<Self, MeasurandError> {
        let object = value.as_object().ok_or_else(|| {
            MeasurandError::InvalidLookupTable(format!(
                "expected an object, found {}",
                kind(value)
            ))
        })?;

        let mut lookups = Lookups::new();
        for (key, tuple) in object {
            let (parameter, unit) = parse_tuple(key, tuple, mode)?;
            lookups.insert(key.as_str(), parameter, unit);
        }

        tracing::debug!("Read {} lookup entries ({:?})", lookups.len(), mode);
        Ok(lookups)
    }
}

fn parse_tuple<'a>(
    key: &str,
    tuple: &'a Value,
    mode: ValidationMode,
) -> Result<(&'a str, &'a str), MeasurandError> {
    let invalid = |reason: String| MeasurandError::InvalidLookupEntry {
        key: key.to_string(),
        reason,
    };

    let items = tuple.as_array().ok_or_else(|| {
        invalid(format!(
            "expected [parameter, unit], found {}",
            kind(tuple)
        ))
    })?;

    let parameter = match items.first() {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(invalid(format!(
                "parameter must be a string, found {}",
                kind(other)
            )))
        }
        None => return Err(invalid("missing parameter".to_string())),
    };
    let unit = match items.get(1) {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            return Err(invalid(format!(
                "unit must be a string, found {}",
                kind(other)
            )))
        }
        None => return Err(invalid("missing unit".to_string())),
    };

    if mode == ValidationMode::Strict {
        if items.len() != 2 {
            return Err(invalid(format!(
                "expected exactly 2 elements, found {}",
                items.len()
            )));
        }
        if parameter.is_empty() {
            return Err(invalid("parameter is empty".to_string()));
        }
        if unit.is_empty() {
            return Err(invalid("unit is empty".to_string()));
        }
    }

    Ok((parameter, unit))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<'a> IntoIterator for &'a Lookups {
    type Item = &'a LookupEntry;
    type IntoIter = std::slice::Iter<'a, LookupEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K, P, U> FromIterator<(K, (P, U))> for Lookups
where
    K: Into<String>,
    P: Into<String>,
    U: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, (P, U))>>(iter: I) -> Self {
        let mut lookups = Lookups::new();
        for (code, (parameter, unit)) in iter {
            lookups.insert(code, parameter, unit);
        }
        lookups
    }
}

impl<'de> Deserialize<'de> for Lookups {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Lookups::from_json(&value, ValidationMode::Permissive).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Lookups {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.provider_code, &(&entry.parameter, &entry.unit))?;
        }
        map.end()
    }
}
