//! Measurand registry.
//!
//! Builds canonical measurand descriptors from a provider lookup table and
//! indexes them by provider code. A descriptor knows how the provider names
//! a measurand, what it is called internally, and how to bring its values
//! into the internal unit.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::lookup::{LookupEntry, Lookups};
use crate::units::UnitConversion;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while reading lookup tables or indexing descriptors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeasurandError {
    /// Lookup table is not a mapping
    #[error("Invalid lookup table: {0}")]
    InvalidLookupTable(String),

    /// A lookup entry does not have the `[parameter, unit]` shape
    #[error("Invalid lookup entry '{key}': {reason}")]
    InvalidLookupEntry { key: String, reason: String },

    /// Two descriptors share a provider code
    #[error("Duplicate provider code: {0}")]
    DuplicateProviderCode(String),
}

// ============================================================================
// Descriptor
// ============================================================================

/// How one provider code maps onto a canonical measurand
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MeasurandDescriptor {
    /// How the external source names this measurand (e.g. "CO")
    pub provider_code: String,
    /// How the measurand is named internally (e.g. "co")
    pub parameter: String,
    /// Unit the provider reports values in (e.g. "ppb")
    pub unit: String,
}

impl MeasurandDescriptor {
    pub fn new(
        provider_code: impl Into<String>,
        parameter: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            provider_code: provider_code.into(),
            parameter: parameter.into(),
            unit: unit.into(),
        }
    }

    /// Conversion rule for this descriptor's source unit
    pub fn conversion(&self) -> UnitConversion {
        UnitConversion::for_unit(&self.unit)
    }

    /// Unit of values after [`normalize_value`](Self::normalize_value)
    pub fn normalized_unit(&self) -> &str {
        self.conversion().normalized_unit(&self.unit)
    }

    /// Convert a raw value from the source unit into the normalized unit
    pub fn normalize_value(&self, value: f64) -> f64 {
        self.conversion().apply(value)
    }
}

impl From<&LookupEntry> for MeasurandDescriptor {
    fn from(entry: &LookupEntry) -> Self {
        MeasurandDescriptor::new(&entry.provider_code, &entry.parameter, &entry.unit)
    }
}

// ============================================================================
// Index
// ============================================================================

/// Descriptors keyed by provider code.
///
/// Built once from a lookup table and read-only afterwards. Iteration
/// follows the order of the lookup table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MeasurandIndex {
    descriptors: Vec<MeasurandDescriptor>,
    positions: HashMap<String, usize>,
}

impl MeasurandIndex {
    /// Fold descriptors into an index. A repeated provider code is an error.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = MeasurandDescriptor>,
    ) -> Result<Self, MeasurandError> {
        descriptors
            .into_iter()
            .try_fold(MeasurandIndex::default(), |mut index, descriptor| {
                if index.positions.contains_key(&descriptor.provider_code) {
                    return Err(MeasurandError::DuplicateProviderCode(
                        descriptor.provider_code,
                    ));
                }
                index
                    .positions
                    .insert(descriptor.provider_code.clone(), index.descriptors.len());
                index.descriptors.push(descriptor);
                Ok(index)
            })
    }

    pub fn get(&self, provider_code: &str) -> Option<&MeasurandDescriptor> {
        self.positions
            .get(provider_code)
            .map(|&pos| &self.descriptors[pos])
    }

    pub fn contains_key(&self, provider_code: &str) -> bool {
        self.positions.contains_key(provider_code)
    }

    /// Provider codes in lookup table order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.provider_code.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &MeasurandDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl Serialize for MeasurandIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        #[derive(Serialize)]
        struct Entry<'a> {
            parameter: &'a str,
            unit: &'a str,
            normalized_unit: &'a str,
        }

        let mut map = serializer.serialize_map(Some(self.descriptors.len()))?;
        for d in &self.descriptors {
            map.serialize_entry(
                &d.provider_code,
                &Entry {
                    parameter: &d.parameter,
                    unit: &d.unit,
                    normalized_unit: d.normalized_unit(),
                },
            )?;
        }
        map.end()
    }
}

// ============================================================================
// Registry operations
// ============================================================================

/// Build one descriptor per lookup entry, in table order.
///
/// Every entry is assumed to be supported; names and units are taken as
/// supplied.
pub fn build_descriptors(lookups: &Lookups) -> Vec<MeasurandDescriptor> {
    let descriptors: Vec<MeasurandDescriptor> =
        lookups.iter().map(MeasurandDescriptor::from).collect();
    tracing::debug!("Built {} measurand descriptors", descriptors.len());
    descriptors
}

/// Build descriptors and index them by provider code.
///
/// Goes through [`MeasurandIndex::from_descriptors`]; `Lookups` keys are
/// unique, so the duplicate check never fires here.
pub fn build_index(lookups: &Lookups) -> MeasurandIndex {
    MeasurandIndex::from_descriptors(build_descriptors(lookups))
        .unwrap_or_else(|err| unreachable!("lookup table keys are unique: {err}"))
}
