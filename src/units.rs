//! Unit normalization rules for provider-reported measurands.
//!
//! Providers report some pollutants in units that differ from the ones used
//! internally. This module holds the closed set of known unit quirks and the
//! conversion applied to values reported in each of them. Any unit outside
//! the set passes through unchanged.

use std::str::FromStr;

use serde::Serialize;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Conversion rule selected by a provider's source unit.
///
/// Parsing is keyed by the exact unit string a provider reports. Unknown
/// strings resolve to [`UnitConversion::Identity`] via [`UnitConversion::for_unit`].
#[derive(Clone, Copy, Debug, EnumIter, EnumString, IntoStaticStr, PartialEq, Eq, Hash)]
pub enum UnitConversion {
    /// Parts per billion, normalized to parts per million
    #[strum(serialize = "ppb")]
    PartsPerBillion,
    /// Nanograms per cubic meter, normalized to micrograms per cubic meter
    #[strum(serialize = "ng/m³")]
    NanogramsPerCubicMeter,
    /// Particle count per 100 ml, normalized to particles per cubic centimeter
    #[strum(serialize = "pp100ml")]
    ParticlesPer100Ml,
    /// Any other unit; value and label are kept as reported
    #[strum(disabled)]
    Identity,
}

impl UnitConversion {
    /// Resolve the conversion rule for a source unit.
    pub fn for_unit(unit: &str) -> Self {
        UnitConversion::from_str(unit).unwrap_or(UnitConversion::Identity)
    }

    /// Whether this rule changes the reported value or label.
    pub fn is_identity(&self) -> bool {
        matches!(self, UnitConversion::Identity)
    }

    /// The unit values are expressed in after conversion.
    ///
    /// `source_unit` is only consulted for [`UnitConversion::Identity`].
    pub fn normalized_unit<'a>(&self, source_unit: &'a str) -> &'a str {
        match self {
            UnitConversion::PartsPerBillion => "ppm",
            UnitConversion::NanogramsPerCubicMeter => "µg/m³",
            UnitConversion::ParticlesPer100Ml => "particles/cm³",
            UnitConversion::Identity => source_unit,
        }
    }

    /// Convert a value from the source unit to the normalized unit
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            UnitConversion::PartsPerBillion => value / 1000.0,
            UnitConversion::NanogramsPerCubicMeter => value / 1000.0,
            UnitConversion::ParticlesPer100Ml => value / 100.0,
            UnitConversion::Identity => value,
        }
    }

    /// All rules that alter a value, with their source unit strings.
    pub fn known() -> impl Iterator<Item = (&'static str, UnitConversion)> {
        UnitConversion::iter()
            .filter(|c| !c.is_identity())
            .map(|c| (c.source_symbol(), c))
    }

    /// Source unit string for a known rule, empty for identity
    pub fn source_symbol(&self) -> &'static str {
        match self {
            UnitConversion::Identity => "",
            other => (*other).into(),
        }
    }
}

/// One row of the conversion table
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionRule {
    pub source_unit: &'static str,
    pub normalized_unit: &'static str,
    /// Multiplier applied to values in `source_unit`
    pub factor: f64,
}

/// Every unit that is converted, in declaration order.
pub fn conversion_table() -> Vec<ConversionRule> {
    UnitConversion::known()
        .map(|(symbol, conversion)| ConversionRule {
            source_unit: symbol,
            normalized_unit: conversion.normalized_unit(symbol),
            factor: conversion.apply(1.0),
        })
        .collect()
}

/// Normalize a unit label and value in one step.
///
/// Returns `(normalized_unit, converted_value)`.
pub fn normalize(unit: &str, value: f64) -> (&str, f64) {
    let conversion = UnitConversion::for_unit(unit);
    (conversion.normalized_unit(unit), conversion.apply(value))
}
