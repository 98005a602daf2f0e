//! Tests for unit normalization
//!
//! Tests cover:
//! - Each known provider unit quirk
//! - Pass-through of every other unit
//! - Negative and zero values
//! - Dependence on the unit string only

use aqfetch::units::{normalize, UnitConversion};
use aqfetch::MeasurandDescriptor;

use crate::common::approx_eq;

// ============================================
// Known Conversion Tests
// ============================================

#[test]
fn test_ppb_to_ppm() {
    let (unit, value) = normalize("ppb", 500.0);
    assert_eq!(unit, "ppm");
    assert_eq!(value, 0.5);
}

#[test]
fn test_ng_to_ug() {
    let (unit, value) = normalize("ng/m³", 2000.0);
    assert_eq!(unit, "µg/m³");
    assert_eq!(value, 2.0);
}

#[test]
fn test_pp100ml_to_particles_per_cm3() {
    let (unit, value) = normalize("pp100ml", 250.0);
    assert_eq!(unit, "particles/cm³");
    assert_eq!(value, 2.5);
}

#[test]
fn test_zero_and_negative_values() {
    assert_eq!(normalize("ppb", 0.0).1, 0.0);
    assert!(approx_eq(normalize("ppb", -20.0).1, -0.02));
    assert!(approx_eq(normalize("pp100ml", -50.0).1, -0.5));
}

#[test]
fn test_large_values_stay_finite() {
    let value = normalize("ng/m³", 1.0e300).1;
    assert!(value.is_finite());
    assert!(approx_eq(value / 1.0e297, 1.0));
}

// ============================================
// Pass-through Tests
// ============================================

#[test]
fn test_ug_passes_through() {
    let (unit, value) = normalize("µg/m³", 42.0);
    assert_eq!(unit, "µg/m³");
    assert_eq!(value, 42.0);
}

#[test]
fn test_already_normalized_units_pass_through() {
    assert_eq!(normalize("ppm", 1.5), ("ppm", 1.5));
    assert_eq!(normalize("particles/cm³", 7.0), ("particles/cm³", 7.0));
}

#[test]
fn test_lookalike_units_pass_through() {
    // Only exact strings are recognized
    assert!(UnitConversion::for_unit("ng/m3").is_identity());
    assert!(UnitConversion::for_unit(" ppb").is_identity());
    assert!(UnitConversion::for_unit("Ppb").is_identity());
}

// ============================================
// Purity Tests
// ============================================

#[test]
fn test_resolution_is_stable() {
    for unit in ["ppb", "ng/m³", "pp100ml", "µg/m³", "c", ""] {
        assert_eq!(UnitConversion::for_unit(unit), UnitConversion::for_unit(unit));
        assert_eq!(normalize(unit, 123.0), normalize(unit, 123.0));
    }
}

#[test]
fn test_descriptor_identity_does_not_matter() {
    let a = MeasurandDescriptor::new("CO", "co", "ppb");
    let b = MeasurandDescriptor::new("NO2", "no2", "ppb");
    assert_eq!(a.normalized_unit(), b.normalized_unit());
    assert_eq!(a.normalize_value(750.0), b.normalize_value(750.0));
    assert_eq!(a.conversion(), b.conversion());
}

#[test]
fn test_known_rules_listed() {
    let rules: Vec<_> = UnitConversion::known().collect();
    assert_eq!(rules.len(), 3);
    assert!(rules
        .iter()
        .all(|(symbol, rule)| UnitConversion::for_unit(symbol) == *rule));
}
