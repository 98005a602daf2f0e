//! Tests for reading normalization
//!
//! Tests cover:
//! - Converting a fixture batch of provider readings
//! - Skipping readings with unknown provider codes
//! - Carrying extra reading fields through unchanged
//! - Provider unit labels never overriding the normalized unit
//! - Readings without a value

use aqfetch::build_index;
use aqfetch::normalize::{normalize_reading, normalize_readings, RawReading};
use serde_json::Value;

use crate::common::example_files::*;
use crate::common::{approx_eq, mixed_lookups, read_example_file};

fn fixture_readings() -> Vec<RawReading> {
    serde_json::from_str(&read_example_file(READINGS)).expect("readings fixture should parse")
}

#[test]
fn test_fixture_batch() {
    let index = build_index(&mixed_lookups());
    let batch = normalize_readings(&index, &fixture_readings());

    assert_eq!(batch.measurements.len(), 4);
    assert_eq!(batch.skipped, 1);
    assert_eq!(batch.unknown_parameters, vec!["SO2".to_string()]);

    let units: Vec<_> = batch.measurements.iter().map(|m| m.unit.as_str()).collect();
    assert_eq!(units, vec!["ppm", "µg/m³", "particles/cm³", "µg/m³"]);

    let values: Vec<_> = batch.measurements.iter().map(|m| m.value).collect();
    assert_eq!(values, vec![0.5, 2.0, 2.5, 42.0]);
}

#[test]
fn test_canonical_parameter_replaces_code() {
    let index = build_index(&mixed_lookups());
    let m = normalize_reading(&index, &RawReading::new("NO2", 40.0)).unwrap();
    assert_eq!(m.parameter, "no2");
    assert!(approx_eq(m.value, 0.04));
}

#[test]
fn test_extra_fields_preserved() {
    let index = build_index(&mixed_lookups());
    let batch = normalize_readings(&index, &fixture_readings());
    let first = &batch.measurements[0];

    assert_eq!(first.extra["location"], "Station 1");
    assert_eq!(first.extra["date"], "2024-03-01T10:00:00Z");
    assert!(!first.extra.contains_key("parameter"));
}

#[test]
fn test_serialized_measurement_is_flat() {
    let index = build_index(&mixed_lookups());
    let m = normalize_reading(&index, &fixture_readings()[0]).unwrap();
    let json = serde_json::to_value(&m).unwrap();

    assert_eq!(json["parameter"], "co");
    assert_eq!(json["unit"], "ppm");
    assert_eq!(json["location"], "Station 1");
}

#[test]
fn test_provider_unit_label_is_replaced() {
    let index = build_index(&mixed_lookups());
    let readings: Vec<RawReading> =
        serde_json::from_str(r#"[{"parameter": "CO", "value": 500, "unit": "ppb"}]"#).unwrap();
    let batch = normalize_readings(&index, &readings);

    let text = serde_json::to_string(&batch.measurements[0]).unwrap();
    assert_eq!(text.matches("\"unit\"").count(), 1);

    let reparsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(reparsed["unit"], "ppm");
    assert!(approx_eq(reparsed["value"].as_f64().unwrap(), 0.5));
}

#[test]
fn test_fixture_units_do_not_leak() {
    let index = build_index(&mixed_lookups());
    let batch = normalize_readings(&index, &fixture_readings());
    let json = serde_json::to_value(&batch).unwrap();

    assert_eq!(json["measurements"][0]["unit"], "ppm");
    assert_eq!(json["measurements"][1]["unit"], "µg/m³");
    assert!(batch.measurements.iter().all(|m| !m.extra.contains_key("unit")));
}

#[test]
fn test_missing_values_skipped_not_fatal() {
    let index = build_index(&mixed_lookups());
    let readings: Vec<RawReading> = serde_json::from_str(
        r#"[
            {"parameter": "CO", "value": null, "location": "Station 1"},
            {"parameter": "NO2", "value": 40},
            {"parameter": "SO2", "value": null}
        ]"#,
    )
    .expect("null values should deserialize");
    let batch = normalize_readings(&index, &readings);

    assert_eq!(batch.measurements.len(), 1);
    assert_eq!(batch.measurements[0].parameter, "no2");
    assert_eq!(batch.skipped, 2);
    assert_eq!(batch.missing_values, 1);
    assert_eq!(batch.unknown_parameters, vec!["SO2".to_string()]);
}

#[test]
fn test_empty_batch() {
    let index = build_index(&mixed_lookups());
    let batch = normalize_readings(&index, &[]);
    assert!(batch.measurements.is_empty());
    assert_eq!(batch.skipped, 0);
}
