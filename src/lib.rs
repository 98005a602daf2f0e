//! aqfetch - Measurand normalization for environmental sensor providers
//!
//! This library maps the parameter codes and units used by external air
//! quality data providers onto canonical parameters and internal units.
//!
//! ## Module Structure
//!
//! - [`measurand`] - Measurand descriptors and the provider code index
//! - [`lookup`] - Provider lookup tables and their JSON shape checks
//! - [`units`] - Known provider unit quirks and value conversions
//! - [`normalize`] - Applying an index to raw provider readings
//! - [`source`] - Source configuration documents and source name resolution
//! - [`settings`] - Runtime settings

pub mod lookup;
pub mod measurand;
pub mod normalize;
pub mod settings;
pub mod source;
pub mod units;

pub use lookup::{LookupEntry, Lookups, ValidationMode};
pub use measurand::{
    build_descriptors, build_index, MeasurandDescriptor, MeasurandError, MeasurandIndex,
};
pub use units::UnitConversion;
