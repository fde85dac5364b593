//! Serde data file structs for facility and capacity definitions.
//!
//! These structs define the on-disk format of a game's base content. They are
//! deserialized from RON, JSON, or TOML data files and then resolved into a
//! [`outpost_core::catalog::Catalog`] by the loader.

use serde::Deserialize;

// ===========================================================================
// Capacities
// ===========================================================================

/// A named capacity that facilities may grant or consume.
#[derive(Debug, Clone, Deserialize)]
pub struct CapacityDefData {
    pub name: String,
}

/// A capacity amount on a facility, either as a short `("NAME", amount)`
/// tuple or with explicit fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CapacityData {
    Short(String, u32),
    Full { capacity: String, amount: u32 },
}

impl CapacityData {
    pub fn capacity(&self) -> &str {
        match self {
            CapacityData::Short(name, _) => name,
            CapacityData::Full { capacity, .. } => capacity,
        }
    }

    pub fn amount(&self) -> u32 {
        match self {
            CapacityData::Short(_, amount) | CapacityData::Full { amount, .. } => *amount,
        }
    }
}

// ===========================================================================
// Facilities
// ===========================================================================

/// A facility type definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilityData {
    pub name: String,
    #[serde(default = "default_footprint")]
    pub footprint: FootprintData,
    /// Zero means the facility is complete as soon as it is placed.
    #[serde(default)]
    pub build_seconds: f64,
    #[serde(default)]
    pub build_cost: u32,
    #[serde(default)]
    pub scrap_revenue: u32,
    /// At most one facility of this type per base.
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub access_lift: bool,
    #[serde(default)]
    pub grants: Vec<CapacityData>,
    #[serde(default)]
    pub consumes: Vec<CapacityData>,
}

/// The footprint (size) of a facility on the grid.
#[derive(Debug, Clone, Deserialize)]
pub struct FootprintData {
    pub width: u32,
    pub height: u32,
}

fn default_footprint() -> FootprintData {
    FootprintData {
        width: 1,
        height: 1,
    }
}

// ===========================================================================
// TOML wrappers
// ===========================================================================

/// TOML has no top-level arrays, so lists live under a named key.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlFacilities {
    pub facilities: Vec<FacilityData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlCapacities {
    pub capacities: Vec<CapacityDefData>,
}
