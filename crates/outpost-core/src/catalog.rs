//! Facility types and the read-only catalog that looks them up.
//!
//! A floorplan never owns facility data. It holds a shared reference to a
//! [`FacilityCatalog`] and asks it for the footprint, build time and
//! capacity effects of each facility it places. [`Catalog`] is the standard
//! in-memory implementation, frozen after [`CatalogBuilder::build`].

use crate::grid::{CELLS_HIGH, CELLS_WIDE, Footprint};
use crate::id::FacilityTypeId;
use crate::ledger::CapacityLedger;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Facility types
// ---------------------------------------------------------------------------

/// An amount of a named capacity that a facility grants or consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityDelta {
    pub capacity: String,
    pub amount: u32,
}

impl CapacityDelta {
    pub fn new(capacity: impl Into<String>, amount: u32) -> Self {
        Self {
            capacity: capacity.into(),
            amount,
        }
    }
}

/// A catalog entry describing one kind of facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityType {
    name: String,
    footprint: Footprint,
    build_duration_seconds: f64,
    build_cost: u32,
    scrap_revenue: u32,
    base_unique: bool,
    access_lift: bool,
    grants: Vec<CapacityDelta>,
    consumes: Vec<CapacityDelta>,
}

impl FacilityType {
    /// A facility that builds instantly and has no capacity effects.
    pub fn new(name: impl Into<String>, footprint: Footprint) -> Self {
        Self {
            name: name.into(),
            footprint,
            build_duration_seconds: 0.0,
            build_cost: 0,
            scrap_revenue: 0,
            base_unique: false,
            access_lift: false,
            grants: Vec::new(),
            consumes: Vec::new(),
        }
    }

    pub fn with_build_duration(mut self, seconds: f64) -> Self {
        self.build_duration_seconds = seconds;
        self
    }

    pub fn with_costs(mut self, build_cost: u32, scrap_revenue: u32) -> Self {
        self.build_cost = build_cost;
        self.scrap_revenue = scrap_revenue;
        self
    }

    /// Only one facility of this type may exist per base.
    pub fn base_unique(mut self) -> Self {
        self.base_unique = true;
        self
    }

    /// Marks the type as the access lift. Access lifts are always base-unique.
    pub fn access_lift(mut self) -> Self {
        self.access_lift = true;
        self.base_unique = true;
        self
    }

    pub fn granting(mut self, capacity: impl Into<String>, amount: u32) -> Self {
        self.grants.push(CapacityDelta::new(capacity, amount));
        self
    }

    pub fn consuming(mut self, capacity: impl Into<String>, amount: u32) -> Self {
        self.consumes.push(CapacityDelta::new(capacity, amount));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn footprint(&self) -> Footprint {
        self.footprint
    }

    pub fn build_duration_seconds(&self) -> f64 {
        self.build_duration_seconds
    }

    pub fn build_cost(&self) -> u32 {
        self.build_cost
    }

    pub fn scrap_revenue(&self) -> u32 {
        self.scrap_revenue
    }

    pub fn is_base_unique(&self) -> bool {
        self.base_unique
    }

    pub fn is_access_lift(&self) -> bool {
        self.access_lift
    }

    pub fn grants(&self) -> &[CapacityDelta] {
        &self.grants
    }

    pub fn consumes(&self) -> &[CapacityDelta] {
        &self.consumes
    }

    // -- Lifecycle callbacks --

    /// Reserve granted capacity as "building".
    pub fn on_start_building(&self, ledger: &mut CapacityLedger) {
        for delta in &self.grants {
            ledger.begin_building(&delta.capacity, delta.amount);
        }
    }

    /// Turn reserved capacity into available capacity and start consuming.
    pub fn on_finished_building(&self, ledger: &mut CapacityLedger) {
        for delta in &self.grants {
            ledger.finish_building(&delta.capacity, delta.amount);
        }
        for delta in &self.consumes {
            ledger.occupy(&delta.capacity, delta.amount);
        }
    }

    /// Undo this facility's effect on the ledger. A complete facility gives up
    /// its granted and consumed capacity; a partial one only drops its
    /// reservation.
    pub fn on_destroy(&self, ledger: &mut CapacityLedger, was_complete: bool) {
        if was_complete {
            for delta in &self.grants {
                ledger.withdraw(&delta.capacity, delta.amount);
            }
            for delta in &self.consumes {
                ledger.vacate(&delta.capacity, delta.amount);
            }
        } else {
            for delta in &self.grants {
                ledger.cancel_building(&delta.capacity, delta.amount);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// Read-only lookup from a type id to its facility type.
///
/// Shared between every floorplan of a game, so implementations must be
/// thread-safe to share.
pub trait FacilityCatalog: std::fmt::Debug + Send + Sync {
    fn facility_type(&self, id: FacilityTypeId) -> Option<&FacilityType>;
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Errors found while freezing a catalog.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate facility type '{0}'")]
    DuplicateName(String),
    #[error("facility type '{name}' has an empty footprint")]
    EmptyFootprint { name: String },
    #[error("facility type '{name}' is {width}x{height}, larger than the base grid")]
    FootprintTooLarge {
        name: String,
        width: u32,
        height: u32,
    },
    #[error("facility type '{name}' has invalid build duration {seconds}")]
    InvalidBuildDuration { name: String, seconds: f64 },
    #[error("access lift declared twice: '{first}' and '{second}'")]
    MultipleAccessLifts { first: String, second: String },
}

/// Builder for an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    types: Vec<FacilityType>,
    name_to_id: HashMap<String, FacilityTypeId>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a facility type. Returns its ID.
    pub fn register(&mut self, facility: FacilityType) -> Result<FacilityTypeId, CatalogError> {
        if self.name_to_id.contains_key(facility.name()) {
            return Err(CatalogError::DuplicateName(facility.name().to_string()));
        }
        let id = FacilityTypeId(self.types.len() as u32);
        self.name_to_id.insert(facility.name().to_string(), id);
        self.types.push(facility);
        Ok(id)
    }

    /// Lookup a registered type ID by name.
    pub fn id(&self, name: &str) -> Option<FacilityTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// Validate every entry and freeze the catalog.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        let mut lift: Option<&str> = None;
        for ty in &self.types {
            let fp = ty.footprint();
            if fp.width == 0 || fp.height == 0 {
                return Err(CatalogError::EmptyFootprint {
                    name: ty.name().to_string(),
                });
            }
            if fp.width > CELLS_WIDE as u32 || fp.height > CELLS_HIGH as u32 {
                return Err(CatalogError::FootprintTooLarge {
                    name: ty.name().to_string(),
                    width: fp.width,
                    height: fp.height,
                });
            }
            let seconds = ty.build_duration_seconds();
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(CatalogError::InvalidBuildDuration {
                    name: ty.name().to_string(),
                    seconds,
                });
            }
            if ty.is_access_lift() {
                if let Some(first) = lift {
                    return Err(CatalogError::MultipleAccessLifts {
                        first: first.to_string(),
                        second: ty.name().to_string(),
                    });
                }
                lift = Some(ty.name());
            }
        }

        Ok(Catalog {
            types: self.types,
            name_to_id: self.name_to_id,
        })
    }
}

/// Immutable facility catalog. Frozen after build(). Thread-safe to share.
#[derive(Debug)]
pub struct Catalog {
    types: Vec<FacilityType>,
    name_to_id: HashMap<String, FacilityTypeId>,
}

impl Catalog {
    pub fn get(&self, id: FacilityTypeId) -> Option<&FacilityType> {
        self.types.get(id.0 as usize)
    }

    /// Lookup a type ID by name.
    pub fn id(&self, name: &str) -> Option<FacilityTypeId> {
        self.name_to_id.get(name).copied()
    }

    /// The access lift type, if the catalog declares one.
    pub fn access_lift(&self) -> Option<FacilityTypeId> {
        self.iter()
            .find(|(_, ty)| ty.is_access_lift())
            .map(|(id, _)| id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FacilityTypeId, &FacilityType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, ty)| (FacilityTypeId(i as u32), ty))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FacilityCatalog for Catalog {
    fn facility_type(&self, id: FacilityTypeId) -> Option<&FacilityType> {
        self.get(id)
    }
}
