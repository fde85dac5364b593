//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::catalog::{Catalog, CatalogBuilder, FacilityType};
use crate::facility::FacilityInstance;
use crate::floorplan::Floorplan;
use crate::grid::{Footprint, GridPosition};
use crate::id::{FacilityId, FacilityTypeId};
use std::sync::Arc;

// ===========================================================================
// Constants
// ===========================================================================

pub const STORAGE: &str = "STORAGE";
pub const HANGAR: &str = "HANGAR";
pub const LIVING_SPACE: &str = "LIVING_SPACE";
pub const WORKSHOP_SPACE: &str = "WORKSHOP_SPACE";

pub const STORAGE_PER_FACILITY: u32 = 500;
pub const STORAGE_BUILD_SECONDS: f64 = 500_000.0;
pub const HANGAR_BUILD_SECONDS: f64 = 1_000.0;
pub const WORKSHOP_BUILD_SECONDS: f64 = 100.0;

pub const DAY_MS: u64 = 86_400_000;

// ===========================================================================
// Facility type constructors (ids match `standard_catalog` order)
// ===========================================================================

pub fn access_lift() -> FacilityTypeId {
    FacilityTypeId(0)
}
pub fn landing_pad() -> FacilityTypeId {
    FacilityTypeId(1)
}
pub fn storage() -> FacilityTypeId {
    FacilityTypeId(2)
}
pub fn hangar() -> FacilityTypeId {
    FacilityTypeId(3)
}
pub fn tall_block() -> FacilityTypeId {
    FacilityTypeId(4)
}
pub fn wide_block() -> FacilityTypeId {
    FacilityTypeId(5)
}
pub fn living_quarters() -> FacilityTypeId {
    FacilityTypeId(6)
}
pub fn workshop() -> FacilityTypeId {
    FacilityTypeId(7)
}
pub fn command_centre() -> FacilityTypeId {
    FacilityTypeId(8)
}

/// Catalog used across the test suites.
///
/// | type            | size | build     | capacity                     |
/// |-----------------|------|-----------|------------------------------|
/// | access_lift     | 1x1  | instant   |                              |
/// | landing_pad     | 1x1  | instant   |                              |
/// | storage         | 1x1  | 500000 s  | +500 STORAGE                 |
/// | hangar          | 2x2  | 1000 s    | +1 HANGAR                    |
/// | tall_block      | 1x3  | instant   |                              |
/// | wide_block      | 3x1  | instant   |                              |
/// | living_quarters | 1x1  | instant   | +50 LIVING_SPACE             |
/// | workshop        | 1x1  | 100 s     | +10 WORKSHOP, -10 LIVING     |
/// | command_centre  | 1x1  | instant   | base-unique                  |
pub fn standard_catalog() -> Arc<Catalog> {
    let mut builder = CatalogBuilder::new();
    let types = [
        FacilityType::new("access_lift", Footprint::single())
            .access_lift()
            .with_costs(0, 0),
        FacilityType::new("landing_pad", Footprint::single()).with_costs(200_000, 50_000),
        FacilityType::new("storage", Footprint::single())
            .with_build_duration(STORAGE_BUILD_SECONDS)
            .with_costs(300_000, 75_000)
            .granting(STORAGE, STORAGE_PER_FACILITY),
        FacilityType::new("hangar", Footprint::new(2, 2))
            .with_build_duration(HANGAR_BUILD_SECONDS)
            .with_costs(600_000, 150_000)
            .granting(HANGAR, 1),
        FacilityType::new("tall_block", Footprint::new(1, 3)),
        FacilityType::new("wide_block", Footprint::new(3, 1)),
        FacilityType::new("living_quarters", Footprint::single()).granting(LIVING_SPACE, 50),
        FacilityType::new("workshop", Footprint::single())
            .with_build_duration(WORKSHOP_BUILD_SECONDS)
            .granting(WORKSHOP_SPACE, 10)
            .consuming(LIVING_SPACE, 10),
        FacilityType::new("command_centre", Footprint::single()).base_unique(),
    ];
    for ty in types {
        builder.register(ty).unwrap();
    }
    Arc::new(builder.build().unwrap())
}

// ===========================================================================
// Floorplan helpers
// ===========================================================================

/// An empty base using the standard catalog.
pub fn new_base() -> Floorplan {
    Floorplan::new(standard_catalog())
}

/// A base holding only its access lift.
pub fn base_with_lift(x: i32, y: i32) -> (Floorplan, FacilityId) {
    let mut fp = new_base();
    let lift = place(&mut fp, access_lift(), x, y);
    (fp, lift)
}

/// Check legality, then add. Panics with the placement error if illegal.
pub fn place(fp: &mut Floorplan, type_id: FacilityTypeId, x: i32, y: i32) -> FacilityId {
    let candidate = FacilityInstance::new(type_id, GridPosition::new(x, y));
    if let Err(err) = fp.is_position_legal(&candidate) {
        panic!("cannot place {type_id:?} at ({x}, {y}): {err}");
    }
    fp.add_facility(candidate)
}

/// Tick until nothing is under construction.
pub fn finish_construction(fp: &mut Floorplan) {
    while !fp.schedule().is_empty() {
        fp.update(10 * DAY_MS);
    }
}

/// Place a facility and tick until everything on the base is complete.
pub fn place_completed(fp: &mut Floorplan, type_id: FacilityTypeId, x: i32, y: i32) -> FacilityId {
    let id = place(fp, type_id, x, y);
    finish_construction(fp);
    id
}
