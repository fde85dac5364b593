//! Floorplan persistence for save games.
//!
//! A [`FloorplanSnapshot`] holds the facilities in placement order and the
//! capacity ledger. Pending elapsed time is folded into each facility's
//! remaining build time, so a restored floorplan starts with a freshly
//! reconciled schedule. The catalog is not saved; it is injected again on
//! restore and every facility type is checked against it.

use crate::catalog::FacilityCatalog;
use crate::connectivity;
use crate::facility::FacilityInstance;
use crate::floorplan::Floorplan;
use crate::id::FacilityTypeId;
use crate::ledger::CapacityLedger;
use crate::schedule::ConstructionSchedule;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a floorplan snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x0B45_F100;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("facility type {0:?} is not in the catalog")]
    UnknownFacilityType(FacilityTypeId),
    #[error("facility {index} does not fit inside the base")]
    OutOfBounds { index: usize },
    #[error("facility {index} overlaps facility {other}")]
    Overlap { index: usize, other: usize },
    #[error("first facility is not an access lift")]
    MissingAccessLift,
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
}

impl SnapshotHeader {
    pub fn new() -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// The persistent state of one floorplan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorplanSnapshot {
    pub header: SnapshotHeader,
    /// Placement order, access lift first.
    pub facilities: Vec<FacilityInstance>,
    pub ledger: CapacityLedger,
}

impl Floorplan {
    /// Capture the floorplan. Time accumulated since the last reconciliation
    /// is charged to facilities under construction.
    pub fn snapshot(&self) -> FloorplanSnapshot {
        let facilities = self
            .facilities()
            .map(|(_, facility)| {
                let mut facility = facility.clone();
                if facility.is_under_construction() {
                    facility.advance(self.elapsed);
                }
                facility
            })
            .collect();
        FloorplanSnapshot {
            header: SnapshotHeader::new(),
            facilities,
            ledger: self.ledger.clone(),
        }
    }

    /// Rebuild a floorplan from a snapshot.
    ///
    /// The ledger is taken as saved; no lifecycle callbacks run. The layout
    /// is validated against the catalog so a corrupt save cannot break the
    /// grid invariants.
    pub fn restore(
        catalog: Arc<dyn FacilityCatalog>,
        snapshot: FloorplanSnapshot,
    ) -> Result<Self, DeserializeError> {
        snapshot.header.validate()?;

        let mut placed: Vec<connectivity::PlacedFootprint> =
            Vec::with_capacity(snapshot.facilities.len());
        for (index, facility) in snapshot.facilities.iter().enumerate() {
            let ty = catalog
                .facility_type(facility.type_id())
                .ok_or(DeserializeError::UnknownFacilityType(facility.type_id()))?;
            if index == 0 && !ty.is_access_lift() {
                return Err(DeserializeError::MissingAccessLift);
            }
            let footprint = ty.footprint();
            if !footprint.fits_grid(facility.position()) {
                return Err(DeserializeError::OutOfBounds { index });
            }
            for cell in footprint.cells(facility.position()) {
                if let Some(other) = connectivity::facility_at(&placed, cell) {
                    return Err(DeserializeError::Overlap { index, other });
                }
            }
            placed.push(connectivity::PlacedFootprint::new(
                facility.position(),
                footprint,
                facility.is_under_construction(),
            ));
        }

        let mut facilities = SlotMap::with_key();
        let order = snapshot
            .facilities
            .into_iter()
            .map(|facility| facilities.insert(facility))
            .collect();

        let mut floorplan = Floorplan {
            catalog,
            facilities,
            order,
            schedule: ConstructionSchedule::new(),
            elapsed: 0.0,
            ledger: snapshot.ledger,
            events: Vec::new(),
        };
        floorplan.rebuild_schedule();
        log::debug!(
            "restored floorplan with {} facilities, {} under construction",
            floorplan.len(),
            floorplan.schedule.len()
        );
        Ok(floorplan)
    }

    /// Serialize the floorplan to a binary blob via bitcode.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        bitcode::serialize(&self.snapshot()).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Deserialize a floorplan, validating the header before the layout.
    pub fn deserialize(
        catalog: Arc<dyn FacilityCatalog>,
        data: &[u8],
    ) -> Result<Self, DeserializeError> {
        let snapshot: FloorplanSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        Self::restore(catalog, snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPosition;
    use crate::test_utils::*;

    #[test]
    fn round_trip_preserves_layout_and_ledger() {
        let (mut fp, _) = base_with_lift(0, 0);
        place_completed(&mut fp, storage(), 1, 0);
        place(&mut fp, hangar(), 0, 1);
        fp.ledger_mut().consume(STORAGE, 120).unwrap();

        let data = fp.serialize().unwrap();
        let restored = Floorplan::deserialize(standard_catalog(), &data).unwrap();

        let original: Vec<_> = fp.facilities().map(|(_, f)| f.clone()).collect();
        let copy: Vec<_> = restored.facilities().map(|(_, f)| f.clone()).collect();
        assert_eq!(original, copy);
        assert_eq!(restored.ledger(), fp.ledger());
        assert_eq!(restored.schedule().len(), 1);
        assert_eq!(restored.schedule().next_due(), Some(HANGAR_BUILD_SECONDS));
    }

    #[test]
    fn snapshot_folds_pending_time() {
        let (mut fp, _) = base_with_lift(0, 0);
        let id = place(&mut fp, hangar(), 1, 0);
        fp.update(300_000);
        assert_eq!(fp.pending_elapsed_seconds(), 300.0);

        let snapshot = fp.snapshot();
        assert_eq!(snapshot.facilities[1].remaining_build_seconds(), 700.0);
        // Capturing does not touch the live floorplan.
        assert_eq!(
            fp.get(id).unwrap().remaining_build_seconds(),
            HANGAR_BUILD_SECONDS
        );

        let mut restored = Floorplan::restore(standard_catalog(), snapshot).unwrap();
        assert_eq!(restored.pending_elapsed_seconds(), 0.0);
        restored.update(700_000);
        let hangar_id = restored.ids()[1];
        assert!(!restored.get(hangar_id).unwrap().is_under_construction());
    }

    #[test]
    fn invalid_magic_rejected() {
        let (fp, _) = base_with_lift(0, 0);
        let mut snapshot = fp.snapshot();
        snapshot.header.magic = 0xDEAD_BEEF;
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::InvalidMagic(0xDEAD_BEEF))
        ));
    }

    #[test]
    fn future_version_rejected() {
        let (fp, _) = base_with_lift(0, 0);
        let mut snapshot = fp.snapshot();
        snapshot.header.version = FORMAT_VERSION + 1;
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::FutureVersion(_))
        ));
    }

    #[test]
    fn unknown_type_rejected() {
        let (fp, _) = base_with_lift(0, 0);
        let mut snapshot = fp.snapshot();
        snapshot
            .facilities
            .push(FacilityInstance::new(FacilityTypeId(99), GridPosition::new(1, 0)));
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::UnknownFacilityType(FacilityTypeId(99)))
        ));
    }

    #[test]
    fn overlapping_layout_rejected() {
        let (fp, _) = base_with_lift(0, 0);
        let mut snapshot = fp.snapshot();
        snapshot
            .facilities
            .push(FacilityInstance::new(landing_pad(), GridPosition::new(0, 0)));
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::Overlap { index: 1, other: 0 })
        ));
    }

    #[test]
    fn out_of_bounds_layout_rejected() {
        let (fp, _) = base_with_lift(5, 5);
        let mut snapshot = fp.snapshot();
        snapshot
            .facilities
            .push(FacilityInstance::new(hangar(), GridPosition::new(5, 4)));
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::OutOfBounds { index: 1 })
        ));
    }

    #[test]
    fn first_facility_must_be_lift() {
        let snapshot = FloorplanSnapshot {
            header: SnapshotHeader::new(),
            facilities: vec![FacilityInstance::new(landing_pad(), GridPosition::new(0, 0))],
            ledger: CapacityLedger::new(),
        };
        assert!(matches!(
            Floorplan::restore(standard_catalog(), snapshot),
            Err(DeserializeError::MissingAccessLift)
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let result = Floorplan::deserialize(standard_catalog(), &[1, 2, 3]);
        assert!(matches!(result, Err(DeserializeError::Decode(_))));
    }
}
