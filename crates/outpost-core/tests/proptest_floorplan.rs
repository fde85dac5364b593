//! Property-based tests for the floorplan.
//!
//! Random sequences of placements, removals and ticks are applied only when
//! the floorplan reports them legal; the structural invariants must hold
//! after every step.

use outpost_core::catalog::Catalog;
use outpost_core::connectivity::{self, PlacedFootprint};
use outpost_core::facility::FacilityInstance;
use outpost_core::floorplan::Floorplan;
use outpost_core::grid::{CELLS_HIGH, CELLS_WIDE, GridPosition};
use outpost_core::id::FacilityTypeId;
use outpost_core::test_utils::*;
use proptest::prelude::*;
use std::collections::HashSet;

// ===========================================================================
// Generators
// ===========================================================================

#[derive(Debug, Clone)]
enum FloorplanOp {
    Place { kind: u8, x: i32, y: i32 },
    Remove(usize),
    Tick(u64),
}

fn type_for(kind: u8) -> FacilityTypeId {
    match kind % 7 {
        0 => landing_pad(),
        1 => storage(),
        2 => hangar(),
        3 => tall_block(),
        4 => wide_block(),
        5 => living_quarters(),
        _ => workshop(),
    }
}

fn arb_ops(max_ops: usize) -> impl Strategy<Value = Vec<FloorplanOp>> {
    proptest::collection::vec(
        prop_oneof![
            4 => (0..7u8, 0..CELLS_WIDE, 0..CELLS_HIGH)
                .prop_map(|(kind, x, y)| FloorplanOp::Place { kind, x, y }),
            2 => (0..40usize).prop_map(FloorplanOp::Remove),
            2 => prop_oneof![
                0..2_000u64,
                (1..2_000u64).prop_map(|s| s * 1_000),
                Just(10 * DAY_MS),
            ]
            .prop_map(FloorplanOp::Tick),
        ],
        1..=max_ops,
    )
}

// ===========================================================================
// Helpers
// ===========================================================================

fn footprints(fp: &Floorplan, catalog: &Catalog) -> Vec<PlacedFootprint> {
    fp.facilities()
        .map(|(_, f)| {
            let ty = catalog.get(f.type_id()).unwrap();
            PlacedFootprint::new(f.position(), ty.footprint(), f.is_under_construction())
        })
        .collect()
}

/// Apply one operation if the floorplan allows it.
fn apply(fp: &mut Floorplan, op: &FloorplanOp) {
    match *op {
        FloorplanOp::Place { kind, x, y } => {
            let candidate = FacilityInstance::new(type_for(kind), GridPosition::new(x, y));
            if fp.is_position_legal(&candidate).is_ok() {
                fp.add_facility(candidate);
            }
        }
        FloorplanOp::Remove(index) => {
            let id = fp.ids()[index % fp.len()];
            if fp.can_remove(id).is_ok() {
                fp.remove_facility(id);
            }
        }
        FloorplanOp::Tick(ms) => fp.update(ms),
    }
}

fn check_invariants(fp: &Floorplan, catalog: &Catalog) -> Result<(), TestCaseError> {
    let placed = footprints(fp, catalog);

    // Footprints are in bounds and never share a cell.
    let mut cells = HashSet::new();
    for p in &placed {
        prop_assert!(p.footprint.fits_grid(p.origin), "{:?} off the grid", p);
        for cell in p.footprint.cells(p.origin) {
            prop_assert!(cell.in_grid(), "cell {:?} off the grid", cell);
            prop_assert!(cells.insert(cell), "cell {:?} covered twice", cell);
        }
    }

    prop_assert!(connectivity::is_connected(&placed), "base split: {:?}", placed);

    // The schedule lists exactly the facilities under construction, once
    // each, with strictly ascending keys no larger than their remaining time.
    let building: HashSet<_> = fp
        .facilities()
        .filter(|(_, f)| f.is_under_construction())
        .map(|(id, _)| id)
        .collect();
    let entries: Vec<_> = fp.schedule().iter().collect();
    prop_assert_eq!(entries.len(), building.len());
    for &id in &building {
        prop_assert!(fp.schedule().contains(id), "{:?} missing from schedule", id);
    }
    for pair in entries.windows(2) {
        prop_assert!(pair[0].0 < pair[1].0, "keys out of order: {:?}", entries);
    }
    for &(key, id) in &entries {
        prop_assert!(building.contains(&id));
        let remaining = fp.get(id).unwrap().remaining_build_seconds();
        prop_assert!(key <= remaining, "key {} above remaining {}", key, remaining);
    }
    Ok(())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Grid, connectivity and schedule invariants survive any legal sequence.
    #[test]
    fn invariants_hold_after_every_step(
        (lx, ly) in (0..CELLS_WIDE, 0..CELLS_HIGH),
        ops in arb_ops(60),
    ) {
        let catalog = standard_catalog();
        let (mut fp, _) = base_with_lift(lx, ly);
        check_invariants(&fp, &catalog)?;

        for op in &ops {
            apply(&mut fp, op);
            check_invariants(&fp, &catalog)?;
        }
    }

    /// Remaining build time only ever goes down, and completed facilities
    /// stay complete.
    #[test]
    fn construction_progress_is_monotonic(ops in arb_ops(60)) {
        let (mut fp, _) = base_with_lift(2, 2);

        for op in &ops {
            let before: Vec<_> = fp
                .facilities()
                .map(|(id, f)| (id, f.remaining_build_seconds()))
                .collect();
            apply(&mut fp, op);
            for (id, remaining) in before {
                if let Some(f) = fp.get(id) {
                    prop_assert!(f.remaining_build_seconds() <= remaining);
                    if remaining <= 0.0 {
                        prop_assert!(!f.is_under_construction());
                    }
                }
            }
        }
    }

    /// A zero-length tick never changes anything observable.
    #[test]
    fn update_zero_is_a_no_op(ops in arb_ops(40)) {
        let (mut fp, _) = base_with_lift(0, 0);
        for op in &ops {
            apply(&mut fp, op);
        }
        fp.drain_events();

        let facilities: Vec<_> = fp.facilities().map(|(id, f)| (id, f.clone())).collect();
        let schedule: Vec<_> = fp.schedule().iter().collect();
        let ledger = fp.ledger().clone();
        let pending = fp.pending_elapsed_seconds();

        fp.update(0);

        let after: Vec<_> = fp.facilities().map(|(id, f)| (id, f.clone())).collect();
        prop_assert_eq!(after, facilities);
        prop_assert_eq!(fp.schedule().iter().collect::<Vec<_>>(), schedule);
        prop_assert_eq!(fp.ledger(), &ledger);
        prop_assert_eq!(fp.pending_elapsed_seconds(), pending);
        prop_assert!(fp.drain_events().is_empty());
    }

    /// Saving and loading preserves the layout and construction state.
    #[test]
    fn serialize_round_trip(ops in arb_ops(40)) {
        let (mut fp, _) = base_with_lift(3, 3);
        for op in &ops {
            apply(&mut fp, op);
        }

        let data = fp.serialize().expect("serialize should succeed");
        let restored = Floorplan::deserialize(standard_catalog(), &data)
            .expect("deserialize should succeed");

        prop_assert_eq!(restored.snapshot(), fp.snapshot());
        prop_assert_eq!(restored.schedule().len(), fp.schedule().len());
    }
}
