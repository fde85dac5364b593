//! Neighbour and connectivity queries over an immutable footprint snapshot.
//!
//! A snapshot is a slice of [`PlacedFootprint`] in floorplan order; index 0
//! is the access lift, the root of connectivity. Adjacency is recomputed
//! geometrically on every call. A base holds at most 36 cells, so the
//! quadratic scans here stay cheap.

use crate::grid::{Footprint, GridPosition};
use std::collections::BTreeSet;

/// Index of the access lift in a snapshot.
pub const ROOT: usize = 0;

/// Where a facility sits and whether it is still being built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedFootprint {
    pub origin: GridPosition,
    pub footprint: Footprint,
    pub under_construction: bool,
}

impl PlacedFootprint {
    pub fn new(origin: GridPosition, footprint: Footprint, under_construction: bool) -> Self {
        Self {
            origin,
            footprint,
            under_construction,
        }
    }

    pub fn contains(&self, cell: GridPosition) -> bool {
        self.footprint.contains(self.origin, cell)
    }
}

/// Index of the first facility covering `cell`.
pub fn facility_at(snapshot: &[PlacedFootprint], cell: GridPosition) -> Option<usize> {
    snapshot.iter().position(|placed| placed.contains(cell))
}

/// Distinct facilities touching the footprint at `origin` along an edge,
/// in discovery order. `exclude` is skipped entirely; under-construction
/// facilities are skipped unless `include_under_construction` is set.
pub fn neighbours_of(
    snapshot: &[PlacedFootprint],
    origin: GridPosition,
    footprint: Footprint,
    exclude: Option<usize>,
    include_under_construction: bool,
) -> Vec<usize> {
    let mut seen = BTreeSet::new();
    let mut result = Vec::new();

    for cell in footprint.border_cells(origin) {
        let Some(index) = facility_at(snapshot, cell) else {
            continue;
        };
        if Some(index) == exclude {
            continue;
        }
        if !include_under_construction && snapshot[index].under_construction {
            continue;
        }
        if seen.insert(index) {
            result.push(index);
        }
    }
    result
}

/// Distinct facilities touching `snapshot[index]`.
pub fn neighbours(
    snapshot: &[PlacedFootprint],
    index: usize,
    include_under_construction: bool,
) -> Vec<usize> {
    let placed = &snapshot[index];
    neighbours_of(
        snapshot,
        placed.origin,
        placed.footprint,
        Some(index),
        include_under_construction,
    )
}

/// Number of facilities still attached to the access lift when `excluded`
/// is taken out of the graph.
///
/// Completed facilities reached from the lift extend the spanning tree.
/// Under-construction facilities touching the tree count as attached, but
/// the walk does not continue through them.
fn attached_count(snapshot: &[PlacedFootprint], excluded: Option<usize>) -> usize {
    if snapshot.is_empty() {
        return 0;
    }

    let mut visited = vec![false; snapshot.len()];
    visited[ROOT] = true;
    if let Some(excluded) = excluded {
        visited[excluded] = true;
    }

    let mut tree = vec![ROOT];
    let mut incomplete = Vec::new();
    let mut next = 0;
    while next < tree.len() {
        let current = tree[next];
        next += 1;
        for neighbour in neighbours(snapshot, current, true) {
            if visited[neighbour] {
                continue;
            }
            visited[neighbour] = true;
            if snapshot[neighbour].under_construction {
                incomplete.push(neighbour);
            } else {
                tree.push(neighbour);
            }
        }
    }
    tree.len() + incomplete.len()
}

/// Whether removing `snapshot[candidate]` would leave some facility cut off
/// from the access lift. The lift itself always would.
pub fn would_disconnect(snapshot: &[PlacedFootprint], candidate: usize) -> bool {
    assert!(
        candidate < snapshot.len(),
        "facility index {candidate} out of range for {} facilities",
        snapshot.len()
    );
    if candidate == ROOT {
        return true;
    }
    attached_count(snapshot, Some(candidate)) < snapshot.len() - 1
}

/// Whether every facility in the snapshot is attached to the access lift.
pub fn is_connected(snapshot: &[PlacedFootprint]) -> bool {
    attached_count(snapshot, None) == snapshot.len()
}
