//! Grid geometry for a base: cell positions and rectangular footprints.

use serde::{Deserialize, Serialize};

/// Number of cell columns in a base.
pub const CELLS_WIDE: i32 = 6;

/// Number of cell rows in a base.
pub const CELLS_HIGH: i32 = 6;

/// A cell on the base grid. The origin is the top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether this cell lies inside the base grid.
    pub fn in_grid(&self) -> bool {
        (0..CELLS_WIDE).contains(&self.x) && (0..CELLS_HIGH).contains(&self.y)
    }
}

/// The size of a facility in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 1x1 facility.
    pub fn single() -> Self {
        Self::new(1, 1)
    }

    /// Iterate over all cells covered by this footprint at the given origin,
    /// row by row.
    pub fn cells(&self, origin: GridPosition) -> impl Iterator<Item = GridPosition> {
        let w = self.width as i32;
        let h = self.height as i32;
        let ox = origin.x;
        let oy = origin.y;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| GridPosition::new(ox + dx, oy + dy)))
    }

    /// Whether `cell` is covered by this footprint placed at `origin`.
    pub fn contains(&self, origin: GridPosition, cell: GridPosition) -> bool {
        let (dx, dy) = (
            i64::from(cell.x) - i64::from(origin.x),
            i64::from(cell.y) - i64::from(origin.y),
        );
        (0..i64::from(self.width)).contains(&dx) && (0..i64::from(self.height)).contains(&dy)
    }

    /// Whether the whole footprint at `origin` lies inside the base grid.
    /// Both corners are checked in `i64`, so any origin is safe to test.
    pub fn fits_grid(&self, origin: GridPosition) -> bool {
        if self.width == 0 || self.height == 0 || !origin.in_grid() {
            return false;
        }
        let right = i64::from(origin.x) + i64::from(self.width);
        let bottom = i64::from(origin.y) + i64::from(self.height);
        right <= i64::from(CELLS_WIDE) && bottom <= i64::from(CELLS_HIGH)
    }

    /// Cells orthogonally adjacent to the footprint: the row above and below,
    /// the column left and right. Corners are not included. Cells outside the
    /// grid are not filtered.
    pub fn border_cells(&self, origin: GridPosition) -> impl Iterator<Item = GridPosition> {
        let w = self.width as i32;
        let h = self.height as i32;
        let (ox, oy) = (origin.x, origin.y);
        let horizontal = (0..w).flat_map(move |dx| {
            [
                GridPosition::new(ox + dx, oy - 1),
                GridPosition::new(ox + dx, oy + h),
            ]
        });
        let vertical = (0..h).flat_map(move |dy| {
            [
                GridPosition::new(ox - 1, oy + dy),
                GridPosition::new(ox + w, oy + dy),
            ]
        });
        horizontal.chain(vertical)
    }
}
