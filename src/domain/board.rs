/// Board: the occupancy grid plus the vehicles on it.
///
/// ## Occupancy invariant
///
/// Whenever no vehicle is lifted, a board cell (or exit-lane cell) is
/// blocked iff exactly one vehicle covers it. All movement composes from
/// `set_occupancy()`: lift the vehicle, change its position, place it back.
///
/// A dragged vehicle stays lifted for the whole drag, so it never collides
/// with its own footprint; the grid only sees it again on release.

use std::collections::HashMap;

use thiserror::Error;

use super::grid::{Grid, CHUTE_COLS};
use super::vehicle::Vehicle;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid board dimensions {width}x{height} (exit offset {exit_offset})")]
    InvalidDimensions { width: i32, height: i32, exit_offset: i32 },
}

/// A broken occupancy invariant. Only ever produced by `check_occupancy`;
/// the engine treats any of these as a bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OccupancyFault {
    #[error("cell ({x}, {y}) covered by vehicles {first} and {second}")]
    Overlap { x: i32, y: i32, first: usize, second: usize },
    #[error("vehicle {index} sits on border cell ({x}, {y})")]
    OnBorder { index: usize, x: i32, y: i32 },
    #[error("cell ({x}, {y}) marked blocked={marked} but covered={covered}")]
    Mismatch { x: i32, y: i32, marked: bool, covered: bool },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    grid: Grid,
    vehicles: Vec<Vehicle>,
}

// ── Construction ──

impl Board {
    pub fn new(width: i32, height: i32, exit_offset: i32) -> Result<Self, BoardError> {
        if width <= 0 || height <= 0 || exit_offset < 0 || exit_offset >= height {
            return Err(BoardError::InvalidDimensions { width, height, exit_offset });
        }
        Ok(Board {
            grid: Grid::new(width, height, exit_offset),
            vehicles: Vec::new(),
        })
    }

    /// Append a vehicle and mark its cells. The caller guarantees the
    /// footprint is free (initial load only).
    pub fn add_vehicle(&mut self, v: Vehicle) -> usize {
        debug_assert!(self.footprint_free(&v), "add_vehicle onto occupied cells");
        let index = self.vehicles.len();
        self.vehicles.push(v);
        self.set_occupancy(index, true);
        index
    }
}

// ── Queries (render contract) ──

impl Board {
    pub fn width(&self) -> i32 { self.grid.width() }
    pub fn height(&self) -> i32 { self.grid.height() }
    pub fn exit_offset(&self) -> i32 { self.grid.exit_offset() }
    pub fn grid(&self) -> &Grid { &self.grid }
    pub fn vehicles(&self) -> &[Vehicle] { &self.vehicles }

    pub fn vehicle(&self, index: usize) -> Option<&Vehicle> {
        self.vehicles.get(index)
    }

    pub(crate) fn vehicle_mut(&mut self, index: usize) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(index)
    }

    #[inline]
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.grid.is_blocked(x, y)
    }

    /// The VIP and its index (always the first vehicle of a parsed puzzle).
    pub fn vip(&self) -> Option<(usize, &Vehicle)> {
        self.vehicles.iter().enumerate().find(|(_, v)| v.is_vip)
    }

    /// First vehicle (in board order) whose rectangle contains the point,
    /// given in cell units.
    pub fn vehicle_at(&self, px: f64, py: f64) -> Option<usize> {
        self.vehicles.iter().position(|v| v.contains_point(px, py))
    }

    /// Are all cells the vehicle would cover currently free?
    pub fn footprint_free(&self, v: &Vehicle) -> bool {
        v.cells().all(|(x, y)| !self.grid.is_blocked(x, y))
    }
}

// ── Mutation ──

impl Board {
    /// Mark exactly the cells covered by vehicle `index` at its current
    /// (grid-aligned) position. Idempotent.
    pub fn set_occupancy(&mut self, index: usize, occupied: bool) {
        let Some(v) = self.vehicles.get(index) else { return };
        debug_assert!(v.is_aligned(), "set_occupancy on a fractional position");
        for (x, y) in v.cells() {
            self.grid.set(x, y, occupied);
        }
    }

    /// Is every cell swept by sliding vehicle `index` to `target` free?
    /// Only cells outside the current footprint are checked. Targets off
    /// the occupancy field are never clear.
    pub fn path_clear(&self, index: usize, target: i32) -> bool {
        let Some(v) = self.vehicles.get(index) else { return false };
        let cur = v.cell();
        let far = v.axis_extent(self.width(), self.height()) + CHUTE_COLS;
        if target < -1 || target > far { return false; }
        let swept = if target > cur {
            (cur + v.length)..(target + v.length)
        } else {
            target..cur
        };
        swept.map(|a| v.cell_on_axis(a)).all(|(x, y)| !self.grid.is_blocked(x, y))
    }

    /// Lift vehicle `index`, put it at `target` and place it again.
    pub fn relocate(&mut self, index: usize, target: i32) {
        if index >= self.vehicles.len() { return; }
        self.set_occupancy(index, false);
        self.vehicles[index].set_axis_pos(target as f64);
        self.set_occupancy(index, true);
    }
}

// ── Invariant check ──

impl Board {
    /// Verify the occupancy invariant. `lifted` names a vehicle that is
    /// currently off the grid (mid-drag) and is skipped.
    pub fn check_occupancy(&self, lifted: Option<usize>) -> Result<(), OccupancyFault> {
        let mut covered: HashMap<(i32, i32), usize> = HashMap::new();

        for (index, v) in self.vehicles.iter().enumerate() {
            if Some(index) == lifted { continue; }
            for (x, y) in v.cells() {
                if !self.grid.is_interior(x, y) && !self.grid.is_exit_lane(x, y) {
                    return Err(OccupancyFault::OnBorder { index, x, y });
                }
                if let Some(&first) = covered.get(&(x, y)) {
                    return Err(OccupancyFault::Overlap { x, y, first, second: index });
                }
                covered.insert((x, y), index);
            }
        }

        for (x, y) in self.grid.vehicle_cells() {
            let marked = self.grid.is_blocked(x, y);
            let is_covered = covered.contains_key(&(x, y));
            if marked != is_covered {
                return Err(OccupancyFault::Mismatch { x, y, marked, covered: is_covered });
            }
        }

        Ok(())
    }
}
