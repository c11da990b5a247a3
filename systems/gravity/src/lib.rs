#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Finds pieces that lost their connection to the anchoring boundary row.

use std::collections::BTreeSet;

use hexburst_core::{AxialCoord, Command};
use hexburst_world::Grid;

/// Pure system that drops pieces no longer attached to the boundary row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gravity {
    boundary_row: i32,
}

impl Gravity {
    /// Creates the system anchored to the provided row.
    #[must_use]
    pub const fn new(boundary_row: i32) -> Self {
        Self { boundary_row }
    }

    /// Row whose occupants anchor the board.
    #[must_use]
    pub const fn boundary_row(&self) -> i32 {
        self.boundary_row
    }

    /// Emits a drop command for every disconnected piece.
    pub fn handle(&self, grid: &Grid, out: &mut Vec<Command>) {
        let cells = falling(grid, self.boundary_row);
        if cells.is_empty() {
            return;
        }
        log::debug!("{} pieces lost their anchor", cells.len());
        out.push(Command::DropPieces { cells });
    }
}

/// Occupied cells reachable from the boundary row through occupied neighbors.
#[must_use]
pub fn connected(grid: &Grid, boundary_row: i32) -> BTreeSet<AxialCoord> {
    let mut visited = BTreeSet::new();
    let mut stack = grid.row_occupants(boundary_row);

    while let Some(cell) = stack.pop() {
        if !visited.insert(cell) {
            continue;
        }
        for neighbor in grid.neighbors(cell, 1) {
            if !visited.contains(&neighbor) {
                stack.push(neighbor);
            }
        }
    }

    visited
}

/// Occupied cells not reachable from the boundary row, ordered by `(q, r)`.
#[must_use]
pub fn falling(grid: &Grid, boundary_row: i32) -> Vec<AxialCoord> {
    let anchored = connected(grid, boundary_row);
    grid.all_occupants()
        .map(|(cell, _)| cell)
        .filter(|cell| !anchored.contains(cell))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{GridExtent, HexLayout, Piece, PieceColor, PieceId, PieceKind};

    fn grid_with(cells: &[(i32, i32)]) -> Grid {
        let mut grid = Grid::new(GridExtent::new(4, 4), HexLayout::default());
        for (index, (q, r)) in cells.iter().enumerate() {
            let piece = Piece::new(PieceId::new(index as u32), PieceKind::Normal, PieceColor::Red);
            assert!(grid.place(AxialCoord::new(*q, *r), piece).is_ok());
        }
        grid
    }

    #[test]
    fn empty_grid_has_nothing_to_drop() {
        let grid = grid_with(&[]);
        assert!(connected(&grid, 0).is_empty());
        assert!(falling(&grid, 0).is_empty());
    }

    #[test]
    fn island_below_boundary_falls() {
        let grid = grid_with(&[(0, 0), (0, -1), (3, -3)]);
        assert_eq!(falling(&grid, 0), vec![AxialCoord::new(3, -3)]);
    }

    #[test]
    fn handle_emits_single_drop_command() {
        let grid = grid_with(&[(0, 0), (2, -2), (2, -3)]);
        let mut out = Vec::new();
        Gravity::new(0).handle(&grid, &mut out);
        assert_eq!(
            out,
            vec![Command::DropPieces {
                cells: vec![AxialCoord::new(2, -3), AxialCoord::new(2, -2)],
            }]
        );

        out.clear();
        Gravity::new(0).handle(&grid_with(&[(0, 0)]), &mut out);
        assert!(out.is_empty());
    }
}
