//! Sparse hex grid keyed by axial coordinate.

use std::collections::{BTreeMap, HashSet};

use glam::Vec2;
use hexburst_core::{AxialCoord, GridExtent, HexLayout, Piece};

/// Bounded map from cell to the piece occupying it.
///
/// Every key lies within the extent, and every stored piece reports the key
/// it is stored under as its placement.
#[derive(Clone, Debug)]
pub struct Grid {
    extent: GridExtent,
    layout: HexLayout,
    cells: BTreeMap<AxialCoord, Piece>,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(extent: GridExtent, layout: HexLayout) -> Self {
        Self {
            extent,
            layout,
            cells: BTreeMap::new(),
        }
    }

    /// Legal cell bounds.
    #[must_use]
    pub const fn extent(&self) -> GridExtent {
        self.extent
    }

    /// World-space placement of the cells.
    #[must_use]
    pub const fn layout(&self) -> HexLayout {
        self.layout
    }

    /// Reports whether the cell lies within the extent.
    #[must_use]
    pub fn contains(&self, cell: AxialCoord) -> bool {
        self.extent.contains(cell)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// World position of the centre of `cell`.
    #[must_use]
    pub fn world_position(&self, cell: AxialCoord) -> Vec2 {
        self.layout.world_position(cell)
    }

    /// Cell containing the world-space `point`.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> AxialCoord {
        self.layout.cell_at(point)
    }

    /// Places `piece` at `cell`.
    ///
    /// Returns the piece back as an error when the cell lies outside the
    /// extent. Otherwise returns the previous occupant, if any; an overwrite
    /// is logged since callers are expected to check occupancy first.
    pub fn place(&mut self, cell: AxialCoord, mut piece: Piece) -> Result<Option<Piece>, Piece> {
        if !self.contains(cell) {
            return Err(piece);
        }

        piece.mark_placed(cell);
        let displaced = self.cells.insert(cell, piece).map(|mut previous| {
            log::warn!("overwriting piece {:?} at {cell}", previous.id());
            previous.mark_unplaced();
            previous
        });
        Ok(displaced)
    }

    /// Removes the occupant of `cell`, returning it unplaced.
    pub fn remove(&mut self, cell: AxialCoord) -> Option<Piece> {
        let mut piece = self.cells.remove(&cell)?;
        piece.mark_unplaced();
        Some(piece)
    }

    /// Occupant of `cell`.
    #[must_use]
    pub fn get(&self, cell: AxialCoord) -> Option<&Piece> {
        self.cells.get(&cell)
    }

    /// Reports whether `cell` is occupied.
    #[must_use]
    pub fn is_occupied(&self, cell: AxialCoord) -> bool {
        self.cells.contains_key(&cell)
    }

    /// Occupied cells of row `r` ordered by `q`.
    #[must_use]
    pub fn row_occupants(&self, r: i32) -> Vec<AxialCoord> {
        self.cells.keys().copied().filter(|cell| cell.r() == r).collect()
    }

    /// Every occupied cell ordered by `(q, r)`.
    pub fn all_occupants(&self) -> impl Iterator<Item = (AxialCoord, &Piece)> {
        self.cells.iter().map(|(cell, piece)| (*cell, piece))
    }

    /// Evicts every piece, returning them unplaced.
    pub fn clear(&mut self) -> Vec<Piece> {
        std::mem::take(&mut self.cells)
            .into_values()
            .map(|mut piece| {
                piece.mark_unplaced();
                piece
            })
            .collect()
    }

    /// Occupied cells within `depth` steps of `cell`, excluding `cell` itself.
    #[must_use]
    pub fn neighbors(&self, cell: AxialCoord, depth: u32) -> Vec<AxialCoord> {
        if depth == 0 {
            return Vec::new();
        }
        let mut visited = HashSet::from([cell]);
        self.neighbors_with_self(cell, depth, &mut visited)
    }

    /// Occupied cells within `depth` steps of `cell`, including `cell`.
    ///
    /// Expands ring by ring, recursing into every neighbor with one less
    /// depth, so the result is the whole ball of radius `depth`. Coordinates
    /// already in `visited` are skipped, and every coordinate examined is
    /// added to it, so a caller sharing one set across calls never sees the
    /// same cell twice.
    pub fn neighbors_with_self(
        &self,
        cell: AxialCoord,
        depth: u32,
        visited: &mut HashSet<AxialCoord>,
    ) -> Vec<AxialCoord> {
        let mut found = Vec::new();
        self.expand(cell, depth, visited, &mut found);
        found
    }

    fn expand(
        &self,
        cell: AxialCoord,
        depth: u32,
        visited: &mut HashSet<AxialCoord>,
        found: &mut Vec<AxialCoord>,
    ) {
        if depth == 0 {
            return;
        }

        self.visit(cell, visited, found);
        for neighbor in cell.neighbors() {
            self.visit(neighbor, visited, found);
        }

        if depth == 1 {
            return;
        }

        for neighbor in cell.neighbors() {
            self.expand(neighbor, depth - 1, visited, found);
        }
    }

    fn visit(
        &self,
        cell: AxialCoord,
        visited: &mut HashSet<AxialCoord>,
        found: &mut Vec<AxialCoord>,
    ) {
        if visited.insert(cell) && self.contains(cell) && self.is_occupied(cell) {
            found.push(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{PieceColor, PieceId, PieceKind};

    fn grid() -> Grid {
        Grid::new(GridExtent::new(4, 4), HexLayout::default())
    }

    fn piece(id: u32) -> Piece {
        Piece::new(PieceId::new(id), PieceKind::Normal, PieceColor::Red)
    }

    fn fill(grid: &mut Grid) {
        let cells: Vec<_> = grid.extent().cells().collect();
        for (index, cell) in cells.into_iter().enumerate() {
            assert!(matches!(grid.place(cell, piece(index as u32)), Ok(None)));
        }
    }

    #[test]
    fn place_marks_piece_and_remove_unmarks() {
        let mut grid = grid();
        let cell = AxialCoord::new(1, -1);
        assert_eq!(grid.place(cell, piece(1)), Ok(None));
        assert_eq!(grid.get(cell).and_then(Piece::coordinate), Some(cell));

        let removed = grid.remove(cell).expect("occupied");
        assert!(!removed.is_placed());
        assert!(grid.is_empty());
        assert!(grid.remove(cell).is_none());
    }

    #[test]
    fn place_outside_extent_hands_piece_back() {
        let mut grid = grid();
        let rejected = grid.place(AxialCoord::new(5, 0), piece(2));
        let returned = rejected.expect_err("out of bounds");
        assert_eq!(returned.id(), PieceId::new(2));
        assert!(!returned.is_placed());
        assert!(grid.is_empty());
    }

    #[test]
    fn overwrite_returns_previous_occupant() {
        let mut grid = grid();
        let cell = AxialCoord::new(0, 0);
        assert_eq!(grid.place(cell, piece(1)), Ok(None));
        let displaced = grid.place(cell, piece(2)).expect("in bounds").expect("displaced");
        assert_eq!(displaced.id(), PieceId::new(1));
        assert!(!displaced.is_placed());
        assert_eq!(grid.get(cell).map(Piece::id), Some(PieceId::new(2)));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn ring_expansion_returns_full_ball() {
        let mut grid = grid();
        fill(&mut grid);
        let centre = AxialCoord::new(0, 0);

        let radius_one = grid.neighbors_with_self(centre, 1, &mut HashSet::new());
        assert_eq!(radius_one.len(), 7);

        let radius_two = grid.neighbors_with_self(centre, 2, &mut HashSet::new());
        assert_eq!(radius_two.len(), 19);
        assert!(radius_two.iter().all(|cell| centre.distance(*cell) <= 2));

        let without_self = grid.neighbors(centre, 2);
        assert_eq!(without_self.len(), 18);
        assert!(!without_self.contains(&centre));
    }

    #[test]
    fn ring_expansion_clips_to_extent_and_occupancy() {
        let mut grid = grid();
        let corner = AxialCoord::new(4, 4);
        assert_eq!(grid.place(corner, piece(1)), Ok(None));
        assert_eq!(grid.place(AxialCoord::new(3, 4), piece(2)), Ok(None));

        let found = grid.neighbors_with_self(corner, 2, &mut HashSet::new());
        assert_eq!(found, vec![corner, AxialCoord::new(3, 4)]);
    }

    #[test]
    fn shared_visited_set_suppresses_repeats() {
        let mut grid = grid();
        fill(&mut grid);
        let mut visited = HashSet::new();
        let first = grid.neighbors_with_self(AxialCoord::new(0, 0), 1, &mut visited);
        let second = grid.neighbors_with_self(AxialCoord::new(1, 0), 1, &mut visited);
        assert_eq!(first.len(), 7);
        assert!(second.iter().all(|cell| !first.contains(cell)));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn row_occupants_filters_by_row() {
        let mut grid = grid();
        for (id, cell) in [(0, 1), (2, 1), (1, 0)].into_iter().enumerate() {
            let cell = AxialCoord::new(cell.0, cell.1);
            assert_eq!(grid.place(cell, piece(id as u32)), Ok(None));
        }
        assert_eq!(
            grid.row_occupants(1),
            vec![AxialCoord::new(0, 1), AxialCoord::new(2, 1)]
        );
    }

    #[test]
    fn clear_returns_unplaced_pieces() {
        let mut grid = grid();
        fill(&mut grid);
        let total = grid.len();
        let evicted = grid.clear();
        assert_eq!(evicted.len(), total);
        assert!(evicted.iter().all(|piece| !piece.is_placed()));
        assert!(grid.is_empty());
    }
}
