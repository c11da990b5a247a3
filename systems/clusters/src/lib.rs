#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resolves which pieces a freshly placed piece destroys.
//!
//! Two searches run independently from the seed cell and their results are
//! merged: a bomb blast search that follows chain detonations, and a
//! breadth-first same-color search that only counts once it reaches
//! [`MIN_MATCH_COUNT`].

use std::collections::{HashSet, VecDeque};

use hexburst_core::{AxialCoord, Command, MIN_MATCH_COUNT};
use hexburst_world::Grid;

/// Cells swept by a blast, with the bombs that went off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlastZone {
    /// Affected cells in discovery order.
    pub cells: Vec<AxialCoord>,
    /// Detonated bombs in detonation order.
    pub detonations: Vec<AxialCoord>,
}

/// Merged result of blast and color searches.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DestroySet {
    cells: Vec<AxialCoord>,
    blast: BlastZone,
    cluster: Vec<AxialCoord>,
}

impl DestroySet {
    /// Every cell to destroy, without repeats.
    #[must_use]
    pub fn cells(&self) -> &[AxialCoord] {
        &self.cells
    }

    /// Contribution of the blast search.
    #[must_use]
    pub fn blast(&self) -> &BlastZone {
        &self.blast
    }

    /// Contribution of the color search; empty below the match threshold.
    #[must_use]
    pub fn cluster(&self) -> &[AxialCoord] {
        &self.cluster
    }

    /// Number of cells to destroy.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether nothing is destroyed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Command that removes the set from the world, if it is not empty.
    #[must_use]
    pub fn to_command(&self) -> Option<Command> {
        if self.is_empty() {
            None
        } else {
            Some(Command::DestroyPieces {
                cells: self.cells.clone(),
            })
        }
    }
}

/// Computes the destroy-set seeded by the piece at `seed`.
///
/// An empty seed cell yields an empty set.
#[must_use]
pub fn find_destroy_set(grid: &Grid, seed: AxialCoord) -> DestroySet {
    let blast = blast_zone(grid, seed);
    let cluster = color_cluster(grid, seed);

    let mut seen = HashSet::new();
    let cells = blast
        .cells
        .iter()
        .chain(cluster.iter())
        .copied()
        .filter(|cell| seen.insert(*cell))
        .collect();

    DestroySet {
        cells,
        blast,
        cluster,
    }
}

/// Collects the cells destroyed by bombs at or around `seed`.
///
/// The seed probes its own blast radius. When no bomb sits inside that probe
/// the zone is empty. Otherwise every bomb found detonates over its own
/// radius, and bombs reached by a detonation are queued in turn.
#[must_use]
pub fn blast_zone(grid: &Grid, seed: AxialCoord) -> BlastZone {
    let Some(seed_piece) = grid.get(seed) else {
        return BlastZone::default();
    };

    let mut zone = BlastZone::default();
    let mut affected = HashSet::new();
    let mut include = |cell: AxialCoord, zone: &mut BlastZone| {
        if affected.insert(cell) {
            zone.cells.push(cell);
        }
    };

    include(seed, &mut zone);
    for cell in grid.neighbors(seed, seed_piece.kind().blast_radius()) {
        include(cell, &mut zone);
    }

    let mut checked = HashSet::new();
    let mut queue: VecDeque<AxialCoord> = zone
        .cells
        .iter()
        .copied()
        .filter(|cell| is_bomb(grid, *cell))
        .collect();
    if queue.is_empty() {
        return BlastZone::default();
    }
    checked.extend(queue.iter().copied());

    while let Some(bomb) = queue.pop_front() {
        let radius = grid
            .get(bomb)
            .map_or(0, |piece| piece.kind().blast_radius());
        log::debug!("detonating bomb at {bomb} with radius {radius}");
        zone.detonations.push(bomb);

        for cell in grid.neighbors_with_self(bomb, radius, &mut checked) {
            include(cell, &mut zone);
            if is_bomb(grid, cell) {
                queue.push_back(cell);
            }
        }
    }

    zone
}

/// Breadth-first same-color search from `seed`.
///
/// Bombs are never joined but do not stop the search. Returns an empty list
/// when the group is smaller than [`MIN_MATCH_COUNT`].
#[must_use]
pub fn color_cluster(grid: &Grid, seed: AxialCoord) -> Vec<AxialCoord> {
    let Some(seed_piece) = grid.get(seed) else {
        return Vec::new();
    };
    let color = seed_piece.color();

    let mut visited = HashSet::from([seed]);
    let mut queue = VecDeque::from([seed]);
    let mut cluster = Vec::new();

    while let Some(current) = queue.pop_front() {
        cluster.push(current);
        for cell in grid.neighbors_with_self(current, 1, &mut visited) {
            let Some(piece) = grid.get(cell) else {
                continue;
            };
            if piece.kind().is_bomb() {
                continue;
            }
            if piece.color() == color {
                queue.push_back(cell);
            }
        }
    }

    if cluster.len() >= MIN_MATCH_COUNT {
        cluster
    } else {
        Vec::new()
    }
}

fn is_bomb(grid: &Grid, cell: AxialCoord) -> bool {
    grid.get(cell).is_some_and(|piece| piece.kind().is_bomb())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{GridExtent, HexLayout, Piece, PieceColor, PieceId, PieceKind};

    fn grid_with(pieces: &[((i32, i32), PieceKind, PieceColor)]) -> Grid {
        let mut grid = Grid::new(GridExtent::new(5, 5), HexLayout::default());
        for (index, ((q, r), kind, color)) in pieces.iter().enumerate() {
            let piece = Piece::new(PieceId::new(index as u32), *kind, *color);
            assert!(grid.place(AxialCoord::new(*q, *r), piece).is_ok());
        }
        grid
    }

    #[test]
    fn empty_seed_destroys_nothing() {
        let grid = grid_with(&[]);
        assert!(find_destroy_set(&grid, AxialCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn pair_is_below_threshold() {
        let grid = grid_with(&[
            ((0, 0), PieceKind::Normal, PieceColor::Blue),
            ((1, 0), PieceKind::Normal, PieceColor::Blue),
        ]);
        assert!(color_cluster(&grid, AxialCoord::new(1, 0)).is_empty());
        assert!(find_destroy_set(&grid, AxialCoord::new(1, 0)).to_command().is_none());
    }

    #[test]
    fn bombs_are_skipped_but_do_not_block() {
        // The blue bomb touching the seed never joins the cluster.
        let grid = grid_with(&[
            ((0, 0), PieceKind::Normal, PieceColor::Blue),
            ((1, 0), PieceKind::Bomb, PieceColor::Blue),
            ((1, -1), PieceKind::Normal, PieceColor::Blue),
            ((2, -1), PieceKind::Normal, PieceColor::Blue),
        ]);
        let cluster = color_cluster(&grid, AxialCoord::new(0, 0));
        assert_eq!(cluster.len(), 3);
        assert!(!cluster.contains(&AxialCoord::new(1, 0)));
    }

    #[test]
    fn non_bomb_seed_without_adjacent_bomb_has_no_blast() {
        let grid = grid_with(&[
            ((0, 0), PieceKind::Normal, PieceColor::Red),
            ((2, 0), PieceKind::Bomb, PieceColor::Red),
        ]);
        assert_eq!(blast_zone(&grid, AxialCoord::new(0, 0)), BlastZone::default());
    }

    #[test]
    fn non_bomb_seed_triggers_adjacent_bomb() {
        let grid = grid_with(&[
            ((0, 0), PieceKind::Normal, PieceColor::Red),
            ((1, 0), PieceKind::Bomb, PieceColor::Yellow),
            ((2, 0), PieceKind::Normal, PieceColor::Blue),
            ((3, 0), PieceKind::Normal, PieceColor::Blue),
        ]);
        let zone = blast_zone(&grid, AxialCoord::new(0, 0));
        assert_eq!(zone.detonations, vec![AxialCoord::new(1, 0)]);
        let mut cells = zone.cells.clone();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                AxialCoord::new(0, 0),
                AxialCoord::new(1, 0),
                AxialCoord::new(2, 0)
            ]
        );
    }
}
