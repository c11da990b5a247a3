use std::collections::BTreeSet;

use hexburst_core::{
    AxialCoord, Command, GridExtent, HexLayout, Piece, PieceColor, PieceId, PieceKind,
};
use hexburst_system_clusters::{blast_zone, color_cluster, find_destroy_set};
use hexburst_world::Grid;
use proptest::prelude::*;

fn empty_grid() -> Grid {
    Grid::new(GridExtent::new(6, 6), HexLayout::default())
}

fn put(grid: &mut Grid, q: i32, r: i32, kind: PieceKind, color: PieceColor) {
    let id = PieceId::new(grid.len() as u32);
    assert!(grid
        .place(AxialCoord::new(q, r), Piece::new(id, kind, color))
        .is_ok());
}

fn sorted(cells: &[AxialCoord]) -> Vec<AxialCoord> {
    cells.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

#[test]
fn fourth_red_completes_a_line_of_three() {
    let mut grid = empty_grid();
    for q in 0..3 {
        put(&mut grid, q, 0, PieceKind::Normal, PieceColor::Red);
    }
    put(&mut grid, 0, 1, PieceKind::Normal, PieceColor::Blue);
    put(&mut grid, 3, 0, PieceKind::Normal, PieceColor::Red);

    let set = find_destroy_set(&grid, AxialCoord::new(3, 0));

    assert_eq!(set.len(), 4);
    assert!(set.blast().cells.is_empty());
    for cell in set.cells() {
        assert_eq!(grid.get(*cell).map(Piece::color), Some(PieceColor::Red));
    }
    assert!(matches!(
        set.to_command(),
        Some(Command::DestroyPieces { cells }) if cells.len() == 4
    ));
}

#[test]
fn three_adjacent_same_color_pieces_match() {
    let mut grid = empty_grid();
    put(&mut grid, 0, 0, PieceKind::Fairy, PieceColor::Yellow);
    put(&mut grid, 1, 0, PieceKind::Normal, PieceColor::Yellow);
    put(&mut grid, 0, 1, PieceKind::Normal, PieceColor::Yellow);

    assert_eq!(color_cluster(&grid, AxialCoord::new(0, 1)).len(), 3);
}

#[test]
fn bomb_next_to_large_bomb_unions_both_footprints() {
    let mut grid = empty_grid();
    put(&mut grid, 0, 0, PieceKind::LargeBomb, PieceColor::Red);
    put(&mut grid, -2, 0, PieceKind::Normal, PieceColor::Blue);
    put(&mut grid, 2, 0, PieceKind::Normal, PieceColor::Yellow);
    put(&mut grid, 3, 0, PieceKind::Normal, PieceColor::Yellow);
    put(&mut grid, 1, 0, PieceKind::Bomb, PieceColor::Blue);

    let set = find_destroy_set(&grid, AxialCoord::new(1, 0));

    assert_eq!(
        sorted(set.cells()),
        vec![
            AxialCoord::new(-2, 0),
            AxialCoord::new(0, 0),
            AxialCoord::new(1, 0),
            AxialCoord::new(2, 0),
        ]
    );
    assert_eq!(
        sorted(&set.blast().detonations),
        vec![AxialCoord::new(0, 0), AxialCoord::new(1, 0)]
    );
    assert!(set.cluster().is_empty());
}

#[test]
fn bomb_chain_detonates_every_bomb_once() {
    let mut grid = empty_grid();
    let bombs = [(0, 0), (1, 0), (0, 1), (1, -1), (-1, 1), (2, -1)];
    for (q, r) in bombs {
        put(&mut grid, q, r, PieceKind::Bomb, PieceColor::Yellow);
    }
    put(&mut grid, 4, 0, PieceKind::Normal, PieceColor::Red);

    let zone = blast_zone(&grid, AxialCoord::new(0, 0));

    assert_eq!(zone.detonations.len(), bombs.len());
    assert_eq!(sorted(&zone.detonations).len(), bombs.len());
    assert_eq!(sorted(&zone.cells).len(), zone.cells.len());
    assert!(!zone.cells.contains(&AxialCoord::new(4, 0)));
}

#[test]
fn placed_bomb_can_also_complete_a_color_match() {
    let mut grid = empty_grid();
    put(&mut grid, -1, 0, PieceKind::Normal, PieceColor::Red);
    put(&mut grid, -2, 0, PieceKind::Normal, PieceColor::Red);
    put(&mut grid, -3, 0, PieceKind::Normal, PieceColor::Red);
    put(&mut grid, 0, 0, PieceKind::LargeBomb, PieceColor::Red);

    let set = find_destroy_set(&grid, AxialCoord::new(0, 0));

    assert_eq!(set.cluster().len(), 4);
    assert_eq!(set.blast().detonations, vec![AxialCoord::new(0, 0)]);
    assert_eq!(set.len(), 4);
}

fn piece_strategy() -> impl Strategy<Value = (i32, i32, u8, u8)> {
    (-3i32..=3, -3i32..=3, 0u8..4, 0u8..3)
}

proptest! {
    #[test]
    fn destroy_sets_never_hold_a_lone_pair(
        layout in proptest::collection::vec(piece_strategy(), 1..30),
    ) {
        let mut grid = empty_grid();
        for (index, (q, r, kind, color)) in layout.iter().enumerate() {
            let kind = match kind {
                0 => PieceKind::Normal,
                1 => PieceKind::Fairy,
                2 => PieceKind::Bomb,
                _ => PieceKind::LargeBomb,
            };
            let color = PieceColor::ALL[*color as usize];
            let piece = Piece::new(PieceId::new(index as u32), kind, color);
            let _ = grid.place(AxialCoord::new(*q, *r), piece);
        }
        let (q, r, _, _) = layout[0];
        let seed = AxialCoord::new(q, r);

        let set = find_destroy_set(&grid, seed);
        let cluster = set.cluster();
        prop_assert!(cluster.is_empty() || cluster.len() >= 3);
        prop_assert_eq!(sorted(set.cells()).len(), set.len());
        prop_assert!(set.cells().iter().all(|cell| grid.is_occupied(*cell)));

        let detonations = &set.blast().detonations;
        prop_assert_eq!(sorted(detonations).len(), detonations.len());
    }
}
