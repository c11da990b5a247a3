//! Plain-text views of the board and the event stream.

use hexburst_core::{AxialCoord, Event, Piece, PieceKind};
use hexburst_world::Grid;

const EMPTY_CELL: char = '.';

/// Draws the grid as staggered rows, top row first.
///
/// Normal pieces show their color in lower case and fairies in upper case.
/// Bombs are `*` and large bombs `@`.
pub(crate) fn render_grid(grid: &Grid) -> String {
    let max_q = grid.extent().max_q();
    let max_r = grid.extent().max_r();
    let Some(width) = column(max_q, max_r, max_q, max_r).and_then(|last| last.checked_add(1))
    else {
        log::warn!("board of extent {max_q}x{max_r} is too large to draw");
        return String::new();
    };

    let mut lines = Vec::new();
    for r in (-max_r..=max_r).rev() {
        let mut line = vec![' '; width];
        for q in -max_q..=max_q {
            let cell = AxialCoord::new(q, r);
            if let Some(slot) = column(q, r, max_q, max_r).and_then(|at| line.get_mut(at)) {
                *slot = grid.get(cell).map_or(EMPTY_CELL, glyph);
            }
        }
        let line: String = line.into_iter().collect();
        lines.push(line.trim_end().to_owned());
    }
    lines.join("\n")
}

/// Text column of `(q, r)`: two characters per `q` step, one per `r` step.
fn column(q: i32, r: i32, max_q: i32, max_r: i32) -> Option<usize> {
    let column = 2 * (i64::from(q) + i64::from(max_q)) + i64::from(r) + i64::from(max_r);
    usize::try_from(column).ok()
}

fn glyph(piece: &Piece) -> char {
    match piece.kind() {
        PieceKind::Normal => piece.color().glyph(),
        PieceKind::Fairy => piece.color().glyph().to_ascii_uppercase(),
        PieceKind::Bomb => '*',
        PieceKind::LargeBomb => '@',
    }
}

/// One-line description of the events worth showing a player.
pub(crate) fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::SessionStarted { boss_health, shots } => {
            format!("session started: boss {boss_health} hp, {shots} shots")
        }
        Event::ShotFired { cell, .. } => format!("shot lands at {cell}"),
        Event::ShotWasted { reason, .. } => format!("shot wasted ({reason:?})"),
        Event::BombsDetonated { cells } => format!("{} bombs detonate", cells.len()),
        Event::ClusterDestroyed { count, .. } => format!("{count} pieces destroyed"),
        Event::PiecesFell { count, .. } => format!("{count} pieces fall"),
        Event::ScoreAwarded { amount, total } => format!("+{amount} points ({total})"),
        Event::BossDamaged { amount, remaining } => {
            format!("boss takes {amount} damage, {remaining} hp left")
        }
        Event::BossDefeated => "boss defeated".to_owned(),
        Event::PieceSacrificed { gauge, .. } => format!("piece sacrificed, gauge at {gauge}"),
        Event::LargeBombArmed { .. } => "large bomb ready".to_owned(),
        Event::ShotsExhausted => "out of shots".to_owned(),
        Event::LaneSettled {
            lane,
            placed,
            discarded,
        } if *placed > 0 || *discarded > 0 => format!(
            "lane {} refilled {placed} cells ({discarded} discarded)",
            lane.get()
        ),
        Event::SessionFinished { outcome } => format!("session over: {outcome:?}"),
        _ => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{GridExtent, HexLayout, PieceColor, PieceId};

    #[test]
    fn rows_are_staggered_top_first() {
        let mut grid = Grid::new(GridExtent::new(1, 1), HexLayout::default());
        let red = Piece::new(PieceId::new(0), PieceKind::Normal, PieceColor::Red);
        let fairy = Piece::new(PieceId::new(1), PieceKind::Fairy, PieceColor::Blue);
        assert!(grid.place(AxialCoord::new(0, 0), red).is_ok());
        assert!(grid.place(AxialCoord::new(1, 1), fairy).is_ok());

        assert_eq!(render_grid(&grid), "  . . B\n . r .\n. . .");
    }

    #[test]
    fn extreme_extents_do_not_overflow_columns() {
        let widest = usize::try_from(6 * i64::from(i32::MAX)).ok();
        assert_eq!(column(i32::MAX, i32::MAX, i32::MAX, i32::MAX), widest);
        assert_eq!(column(-1, 0, 0, 0), None);
    }

    #[test]
    fn lane_chatter_is_hidden() {
        assert_eq!(describe(&Event::ShotConsumed { remaining: 3 }), None);
        assert_eq!(
            describe(&Event::BossDamaged {
                amount: 2,
                remaining: 1
            })
            .as_deref(),
            Some("boss takes 2 damage, 1 hp left")
        );
    }
}
