#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Hexburst.

mod grid;
mod pool;

pub use grid::Grid;
pub use pool::{PiecePool, DEFAULT_POOL_CAPACITY};

use hexburst_core::{
    BossHealth, Command, Event, GridExtent, HexLayout, Piece, PieceKind, BASE_MATCH_SCORE,
    FALL_BONUS,
};

const DEFAULT_EXTENT: i32 = 6;
const DEFAULT_BOSS_HEALTH: u32 = 1;

/// Represents the authoritative Hexburst board state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    boss: BossHealth,
    shots: u32,
    score: u64,
}

impl World {
    /// Creates an empty world with a default grid and no shots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(
                GridExtent::new(DEFAULT_EXTENT, DEFAULT_EXTENT),
                HexLayout::default(),
            ),
            boss: BossHealth::new(DEFAULT_BOSS_HEALTH),
            shots: 0,
            score: 0,
        }
    }

    fn award(&mut self, amount: u64, out_events: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        self.score = self.score.saturating_add(amount);
        out_events.push(Event::ScoreAwarded {
            amount,
            total: self.score,
        });
    }

    fn damage_boss(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 || self.boss.is_depleted() {
            return;
        }
        let remaining = self.boss.damage(amount);
        out_events.push(Event::BossDamaged { amount, remaining });
        if self.boss.is_depleted() {
            log::info!("boss defeated");
            out_events.push(Event::BossDefeated);
        }
    }

    fn take_cells(&mut self, cells: &[hexburst_core::AxialCoord]) -> Vec<Piece> {
        cells
            .iter()
            .filter_map(|cell| self.grid.remove(*cell))
            .collect()
    }

    fn evict_all(&mut self, out_events: &mut Vec<Event>) {
        let pieces = self.grid.clear();
        if !pieces.is_empty() {
            out_events.push(Event::GridCleared { pieces });
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { extent, layout } => {
            world.evict_all(out_events);
            world.grid = Grid::new(extent, layout);
        }
        Command::StartSession { boss_health, shots } => {
            world.evict_all(out_events);
            world.boss = BossHealth::new(boss_health);
            world.shots = shots;
            world.score = 0;
            out_events.push(Event::SessionStarted {
                boss_health: world.boss.max(),
                shots,
            });
        }
        Command::PlacePiece { cell, piece } => {
            let id = piece.id();
            match world.grid.place(cell, piece) {
                Ok(displaced) => {
                    if let Some(piece) = displaced {
                        out_events.push(Event::PieceDisplaced { cell, piece });
                    }
                    out_events.push(Event::PiecePlaced { cell, piece: id });
                }
                Err(piece) => {
                    log::warn!("rejected placement of {id:?} outside the grid at {cell}");
                    out_events.push(Event::PlacementRejected { cell, piece });
                }
            }
        }
        Command::RemovePiece { cell } => {
            if let Some(piece) = world.grid.remove(cell) {
                out_events.push(Event::PieceRemoved { cell, piece });
            }
        }
        Command::DestroyPieces { cells } => {
            let pieces = world.take_cells(&cells);
            if pieces.is_empty() {
                return;
            }
            let count = pieces.len();
            let fairies = pieces
                .iter()
                .filter(|piece| piece.kind() == PieceKind::Fairy)
                .count() as u32;
            log::debug!("destroyed {count} pieces ({fairies} fairies)");
            out_events.push(Event::ClusterDestroyed { count, pieces });
            world.award(count as u64 * BASE_MATCH_SCORE, out_events);
            world.damage_boss(fairies, out_events);
        }
        Command::DropPieces { cells } => {
            let pieces = world.take_cells(&cells);
            if pieces.is_empty() {
                return;
            }
            let count = pieces.len();
            log::debug!("{count} pieces fell");
            out_events.push(Event::PiecesFell { count, pieces });
            world.award(count as u64 * FALL_BONUS, out_events);
        }
        Command::DamageBoss { amount } => world.damage_boss(amount, out_events),
        Command::ConsumeShot => {
            if world.shots == 0 {
                return;
            }
            world.shots -= 1;
            out_events.push(Event::ShotConsumed {
                remaining: world.shots,
            });
            if world.shots == 0 {
                out_events.push(Event::ShotsExhausted);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Grid, World};
    use hexburst_core::{AxialCoord, BossHealth, Piece};

    /// Provides read-only access to the grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Occupant of the provided cell.
    #[must_use]
    pub fn piece_at(world: &World, cell: AxialCoord) -> Option<&Piece> {
        world.grid.get(cell)
    }

    /// Reports whether the provided cell is occupied.
    #[must_use]
    pub fn is_occupied(world: &World, cell: AxialCoord) -> bool {
        world.grid.is_occupied(cell)
    }

    /// Current boss health.
    #[must_use]
    pub fn boss(world: &World) -> BossHealth {
        world.boss
    }

    /// Shots left in the budget.
    #[must_use]
    pub fn shots_remaining(world: &World) -> u32 {
        world.shots
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u64 {
        world.score
    }
}
