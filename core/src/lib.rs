#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hexburst puzzle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Callers submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. Systems read immutable snapshots and answer with new commands or
//! plain computed values; none of them own the grid.

mod boss;
mod hex;
mod level;
mod piece;

pub use boss::BossHealth;
pub use hex::{AxialCoord, GridExtent, HexDirection, HexLayout};
pub use level::{LaneConfig, LevelConfig, LevelError, ShooterConfig, SpawnWeights, WallConfig};
pub use piece::{Piece, PieceColor, PieceId, PieceKind};

use serde::{Deserialize, Serialize};

/// Smallest same-color group that is destroyed.
pub const MIN_MATCH_COUNT: usize = 3;

/// Radius searched around a non-bomb seed to discover adjacent bombs.
pub const PROBE_RADIUS: u32 = 1;

/// Score awarded per destroyed piece.
pub const BASE_MATCH_SCORE: u64 = 10;

/// Score awarded per piece that falls off the board.
pub const FALL_BONUS: u64 = 20;

/// Source of reusable pieces.
///
/// Implementations must hand out pieces without placement state and accept
/// any piece back for immediate reuse.
pub trait PieceFactory {
    /// Produces a piece of the requested kind and color.
    fn acquire(&mut self, kind: PieceKind, color: PieceColor) -> Piece;

    /// Takes a piece back so it can be handed out again.
    fn release(&mut self, piece: Piece);
}

/// Identifier of a spawn lane, matching its index in the level description.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(u32);

impl LaneId {
    /// Creates a new lane identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One pending piece stepping along a lane path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceMove {
    /// Piece that moved.
    pub piece: PieceId,
    /// Path cell the piece left.
    pub from: AxialCoord,
    /// Path cell the piece is heading to.
    pub to: AxialCoord,
}

/// Why a fired piece did not end up on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WasteReason {
    /// The shot never touched a piece.
    NoTarget,
    /// The resolved cell lies outside the grid extent.
    OutOfBounds,
    /// The resolved cell and every fallback cell were occupied.
    Occupied,
}

/// Terminal result of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The boss was defeated.
    Victory,
    /// Shots ran out with the boss still standing.
    Defeat,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the grid geometry, evicting every placed piece.
    ConfigureGrid {
        /// Legal cell bounds.
        extent: GridExtent,
        /// World-space placement of the cells.
        layout: HexLayout,
    },
    /// Resets boss health, shot budget and score and empties the grid.
    StartSession {
        /// Starting boss health.
        boss_health: u32,
        /// Shots available to the player.
        shots: u32,
    },
    /// Places a piece into a cell.
    PlacePiece {
        /// Target cell.
        cell: AxialCoord,
        /// Piece to place.
        piece: Piece,
    },
    /// Removes whatever occupies a cell.
    RemovePiece {
        /// Cell to clear.
        cell: AxialCoord,
    },
    /// Destroys a resolved destroy-set.
    DestroyPieces {
        /// Cells to destroy.
        cells: Vec<AxialCoord>,
    },
    /// Drops pieces that lost their connection to the boundary row.
    DropPieces {
        /// Cells whose pieces fall.
        cells: Vec<AxialCoord>,
    },
    /// Damages the boss directly.
    DamageBoss {
        /// Health to remove.
        amount: u32,
    },
    /// Spends one shot from the budget.
    ConsumeShot,
}

/// Events broadcast by the world and the turn pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Every piece was evicted from the grid.
    GridCleared {
        /// Pieces that were on the grid, now unplaced.
        pieces: Vec<Piece>,
    },
    /// A new session began.
    SessionStarted {
        /// Starting boss health.
        boss_health: u32,
        /// Shots available.
        shots: u32,
    },
    /// A piece entered the grid.
    PiecePlaced {
        /// Cell now occupied.
        cell: AxialCoord,
        /// Piece that was placed.
        piece: PieceId,
    },
    /// A placement targeted a cell outside the extent.
    PlacementRejected {
        /// Rejected cell.
        cell: AxialCoord,
        /// Piece handed back to the caller.
        piece: Piece,
    },
    /// A placement overwrote an existing occupant.
    PieceDisplaced {
        /// Cell that was overwritten.
        cell: AxialCoord,
        /// Previous occupant, now unplaced.
        piece: Piece,
    },
    /// A single piece left the grid.
    PieceRemoved {
        /// Cell that was cleared.
        cell: AxialCoord,
        /// Removed piece, now unplaced.
        piece: Piece,
    },
    /// A destroy-set was removed from the grid.
    ClusterDestroyed {
        /// Number of destroyed pieces.
        count: usize,
        /// Destroyed pieces, now unplaced.
        pieces: Vec<Piece>,
    },
    /// Disconnected pieces fell off the board.
    PiecesFell {
        /// Number of fallen pieces.
        count: usize,
        /// Fallen pieces, now unplaced.
        pieces: Vec<Piece>,
    },
    /// Score increased.
    ScoreAwarded {
        /// Points added by this award.
        amount: u64,
        /// Running total.
        total: u64,
    },
    /// The boss lost health.
    BossDamaged {
        /// Health removed.
        amount: u32,
        /// Health left.
        remaining: u32,
    },
    /// The boss has no health left.
    BossDefeated,
    /// One shot was spent.
    ShotConsumed {
        /// Shots left.
        remaining: u32,
    },
    /// The shot budget reached zero.
    ShotsExhausted,
    /// A piece left the shooter towards a resolved cell.
    ShotFired {
        /// Fired piece.
        piece: PieceId,
        /// Cell the piece will occupy.
        cell: AxialCoord,
    },
    /// A fired piece had nowhere to go and returned to the pool.
    ShotWasted {
        /// Fired piece.
        piece: PieceId,
        /// Why no cell was found.
        reason: WasteReason,
    },
    /// The ready piece was sacrificed to charge the gauge.
    PieceSacrificed {
        /// Sacrificed piece.
        piece: PieceId,
        /// Gauge level after the sacrifice.
        gauge: u32,
    },
    /// A large bomb was loaded at the front of the ready rack.
    LargeBombArmed {
        /// Loaded piece.
        piece: PieceId,
    },
    /// Bombs detonated while resolving a destroy-set.
    BombsDetonated {
        /// Cells of the detonated bombs in detonation order.
        cells: Vec<AxialCoord>,
    },
    /// A lane chain stepped one cell towards the grid.
    LaneAdvanced {
        /// Lane that advanced.
        lane: LaneId,
        /// Individual piece moves.
        moves: Vec<PieceMove>,
    },
    /// A new piece appeared at a lane head.
    LanePieceSpawned {
        /// Lane that spawned.
        lane: LaneId,
        /// New piece.
        piece: PieceId,
        /// Head cell of the lane.
        cell: AxialCoord,
    },
    /// A lane finished generating or regenerating.
    LaneSettled {
        /// Lane that settled.
        lane: LaneId,
        /// Pieces placed into the grid.
        placed: usize,
        /// Pieces returned to the pool.
        discarded: usize,
    },
    /// The session reached a terminal state.
    SessionFinished {
        /// How the session ended.
        outcome: Outcome,
    },
}
