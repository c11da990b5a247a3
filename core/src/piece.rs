//! Piece identity and attributes.

use serde::{Deserialize, Serialize};

use crate::hex::AxialCoord;

/// Unique identifier assigned to a piece by its factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
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

/// Colors a piece can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceColor {
    /// Red pieces.
    Red,
    /// Blue pieces.
    Blue,
    /// Yellow pieces.
    Yellow,
}

impl PieceColor {
    /// Every color in declaration order.
    pub const ALL: [PieceColor; 3] = [PieceColor::Red, PieceColor::Blue, PieceColor::Yellow];

    /// Single character used by text renderings of the board.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Blue => 'b',
            Self::Yellow => 'y',
        }
    }
}

/// Behavioral variant of a piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceKind {
    /// Plain colored piece that only participates in color matches.
    Normal,
    /// Colored piece that damages the boss when destroyed.
    Fairy,
    /// Explodes everything within one step when detonated.
    Bomb,
    /// Explodes everything within two steps when detonated.
    LargeBomb,
}

impl PieceKind {
    /// Reports whether the kind detonates.
    #[must_use]
    pub const fn is_bomb(self) -> bool {
        matches!(self, Self::Bomb | Self::LargeBomb)
    }

    /// Radius used when this kind seeds or relays a blast.
    ///
    /// Non-bomb kinds report the probe radius used to look for adjacent bombs.
    #[must_use]
    pub const fn blast_radius(self) -> u32 {
        match self {
            Self::LargeBomb => 2,
            Self::Bomb => 1,
            Self::Normal | Self::Fairy => crate::PROBE_RADIUS,
        }
    }
}

/// A single game piece.
///
/// The placement coordinate is only present while a grid owns the piece.
/// Pieces pending in a lane or resting in a pool report no placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    id: PieceId,
    kind: PieceKind,
    color: PieceColor,
    placement: Option<AxialCoord>,
}

impl Piece {
    /// Creates an unplaced piece.
    ///
    /// Large bombs are always red regardless of the requested color.
    #[must_use]
    pub fn new(id: PieceId, kind: PieceKind, color: PieceColor) -> Self {
        Self {
            id,
            kind,
            color: normalize_color(kind, color),
            placement: None,
        }
    }

    /// Identifier of the piece.
    #[must_use]
    pub const fn id(&self) -> PieceId {
        self.id
    }

    /// Behavioral kind of the piece.
    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Color of the piece.
    #[must_use]
    pub const fn color(&self) -> PieceColor {
        self.color
    }

    /// Cell the piece occupies, if it is placed.
    #[must_use]
    pub const fn coordinate(&self) -> Option<AxialCoord> {
        self.placement
    }

    /// Reports whether a grid currently owns the piece.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        self.placement.is_some()
    }

    /// Records that the piece now occupies `cell`.
    ///
    /// Only the grid should call this, in the same step that inserts the piece.
    pub fn mark_placed(&mut self, cell: AxialCoord) {
        self.placement = Some(cell);
    }

    /// Clears placement state after the piece leaves a grid.
    pub fn mark_unplaced(&mut self) {
        self.placement = None;
    }

    /// Reassigns kind and color for reuse and drops any placement state.
    pub fn reset_as(&mut self, kind: PieceKind, color: PieceColor) {
        self.kind = kind;
        self.color = normalize_color(kind, color);
        self.placement = None;
    }
}

fn normalize_color(kind: PieceKind, color: PieceColor) -> PieceColor {
    if kind == PieceKind::LargeBomb {
        PieceColor::Red
    } else {
        color
    }
}
