use std::collections::VecDeque;

use hexburst_core::{AxialCoord, LaneConfig, Piece, PieceMove};

/// Immutable ordered cells of a lane, head first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanePath {
    cells: Vec<AxialCoord>,
}

impl LanePath {
    /// Creates a path from explicit cells.
    ///
    /// # Panics
    ///
    /// Panics when `cells` is empty; a lane without cells cannot spawn.
    #[must_use]
    pub fn new(cells: Vec<AxialCoord>) -> Self {
        assert!(!cells.is_empty(), "lane path must contain at least one cell");
        Self { cells }
    }

    /// Expands a lane description into its path.
    #[must_use]
    pub fn from_config(config: &LaneConfig) -> Self {
        Self::new(config.path())
    }

    /// Cell where new pieces appear.
    #[must_use]
    pub fn head(&self) -> AxialCoord {
        self.cells[0]
    }

    /// Number of cells in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; paths hold at least one cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `index`, counted from the head.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<AxialCoord> {
        self.cells.get(index).copied()
    }

    /// Every cell, head first.
    #[must_use]
    pub fn cells(&self) -> &[AxialCoord] {
        &self.cells
    }
}

/// Pieces travelling along a lane before they enter the grid.
///
/// Index `i` of the chain sits on path index `i`; the front of the chain is
/// the piece nearest the head.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PendingChain {
    pieces: VecDeque<Piece>,
}

impl PendingChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Reports whether no pieces are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Pending pieces, head first.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Appends a piece behind every other pending piece.
    pub fn push_tail(&mut self, piece: Piece) {
        self.pieces.push_back(piece);
    }

    /// Inserts a piece at the head.
    ///
    /// Returns the piece pushed off the far end when the chain would
    /// outgrow the path.
    pub fn push_head(&mut self, piece: Piece, path: &LanePath) -> Option<Piece> {
        self.pieces.push_front(piece);
        if self.pieces.len() > path.len() {
            self.pieces.pop_back()
        } else {
            None
        }
    }

    /// Moves every pending piece one cell away from the head.
    ///
    /// Pieces already on the last path cell stay where they are.
    #[must_use]
    pub fn advance(&self, path: &LanePath) -> Vec<PieceMove> {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(index, piece)| {
                let from = path.get(index)?;
                let to = path.get(index + 1)?;
                Some(PieceMove {
                    piece: piece.id(),
                    from,
                    to,
                })
            })
            .collect()
    }

    /// Removes every pending piece, head first.
    pub fn drain(&mut self) -> impl Iterator<Item = Piece> + '_ {
        self.pieces.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::{HexDirection, PieceColor, PieceId, PieceKind};

    fn path(len: i32) -> LanePath {
        LanePath::new((0..len).map(|q| AxialCoord::new(q, 0)).collect())
    }

    fn piece(id: u32) -> Piece {
        Piece::new(PieceId::new(id), PieceKind::Normal, PieceColor::Red)
    }

    #[test]
    #[should_panic(expected = "at least one cell")]
    fn empty_path_is_rejected() {
        let _ = LanePath::new(Vec::new());
    }

    #[test]
    fn from_config_follows_directions() {
        let config = LaneConfig {
            start: AxialCoord::new(0, 0),
            directions: vec![HexDirection::Right, HexDirection::TopRight],
        };
        let path = LanePath::from_config(&config);
        assert_eq!(
            path.cells(),
            &[
                AxialCoord::new(0, 0),
                AxialCoord::new(1, 0),
                AxialCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn advance_shifts_each_piece_one_cell() {
        let path = path(3);
        let mut chain = PendingChain::new();
        assert_eq!(chain.push_head(piece(1), &path), None);
        assert_eq!(chain.push_head(piece(2), &path), None);

        let moves = chain.advance(&path);
        assert_eq!(
            moves,
            vec![
                PieceMove {
                    piece: PieceId::new(2),
                    from: AxialCoord::new(0, 0),
                    to: AxialCoord::new(1, 0),
                },
                PieceMove {
                    piece: PieceId::new(1),
                    from: AxialCoord::new(1, 0),
                    to: AxialCoord::new(2, 0),
                },
            ]
        );
    }

    #[test]
    fn last_cell_piece_does_not_move() {
        let path = path(2);
        let mut chain = PendingChain::new();
        for id in 0..2 {
            assert_eq!(chain.push_head(piece(id), &path), None);
        }
        let moves = chain.advance(&path);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].piece, PieceId::new(1));
    }

    #[test]
    fn chain_never_outgrows_path() {
        let path = path(2);
        let mut chain = PendingChain::new();
        assert_eq!(chain.push_head(piece(0), &path), None);
        assert_eq!(chain.push_head(piece(1), &path), None);
        let overflow = chain.push_head(piece(2), &path).expect("overflow");
        assert_eq!(overflow.id(), PieceId::new(0));
        assert_eq!(chain.len(), 2);
    }
}
