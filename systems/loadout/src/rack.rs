use std::collections::VecDeque;

use hexburst_core::{Piece, PieceColor, PieceFactory, PieceKind};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Number of pieces a reload tops the rack up to.
pub const READY_RACK_CAPACITY: usize = 3;

/// Queue of upcoming shot pieces, current piece first.
#[derive(Clone, Debug)]
pub struct ReadyRack {
    pieces: VecDeque<Piece>,
    rng: ChaCha8Rng,
}

impl ReadyRack {
    /// Creates an empty rack whose reload colors derive from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            pieces: VecDeque::with_capacity(READY_RACK_CAPACITY + 1),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Tops the rack up to capacity with normal pieces of random color.
    pub fn reload(&mut self, factory: &mut dyn PieceFactory) {
        while self.pieces.len() < READY_RACK_CAPACITY {
            let color = PieceColor::ALL[self.rng.gen_range(0..PieceColor::ALL.len())];
            self.pieces.push_back(factory.acquire(PieceKind::Normal, color));
        }
    }

    /// Moves the current piece to the back of the rack.
    pub fn rotate(&mut self) {
        if let Some(piece) = self.pieces.pop_front() {
            self.pieces.push_back(piece);
        }
    }

    /// Piece that the next shot fires.
    #[must_use]
    pub fn current(&self) -> Option<&Piece> {
        self.pieces.front()
    }

    /// Removes the current piece.
    pub fn take(&mut self) -> Option<Piece> {
        self.pieces.pop_front()
    }

    /// Puts a piece in front of every other piece.
    ///
    /// The rack may temporarily hold one piece more than its capacity.
    pub fn push_front(&mut self, piece: Piece) {
        self.pieces.push_front(piece);
    }

    /// Number of racked pieces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Reports whether the rack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Racked pieces, current first.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Returns every racked piece to `factory`.
    pub fn clear(&mut self, factory: &mut dyn PieceFactory) {
        for piece in self.pieces.drain(..) {
            factory.release(piece);
        }
    }
}
