//! Reusable piece storage.

use hexburst_core::{Piece, PieceColor, PieceFactory, PieceId, PieceKind};

/// Default number of pieces minted up front by [`PiecePool::prewarmed`].
pub const DEFAULT_POOL_CAPACITY: usize = 50;

/// Owns pieces that are neither placed nor pending in a lane.
#[derive(Clone, Debug, Default)]
pub struct PiecePool {
    free: Vec<Piece>,
    next_id: u32,
}

impl PiecePool {
    /// Creates an empty pool that mints pieces on demand.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool holding `capacity` ready pieces.
    #[must_use]
    pub fn prewarmed(capacity: usize) -> Self {
        let mut pool = Self::new();
        for _ in 0..capacity {
            let piece = pool.mint(PieceKind::Normal, PieceColor::Red);
            pool.free.push(piece);
        }
        pool
    }

    /// Pieces ready to be handed out without minting.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Total pieces this pool has ever created.
    #[must_use]
    pub fn minted(&self) -> u32 {
        self.next_id
    }

    fn mint(&mut self, kind: PieceKind, color: PieceColor) -> Piece {
        let id = PieceId::new(self.next_id);
        self.next_id += 1;
        Piece::new(id, kind, color)
    }
}

impl PieceFactory for PiecePool {
    fn acquire(&mut self, kind: PieceKind, color: PieceColor) -> Piece {
        match self.free.pop() {
            Some(mut piece) => {
                piece.reset_as(kind, color);
                piece
            }
            None => {
                let piece = self.mint(kind, color);
                log::debug!("pool exhausted, minted piece {:?}", piece.id());
                piece
            }
        }
    }

    fn release(&mut self, mut piece: Piece) {
        piece.mark_unplaced();
        self.free.push(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexburst_core::AxialCoord;

    #[test]
    fn prewarmed_pool_reuses_before_minting() {
        let mut pool = PiecePool::prewarmed(2);
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.minted(), 2);

        let a = pool.acquire(PieceKind::Fairy, PieceColor::Blue);
        let b = pool.acquire(PieceKind::Normal, PieceColor::Yellow);
        assert_eq!(pool.minted(), 2);
        assert_ne!(a.id(), b.id());

        let c = pool.acquire(PieceKind::Normal, PieceColor::Red);
        assert_eq!(pool.minted(), 3);
        assert_eq!(c.id(), PieceId::new(2));
    }

    #[test]
    fn released_piece_carries_no_stale_state() {
        let mut pool = PiecePool::new();
        let mut piece = pool.acquire(PieceKind::Bomb, PieceColor::Blue);
        piece.mark_placed(AxialCoord::new(3, 1));
        let id = piece.id();
        pool.release(piece);

        let reused = pool.acquire(PieceKind::Normal, PieceColor::Yellow);
        assert_eq!(reused.id(), id);
        assert!(!reused.is_placed());
        assert_eq!(reused.kind(), PieceKind::Normal);
        assert_eq!(reused.color(), PieceColor::Yellow);
    }

    #[test]
    fn large_bombs_come_out_red() {
        let mut pool = PiecePool::prewarmed(1);
        let bomb = pool.acquire(PieceKind::LargeBomb, PieceColor::Yellow);
        assert_eq!(bomb.color(), PieceColor::Red);
    }
}
