use hexburst_core::{Piece, PieceColor, PieceFactory, PieceKind, SpawnWeights};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Seeded source of freshly spawned lane pieces.
///
/// Colors are uniform over [`PieceColor::ALL`]; kinds follow the configured
/// weights. Large bombs never come out of a roller.
#[derive(Clone, Debug)]
pub struct PieceRoller {
    rng: ChaCha8Rng,
    weights: SpawnWeights,
}

impl PieceRoller {
    /// Creates a roller from a seed and kind weights.
    #[must_use]
    pub fn new(seed: u64, weights: SpawnWeights) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            weights,
        }
    }

    /// Derives an independent roller, advancing this one.
    #[must_use]
    pub fn fork(&mut self) -> Self {
        Self::new(self.rng.gen(), self.weights)
    }

    /// Rolls a uniformly random color.
    pub fn color(&mut self) -> PieceColor {
        PieceColor::ALL[self.rng.gen_range(0..PieceColor::ALL.len())]
    }

    /// Rolls a kind according to the weights.
    pub fn kind(&mut self) -> PieceKind {
        let total = self.weights.total();
        if total == 0 {
            return PieceKind::Normal;
        }
        let normal = u64::from(self.weights.normal);
        let fairy = normal + u64::from(self.weights.fairy);
        let roll = self.rng.gen_range(0..total);
        if roll < normal {
            PieceKind::Normal
        } else if roll < fairy {
            PieceKind::Fairy
        } else {
            PieceKind::Bomb
        }
    }

    /// Acquires a freshly rolled piece from `factory`.
    pub fn roll(&mut self, factory: &mut dyn PieceFactory) -> Piece {
        let color = self.color();
        let kind = self.kind();
        factory.acquire(kind, color)
    }
}
