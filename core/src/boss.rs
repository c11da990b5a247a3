//! Boss health counter used as the session win condition.

use serde::{Deserialize, Serialize};

/// Health pool of the level boss.
///
/// Current health never increases except through [`BossHealth::reset`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossHealth {
    max: u32,
    current: u32,
}

impl BossHealth {
    /// Creates a full health pool. A zero maximum is clamped to one.
    #[must_use]
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { max, current: max }
    }

    /// Maximum health.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Remaining health.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Applies damage and returns the remaining health, clamping at zero.
    pub fn damage(&mut self, amount: u32) -> u32 {
        self.current = self.current.saturating_sub(amount);
        self.current
    }

    /// Restores health to the maximum.
    pub fn reset(&mut self) {
        self.current = self.max;
    }

    /// Reports whether the boss has no health left.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.current == 0
    }

    /// Remaining health as a fraction of the maximum in `[0, 1]`.
    #[must_use]
    pub fn rate(&self) -> f32 {
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }
}
