/// Counts sacrificed pieces towards the next large bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SacrificeGauge {
    goal: u32,
    level: u32,
    armed: bool,
    locked: bool,
}

impl SacrificeGauge {
    /// Creates an empty gauge. A zero goal is clamped to one.
    #[must_use]
    pub fn new(goal: u32) -> Self {
        Self {
            goal: goal.max(1),
            level: 0,
            armed: false,
            locked: false,
        }
    }

    /// Sacrifices needed to arm the gauge.
    #[must_use]
    pub const fn goal(&self) -> u32 {
        self.goal
    }

    /// Sacrifices counted so far.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    /// Fill fraction in `[0, 1]`.
    #[must_use]
    pub fn rate(&self) -> f32 {
        (self.level as f32 / self.goal as f32).clamp(0.0, 1.0)
    }

    /// Reports whether a large bomb is waiting to be fired.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Reports whether fills are currently ignored.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Reports whether a sacrifice may be made right now.
    #[must_use]
    pub const fn accepts_sacrifice(&self) -> bool {
        !self.locked && !self.armed
    }

    /// Counts one sacrifice.
    ///
    /// Returns true when this fill armed the gauge. Locked or armed gauges
    /// are left untouched.
    pub fn fill(&mut self) -> bool {
        if !self.accepts_sacrifice() {
            return false;
        }
        self.level = (self.level + 1).min(self.goal);
        if self.level == self.goal {
            self.armed = true;
            log::debug!("sacrifice gauge armed");
        }
        self.armed
    }

    /// Empties and disarms the gauge.
    pub fn reset(&mut self) {
        self.level = 0;
        self.armed = false;
    }

    /// Ignores sacrifices while a shot resolves.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Accepts sacrifices again.
    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
