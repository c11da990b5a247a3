//! Immutable level description read once when a session starts.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hex::{AxialCoord, GridExtent, HexDirection, HexLayout};

/// Complete description of a playable level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Legal cell bounds of the grid.
    pub extent: GridExtent,
    /// Distance from a cell centre to its corners in world units.
    pub hex_size: f32,
    /// World position of the `(0, 0)` cell.
    #[serde(default)]
    pub origin: Vec2,
    /// Row whose occupants anchor the board against falling.
    #[serde(default)]
    pub boundary_row: i32,
    /// Spawn lanes feeding pieces into the grid.
    pub lanes: Vec<LaneConfig>,
    /// Fewest lane cells regrown once the boss is nearly defeated.
    pub min_spawn_count: u32,
    /// Lane cells filled by initial generation and regrown at full boss health.
    pub max_spawn_count: u32,
    /// Shots available to the player.
    pub shot_count: u32,
    /// Starting boss health.
    pub boss_health: u32,
    /// Sacrifices required to arm a large bomb.
    #[serde(default = "default_sacrifice_goal")]
    pub sacrifice_goal: u32,
    /// Relative weights used when rolling lane piece kinds.
    #[serde(default)]
    pub spawn_weights: SpawnWeights,
    /// Vertical walls the shot may reflect from.
    pub walls: WallConfig,
    /// Where shots start and how far they travel.
    pub shooter: ShooterConfig,
}

/// Start coordinate and step directions of one lane.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Lane head, where new pieces appear.
    pub start: AxialCoord,
    /// Steps walked from the head towards the lane end.
    pub directions: Vec<HexDirection>,
}

impl LaneConfig {
    /// Expands the lane into its ordered coordinate path.
    #[must_use]
    pub fn path(&self) -> Vec<AxialCoord> {
        let mut path = Vec::with_capacity(self.directions.len() + 1);
        let mut cursor = self.start;
        path.push(cursor);
        for direction in &self.directions {
            cursor = cursor.neighbor(*direction);
            path.push(cursor);
        }
        path
    }
}

/// Weighted odds used to roll the kind of freshly spawned lane pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWeights {
    /// Weight of normal pieces.
    pub normal: u32,
    /// Weight of fairy pieces.
    pub fairy: u32,
    /// Weight of bombs.
    pub bomb: u32,
}

impl SpawnWeights {
    /// Sum of all weights, widened so any three `u32` weights fit.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.normal as u64 + self.fairy as u64 + self.bomb as u64
    }
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            normal: 60,
            fairy: 20,
            bomb: 20,
        }
    }
}

/// Horizontal position of the two side walls.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallConfig {
    /// World x of the left wall.
    pub left: f32,
    /// World x of the right wall.
    pub right: f32,
}

/// Shot origin and travel limit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShooterConfig {
    /// World position shots leave from.
    pub origin: Vec2,
    /// Longest distance a single ray segment may travel.
    pub max_distance: f32,
}

const fn default_sacrifice_goal() -> u32 {
    3
}

/// Reasons a level description cannot start a session.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LevelError {
    /// The level defines no lanes.
    #[error("level defines no spawn lanes")]
    NoLanes,
    /// A lane path cannot hold the configured spawn count.
    #[error("lane {lane} has {length} cells but max_spawn_count requires {required}")]
    LaneTooShort {
        /// Index of the offending lane.
        lane: usize,
        /// Number of cells in the lane path.
        length: usize,
        /// Minimum number of cells required.
        required: usize,
    },
    /// A lane path leaves the grid extent.
    #[error("lane {lane} leaves the grid at {cell}")]
    LaneOutOfBounds {
        /// Index of the offending lane.
        lane: usize,
        /// First coordinate outside the extent.
        cell: AxialCoord,
    },
    /// Spawn count bounds are empty or inverted.
    #[error("spawn counts must satisfy 1 <= min ({min}) <= max ({max})")]
    SpawnCountRange {
        /// Configured minimum.
        min: u32,
        /// Configured maximum.
        max: u32,
    },
    /// No shots were configured.
    #[error("shot_count must be at least 1")]
    NoShots,
    /// The sacrifice goal is zero.
    #[error("sacrifice_goal must be at least 1")]
    NoSacrificeGoal,
    /// Cell size is not a positive finite number.
    #[error("hex_size must be positive, got {0}")]
    InvalidHexSize(f32),
    /// Every spawn weight is zero.
    #[error("spawn weights must not all be zero")]
    ZeroSpawnWeights,
    /// Walls are inverted or the shooter travel limit is not positive.
    #[error("walls must satisfy left < right and max_distance must be positive")]
    InvalidBoard,
}

impl LevelConfig {
    /// Checks that the level can start a session.
    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.hex_size.is_finite() && self.hex_size > 0.0) {
            return Err(LevelError::InvalidHexSize(self.hex_size));
        }
        if self.min_spawn_count == 0 || self.min_spawn_count > self.max_spawn_count {
            return Err(LevelError::SpawnCountRange {
                min: self.min_spawn_count,
                max: self.max_spawn_count,
            });
        }
        if self.shot_count == 0 {
            return Err(LevelError::NoShots);
        }
        if self.sacrifice_goal == 0 {
            return Err(LevelError::NoSacrificeGoal);
        }
        if self.spawn_weights.total() == 0 {
            return Err(LevelError::ZeroSpawnWeights);
        }
        if self.walls.left >= self.walls.right || self.shooter.max_distance <= 0.0 {
            return Err(LevelError::InvalidBoard);
        }
        if self.lanes.is_empty() {
            return Err(LevelError::NoLanes);
        }

        let required = self.max_spawn_count as usize;
        for (lane, config) in self.lanes.iter().enumerate() {
            let path = config.path();
            if path.len() < required {
                return Err(LevelError::LaneTooShort {
                    lane,
                    length: path.len(),
                    required,
                });
            }
            if let Some(cell) = path.iter().find(|cell| !self.extent.contains(**cell)) {
                return Err(LevelError::LaneOutOfBounds { lane, cell: *cell });
            }
        }

        Ok(())
    }

    /// World-space layout of the grid.
    #[must_use]
    pub fn layout(&self) -> HexLayout {
        HexLayout::new(self.hex_size, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        hex_size = 0.5
        boundary_row = 2
        min_spawn_count = 1
        max_spawn_count = 3
        shot_count = 10
        boss_health = 5

        [extent]
        max_q = 4
        max_r = 2

        [walls]
        left = -4.0
        right = 4.0

        [shooter]
        origin = [0.0, -3.0]
        max_distance = 20.0

        [[lanes]]
        start = { q = 0, r = 2 }
        directions = ["BottomLeft", "BottomLeft", "BottomRight"]
    "#;

    fn parse() -> LevelConfig {
        toml::from_str(LEVEL).expect("level parses")
    }

    #[test]
    fn parses_toml_with_defaults() {
        let level = parse();
        assert_eq!(level.sacrifice_goal, 3);
        assert_eq!(level.spawn_weights, SpawnWeights::default());
        assert_eq!(level.origin, Vec2::ZERO);
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn lane_path_walks_directions() {
        let level = parse();
        assert_eq!(
            level.lanes[0].path(),
            vec![
                AxialCoord::new(0, 2),
                AxialCoord::new(0, 1),
                AxialCoord::new(0, 0),
                AxialCoord::new(1, -1),
            ]
        );
    }

    #[test]
    fn huge_spawn_weights_validate_without_overflow() {
        let mut level = parse();
        level.spawn_weights = SpawnWeights {
            normal: u32::MAX,
            fairy: u32::MAX,
            bomb: 1,
        };
        assert_eq!(level.spawn_weights.total(), 2 * u64::from(u32::MAX) + 1);
        assert_eq!(level.validate(), Ok(()));
    }

    #[test]
    fn rejects_all_zero_spawn_weights() {
        let mut level = parse();
        level.spawn_weights = SpawnWeights {
            normal: 0,
            fairy: 0,
            bomb: 0,
        };
        assert_eq!(level.validate(), Err(LevelError::ZeroSpawnWeights));
    }

    #[test]
    fn rejects_short_lanes() {
        let mut level = parse();
        level.max_spawn_count = 5;
        assert_eq!(
            level.validate(),
            Err(LevelError::LaneTooShort {
                lane: 0,
                length: 4,
                required: 5,
            })
        );
    }

    #[test]
    fn rejects_lanes_leaving_the_extent() {
        let mut level = parse();
        level.lanes[0].directions.push(HexDirection::BottomLeft);
        level.lanes[0].directions.push(HexDirection::BottomLeft);
        assert_eq!(
            level.validate(),
            Err(LevelError::LaneOutOfBounds {
                lane: 0,
                cell: AxialCoord::new(1, -3),
            })
        );
    }

    #[test]
    fn rejects_inverted_spawn_counts_and_missing_lanes() {
        let mut level = parse();
        level.min_spawn_count = 4;
        assert!(matches!(
            level.validate(),
            Err(LevelError::SpawnCountRange { min: 4, max: 3 })
        ));

        let mut level = parse();
        level.lanes.clear();
        assert_eq!(level.validate(), Err(LevelError::NoLanes));
    }
}
