#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shot path planning with at most one wall reflection.
//!
//! Collision queries are delegated to a [`Raycaster`], so the planner works
//! against any geometry provider. [`BoardColliders`] is the reference
//! provider built from the grid and the level walls.

mod colliders;

pub use colliders::{BoardColliders, PIECE_RADIUS_FACTOR};

use std::ops::BitOr;

use glam::Vec2;
use hexburst_core::{AxialCoord, PieceId, WasteReason};
use hexburst_world::Grid;

/// Offset applied past a wall before the reflected ray is cast.
pub const REFLECTION_EPSILON: f32 = 0.01;

/// Fraction of the hex size the impact point is pushed outward before snapping.
pub const PLACEMENT_PROBE_FACTOR: f32 = 0.6;

/// Set of collider layers a ray may hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(u8);

impl LayerMask {
    /// Board walls.
    pub const WALLS: LayerMask = LayerMask(0b01);
    /// Placed pieces.
    pub const PIECES: LayerMask = LayerMask(0b10);
    /// Walls and pieces.
    pub const ALL: LayerMask = LayerMask(0b11);

    /// Reports whether every layer in `other` is part of this mask.
    #[must_use]
    pub const fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LayerMask(self.0 | rhs.0)
    }
}

/// What a ray struck.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    /// A board wall.
    Wall,
    /// A placed piece.
    Piece(StruckPiece),
}

/// Identity and position of a piece struck by a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StruckPiece {
    /// Struck piece.
    pub id: PieceId,
    /// Cell the piece occupies.
    pub cell: AxialCoord,
    /// World position of the piece centre.
    pub center: Vec2,
}

/// Result of a single ray cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Contact point.
    pub point: Vec2,
    /// Unit surface normal at the contact point.
    pub normal: Vec2,
    /// Distance travelled from the ray origin.
    pub distance: f32,
    /// Collider that was hit.
    pub collider: Collider,
}

/// Geometry provider answering ray queries.
pub trait Raycaster {
    /// Casts a ray and returns the nearest hit on a masked layer within `max_distance`.
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;
}

/// Path a shot would follow.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryResult {
    waypoints: Vec<Vec2>,
    reflected: bool,
    final_position: Vec2,
    struck: Option<StruckPiece>,
}

impl TrajectoryResult {
    /// Ordered points along the path, starting at the origin. Always two or three.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// Reports whether the path bounced off a wall.
    #[must_use]
    pub const fn reflected(&self) -> bool {
        self.reflected
    }

    /// Where the path ends.
    #[must_use]
    pub const fn final_position(&self) -> Vec2 {
        self.final_position
    }

    /// Piece struck by the final segment, if any.
    #[must_use]
    pub const fn struck(&self) -> Option<StruckPiece> {
        self.struck
    }

    /// Reports whether the final segment ended on a piece.
    #[must_use]
    pub const fn hit_piece(&self) -> bool {
        self.struck.is_some()
    }
}

/// Computes shot paths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryPlanner {
    max_distance: f32,
}

impl TrajectoryPlanner {
    /// Creates a planner whose ray segments travel at most `max_distance`.
    #[must_use]
    pub const fn new(max_distance: f32) -> Self {
        Self { max_distance }
    }

    /// Longest distance a single ray segment travels.
    #[must_use]
    pub const fn max_distance(&self) -> f32 {
        self.max_distance
    }

    /// Traces a shot from `origin` along `direction`.
    ///
    /// A wall hit reflects the ray exactly once; whatever the reflected ray
    /// meets ends the path. A zero direction produces a degenerate path that
    /// ends at the origin.
    #[must_use]
    pub fn plan(
        &self,
        origin: Vec2,
        direction: Vec2,
        raycaster: &dyn Raycaster,
    ) -> TrajectoryResult {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return TrajectoryResult {
                waypoints: vec![origin, origin],
                reflected: false,
                final_position: origin,
                struck: None,
            };
        }

        let Some(hit) = raycaster.raycast(origin, direction, self.max_distance, LayerMask::ALL)
        else {
            let end = origin + direction * self.max_distance;
            return TrajectoryResult {
                waypoints: vec![origin, end],
                reflected: false,
                final_position: end,
                struck: None,
            };
        };

        match hit.collider {
            Collider::Piece(piece) => TrajectoryResult {
                waypoints: vec![origin, hit.point],
                reflected: false,
                final_position: hit.point,
                struck: Some(piece),
            },
            Collider::Wall => {
                let bounced = reflect(direction, hit.normal).normalize_or_zero();
                let restart = hit.point + bounced * REFLECTION_EPSILON;
                match raycaster.raycast(restart, bounced, self.max_distance, LayerMask::ALL) {
                    Some(second) => TrajectoryResult {
                        waypoints: vec![origin, hit.point, second.point],
                        reflected: true,
                        final_position: second.point,
                        struck: match second.collider {
                            Collider::Piece(piece) => Some(piece),
                            Collider::Wall => None,
                        },
                    },
                    None => {
                        let end = hit.point + bounced * self.max_distance;
                        TrajectoryResult {
                            waypoints: vec![origin, hit.point, end],
                            reflected: true,
                            final_position: end,
                            struck: None,
                        }
                    }
                }
            }
        }
    }
}

/// Mirrors `direction` about the surface with unit normal `normal`.
#[must_use]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Cell on the impact side of the struck piece, before any occupancy checks.
///
/// Returns `None` when the path did not end on a piece.
#[must_use]
pub fn impact_cell(trajectory: &TrajectoryResult, grid: &Grid) -> Option<AxialCoord> {
    let struck = trajectory.struck()?;
    let hit = trajectory.final_position();
    let impact = (hit - struck.center).normalize_or_zero();
    let probe = hit + impact * grid.layout().hex_size * PLACEMENT_PROBE_FACTOR;
    Some(grid.cell_at(probe))
}

/// Resolves the empty cell a shot settles into.
///
/// When the impact-side cell is taken, the empty in-extent neighbor of the
/// struck piece closest to the hit point is used instead.
pub fn resolve_placement(
    trajectory: &TrajectoryResult,
    grid: &Grid,
) -> Result<AxialCoord, WasteReason> {
    let Some(struck) = trajectory.struck() else {
        return Err(WasteReason::NoTarget);
    };
    let Some(cell) = impact_cell(trajectory, grid) else {
        return Err(WasteReason::NoTarget);
    };

    if !grid.contains(cell) {
        return Err(WasteReason::OutOfBounds);
    }
    if !grid.is_occupied(cell) {
        return Ok(cell);
    }

    let hit = trajectory.final_position();
    struck
        .cell
        .neighbors()
        .filter(|candidate| grid.contains(*candidate) && !grid.is_occupied(*candidate))
        .min_by(|a, b| {
            let da = grid.world_position(*a).distance_squared(hit);
            let db = grid.world_position(*b).distance_squared(hit);
            da.total_cmp(&db)
        })
        .ok_or(WasteReason::Occupied)
}
