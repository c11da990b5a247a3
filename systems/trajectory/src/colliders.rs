//! Reference geometry provider built from the grid and the level walls.

use glam::Vec2;
use hexburst_core::WallConfig;
use hexburst_world::Grid;

use crate::{Collider, LayerMask, RayHit, Raycaster, StruckPiece};

/// Piece collider radius as a fraction of the hex size.
pub const PIECE_RADIUS_FACTOR: f32 = 0.85;

/// Two vertical walls plus a circular collider per placed piece.
#[derive(Clone, Copy, Debug)]
pub struct BoardColliders<'a> {
    grid: &'a Grid,
    walls: WallConfig,
    piece_radius: f32,
}

impl<'a> BoardColliders<'a> {
    /// Builds colliders for the current grid occupancy.
    #[must_use]
    pub fn new(grid: &'a Grid, walls: WallConfig) -> Self {
        Self {
            grid,
            walls,
            piece_radius: grid.layout().hex_size * PIECE_RADIUS_FACTOR,
        }
    }

    fn wall_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let (x, normal) = if direction.x < 0.0 {
            (self.walls.left, Vec2::X)
        } else if direction.x > 0.0 {
            (self.walls.right, Vec2::NEG_X)
        } else {
            return None;
        };

        let distance = (x - origin.x) / direction.x;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }
        Some(RayHit {
            point: origin + direction * distance,
            normal,
            distance,
            collider: Collider::Wall,
        })
    }

    fn piece_hit(&self, origin: Vec2, direction: Vec2, max_distance: f32) -> Option<RayHit> {
        let radius_sq = self.piece_radius * self.piece_radius;
        let mut nearest: Option<RayHit> = None;

        for (cell, piece) in self.grid.all_occupants() {
            let center = self.grid.world_position(cell);
            let offset = origin - center;
            let b = offset.dot(direction);
            let c = offset.length_squared() - radius_sq;
            if c > 0.0 && b > 0.0 {
                continue;
            }
            let discriminant = b * b - c;
            if discriminant < 0.0 {
                continue;
            }
            let distance = (-b - discriminant.sqrt()).max(0.0);
            if distance > max_distance {
                continue;
            }
            if nearest.is_some_and(|hit| hit.distance <= distance) {
                continue;
            }

            let point = origin + direction * distance;
            nearest = Some(RayHit {
                point,
                normal: (point - center).normalize_or_zero(),
                distance,
                collider: Collider::Piece(StruckPiece {
                    id: piece.id(),
                    cell,
                    center,
                }),
            });
        }

        nearest
    }
}

impl Raycaster for BoardColliders<'_> {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        let wall = if mask.contains(LayerMask::WALLS) {
            self.wall_hit(origin, direction, max_distance)
        } else {
            None
        };
        let piece = if mask.contains(LayerMask::PIECES) {
            self.piece_hit(origin, direction, max_distance)
        } else {
            None
        };

        match (wall, piece) {
            (Some(wall), Some(piece)) if piece.distance <= wall.distance => Some(piece),
            (Some(wall), _) => Some(wall),
            (None, piece) => piece,
        }
    }
}
