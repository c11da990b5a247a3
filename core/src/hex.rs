//! Axial hex coordinates for a pointy-top lattice.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// `√3 = 2·sin 60°`, the width of a pointy-top hex per unit of size.
/// `f32::sqrt` is not const, so the value is spelled out.
const SQRT_3: f32 = 1.732_050_8;

/// Location of a single hex cell expressed in axial `(q, r)` coordinates.
///
/// The implied cube coordinate is `s = -q - r`. Positive `r` points up in
/// world space, positive `q` points right.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AxialCoord {
    q: i32,
    r: i32,
}

impl AxialCoord {
    /// Creates a new axial coordinate.
    #[must_use]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Column component of the coordinate.
    #[must_use]
    pub const fn q(&self) -> i32 {
        self.q
    }

    /// Row component of the coordinate.
    #[must_use]
    pub const fn r(&self) -> i32 {
        self.r
    }

    /// Implied third cube component, `-q - r`.
    #[must_use]
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Returns the adjacent coordinate in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: HexDirection) -> Self {
        let (dq, dr) = direction.offset();
        Self::new(self.q + dq, self.r + dr)
    }

    /// Iterates the six adjacent coordinates in [`HexDirection::ALL`] order.
    pub fn neighbors(self) -> impl Iterator<Item = AxialCoord> {
        HexDirection::ALL
            .into_iter()
            .map(move |direction| self.neighbor(direction))
    }

    /// Hex distance between two coordinates measured in steps.
    #[must_use]
    pub fn distance(self, other: AxialCoord) -> u32 {
        let dq = self.q.abs_diff(other.q);
        let dr = self.r.abs_diff(other.r);
        let ds = self.s().abs_diff(other.s());
        dq.max(dr).max(ds)
    }

    /// Projects the cell centre into local world space.
    ///
    /// `x = size * (√3 * q + √3/2 * r)`, `y = size * 1.5 * r`.
    #[must_use]
    pub fn to_world(self, hex_size: f32) -> Vec2 {
        let q = self.q as f32;
        let r = self.r as f32;
        Vec2::new(
            hex_size * (SQRT_3 * q + SQRT_3 * 0.5 * r),
            hex_size * 1.5 * r,
        )
    }

    /// Snaps a local world-space point to the cell that contains it.
    ///
    /// Inverts [`AxialCoord::to_world`] into fractional cube coordinates and
    /// applies cube rounding, so points near a shared edge resolve to the cell
    /// that actually contains them.
    #[must_use]
    pub fn from_world(point: Vec2, hex_size: f32) -> Self {
        let r = (2.0 / 3.0) * point.y / hex_size;
        let q = (SQRT_3 / 3.0) * point.x / hex_size - r * 0.5;
        cube_round(q, r)
    }
}

impl std::fmt::Display for AxialCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

fn cube_round(q: f32, r: f32) -> AxialCoord {
    let s = -q - r;

    let mut qi = q.round();
    let mut ri = r.round();
    let si = s.round();

    let q_diff = (qi - q).abs();
    let r_diff = (ri - r).abs();
    let s_diff = (si - s).abs();

    if q_diff > r_diff && q_diff > s_diff {
        qi = -ri - si;
    } else if r_diff > s_diff {
        ri = -qi - si;
    }

    AxialCoord::new(qi as i32, ri as i32)
}

/// The six canonical neighbor directions of a pointy-top hex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HexDirection {
    /// Up and to the right, `(0, +1)`.
    TopRight,
    /// Right, `(+1, 0)`.
    Right,
    /// Down and to the right, `(+1, -1)`.
    BottomRight,
    /// Down and to the left, `(0, -1)`.
    BottomLeft,
    /// Left, `(-1, 0)`.
    Left,
    /// Up and to the left, `(-1, +1)`.
    TopLeft,
}

impl HexDirection {
    /// Every direction in canonical, indexable order.
    pub const ALL: [HexDirection; 6] = [
        HexDirection::TopRight,
        HexDirection::Right,
        HexDirection::BottomRight,
        HexDirection::BottomLeft,
        HexDirection::Left,
        HexDirection::TopLeft,
    ];

    /// Axial `(dq, dr)` offset of the direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::TopRight => (0, 1),
            Self::Right => (1, 0),
            Self::BottomRight => (1, -1),
            Self::BottomLeft => (0, -1),
            Self::Left => (-1, 0),
            Self::TopLeft => (-1, 1),
        }
    }

    /// Position of the direction within [`HexDirection::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a direction by its canonical index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopRight => Self::BottomLeft,
            Self::Right => Self::Left,
            Self::BottomRight => Self::TopLeft,
            Self::BottomLeft => Self::TopRight,
            Self::Left => Self::Right,
            Self::TopLeft => Self::BottomRight,
        }
    }
}

/// Bounded region of legal cells: `|q| <= max_q` and `|r| <= max_r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridExtent {
    max_q: i32,
    max_r: i32,
}

impl GridExtent {
    /// Creates an extent. Negative bounds are treated as zero.
    #[must_use]
    pub fn new(max_q: i32, max_r: i32) -> Self {
        Self {
            max_q: max_q.max(0),
            max_r: max_r.max(0),
        }
    }

    /// Largest legal absolute `q`.
    #[must_use]
    pub const fn max_q(&self) -> i32 {
        self.max_q
    }

    /// Largest legal absolute `r`.
    #[must_use]
    pub const fn max_r(&self) -> i32 {
        self.max_r
    }

    /// Reports whether the coordinate lies within the extent.
    #[must_use]
    pub fn contains(&self, coord: AxialCoord) -> bool {
        coord.q().abs() <= self.max_q && coord.r().abs() <= self.max_r
    }

    /// Iterates every legal cell ordered by `(q, r)`.
    pub fn cells(&self) -> impl Iterator<Item = AxialCoord> {
        let max_r = self.max_r;
        (-self.max_q..=self.max_q)
            .flat_map(move |q| (-max_r..=max_r).map(move |r| AxialCoord::new(q, r)))
    }
}

/// World-space placement of a hex grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HexLayout {
    /// Distance from a cell centre to any of its corners.
    pub hex_size: f32,
    /// World position of the `(0, 0)` cell centre.
    pub origin: Vec2,
}

impl HexLayout {
    /// Creates a layout with the provided cell size and origin.
    #[must_use]
    pub const fn new(hex_size: f32, origin: Vec2) -> Self {
        Self { hex_size, origin }
    }

    /// World position of the centre of `cell`.
    #[must_use]
    pub fn world_position(&self, cell: AxialCoord) -> Vec2 {
        self.origin + cell.to_world(self.hex_size)
    }

    /// Cell containing the world-space `point`.
    #[must_use]
    pub fn cell_at(&self, point: Vec2) -> AxialCoord {
        AxialCoord::from_world(point - self.origin, self.hex_size)
    }
}

impl Default for HexLayout {
    fn default() -> Self {
        Self::new(1.0, Vec2::ZERO)
    }
}
