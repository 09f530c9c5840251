//! Hex coordinate system using axial coordinates (q, r).
//!
//! This module provides the coordinate type every board map is keyed by:
//! - `HexCoord`: identifies individual hex cells
//! - `Direction`: the six axial moves a character can request
//!
//! Axial coordinates map onto cube coordinates as `x = q`, `z = r` and
//! `y = -q - r`. Directions are named after the cube axis they increase
//! while keeping one other axis constant.

use serde::{Deserialize, Serialize};

/// One of the six axial movement directions.
///
/// The serialized form is the one the match server expects in a
/// `"movement": "move"` action (`"x+"`, `"y-"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// +x, z constant
    #[serde(rename = "x+")]
    XPlus,
    /// +y, x constant
    #[serde(rename = "y+")]
    YPlus,
    /// +z, y constant
    #[serde(rename = "z+")]
    ZPlus,
    /// -x, z constant
    #[serde(rename = "x-")]
    XMinus,
    /// -y, x constant
    #[serde(rename = "y-")]
    YMinus,
    /// -z, y constant
    #[serde(rename = "z-")]
    ZMinus,
}

impl Direction {
    /// All directions, positive axes first
    pub const ALL: [Direction; 6] = [
        Direction::XPlus,
        Direction::YPlus,
        Direction::ZPlus,
        Direction::XMinus,
        Direction::YMinus,
        Direction::ZMinus,
    ];

    /// The direction pointing the other way along the same axis
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::XPlus => Direction::XMinus,
            Direction::YPlus => Direction::YMinus,
            Direction::ZPlus => Direction::ZMinus,
            Direction::XMinus => Direction::XPlus,
            Direction::YMinus => Direction::YPlus,
            Direction::ZMinus => Direction::ZPlus,
        }
    }

    /// Axial `(dq, dr)` offset of one step in this direction
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::XPlus => (1, 0),
            Direction::YPlus => (0, -1),
            Direction::ZPlus => (-1, 1),
            Direction::XMinus => (-1, 0),
            Direction::YMinus => (0, 1),
            Direction::ZMinus => (1, -1),
        }
    }

    /// Wire name of the direction
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::XPlus => "x+",
            Direction::YPlus => "y+",
            Direction::ZPlus => "z+",
            Direction::XMinus => "x-",
            Direction::YMinus => "y-",
            Direction::ZMinus => "z-",
        }
    }
}

/// Axial coordinate for the hex grid.
///
/// Equality is component-wise. The derived ordering is lexicographic on
/// `(q, r)`, which is only used for deterministic iteration. The derived
/// `Hash` is consistent with equality so the type can key a `HashMap`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third cube coordinate (y = -q - r). Widened, since it
    /// does not fit `i32` near the edges of the coordinate range.
    pub const fn y(&self) -> i64 {
        -(self.q as i64) - self.r as i64
    }

    /// The neighboring cell one step away in `direction`. Wraps around at
    /// the edges of the `i32` range.
    pub const fn neighbor(&self, direction: Direction) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q.wrapping_add(dq), self.r.wrapping_add(dr))
    }

    /// The six neighboring cells in `Direction::ALL` order
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance to another cell (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u64 {
        let dq = (self.q as i64 - other.q as i64).unsigned_abs();
        let dr = (self.r as i64 - other.r as i64).unsigned_abs();
        let dy = (self.y() - other.y()).unsigned_abs();
        (dq + dr + dy) / 2
    }
}

impl From<(i32, i32)> for HexCoord {
    fn from((q, r): (i32, i32)) -> Self {
        Self::new(q, r)
    }
}
