//! Board entity model: cells, characters, bombs and per-player counters.
//!
//! This module contains:
//! - The typed records the match server describes each turn
//! - The `Board` container that owns them for the length of a session
//!
//! `Board` has no game rules of its own. Every mutation goes through the
//! state synchronizer in [`crate::sync`].

use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Character identifier, assigned by the match server
pub type CharacterId = i32;

/// Player identifier as assigned at game start (0-based)
pub type PlayerId = i32;

/// Cell/entity color. 0 is neutral, positive values identify a player.
pub type Color = i32;

/// Color the server paints unclaimed cells with
pub const NEUTRAL: Color = 0;

/// The color owned by a player: colors are player ids shifted by one so
/// that 0 stays neutral.
pub const fn color_of_player(player: PlayerId) -> Color {
    player + 1
}

/// A board cell. Its coordinate is fixed, only the color changes.
///
/// Serialized as the server writes it: `{"q": 0, "r": 0, "color": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireCell", into = "WireCell")]
pub struct Cell {
    pub coord: HexCoord,
    pub color: Color,
}

impl Cell {
    pub fn new(coord: HexCoord, color: Color) -> Self {
        Self { coord, color }
    }

    pub fn is_neutral(&self) -> bool {
        self.color == NEUTRAL
    }
}

/// A character controlled by one of the players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireCharacter", into = "WireCharacter")]
pub struct Character {
    /// Unique identifier, stable for the whole game
    pub id: CharacterId,
    /// Current position
    pub coord: HexCoord,
    /// Owning player's color
    pub color: Color,
    /// Whether the character is currently alive
    pub is_alive: bool,
    /// -1 while alive; counts down toward 0 while dead
    pub revive_delay: i32,
}

impl Character {
    /// Dead characters can be revived once their delay reaches 0
    pub fn is_revivable(&self) -> bool {
        !self.is_alive && self.revive_delay == 0
    }
}

/// A bomb waiting to explode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireBomb", into = "WireBomb")]
pub struct Bomb {
    /// Center of the explosion area
    pub coord: HexCoord,
    /// Color painted on the cells the explosion reaches
    pub color: Color,
    /// Number of cells reached in each direction
    pub range: i32,
    /// Turns left before the explosion
    pub delay: i32,
}

// Wire shapes: coordinates are inlined as `q`/`r` and the liveness flag is
// called `alive`.

#[derive(Serialize, Deserialize)]
struct WireCell {
    q: i32,
    r: i32,
    color: Color,
}

impl From<WireCell> for Cell {
    fn from(w: WireCell) -> Self {
        Cell::new(HexCoord::new(w.q, w.r), w.color)
    }
}

impl From<Cell> for WireCell {
    fn from(c: Cell) -> Self {
        WireCell {
            q: c.coord.q,
            r: c.coord.r,
            color: c.color,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireCharacter {
    id: CharacterId,
    q: i32,
    r: i32,
    color: Color,
    alive: bool,
    revive_delay: i32,
}

impl From<WireCharacter> for Character {
    fn from(w: WireCharacter) -> Self {
        Character {
            id: w.id,
            coord: HexCoord::new(w.q, w.r),
            color: w.color,
            is_alive: w.alive,
            revive_delay: w.revive_delay,
        }
    }
}

impl From<Character> for WireCharacter {
    fn from(c: Character) -> Self {
        WireCharacter {
            id: c.id,
            q: c.coord.q,
            r: c.coord.r,
            color: c.color,
            alive: c.is_alive,
            revive_delay: c.revive_delay,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireBomb {
    q: i32,
    r: i32,
    color: Color,
    range: i32,
    delay: i32,
}

impl From<WireBomb> for Bomb {
    fn from(w: WireBomb) -> Self {
        Bomb {
            coord: HexCoord::new(w.q, w.r),
            color: w.color,
            range: w.range,
            delay: w.delay,
        }
    }
}

impl From<Bomb> for WireBomb {
    fn from(b: Bomb) -> Self {
        WireBomb {
            q: b.coord.q,
            r: b.coord.r,
            color: b.color,
            range: b.range,
            delay: b.delay,
        }
    }
}

/// Local model of the board, as last described by the server.
///
/// Cells accumulate across turns; characters, bombs and both player
/// counters always hold exactly what the latest snapshot contained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub cells: HashMap<HexCoord, Cell>,
    pub characters: Vec<Character>,
    pub bombs: Vec<Bomb>,
    pub score: BTreeMap<PlayerId, i32>,
    pub cell_count: BTreeMap<PlayerId, i32>,
}

impl Board {
    /// An empty board, before the initial snapshot is applied
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, coord: HexCoord) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Color of the cell at `coord`, or `None` if the cell is not on the board
    pub fn color_at(&self, coord: HexCoord) -> Option<Color> {
        self.cells.get(&coord).map(|c| c.color)
    }

    /// All cell coordinates, in lexicographic order
    pub fn sorted_coords(&self) -> Vec<HexCoord> {
        let mut coords: Vec<_> = self.cells.keys().copied().collect();
        coords.sort();
        coords
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Characters of the given color, in snapshot order
    pub fn characters_of(&self, color: Color) -> impl Iterator<Item = &Character> + '_ {
        self.characters.iter().filter(move |c| c.color == color)
    }

    pub fn bombs_at(&self, coord: HexCoord) -> impl Iterator<Item = &Bomb> + '_ {
        self.bombs.iter().filter(move |b| b.coord == coord)
    }

    pub fn score_of(&self, player: PlayerId) -> Option<i32> {
        self.score.get(&player).copied()
    }

    pub fn cell_count_of(&self, player: PlayerId) -> Option<i32> {
        self.cell_count.get(&player).copied()
    }
}
