//! Actions a client submits for its characters each turn.
//!
//! An [`Intent`] is what a strategy decides for one character; an
//! [`Action`] is that intent tagged with the character id, in the exact
//! shape the match server reads:
//!
//! ```json
//! {"id": 4, "movement": "move", "direction": "z-"}
//! {"id": 4, "movement": "bomb", "bomb_delay": 3, "bomb_range": 3}
//! {"id": 4, "movement": "revive", "revive_q": 0, "revive_r": 0}
//! ```

use crate::board::CharacterId;
use crate::hex::{Direction, HexCoord};
use serde::{Deserialize, Serialize};

/// Bomb delay used when a strategy has no preference
pub const DEFAULT_BOMB_DELAY: i32 = 3;

/// Bomb range used when a strategy has no preference
pub const DEFAULT_BOMB_RANGE: i32 = 3;

/// What one character should do this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "movement", rename_all = "lowercase")]
pub enum Intent {
    /// Step to the neighboring cell
    Move { direction: Direction },
    /// Drop a bomb on the current cell
    Bomb {
        #[serde(rename = "bomb_delay")]
        delay: i32,
        #[serde(rename = "bomb_range")]
        range: i32,
    },
    /// Bring a dead character back at the given cell
    Revive {
        #[serde(rename = "revive_q")]
        q: i32,
        #[serde(rename = "revive_r")]
        r: i32,
    },
}

impl Intent {
    pub fn move_towards(direction: Direction) -> Self {
        Intent::Move { direction }
    }

    /// A bomb with the default delay and range
    pub fn default_bomb() -> Self {
        Intent::Bomb {
            delay: DEFAULT_BOMB_DELAY,
            range: DEFAULT_BOMB_RANGE,
        }
    }

    pub fn revive_at(coord: HexCoord) -> Self {
        Intent::Revive {
            q: coord.q,
            r: coord.r,
        }
    }

    /// Wire value of the `movement` field
    pub fn movement(&self) -> &'static str {
        match self {
            Intent::Move { .. } => "move",
            Intent::Bomb { .. } => "bomb",
            Intent::Revive { .. } => "revive",
        }
    }
}

/// An intent tagged with the character it applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: CharacterId,
    #[serde(flatten)]
    pub intent: Intent,
}

impl Action {
    pub fn new(id: CharacterId, intent: Intent) -> Self {
        Self { id, intent }
    }
}
