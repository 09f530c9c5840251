//! Hexabomb client core - board model and turn protocol
//!
//! This crate provides what a hexabomb player needs between the network and
//! its decision logic:
//! - Hex coordinate system for the game board
//! - Typed board entities (cells, characters, bombs, player counters)
//! - Synchronization of the server's game state into the board
//! - The turn loop that submits one action per owned character
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and the six movement directions
//! - [`board`]: Board entity model
//! - [`sync`]: Game state parsing and merge/replace synchronization
//! - [`actions`]: Intents and their wire form
//! - [`bot`]: The strategy interface and a random strategy
//! - [`session`]: Turn loop over a pluggable transport

pub mod actions;
pub mod board;
pub mod bot;
pub mod hex;
pub mod session;
pub mod sync;

// Re-export commonly used types
pub use actions::{Action, Intent, DEFAULT_BOMB_DELAY, DEFAULT_BOMB_RANGE};
pub use board::{color_of_player, Board, Bomb, Cell, Character, CharacterId, Color, PlayerId};
pub use bot::{RandomStrategy, Strategy, StrategyError};
pub use hex::{Direction, HexCoord};
pub use session::{
    GameEndsMessage, GameStartsMessage, Session, SessionError, SessionPhase, SessionSummary,
    Transport, TurnMessage, TurnUpdate,
};
pub use sync::{synchronize, ParseError, ParseErrorKind, Snapshot};
