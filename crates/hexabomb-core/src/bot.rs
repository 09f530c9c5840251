//! Decision strategies for the characters a client controls.
//!
//! The turn loop only knows the [`Strategy`] trait. [`RandomStrategy`] picks
//! uniformly among the reference intents and is what the client binary
//! plays with; tests plug in deterministic strategies instead.

use crate::actions::Intent;
use crate::board::{Board, CharacterId};
use crate::hex::{Direction, HexCoord};
use rand::prelude::*;
use thiserror::Error;

/// Errors a strategy can report instead of an intent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrategyError {
    #[error("character {0} is not on the board")]
    UnknownCharacter(CharacterId),

    #[error("strategy failed: {0}")]
    Internal(String),
}

/// Decides what a character does this turn.
pub trait Strategy {
    /// Choose an intent for `character`, given the whole board as context.
    fn decide(&mut self, character: CharacterId, board: &Board) -> Result<Intent, StrategyError>;
}

impl<S: Strategy + ?Sized> Strategy for Box<S> {
    fn decide(&mut self, character: CharacterId, board: &Board) -> Result<Intent, StrategyError> {
        (**self).decide(character, board)
    }
}

/// Number of distinct intents the random strategy draws from:
/// six moves, one bomb and one revive.
const RANDOM_CHOICES: usize = Direction::ALL.len() + 2;

/// Picks one of the reference intents uniformly at random.
///
/// Bombs use the default delay and range. Revives target a random known
/// cell, or the character's own cell while the board has none.
pub struct RandomStrategy {
    rng: StdRng,
    /// Sorted coordinates of the board's cells, as of the last revive
    revive_targets: Vec<HexCoord>,
}

impl RandomStrategy {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            revive_targets: Vec::new(),
        }
    }

    /// Cells are never removed from a board, so an unchanged cell count
    /// means an unchanged set of coordinates.
    fn refresh_revive_targets(&mut self, board: &Board) {
        if self.revive_targets.len() != board.cells.len() {
            self.revive_targets = board.sorted_coords();
        }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomStrategy {
    fn decide(&mut self, character: CharacterId, board: &Board) -> Result<Intent, StrategyError> {
        let me = board
            .character(character)
            .ok_or(StrategyError::UnknownCharacter(character))?;

        let choice = self.rng.gen_range(0..RANDOM_CHOICES);
        let intent = match Direction::ALL.get(choice) {
            Some(&direction) => Intent::move_towards(direction),
            None if choice == Direction::ALL.len() => Intent::default_bomb(),
            None => {
                // Sorted so that a seeded strategy replays identically.
                self.refresh_revive_targets(board);
                let target = self
                    .revive_targets
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or(me.coord);
                Intent::revive_at(target)
            }
        };
        Ok(intent)
    }
}
