//! Turn loop for one game session.
//!
//! A session waits for the game start, builds the initial board, then for
//! every turn synchronizes the board, asks the strategy for one intent per
//! owned character and submits the batch. Networking is left to a
//! [`Transport`] implementation.

use crate::actions::Action;
use crate::board::{color_of_player, Board, Color, PlayerId};
use crate::bot::{Strategy, StrategyError};
use crate::sync::{synchronize, ParseError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// First message of a game: who we are and how long the game lasts
#[derive(Debug, Clone, PartialEq)]
pub struct GameStartsMessage {
    pub player_id: PlayerId,
    pub nb_turns_max: u32,
    pub initial_game_state: Value,
}

/// One turn's game state
#[derive(Debug, Clone, PartialEq)]
pub struct TurnMessage {
    pub turn_number: u32,
    pub game_state: Value,
}

/// Final message of a game
#[derive(Debug, Clone, PartialEq)]
pub struct GameEndsMessage {
    /// `None` when the server declares no winner
    pub winner_player_id: Option<PlayerId>,
    pub game_state: Value,
}

/// What the server sent while the session was waiting for a turn
#[derive(Debug, Clone, PartialEq)]
pub enum TurnUpdate {
    Turn(TurnMessage),
    GameEnds(GameEndsMessage),
}

/// Errors that end a session. None of them is retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Strategy(#[from] StrategyError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid operation for current phase")]
    InvalidPhase,
}

/// Message exchange with the match server.
///
/// Implementations block (asynchronously) until the next message arrives.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn read_game_starts(&mut self) -> Result<GameStartsMessage, SessionError>;

    async fn read_turn(&mut self) -> Result<TurnUpdate, SessionError>;

    async fn send_turn_ack(
        &mut self,
        turn_number: u32,
        actions: &[Action],
    ) -> Result<(), SessionError>;
}

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing received yet
    AwaitingGameStart,
    /// Playing; `remaining` turns are still expected
    AwaitingTurn { remaining: u32 },
    /// Terminal
    Finished,
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns_played: u32,
    /// Only known when the server sent its game-end message
    pub winner: Option<PlayerId>,
}

/// A client's view of one game, from game start to the last turn
pub struct Session<S> {
    board: Board,
    phase: SessionPhase,
    strategy: S,
    player_id: Option<PlayerId>,
    turns_played: u32,
    winner: Option<PlayerId>,
}

impl<S: Strategy> Session<S> {
    pub fn new(strategy: S) -> Self {
        Self {
            board: Board::new(),
            phase: SessionPhase::AwaitingGameStart,
            strategy,
            player_id: None,
            turns_played: 0,
            winner: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.player_id
    }

    /// Our color, known once the game has started
    pub fn color(&self) -> Option<Color> {
        self.player_id.map(color_of_player)
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// Wait for the game start and build the initial board.
    pub async fn start<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        if self.phase != SessionPhase::AwaitingGameStart {
            return Err(SessionError::InvalidPhase);
        }

        let starts = transport.read_game_starts().await?;
        synchronize(&starts.initial_game_state, &mut self.board)?;
        self.player_id = Some(starts.player_id);

        // The game-start message counts as the first of nb_turns_max turns.
        let remaining = starts.nb_turns_max.saturating_sub(1);
        self.phase = if remaining == 0 {
            SessionPhase::Finished
        } else {
            SessionPhase::AwaitingTurn { remaining }
        };

        info!(
            player_id = starts.player_id,
            color = color_of_player(starts.player_id),
            nb_turns_max = starts.nb_turns_max,
            cells = self.board.cells.len(),
            "game started"
        );
        Ok(())
    }

    /// One intent per character of our color, in snapshot order.
    ///
    /// Any strategy failure aborts the whole batch.
    pub fn decide_actions(&mut self) -> Result<Vec<Action>, SessionError> {
        let color = self.color().ok_or(SessionError::InvalidPhase)?;
        let board = &self.board;
        let strategy = &mut self.strategy;

        board
            .characters_of(color)
            .map(|character| {
                let intent = strategy.decide(character.id, board)?;
                Ok(Action::new(character.id, intent))
            })
            .collect()
    }

    /// Wait for the next turn, synchronize, decide and submit the actions.
    pub async fn play_turn<T: Transport>(&mut self, transport: &mut T) -> Result<(), SessionError> {
        let SessionPhase::AwaitingTurn { remaining } = self.phase else {
            return Err(SessionError::InvalidPhase);
        };

        let turn = match transport.read_turn().await? {
            TurnUpdate::Turn(turn) => turn,
            TurnUpdate::GameEnds(ends) => {
                // Keep the final board around for whoever inspects it.
                synchronize(&ends.game_state, &mut self.board)?;
                self.winner = ends.winner_player_id;
                self.phase = SessionPhase::Finished;
                info!(winner = ?ends.winner_player_id, "game ended");
                return Ok(());
            }
        };

        synchronize(&turn.game_state, &mut self.board)?;
        let actions = self.decide_actions()?;
        debug!(
            turn = turn.turn_number,
            actions = actions.len(),
            bombs = self.board.bombs.len(),
            "submitting actions"
        );
        transport.send_turn_ack(turn.turn_number, &actions).await?;

        self.turns_played += 1;
        self.phase = match remaining - 1 {
            0 => SessionPhase::Finished,
            remaining => SessionPhase::AwaitingTurn { remaining },
        };
        Ok(())
    }

    /// Play a whole game: start, then every turn until the session finishes.
    pub async fn run<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<SessionSummary, SessionError> {
        self.start(transport).await?;
        while self.phase != SessionPhase::Finished {
            self.play_turn(transport).await?;
        }

        info!(turns_played = self.turns_played, "session finished");
        Ok(SessionSummary {
            turns_played: self.turns_played,
            winner: self.winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::Intent;
    use crate::board::CharacterId;
    use crate::hex::Direction;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Moves every character along x+, optionally failing for one id
    struct Scripted {
        fail_for: Option<CharacterId>,
    }

    impl Strategy for Scripted {
        fn decide(&mut self, id: CharacterId, _: &Board) -> Result<Intent, StrategyError> {
            if self.fail_for == Some(id) {
                return Err(StrategyError::Internal("scripted failure".into()));
            }
            Ok(Intent::move_towards(Direction::XPlus))
        }
    }

    #[derive(Default)]
    struct FakeTransport {
        starts: Option<GameStartsMessage>,
        turns: VecDeque<TurnUpdate>,
        sent: Vec<(u32, Vec<Action>)>,
    }

    impl Transport for FakeTransport {
        async fn read_game_starts(&mut self) -> Result<GameStartsMessage, SessionError> {
            self.starts
                .take()
                .ok_or_else(|| SessionError::Protocol("no GAME_STARTS".into()))
        }

        async fn read_turn(&mut self) -> Result<TurnUpdate, SessionError> {
            self.turns
                .pop_front()
                .ok_or_else(|| SessionError::Protocol("no TURN".into()))
        }

        async fn send_turn_ack(
            &mut self,
            turn_number: u32,
            actions: &[Action],
        ) -> Result<(), SessionError> {
            self.sent.push((turn_number, actions.to_vec()));
            Ok(())
        }
    }

    fn state(colors: &[i32]) -> Value {
        json!({
            "cells": [],
            "characters": colors.iter().enumerate().map(|(i, color)| json!({
                "id": i, "q": 0, "r": i, "color": color, "alive": true, "revive_delay": -1,
            })).collect::<Vec<_>>(),
            "bombs": [],
            "score": {},
            "cell_count": {},
        })
    }

    fn transport(nb_turns_max: u32, turns: Vec<TurnUpdate>) -> FakeTransport {
        FakeTransport {
            starts: Some(GameStartsMessage {
                player_id: 0,
                nb_turns_max,
                initial_game_state: state(&[1, 2]),
            }),
            turns: turns.into(),
            sent: Vec::new(),
        }
    }

    fn turn(turn_number: u32, colors: &[i32]) -> TurnUpdate {
        TurnUpdate::Turn(TurnMessage {
            turn_number,
            game_state: state(colors),
        })
    }

    #[tokio::test]
    async fn test_batch_has_one_action_per_owned_character() {
        let mut t = transport(2, vec![turn(1, &[1, 2, 1, 3, 1])]);
        let mut session = Session::new(Scripted { fail_for: None });

        let summary = session.run(&mut t).await.unwrap();

        assert_eq!(summary.turns_played, 1);
        assert_eq!(t.sent.len(), 1);
        let (turn_number, actions) = &t.sent[0];
        assert_eq!(*turn_number, 1);
        let ids: Vec<_> = actions.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_runs_nb_turns_max_minus_one_turns() {
        let turns = (1..5).map(|n| turn(n, &[1])).collect();
        let mut t = transport(5, turns);
        let mut session = Session::new(Scripted { fail_for: None });

        let summary = session.run(&mut t).await.unwrap();

        assert_eq!(summary.turns_played, 4);
        let numbers: Vec<_> = t.sent.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(session.phase(), SessionPhase::Finished);
    }

    #[tokio::test]
    async fn test_single_turn_game_finishes_after_start() {
        let mut t = transport(1, vec![]);
        let mut session = Session::new(Scripted { fail_for: None });

        let summary = session.run(&mut t).await.unwrap();
        assert_eq!(summary.turns_played, 0);
        assert!(t.sent.is_empty());
    }

    #[tokio::test]
    async fn test_game_ends_finishes_early() {
        let ends = TurnUpdate::GameEnds(GameEndsMessage {
            winner_player_id: Some(1),
            game_state: state(&[2]),
        });
        let mut t = transport(10, vec![turn(1, &[1]), ends]);
        let mut session = Session::new(Scripted { fail_for: None });

        let summary = session.run(&mut t).await.unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                turns_played: 1,
                winner: Some(1)
            }
        );
        assert_eq!(session.board().characters.len(), 1);
    }

    #[tokio::test]
    async fn test_strategy_failure_aborts_submission() {
        let mut t = transport(3, vec![turn(1, &[1, 1])]);
        let mut session = Session::new(Scripted { fail_for: Some(1) });

        let err = session.run(&mut t).await.unwrap_err();

        assert!(matches!(err, SessionError::Strategy(_)));
        assert!(t.sent.is_empty());
    }

    #[tokio::test]
    async fn test_parse_error_is_fatal() {
        let bad = TurnUpdate::Turn(TurnMessage {
            turn_number: 1,
            game_state: json!({"cells": "nope"}),
        });
        let mut t = transport(3, vec![bad]);
        let mut session = Session::new(Scripted { fail_for: None });

        let err = session.run(&mut t).await.unwrap_err();
        match err {
            SessionError::Parse(e) => assert_eq!(e.path, "cells"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_operations_check_phase() {
        let mut t = transport(2, vec![]);
        let mut session = Session::new(Scripted { fail_for: None });

        assert!(matches!(
            session.play_turn(&mut t).await,
            Err(SessionError::InvalidPhase)
        ));
        assert!(matches!(
            session.decide_actions(),
            Err(SessionError::InvalidPhase)
        ));

        session.start(&mut t).await.unwrap();
        assert_eq!(session.color(), Some(1));
        assert_eq!(session.phase(), SessionPhase::AwaitingTurn { remaining: 1 });
        assert!(matches!(
            session.start(&mut t).await,
            Err(SessionError::InvalidPhase)
        ));
    }
}
