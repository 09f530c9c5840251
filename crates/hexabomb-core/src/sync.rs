//! State synchronizer: turns the server's JSON game state into board updates.
//!
//! The server sends a complete description of characters, bombs and player
//! counters every turn, but cells only need to carry colors that may have
//! changed. Cells are therefore merged into the board while everything
//! else is replaced.
//!
//! Records are read through their serde derives. Parsing always completes
//! before any mutation, so a snapshot that fails to parse leaves the board
//! exactly as it was.

use crate::board::{Board, Bomb, Cell, Character, PlayerId};
use crate::hex::HexCoord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Path used for errors about the snapshot value itself
const ROOT: &str = "$";

/// What was wrong with a snapshot field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Missing field, wrong type or out-of-range integer, as reported by serde
    #[error("{0}")]
    Malformed(String),

    #[error("player id is not an integer")]
    InvalidPlayerId,

    /// Two keys of one counter object name the same player, e.g. `"1"` and `"01"`
    #[error("player id appears more than once")]
    DuplicatePlayerId,
}

/// A malformed game state, with the path of the offending field
/// (for example `characters[2].alive` or `score."abc"`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid game state at `{path}`: {kind}")]
pub struct ParseError {
    pub path: String,
    pub kind: ParseErrorKind,
}

impl ParseError {
    fn new(path: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// Deserializes `raw`, prefixing error paths with `prefix`.
fn deserialize_at<T: DeserializeOwned>(raw: &Value, prefix: &str) -> Result<T, ParseError> {
    serde_path_to_error::deserialize(raw).map_err(|err| {
        // An empty path prints as "."
        let inner = err.path().to_string();
        let path = if inner == "." {
            if prefix.is_empty() { ROOT } else { prefix }.to_string()
        } else if prefix.is_empty() || inner.starts_with('[') {
            format!("{prefix}{inner}")
        } else {
            format!("{prefix}.{inner}")
        };
        ParseError::new(path, ParseErrorKind::Malformed(err.into_inner().to_string()))
    })
}

/// Converts an object keyed by stringified player ids.
///
/// Keys are read as Rust integers, so `"01"` and `"+1"` both name player 1;
/// two keys naming the same player are rejected rather than collapsed.
fn player_int_map(
    raw: BTreeMap<String, i32>,
    path: &str,
) -> Result<BTreeMap<PlayerId, i32>, ParseError> {
    let mut counters = BTreeMap::new();
    for (key, value) in raw {
        let entry_path = format!("{path}.\"{key}\"");
        let player = key
            .parse::<PlayerId>()
            .map_err(|_| ParseError::new(&entry_path, ParseErrorKind::InvalidPlayerId))?;
        if counters.insert(player, value).is_some() {
            return Err(ParseError::new(entry_path, ParseErrorKind::DuplicatePlayerId));
        }
    }
    Ok(counters)
}

fn parse_player_int_map(raw: &Value, path: &str) -> Result<BTreeMap<PlayerId, i32>, ParseError> {
    player_int_map(deserialize_at(raw, path)?, path)
}

/// Merges parsed cells into the board: new coordinates are inserted,
/// known ones only get their color overwritten. Nothing is removed.
fn merge_cells(cells: &mut HashMap<HexCoord, Cell>, incoming: Vec<Cell>) {
    for cell in incoming {
        cells
            .entry(cell.coord)
            .and_modify(|known| known.color = cell.color)
            .or_insert(cell);
    }
}

/// A fully parsed game state, ready to be applied to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub cells: Vec<Cell>,
    pub characters: Vec<Character>,
    pub bombs: Vec<Bomb>,
    pub score: BTreeMap<PlayerId, i32>,
    pub cell_count: BTreeMap<PlayerId, i32>,
}

/// Game state as the server writes it, before player ids are checked
#[derive(Deserialize)]
struct RawSnapshot {
    cells: Vec<Cell>,
    characters: Vec<Character>,
    bombs: Vec<Bomb>,
    score: BTreeMap<String, i32>,
    cell_count: BTreeMap<String, i32>,
}

impl Snapshot {
    /// Parse a raw game state. Fails on the first malformed field.
    pub fn parse(raw: &Value) -> Result<Self, ParseError> {
        let raw: RawSnapshot = deserialize_at(raw, "")?;
        Ok(Self {
            cells: raw.cells,
            characters: raw.characters,
            bombs: raw.bombs,
            score: player_int_map(raw.score, "score")?,
            cell_count: player_int_map(raw.cell_count, "cell_count")?,
        })
    }
}

impl Board {
    /// Commit a parsed snapshot: cells merge, everything else is replaced.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) {
        merge_cells(&mut self.cells, snapshot.cells);
        self.characters = snapshot.characters;
        self.bombs = snapshot.bombs;
        self.score = snapshot.score;
        self.cell_count = snapshot.cell_count;
    }
}

/// Merge a raw `cells` list into `cells`.
///
/// On duplicate coordinates within one list the last entry wins.
pub fn apply_cells(raw: &Value, cells: &mut HashMap<HexCoord, Cell>) -> Result<(), ParseError> {
    let incoming: Vec<Cell> = deserialize_at(raw, "cells")?;
    merge_cells(cells, incoming);
    Ok(())
}

/// Replace `characters` with the raw list, keeping snapshot order.
pub fn apply_characters(raw: &Value, characters: &mut Vec<Character>) -> Result<(), ParseError> {
    *characters = deserialize_at(raw, "characters")?;
    Ok(())
}

/// Replace `bombs` with the raw list, keeping snapshot order.
pub fn apply_bombs(raw: &Value, bombs: &mut Vec<Bomb>) -> Result<(), ParseError> {
    *bombs = deserialize_at(raw, "bombs")?;
    Ok(())
}

/// Replace `target` with a raw player-id keyed object. `field` names the
/// object in error paths (`score`, `cell_count`).
pub fn apply_player_int_map(
    raw: &Value,
    field: &str,
    target: &mut BTreeMap<PlayerId, i32>,
) -> Result<(), ParseError> {
    *target = parse_player_int_map(raw, field)?;
    Ok(())
}

/// Apply a whole raw game state to `board`.
///
/// Either every part of the snapshot is applied or, on error, none is.
pub fn synchronize(raw: &Value, board: &mut Board) -> Result<(), ParseError> {
    let snapshot = Snapshot::parse(raw)?;
    board.apply_snapshot(snapshot);
    Ok(())
}
