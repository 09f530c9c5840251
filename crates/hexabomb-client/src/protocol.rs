//! netorcai metaprotocol messages used by a hexabomb player.

use hexabomb_core::{Action, PlayerId};
use serde::{Deserialize, Serialize};

/// Metaprotocol version announced at login
pub const METAPROTOCOL_VERSION: &str = "2.0.0";

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Log in with a nickname and a role (`player` for bots)
    Login {
        nickname: String,
        role: String,
        metaprotocol_version: String,
    },

    /// Actions for the given turn
    TurnAck {
        turn_number: u32,
        actions: Vec<Action>,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "message_type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Login accepted
    LoginAck {
        #[serde(default)]
        metaprotocol_version: Option<String>,
    },

    /// Game started
    GameStarts {
        player_id: PlayerId,
        #[serde(default)]
        players_info: Vec<PlayerInfo>,
        #[serde(default)]
        nb_players: u32,
        #[serde(default)]
        nb_special_players: u32,
        nb_turns_max: u32,
        #[serde(default)]
        milliseconds_before_first_turn: f64,
        #[serde(default)]
        milliseconds_between_turns: f64,
        initial_game_state: serde_json::Value,
    },

    /// A new turn started
    Turn {
        turn_number: u32,
        game_state: serde_json::Value,
    },

    /// Game finished
    GameEnds {
        winner_player_id: PlayerId,
        game_state: serde_json::Value,
    },

    /// The server closes the connection
    Kick { kick_reason: String },
}

impl ServerMessage {
    /// Wire name, for error reports
    pub fn message_type(&self) -> &'static str {
        match self {
            ServerMessage::LoginAck { .. } => "LOGIN_ACK",
            ServerMessage::GameStarts { .. } => "GAME_STARTS",
            ServerMessage::Turn { .. } => "TURN",
            ServerMessage::GameEnds { .. } => "GAME_ENDS",
            ServerMessage::Kick { .. } => "KICK",
        }
    }
}

/// Player information as announced by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub player_id: PlayerId,
    pub nickname: String,
    #[serde(default)]
    pub remote_address: String,
    #[serde(default)]
    pub is_connected: bool,
}
