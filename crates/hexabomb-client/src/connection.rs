//! Connection to a netorcai server.
//!
//! Every message is a little-endian `u32` content length followed by the
//! content: one UTF-8 JSON object terminated by a newline.

use crate::protocol::{ClientMessage, ServerMessage, METAPROTOCOL_VERSION};
use hexabomb_core::{
    Action, GameEndsMessage, GameStartsMessage, SessionError, Transport, TurnMessage, TurnUpdate,
};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tracing::{debug, info};

/// Largest message content accepted from the server
const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

/// Write one framed message.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    content: &str,
) -> Result<(), SessionError> {
    let mut payload = Vec::with_capacity(content.len() + 1);
    payload.extend_from_slice(content.as_bytes());
    payload.push(b'\n');

    let len = u32::try_from(payload.len())
        .map_err(|_| SessionError::Protocol("outgoing message too large".into()))?;
    writer.write_u32_le(len).await?;
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one framed message.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<String, SessionError> {
    let len = reader.read_u32_le().await? as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(SessionError::Protocol(format!(
            "incoming message of {len} bytes exceeds {MAX_MESSAGE_SIZE}"
        )));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    String::from_utf8(payload)
        .map_err(|_| SessionError::Protocol("incoming message is not UTF-8".into()))
}

/// A logged-in (or about to be) client connection.
pub struct Connection<S> {
    stream: S,
}

impl Connection<TcpStream> {
    /// Open a TCP connection to the server.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self, SessionError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), SessionError> {
        let text = serde_json::to_string(msg)
            .map_err(|e| SessionError::Protocol(format!("cannot encode message: {e}")))?;
        write_frame(&mut self.stream, &text).await
    }

    async fn recv(&mut self) -> Result<ServerMessage, SessionError> {
        let text = read_frame(&mut self.stream).await?;
        let msg: ServerMessage = serde_json::from_str(&text)
            .map_err(|e| SessionError::Protocol(format!("invalid message: {e}")))?;
        debug!(message_type = msg.message_type(), "received");

        match msg {
            ServerMessage::Kick { kick_reason } => {
                Err(SessionError::Protocol(format!("kicked: {kick_reason}")))
            }
            msg => Ok(msg),
        }
    }

    /// Log in and wait for the server's acknowledgement.
    pub async fn login(&mut self, nickname: &str, role: &str) -> Result<(), SessionError> {
        self.send(&ClientMessage::Login {
            nickname: nickname.to_string(),
            role: role.to_string(),
            metaprotocol_version: METAPROTOCOL_VERSION.to_string(),
        })
        .await?;

        match self.recv().await? {
            ServerMessage::LoginAck {
                metaprotocol_version,
            } => {
                info!(nickname, role, server_version = ?metaprotocol_version, "logged in");
                Ok(())
            }
            other => Err(unexpected("LOGIN_ACK", &other)),
        }
    }
}

fn unexpected(expected: &str, received: &ServerMessage) -> SessionError {
    SessionError::Protocol(format!(
        "expected {expected}, received {}",
        received.message_type()
    ))
}

impl<S: AsyncRead + AsyncWrite + Unpin> Transport for Connection<S> {
    async fn read_game_starts(&mut self) -> Result<GameStartsMessage, SessionError> {
        match self.recv().await? {
            ServerMessage::GameStarts {
                player_id,
                players_info,
                nb_players,
                nb_special_players,
                nb_turns_max,
                milliseconds_before_first_turn,
                milliseconds_between_turns,
                initial_game_state,
            } => {
                let nicknames: Vec<_> = players_info
                    .iter()
                    .filter(|p| p.is_connected)
                    .map(|p| format!("{}={}@{}", p.player_id, p.nickname, p.remote_address))
                    .collect();
                debug!(
                    nb_players,
                    nb_special_players,
                    milliseconds_before_first_turn,
                    milliseconds_between_turns,
                    players = ?nicknames,
                    "game settings"
                );
                Ok(GameStartsMessage {
                    player_id,
                    nb_turns_max,
                    initial_game_state,
                })
            }
            other => Err(unexpected("GAME_STARTS", &other)),
        }
    }

    async fn read_turn(&mut self) -> Result<TurnUpdate, SessionError> {
        match self.recv().await? {
            ServerMessage::Turn {
                turn_number,
                game_state,
            } => Ok(TurnUpdate::Turn(TurnMessage {
                turn_number,
                game_state,
            })),
            // A negative id means the game ended without a winner.
            ServerMessage::GameEnds {
                winner_player_id,
                game_state,
            } => Ok(TurnUpdate::GameEnds(GameEndsMessage {
                winner_player_id: (winner_player_id >= 0).then_some(winner_player_id),
                game_state,
            })),
            other => Err(unexpected("TURN", &other)),
        }
    }

    async fn send_turn_ack(
        &mut self,
        turn_number: u32,
        actions: &[Action],
    ) -> Result<(), SessionError> {
        self.send(&ClientMessage::TurnAck {
            turn_number,
            actions: actions.to_vec(),
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexabomb_core::{Direction, Intent};
    use serde_json::{json, Value};
    use tokio::io::{duplex, DuplexStream};

    async fn server_send(server: &mut DuplexStream, msg: Value) {
        write_frame(server, &msg.to_string()).await.unwrap();
    }

    async fn server_recv(server: &mut DuplexStream) -> Value {
        let text = read_frame(server).await.unwrap();
        assert!(text.ends_with('\n'));
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_frame_layout() {
        let (mut a, mut b) = duplex(1024);
        write_frame(&mut a, "{}").await.unwrap();

        let mut raw = [0u8; 7];
        b.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [3, 0, 0, 0, b'{', b'}', b'\n']);
    }

    #[tokio::test]
    async fn test_oversized_frame_is_rejected() {
        let (mut a, mut b) = duplex(1024);
        a.write_u32_le(u32::MAX).await.unwrap();
        let err = read_frame(&mut b).await.unwrap_err();
        assert!(matches!(err, SessionError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_login_handshake() {
        let (client, mut server) = duplex(4096);
        let mut conn = Connection::new(client);

        let server_task = async {
            let login = server_recv(&mut server).await;
            assert_eq!(login["message_type"], "LOGIN");
            assert_eq!(login["nickname"], "bot");
            assert_eq!(login["role"], "player");
            server_send(&mut server, json!({"message_type": "LOGIN_ACK"})).await;
        };

        let (result, ()) = tokio::join!(conn.login("bot", "player"), server_task);
        result.unwrap();
    }

    #[tokio::test]
    async fn test_kick_is_a_protocol_error() {
        let (client, mut server) = duplex(4096);
        let mut conn = Connection::new(client);
        server_send(
            &mut server,
            json!({"message_type": "KICK", "kick_reason": "nickname taken"}),
        )
        .await;

        let err = conn.read_game_starts().await.unwrap_err();
        assert_eq!(err.to_string(), "protocol error: kicked: nickname taken");
    }

    #[tokio::test]
    async fn test_unexpected_message_names_expectation() {
        let (client, mut server) = duplex(4096);
        let mut conn = Connection::new(client);
        server_send(
            &mut server,
            json!({"message_type": "TURN", "turn_number": 1, "game_state": {}}),
        )
        .await;

        let err = conn.read_game_starts().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "protocol error: expected GAME_STARTS, received TURN"
        );
    }

    #[tokio::test]
    async fn test_game_ends_without_winner() {
        let (client, mut server) = duplex(4096);
        let mut conn = Connection::new(client);
        server_send(
            &mut server,
            json!({"message_type": "GAME_ENDS", "winner_player_id": -1, "game_state": {}}),
        )
        .await;

        match conn.read_turn().await.unwrap() {
            TurnUpdate::GameEnds(ends) => assert_eq!(ends.winner_player_id, None),
            other => panic!("unexpected update {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_turn_ack_on_the_wire() {
        let (client, mut server) = duplex(4096);
        let mut conn = Connection::new(client);

        conn.send_turn_ack(3, &[Action::new(8, Intent::move_towards(Direction::XPlus))])
            .await
            .unwrap();

        assert_eq!(
            server_recv(&mut server).await,
            json!({
                "message_type": "TURN_ACK",
                "turn_number": 3,
                "actions": [{"id": 8, "movement": "move", "direction": "x+"}],
            })
        );
    }
}
