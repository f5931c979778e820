//! Error types for the server crate.

use gofour_engine::{ConfigError, MoveError, RosterError};
use gofour_protocol::{GameId, ProtocolError};
use tokio_tungstenite::tungstenite;

/// Errors from the WebSocket transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the listening socket failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Accepting a TCP connection failed.
    #[error("accept failed: {0}")]
    Accept(#[source] std::io::Error),

    /// The WebSocket upgrade handshake failed.
    #[error("websocket handshake failed: {0}")]
    Handshake(#[source] tungstenite::Error),

    /// The client did not finish the handshake within the idle timeout.
    #[error("websocket handshake timed out after {0:?}")]
    HandshakeTimeout(std::time::Duration),

    /// Sending a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),
}

/// Errors from registry operations. Each maps to a response code through
/// [`RegistryError::code`].
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The id does not have the generated shape.
    #[error("invalid game id '{0}'")]
    InvalidId(GameId),

    #[error("game '{0}' not found")]
    NotFound(GameId),

    /// The requested configuration was rejected by the engine.
    #[error("error instantiating new game: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot join game '{game_id}': {source}")]
    Roster {
        game_id: GameId,
        #[source]
        source: RosterError,
    },

    /// Only finished games can be removed.
    #[error("game '{0}' is still in progress")]
    InProgress(GameId),

    /// Moves are refused until every seat is taken.
    #[error("game '{0}' is not ready, waiting on players")]
    NotReady(GameId),

    #[error("player '{player}' not found in game '{game_id}'")]
    UnknownPlayer { game_id: GameId, player: String },

    #[error("invalid move for player '{player}' in game '{game_id}': {source}")]
    Move {
        game_id: GameId,
        player: String,
        #[source]
        source: MoveError,
    },
}

impl RegistryError {
    /// HTTP-style status code sent back to the client in
    /// `Response::Error`.
    ///
    /// The codes follow what an HTTP front end for the same operations
    /// would answer, so a client can treat them the usual way:
    ///
    /// | Code | Meaning | Variants |
    /// |------|---------|----------|
    /// | 400  | The request itself is malformed | `InvalidId`, `Config`, a blank player name |
    /// | 403  | Well-formed, but not allowed right now | other roster failures, `InProgress`, `NotReady`, `UnknownPlayer`, rejected moves |
    /// | 404  | The game does not exist | `NotFound` |
    /// | 500  | The engine broke one of its own invariants | `Move` wrapping `MoveError::Internal` |
    ///
    /// The connection handler adds one code of its own: 409 for a second
    /// `AttachGame` on an already attached connection.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidId(_) | Self::Config(_) => 400,
            Self::Roster {
                source: RosterError::EmptyName,
                ..
            } => 400,
            Self::NotFound(_) => 404,
            Self::Roster { .. }
            | Self::InProgress(_)
            | Self::NotReady(_)
            | Self::UnknownPlayer { .. } => 403,
            Self::Move { source, .. } if source.is_invalid_move() => 403,
            Self::Move { .. } => 500,
        }
    }
}

/// Top-level error for the server crate; `?` converts the layer errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofour_engine::State;

    fn id() -> GameId {
        GameId::from("0123456789abcdef0123456789abcdef")
    }

    #[test]
    fn test_codes_for_lookup_failures() {
        assert_eq!(RegistryError::InvalidId(GameId::from("x")).code(), 400);
        assert_eq!(RegistryError::NotFound(id()).code(), 404);
    }

    #[test]
    fn test_codes_for_roster_failures() {
        let blank = RegistryError::Roster {
            game_id: id(),
            source: RosterError::EmptyName,
        };
        let full = RegistryError::Roster {
            game_id: id(),
            source: RosterError::Full { capacity: 2 },
        };
        assert_eq!(blank.code(), 400);
        assert_eq!(full.code(), 403);
    }

    #[test]
    fn test_internal_move_error_is_a_server_fault() {
        let invalid = RegistryError::Move {
            game_id: id(),
            player: "alice".into(),
            source: MoveError::ColumnFull {
                column: 0,
                player: State::Red,
            },
        };
        let internal = RegistryError::Move {
            game_id: id(),
            player: "alice".into(),
            source: MoveError::Internal("broken".into()),
        };
        assert_eq!(invalid.code(), 403);
        assert_eq!(internal.code(), 500);
    }

    #[test]
    fn test_from_config_error() {
        let err: RegistryError = ConfigError::InvalidWinLength { n_win: 1 }.into();
        assert_eq!(err.code(), 400);
        assert!(err.to_string().contains("invalid win number"));
    }

    #[test]
    fn test_from_registry_error() {
        let err: ServerError = RegistryError::NotReady(id()).into();
        assert!(matches!(err, ServerError::Registry(_)));
        assert!(err.to_string().contains("not ready"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err: ServerError = ProtocolError::InvalidMessage("bad".into()).into();
        assert!(matches!(err, ServerError::Protocol(_)));
    }
}
