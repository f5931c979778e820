//! Message types for the GoFour wire format.
//!
//! A client sends [`Request`]s and the server answers with [`Response`]s,
//! each wrapped in an [`Envelope`]. The five requests mirror what a remote
//! player needs: create a game, list games, join one, play a move, and
//! attach to watch a game live.

use std::fmt;

use gofour_engine::{GameSnapshot, PlayerSeat, State};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Identifier of a game held by the server: 32 lowercase hex characters
/// (128 random bits).
///
/// `#[serde(transparent)]` keeps it a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub String);

impl GameId {
    /// Length of a well-formed id.
    pub const LEN: usize = 32;

    /// `true` when the id has the shape the server generates. Malformed ids
    /// are rejected before any registry lookup.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == Self::LEN
            && self
                .0
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Client → server.
///
/// Internally tagged: `{ "type": "JoinGame", "game_id": "...", ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Create a new game. Any missing field falls back to the classic
    /// 7×6, 2 players, 4 to win.
    CreateGame {
        #[serde(default)]
        columns: Option<usize>,
        #[serde(default)]
        rows: Option<usize>,
        #[serde(default)]
        n_players: Option<usize>,
        #[serde(default)]
        n_win: Option<usize>,
    },

    /// List every game with a one-line status.
    ListGames,

    /// Take the next free seat in a game.
    JoinGame {
        game_id: GameId,
        player_name: String,
    },

    /// Drop a piece. `column` is 0-indexed.
    PlayMove {
        game_id: GameId,
        player_name: String,
        column: usize,
    },

    /// Stream a snapshot now and after every state change until the game
    /// ends.
    AttachGame { game_id: GameId },

    /// Forget a finished game. Refused while the game is still in play.
    RemoveGame { game_id: GameId },

    /// "I'm leaving." Closes the connection.
    Disconnect { reason: String },
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// One line of a [`Response::GameList`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub game_id: GameId,
    pub player_count: usize,
    pub max_player_count: usize,
    /// `"pending"`, `"stale"`, or `"won by <name> <color>"`.
    pub game_state: String,
    pub players: Vec<PlayerSeat>,
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    GameCreated { game_id: GameId },

    GameList { games: Vec<GameSummary> },

    /// The player now holds `color`.
    Joined { game_id: GameId, color: State },

    /// The move was applied; `result` is the game outcome after it.
    MovePlayed { game_id: GameId, result: State },

    /// Full game state, sent on attach and after every change.
    Snapshot {
        game_id: GameId,
        game: GameSnapshot,
    },

    /// The game is gone from the server; `final_state` is how it ended.
    GameRemoved { game_id: GameId, final_state: State },

    /// The attached game is over; no more snapshots follow.
    Detached { game_id: GameId, final_state: State },

    /// The request failed. `code` follows HTTP conventions
    /// (400 bad request, 403 forbidden, 404 not found, 409 conflict,
    /// 500 internal).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// What a message carries: a request or a response.
///
/// Adjacently tagged: `{ "type": "Request", "data": { "type": "ListGames" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Request(Request),
    Response(Response),
}

/// The top-level frame. Every WebSocket message is one envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender sequence number. Responses echo nothing; each side
    /// counts its own messages.
    pub seq: u64,

    /// Milliseconds since the sender's connection started.
    pub timestamp: u64,

    pub payload: Payload,
}

impl Envelope {
    pub fn new(seq: u64, timestamp: u64, payload: Payload) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
