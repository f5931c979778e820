//! Error types for the engine.
//!
//! Three families, kept in separate enums so callers can never confuse them:
//!
//! - [`ConfigError`]: construction failed; no game exists.
//! - [`MoveError`]: a move was refused (or, for [`MoveError::Internal`],
//!   an engine invariant broke).
//! - [`RosterError`]: a player could not take a seat.

use crate::State;

/// Why a [`GameConfig`](crate::GameConfig) was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Both dimensions must be at least 2.
    #[error("invalid grid size: {columns}/{rows}")]
    InvalidGridSize { columns: usize, rows: usize },

    /// More players than palette colours.
    #[error("too many players: {requested}, max: {max}")]
    TooManyPlayers { requested: usize, max: usize },

    /// A game needs someone to play it.
    #[error("too few players: {requested}, minimum 1")]
    TooFewPlayers { requested: usize },

    /// The winning run must be at least 2 long.
    #[error("invalid win number: {n_win}, minimum 2")]
    InvalidWinLength { n_win: usize },

    /// Neither dimension is long enough to fit a winning run.
    #[error("grid too small for anyone to win: {columns}/{rows} with {n_win} to win")]
    GridTooSmall {
        columns: usize,
        rows: usize,
        n_win: usize,
    },
}

/// Why a move was not applied.
///
/// Every variant except [`MoveError::Internal`] is an expected, recoverable
/// rejection: the grid is untouched and the same player may try again.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// Someone other than the current player tried to move.
    #[error("{column} is an invalid move for player {player}: waiting on {expected}")]
    NotYourTurn {
        column: usize,
        player: State,
        expected: State,
    },

    /// The column index is outside the grid.
    #[error("{column} is an invalid move for player {player}")]
    InvalidColumn { column: usize, player: State },

    /// The column has no empty cell left.
    #[error("column {column} is full, invalid move for player {player}")]
    ColumnFull { column: usize, player: State },

    /// The game already has an outcome, stored in `state`.
    #[error("{column} is an invalid move for player {player}: game is over ({state})")]
    GameOver {
        column: usize,
        player: State,
        state: State,
    },

    /// An engine invariant was violated. Never caused by player input.
    #[error("internal engine error: {0}")]
    Internal(String),
}

impl MoveError {
    /// `true` for rejections caused by the caller's input; `false` only for
    /// [`MoveError::Internal`].
    pub fn is_invalid_move(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

/// Why a player could not join a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    /// Every seat is taken.
    #[error("game is full ({capacity} players)")]
    Full { capacity: usize },

    /// A player with this name already holds a seat.
    #[error("player '{0}' already joined")]
    AlreadyJoined(String),

    /// Names must not be blank.
    #[error("missing player name")]
    EmptyName,
}
