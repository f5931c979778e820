//! Game configuration and its validation rules.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, State};

/// Default number of columns (classic Connect Four).
pub const DEFAULT_COLUMNS: usize = 7;
/// Default number of rows.
pub const DEFAULT_ROWS: usize = 6;
/// Default number of players.
pub const DEFAULT_PLAYERS: usize = 2;
/// Default run length needed to win.
pub const DEFAULT_WIN: usize = 4;

/// Largest supported player count: one per palette colour.
pub const MAX_PLAYERS: usize = State::PALETTE.len();

/// The four numbers that fully describe a game before it starts.
///
/// A `GameConfig` on its own is not guaranteed to be valid. It is checked
/// by [`GameConfig::validate`], which [`Four::new`](crate::Four::new) calls
/// before allocating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid width.
    pub columns: usize,

    /// Grid height. Row 0 is the entry (top) row.
    pub rows: usize,

    /// How many players take turns, drawn from the front of the palette.
    ///
    /// Accepted range is `1..=MAX_PLAYERS`. A single player is allowed and
    /// simply plays every move; zero is rejected because there would be no
    /// one whose turn it is.
    pub n_players: usize,

    /// Length of the run a player needs to win.
    pub n_win: usize,
}

impl GameConfig {
    pub fn new(columns: usize, rows: usize, n_players: usize, n_win: usize) -> Self {
        Self {
            columns,
            rows,
            n_players,
            n_win,
        }
    }

    /// Checks every construction invariant, reporting the first one that
    /// fails.
    ///
    /// The order matters for user-facing messages: a bad grid size is
    /// reported before a bad player count, which is reported before a bad
    /// win length.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns < 2 || self.rows < 2 {
            return Err(ConfigError::InvalidGridSize {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.n_players > MAX_PLAYERS {
            return Err(ConfigError::TooManyPlayers {
                requested: self.n_players,
                max: MAX_PLAYERS,
            });
        }
        if self.n_players == 0 {
            return Err(ConfigError::TooFewPlayers {
                requested: self.n_players,
            });
        }
        if self.n_win < 2 {
            return Err(ConfigError::InvalidWinLength { n_win: self.n_win });
        }
        if self.columns.max(self.rows) < self.n_win {
            return Err(ConfigError::GridTooSmall {
                columns: self.columns,
                rows: self.rows,
                n_win: self.n_win,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            n_players: DEFAULT_PLAYERS,
            n_win: DEFAULT_WIN,
        }
    }
}
