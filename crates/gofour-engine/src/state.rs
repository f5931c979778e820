//! The cell/state model shared by the grid and the game outcome.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The value of a single grid cell, and also the overall outcome of a game.
///
/// The same enum serves both purposes, which keeps comparisons cheap:
///
/// - a cell is either [`State::Empty`] or holds one player colour;
/// - a game outcome is `Empty` while in progress, a player colour once that
///   player has won, or [`State::Stale`] when the board filled up with no
///   winner.
///
/// Player colours are ordered: their position in [`State::PALETTE`] is the
/// turn order. `Stale` never appears in a cell.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Empty,
    Red,
    Yellow,
    Green,
    Magenta,
    Blue,
    Cyan,
    Black,
    Stale,
}

impl State {
    /// Every player colour, in turn order. A game with `n` players uses the
    /// first `n` entries.
    pub const PALETTE: [State; 7] = [
        State::Red,
        State::Yellow,
        State::Green,
        State::Magenta,
        State::Blue,
        State::Cyan,
        State::Black,
    ];

    /// Returns `true` for the seven player colours.
    pub fn is_player(self) -> bool {
        !matches!(self, Self::Empty | Self::Stale)
    }

    /// Returns `true` for outcomes that end a game (a winner or `Stale`).
    pub fn is_terminal(self) -> bool {
        self != Self::Empty
    }

    /// Lowercase name, identical to the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Magenta => "magenta",
            Self::Blue => "blue",
            Self::Cyan => "cyan",
            Self::Black => "black",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
