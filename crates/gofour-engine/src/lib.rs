//! Game engine for GoFour, a generalized Connect Four.
//!
//! Any number of columns and rows, 1 to 7 players, any winning run length.
//! The crate holds the rules and nothing else: no rendering, no input
//! parsing, no networking.
//!
//! # Key types
//!
//! - [`Four`]: one game, with its grid, turns, outcome, roster and observers
//! - [`GameConfig`]: the validated construction parameters
//! - [`State`]: a cell value, and also a game outcome
//! - [`ActivityReceiver`]: a subscription to a game's outcome changes
//!
//! # Example
//!
//! ```rust
//! use gofour_engine::{Four, GameConfig, State};
//!
//! let mut four = Four::new(GameConfig::default()).unwrap();
//! assert_eq!(four.player_move(State::Red, 3), Ok(State::Empty));
//! assert_eq!(four.current_player(), State::Yellow);
//! ```

pub mod activity;
mod config;
pub mod detect;
mod error;
mod four;
mod grid;
mod roster;
mod state;

pub use activity::{Activity, ActivityReceiver};
pub use config::{
    GameConfig, DEFAULT_COLUMNS, DEFAULT_PLAYERS, DEFAULT_ROWS, DEFAULT_WIN, MAX_PLAYERS,
};
pub use error::{ConfigError, MoveError, RosterError};
pub use four::{Four, GameSnapshot};
pub use grid::Grid;
pub use roster::{PlayerSeat, Roster};
pub use state::State;
