//! The `Four` game: grid, turn rotation, outcome, roster and activity.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::activity::{Activity, ActivityReceiver};
use crate::roster::{PlayerSeat, Roster};
use crate::{detect, ConfigError, GameConfig, Grid, MoveError, RosterError, State};

/// One N-in-a-row game.
///
/// `Four` is the only place game rules live. Collaborators (the text and
/// terminal runtimes, the network server) read its state through the query
/// methods and change it through exactly one entry point,
/// [`Four::player_move`].
///
/// # Concurrency
///
/// Moves take `&mut self`, so the borrow checker already forces callers to
/// serialise them per game (the server keeps each game behind its own
/// mutex). The roster and the activity channel use interior locking so
/// that joining and subscribing only need `&self`.
#[derive(Debug)]
pub struct Four {
    config: GameConfig,
    grid: Grid,
    players: Vec<State>,
    current_index: usize,
    grid_state: State,
    roster: RwLock<Roster>,
    activity: Activity,
}

/// A serializable copy of everything an observer needs to redraw a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub columns: usize,
    pub rows: usize,
    pub n_win: usize,
    pub n_players: usize,
    /// Rows top first; row 0 is the entry row.
    pub grid: Vec<Vec<State>>,
    pub current_player: State,
    pub grid_state: State,
    pub players: Vec<PlayerSeat>,
}

impl Four {
    /// Creates a new game after validating `config`.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] for the first construction rule that
    /// `config` breaks. No game is created in that case.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: GameConfig) -> Self {
        let players = State::PALETTE[..config.n_players].to_vec();
        tracing::debug!(
            columns = config.columns,
            rows = config.rows,
            n_players = config.n_players,
            n_win = config.n_win,
            "game created"
        );
        Self {
            grid: Grid::new(config.columns, config.rows),
            roster: RwLock::new(Roster::new(players.clone())),
            players,
            current_index: 0,
            grid_state: State::Empty,
            activity: Activity::default(),
            config,
        }
    }

    /// Starts over: a brand-new game with the same configuration.
    ///
    /// The current game is left untouched; callers replace it with the
    /// returned value. Its observers reach end-of-stream once it is dropped.
    pub fn reset(&self) -> Self {
        Self::from_valid(self.config)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn columns(&self) -> usize {
        self.config.columns
    }

    pub fn rows(&self) -> usize {
        self.config.rows
    }

    pub fn n_win(&self) -> usize {
        self.config.n_win
    }

    pub fn n_players(&self) -> usize {
        self.config.n_players
    }

    /// The active colours, in turn order.
    pub fn players(&self) -> &[State] {
        &self.players
    }

    /// Whose turn it is. Keeps rotating even after the game ends.
    pub fn current_player(&self) -> State {
        self.players[self.current_index]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_index
    }

    /// The cell at `(row, column)`; `None` outside the grid.
    pub fn cell(&self, row: usize, column: usize) -> Option<State> {
        self.grid.get(row, column)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// How many pieces sit in `column`. Renderers use it to know how far
    /// a dropped piece falls.
    pub fn column_count(&self, column: usize) -> usize {
        self.grid.column_count(column)
    }

    /// `Empty` while in progress, otherwise the winner or `Stale`.
    pub fn grid_state(&self) -> State {
        self.grid_state
    }

    pub fn is_finished(&self) -> bool {
        self.grid_state.is_terminal()
    }

    /// The winning colour, if a player has won.
    pub fn winner(&self) -> Option<State> {
        Some(self.grid_state).filter(|state| state.is_player())
    }

    pub fn is_stale(&self) -> bool {
        self.grid_state == State::Stale
    }

    // -----------------------------------------------------------------------
    // Moves
    // -----------------------------------------------------------------------

    /// Checks whether `player` may drop a piece into `column` right now.
    ///
    /// Pure: nothing changes whether this succeeds or fails. Collaborators
    /// call it before committing to a move to keep bad input free of side
    /// effects.
    pub fn validate_move(&self, player: State, column: usize) -> Result<(), MoveError> {
        if self.is_finished() {
            return Err(MoveError::GameOver {
                column,
                player,
                state: self.grid_state,
            });
        }
        let expected = self.current_player();
        if player != expected {
            return Err(MoveError::NotYourTurn {
                column,
                player,
                expected,
            });
        }
        if column >= self.config.columns {
            return Err(MoveError::InvalidColumn { column, player });
        }
        if self.grid.is_column_full(column) {
            return Err(MoveError::ColumnFull { column, player });
        }
        Ok(())
    }

    /// Drops `player`'s piece into `column` and returns the resulting
    /// outcome: `Empty` (play continues), the winner, or `Stale`.
    ///
    /// On success the turn always advances, including on the winning move.
    /// Observers are notified of the outcome whatever it is.
    ///
    /// # Errors
    /// The same rejections as [`Four::validate_move`], with the game left
    /// exactly as it was. [`MoveError::Internal`] signals a broken grid
    /// invariant and is logged as such.
    pub fn player_move(&mut self, player: State, column: usize) -> Result<State, MoveError> {
        self.validate_move(player, column)?;

        let Some(row) = self.grid.landing_row(column) else {
            let err = MoveError::Internal(format!(
                "column {column} is full after validation passed"
            ));
            tracing::error!(error = %err, "grid invariant violated");
            return Err(err);
        };
        self.grid.set(row, column, player);

        self.current_index = (self.current_index + 1) % self.players.len();

        let outcome = detect::compute(&self.grid, self.config.n_win);
        if outcome.is_terminal() {
            self.grid_state = outcome;
            tracing::info!(%outcome, "game finished");
        }
        tracing::debug!(%player, column, row, %outcome, "move applied");

        self.activity.publish(outcome);
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Roster
    // -----------------------------------------------------------------------

    /// Seats a named player on the next free colour.
    pub fn join(&self, name: &str) -> Result<State, RosterError> {
        let color = self.roster.write().join(name)?;
        tracing::info!(player = name.trim(), %color, "player joined");
        Ok(color)
    }

    pub fn player_color(&self, name: &str) -> Option<State> {
        self.roster.read().color_of(name)
    }

    pub fn player_name(&self, color: State) -> Option<String> {
        self.roster.read().name_of(color).map(str::to_string)
    }

    /// The joined players, in seat order.
    pub fn roster(&self) -> Vec<PlayerSeat> {
        self.roster.read().seats().to_vec()
    }

    pub fn joined_count(&self) -> usize {
        self.roster.read().len()
    }

    /// `true` once every seat has a player.
    pub fn is_ready(&self) -> bool {
        self.roster.read().is_full()
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Subscribes to outcome notifications. See [`crate::activity`].
    pub fn subscribe(&self) -> ActivityReceiver {
        self.activity.subscribe()
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            columns: self.config.columns,
            rows: self.config.rows,
            n_win: self.config.n_win,
            n_players: self.config.n_players,
            grid: self.grid.rows_iter().map(<[State]>::to_vec).collect(),
            current_player: self.current_player(),
            grid_state: self.grid_state,
            players: self.roster(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Four {
        Four::new(GameConfig::default()).unwrap()
    }

    #[test]
    fn test_new_game_starts_empty_with_first_colour() {
        let four = classic();
        assert_eq!(four.current_player(), State::Red);
        assert_eq!(four.current_player_index(), 0);
        assert_eq!(four.grid_state(), State::Empty);
        assert!(!four.is_finished());
        assert_eq!(four.players(), &[State::Red, State::Yellow]);
        assert_eq!(four.cell(5, 6), Some(State::Empty));
        assert_eq!(four.cell(6, 0), None);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = Four::new(GameConfig::new(2, 2, 2, 3)).unwrap_err();
        assert!(matches!(err, ConfigError::GridTooSmall { .. }));
    }

    #[test]
    fn test_move_lands_on_bottom_row_and_rotates_turn() {
        let mut four = classic();
        assert_eq!(four.player_move(State::Red, 3), Ok(State::Empty));
        assert_eq!(four.cell(5, 3), Some(State::Red));
        assert_eq!(four.current_player(), State::Yellow);
        assert_eq!(four.column_count(3), 1);
    }

    #[test]
    fn test_wrong_player_is_rejected_without_side_effects() {
        let mut four = classic();
        let err = four.player_move(State::Yellow, 0).unwrap_err();
        assert_eq!(
            err,
            MoveError::NotYourTurn {
                column: 0,
                player: State::Yellow,
                expected: State::Red
            }
        );
        assert_eq!(four.column_count(0), 0);
        assert_eq!(four.current_player(), State::Red);
    }

    #[test]
    fn test_out_of_range_column_is_rejected() {
        let four = classic();
        assert_eq!(
            four.validate_move(State::Red, 7),
            Err(MoveError::InvalidColumn {
                column: 7,
                player: State::Red
            })
        );
    }

    #[test]
    fn test_reset_keeps_config_and_clears_board() {
        let mut four = Four::new(GameConfig::new(5, 4, 3, 3)).unwrap();
        four.player_move(State::Red, 0).unwrap();
        four.join("alice").unwrap();

        let fresh = four.reset();
        assert_eq!(fresh.config(), four.config());
        assert_eq!(fresh.column_count(0), 0);
        assert_eq!(fresh.current_player(), State::Red);
        assert_eq!(fresh.joined_count(), 0);
        // The game it was reset from is untouched.
        assert_eq!(four.column_count(0), 1);
    }

    #[test]
    fn test_snapshot_reflects_the_grid() {
        let mut four = Four::new(GameConfig::new(3, 2, 2, 2)).unwrap();
        four.join("alice").unwrap();
        four.player_move(State::Red, 1).unwrap();

        let snap = four.snapshot();
        assert_eq!(snap.grid.len(), 2);
        assert_eq!(snap.grid[1], vec![State::Empty, State::Red, State::Empty]);
        assert_eq!(snap.current_player, State::Yellow);
        assert_eq!(snap.grid_state, State::Empty);
        assert_eq!(snap.players.len(), 1);
        assert_eq!(snap.players[0].name, "alice");
    }

    #[test]
    fn test_roster_through_the_game() {
        let four = classic();
        assert_eq!(four.join("alice"), Ok(State::Red));
        assert!(!four.is_ready());
        assert_eq!(four.join("bob"), Ok(State::Yellow));
        assert!(four.is_ready());
        assert_eq!(four.player_color("bob"), Some(State::Yellow));
        assert_eq!(four.player_name(State::Red).as_deref(), Some("alice"));
        assert!(matches!(four.join("carol"), Err(RosterError::Full { .. })));
    }
}
