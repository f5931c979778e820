//! Process-wide registry of hosted games.
//!
//! The engine has no notion of ids or of other games; this module owns
//! both. Each game sits behind its own mutex, which is what serialises
//! moves on that game, while the map itself sits behind a reader/writer
//! lock so listing and lookups never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use gofour_engine::{ActivityReceiver, Four, GameConfig, GameSnapshot, State};
use gofour_protocol::{GameId, GameSummary};
use rand::Rng;
use tokio::sync::{Mutex, RwLock};

use crate::RegistryError;

/// Shared handle to one hosted game.
pub type GameHandle = Arc<Mutex<Four>>;

/// All games hosted by this server, keyed by [`GameId`].
#[derive(Default)]
pub struct GameRegistry {
    games: RwLock<HashMap<GameId, GameHandle>>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a game and returns its freshly generated id.
    ///
    /// # Errors
    /// [`RegistryError::Config`] when the engine rejects `config`.
    pub async fn create(&self, config: GameConfig) -> Result<GameId, RegistryError> {
        let four = Four::new(config)?;

        let mut games = self.games.write().await;
        let game_id = loop {
            let candidate = generate_game_id();
            if !games.contains_key(&candidate) {
                break candidate;
            }
        };
        games.insert(game_id.clone(), Arc::new(Mutex::new(four)));

        tracing::info!(
            %game_id,
            columns = config.columns,
            rows = config.rows,
            n_players = config.n_players,
            n_win = config.n_win,
            "game created"
        );
        Ok(game_id)
    }

    /// Looks up a game, rejecting malformed ids first.
    pub async fn get(&self, game_id: &GameId) -> Result<GameHandle, RegistryError> {
        if !game_id.is_well_formed() {
            return Err(RegistryError::InvalidId(game_id.clone()));
        }
        self.games
            .read()
            .await
            .get(game_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(game_id.clone()))
    }

    /// One summary per game, ordered by id.
    ///
    /// Handles are cloned out first so the map lock is not held while
    /// waiting on individual games.
    pub async fn list(&self) -> Vec<GameSummary> {
        let mut handles: Vec<(GameId, GameHandle)> = self
            .games
            .read()
            .await
            .iter()
            .map(|(id, handle)| (id.clone(), Arc::clone(handle)))
            .collect();
        handles.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        let mut summaries = Vec::with_capacity(handles.len());
        for (game_id, handle) in handles {
            let four = handle.lock().await;
            summaries.push(summarize(game_id, &four));
        }
        summaries
    }

    /// Seats `player_name` in a game and returns the assigned colour.
    pub async fn join(
        &self,
        game_id: &GameId,
        player_name: &str,
    ) -> Result<State, RegistryError> {
        let handle = self.get(game_id).await?;
        let four = handle.lock().await;
        four.join(player_name).map_err(|source| RegistryError::Roster {
            game_id: game_id.clone(),
            source,
        })
    }

    /// Plays a move on behalf of a joined player.
    ///
    /// The move is validated before it is committed, so a rejected move
    /// leaves no trace on the game.
    pub async fn play(
        &self,
        game_id: &GameId,
        player_name: &str,
        column: usize,
    ) -> Result<State, RegistryError> {
        let handle = self.get(game_id).await?;
        let mut four = handle.lock().await;

        if !four.is_ready() {
            return Err(RegistryError::NotReady(game_id.clone()));
        }
        let player = four
            .player_color(player_name)
            .ok_or_else(|| RegistryError::UnknownPlayer {
                game_id: game_id.clone(),
                player: player_name.to_string(),
            })?;

        let move_error = |source| RegistryError::Move {
            game_id: game_id.clone(),
            player: player_name.to_string(),
            source,
        };
        four.validate_move(player, column).map_err(move_error)?;
        let result = four.player_move(player, column).map_err(move_error)?;

        tracing::info!(%game_id, player = player_name, column, %result, "move played");
        Ok(result)
    }

    /// Takes a snapshot and subscribes to changes in one step, so no state
    /// change can slip between the two.
    pub async fn attach(
        &self,
        game_id: &GameId,
    ) -> Result<(GameSnapshot, ActivityReceiver), RegistryError> {
        let handle = self.get(game_id).await?;
        let four = handle.lock().await;
        Ok((four.snapshot(), four.subscribe()))
    }

    pub async fn snapshot(&self, game_id: &GameId) -> Result<GameSnapshot, RegistryError> {
        let handle = self.get(game_id).await?;
        let four = handle.lock().await;
        Ok(four.snapshot())
    }

    /// Drops a finished game and returns its final state.
    ///
    /// Games still in play are refused with [`RegistryError::InProgress`]
    /// so a player cannot pull the table out from under the others.
    pub async fn remove(&self, game_id: &GameId) -> Result<State, RegistryError> {
        let handle = self.get(game_id).await?;
        let final_state = {
            let four = handle.lock().await;
            if !four.is_finished() {
                return Err(RegistryError::InProgress(game_id.clone()));
            }
            four.grid_state()
        };

        self.games.write().await.remove(game_id);
        tracing::info!(%game_id, %final_state, "game removed");
        Ok(final_state)
    }

    pub async fn len(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.games.read().await.is_empty()
    }
}

/// Builds the one-line status of a game.
pub fn summarize(game_id: GameId, four: &Four) -> GameSummary {
    let state = four.grid_state();
    let game_state = match state {
        State::Empty => "pending".to_string(),
        State::Stale => "stale".to_string(),
        winner => format!(
            "won by {} {}",
            four.player_name(winner).unwrap_or_default(),
            winner
        ),
    };
    GameSummary {
        game_id,
        player_count: four.joined_count(),
        max_player_count: four.n_players(),
        game_state,
        players: four.roster(),
    }
}

/// 16 random bytes as 32 lowercase hex characters.
fn generate_game_id() -> GameId {
    let bytes: [u8; 16] = rand::rng().random();
    GameId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_well_formed_and_distinct() {
        let a = generate_game_id();
        let b = generate_game_id();
        assert!(a.is_well_formed());
        assert!(b.is_well_formed());
        assert_ne!(a, b);
    }

    #[test]
    fn test_summary_of_fresh_game_is_pending() {
        let four = Four::new(GameConfig::default()).unwrap();
        let summary = summarize(generate_game_id(), &four);
        assert_eq!(summary.game_state, "pending");
        assert_eq!(summary.player_count, 0);
        assert_eq!(summary.max_player_count, 2);
    }

    fn finished_game() -> Four {
        let mut four = Four::new(GameConfig::new(2, 2, 2, 2)).unwrap();
        four.join("alice").unwrap();
        four.join("bob").unwrap();
        four.player_move(State::Red, 0).unwrap();
        four.player_move(State::Yellow, 1).unwrap();
        four.player_move(State::Red, 0).unwrap();
        four
    }

    #[tokio::test]
    async fn test_remove_finished_game() {
        let registry = GameRegistry::new();
        let game_id = generate_game_id();
        registry
            .games
            .write()
            .await
            .insert(game_id.clone(), Arc::new(Mutex::new(finished_game())));

        assert_eq!(registry.remove(&game_id).await.unwrap(), State::Red);
        assert!(registry.is_empty().await);
        assert!(matches!(
            registry.remove(&game_id).await,
            Err(RegistryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_refuses_game_in_progress() {
        let registry = GameRegistry::new();
        let game_id = registry.create(GameConfig::default()).await.unwrap();

        let err = registry.remove(&game_id).await.unwrap_err();
        assert!(matches!(err, RegistryError::InProgress(_)));
        assert_eq!(err.code(), 403);
        assert_eq!(registry.len().await, 1);
    }

    #[test]
    fn test_summary_names_the_winner() {
        let four = finished_game();
        let summary = summarize(generate_game_id(), &four);
        assert_eq!(summary.game_state, "won by alice red");
    }
}
