//! Named seats for networked games.
//!
//! Local games never touch the roster. A server fills it as players join:
//! each name takes the next free colour in turn order.

use serde::{Deserialize, Serialize};

use crate::{RosterError, State};

/// A joined player: their colour and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeat {
    pub color: State,
    pub name: String,
}

/// The ordered list of seats, one per active colour.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    colors: Vec<State>,
    seats: Vec<PlayerSeat>,
}

impl Roster {
    /// Creates an empty roster for the given active colours.
    pub fn new(colors: Vec<State>) -> Self {
        Self {
            colors,
            seats: Vec::new(),
        }
    }

    /// Seats `name` on the next free colour.
    ///
    /// # Errors
    /// [`RosterError::EmptyName`] for a blank name,
    /// [`RosterError::Full`] when every colour is taken,
    /// [`RosterError::AlreadyJoined`] when the name is already seated.
    pub fn join(&mut self, name: &str) -> Result<State, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        if self.seats.len() >= self.colors.len() {
            return Err(RosterError::Full {
                capacity: self.colors.len(),
            });
        }
        if self.seats.iter().any(|seat| seat.name == name) {
            return Err(RosterError::AlreadyJoined(name.to_string()));
        }

        let color = self.colors[self.seats.len()];
        self.seats.push(PlayerSeat {
            color,
            name: name.to_string(),
        });
        Ok(color)
    }

    /// Colour held by `name`, if seated.
    pub fn color_of(&self, name: &str) -> Option<State> {
        self.seats
            .iter()
            .find(|seat| seat.name == name)
            .map(|seat| seat.color)
    }

    /// Name seated on `color`, if any.
    pub fn name_of(&self, color: State) -> Option<&str> {
        self.seats
            .iter()
            .find(|seat| seat.color == color)
            .map(|seat| seat.name.as_str())
    }

    pub fn seats(&self) -> &[PlayerSeat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// `true` once every colour has a player.
    pub fn is_full(&self) -> bool {
        self.seats.len() == self.colors.len()
    }
}
