use std::collections::HashSet;

use bevy::prelude::Resource;

/// Error that can occur when mutating the player roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("player {0} is already connected")]
    DuplicatePlayer(String),
    #[error("player {0} is not connected")]
    UnknownPlayer(String),
}

/// Connected observers and the view distance currently served to them.
///
/// The roster doubles as the controller's observer-presence signal: an empty
/// roster suspends automatic adjustment entirely.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: HashSet<String>,
    view_distance: i32,
}

impl PlayerRegistry {
    /// Register a player; returns the new roster size.
    pub fn join(&mut self, name: &str) -> Result<usize, RosterError> {
        if !self.players.insert(name.to_string()) {
            return Err(RosterError::DuplicatePlayer(name.to_string()));
        }
        Ok(self.players.len())
    }

    /// Remove a player; returns the remaining roster size.
    pub fn leave(&mut self, name: &str) -> Result<usize, RosterError> {
        if !self.players.remove(name) {
            return Err(RosterError::UnknownPlayer(name.to_string()));
        }
        Ok(self.players.len())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn view_distance(&self) -> i32 {
        self.view_distance
    }

    /// Broadcast a new view distance to every connected player.
    pub fn set_view_distance(&mut self, distance: i32) {
        self.view_distance = distance;
    }
}
