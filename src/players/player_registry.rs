use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::{Player, PlayerStatus},
};

/// The struct that creates and manages all players across every section of
/// a tournament.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    /// Creates a new, empty player registry.
    pub fn new() -> Self {
        PlayerRegistry {
            players: HashMap::new(),
        }
    }

    /// Registers a new player, returning an error if the id is already in
    /// use.
    pub fn register(&mut self, player: Player) -> Result<PlayerId, PairingError> {
        if self.players.contains_key(&player.id) {
            return Err(PairingError::InvalidSnapshot(format!(
                "player {} is registered twice",
                player.id
            )));
        }
        let id = player.id;
        self.players.insert(id, player);
        Ok(id)
    }

    /// Calculates the number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Calculates if there are no registered players.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// All players, regardless of section or status.
    pub fn all(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// All players registered to `section` (any status).
    pub fn in_section(&self, section: SectionId) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |p| p.section == section)
    }

    /// All non-withdrawn players registered to `section`: the pool spec.md
    /// §4.1 hands to the player-state builder (`status ∈ {active, inactive}`).
    pub fn bracketable_in_section(&self, section: SectionId) -> impl Iterator<Item = &Player> {
        self.in_section(section).filter(|p| p.can_play())
    }

    /// The distinct set of sections with at least one registered player.
    pub fn sections(&self) -> Vec<SectionId> {
        let mut out: Vec<SectionId> = self.players.values().map(|p| p.section).collect();
        out.sort();
        out.dedup();
        out
    }

    /// Given a player id, returns a reference to that player if found.
    pub fn get(&self, id: &PlayerId) -> Result<&Player, PairingError> {
        self.players
            .get(id)
            .ok_or_else(|| PairingError::InvalidSnapshot(format!("unknown player {id}")))
    }

    /// Given a player id, returns a mutable reference to that player if
    /// found.
    pub fn get_mut(&mut self, id: &PlayerId) -> Result<&mut Player, PairingError> {
        self.players
            .get_mut(id)
            .ok_or_else(|| PairingError::InvalidSnapshot(format!("unknown player {id}")))
    }

    /// Sets the specified player's status.
    pub fn set_status(&mut self, id: &PlayerId, status: PlayerStatus) -> Result<(), PairingError> {
        self.get_mut(id)?.update_status(status);
        Ok(())
    }
}
