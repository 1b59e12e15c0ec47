use std::{collections::HashSet, fmt::Display};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::PairingError, identifiers::SectionId};

pub use crate::identifiers::PlayerId;

mod player_registry;
pub use player_registry::PlayerRegistry;

#[derive(
    Serialize, Deserialize, Default, PartialEq, Eq, Debug, Clone, Copy, Hash, PartialOrd, Ord,
)]
/// The registration status of a player within a section.
pub enum PlayerStatus {
    /// The player is registered and playing every round.
    #[default]
    Active,
    /// The player is still registered but is sitting out (receives an
    /// `inactive-zero` bye every round rather than being bracketed).
    Inactive,
    /// The player has withdrawn from the tournament entirely and is excluded
    /// from pairing, bracketing, and standings alike.
    Withdrawn,
}

impl PlayerStatus {
    /// Whether a player with this status is bracketed for pairing at all
    /// (`Withdrawn` players never appear in a pairing computation).
    pub fn is_in_pool(self) -> bool {
        !matches!(self, PlayerStatus::Withdrawn)
    }
}

/// The core player model. Only registration-level facts live here; score,
/// opponent history, and color history are all derived per pairing
/// computation by `state::PlayerStateBuilder` and never stored on the
/// player itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// The player's id
    pub id: PlayerId,
    /// The player's name
    pub name: String,
    /// The player's rating; `0` means unrated.
    pub rating: u32,
    /// An optional title (e.g. "GM", "FM")
    pub title: Option<String>,
    /// The section the player is registered in. A player belongs to exactly
    /// one section; cross-section pairings never occur.
    pub section: SectionId,
    /// The player's registration status
    pub status: PlayerStatus,
    /// Rounds for which the player has pre-requested a half-point bye.
    pub requested_bye_rounds: HashSet<u32>,
    /// The team this player represents, for the team-Swiss variant
    /// (spec.md §4.7). `None` outside of team events.
    pub team: Option<String>,
}

impl Player {
    /// Creates a new active player with no rating and no bye requests.
    pub fn new(name: impl Into<String>, section: SectionId) -> Self {
        Player {
            id: Uuid::new_v4().into(),
            name: name.into(),
            rating: 0,
            title: None,
            section,
            status: PlayerStatus::Active,
            requested_bye_rounds: HashSet::new(),
            team: None,
        }
    }

    /// Sets the player's team, for the team-Swiss variant.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Whether the player is unrated.
    pub fn is_unrated(&self) -> bool {
        self.rating == 0
    }

    /// Whether the player has requested a half-point bye for `round`.
    pub fn has_requested_bye(&self, round: u32) -> bool {
        self.requested_bye_rounds.contains(&round)
    }

    /// Sets the player's status.
    pub fn update_status(&mut self, status: PlayerStatus) {
        self.status = status;
    }

    /// Calculates if the player can be bracketed for pairing (i.e. is not
    /// withdrawn; inactive players are still excluded from bracketing by the
    /// bye partitioning step, but are not withdrawn).
    pub fn can_play(&self) -> bool {
        self.status.is_in_pool()
    }

    /// Normalizes a set of raw (possibly legacy-encoded) bye-round markers
    /// into a canonical set of positive round numbers, per spec.md §3's
    /// "accepts a normalised set of positive integers" requirement.
    pub fn normalize_requested_byes<I>(rounds: I) -> Result<HashSet<u32>, PairingError>
    where
        I: IntoIterator<Item = i64>,
    {
        let mut out = HashSet::new();
        for raw in rounds {
            if raw <= 0 {
                return Err(PairingError::InvalidSnapshot(format!(
                    "requested bye round must be positive, got {raw}"
                )));
            }
            out.insert(raw as u32);
        }
        Ok(out)
    }
}

impl Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PlayerStatus::Active => "Active",
                PlayerStatus::Inactive => "Inactive",
                PlayerStatus::Withdrawn => "Withdrawn",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section() -> SectionId {
        Uuid::new_v4().into()
    }

    #[test]
    fn new_player_is_active_and_rated_zero() {
        let player = Player::new("Morgan", section());
        assert_eq!(player.name, "Morgan");
        assert!(player.is_unrated());
        assert_eq!(player.status, PlayerStatus::Active);
        assert!(player.can_play());
    }

    #[test]
    fn withdrawn_players_cannot_play() {
        let mut player = Player::new("Morgan", section());
        player.update_status(PlayerStatus::Withdrawn);
        assert!(!player.can_play());
    }

    #[test]
    fn inactive_players_can_still_play_bracketing_wise() {
        let mut player = Player::new("Morgan", section());
        player.update_status(PlayerStatus::Inactive);
        assert!(player.can_play());
    }

    #[test]
    fn normalize_requested_byes_rejects_non_positive() {
        assert!(Player::normalize_requested_byes([1, 2, 3]).is_ok());
        assert!(Player::normalize_requested_byes([0]).is_err());
        assert!(Player::normalize_requested_byes([-1]).is_err());
    }

    #[test]
    fn has_requested_bye_reads_the_normalized_set() {
        let mut player = Player::new("Morgan", section());
        player.requested_bye_rounds = Player::normalize_requested_byes([2]).unwrap();
        assert!(player.has_requested_bye(2));
        assert!(!player.has_requested_bye(1));
    }
}
