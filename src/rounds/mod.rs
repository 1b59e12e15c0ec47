use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifiers::{PlayerId, SectionId};

mod round_registry;
pub use round_registry::RoundRegistry;

/// Which way a player was floated out of their natural bracket during a
/// past round's pairing (spec.md §4.2 step 6 / glossary "Float").
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum FloatDirection {
    /// Floated down into a lower-scoring bracket
    Down,
    /// Floated up into a higher-scoring bracket
    Up,
}

/// The color a player held in a single game.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Color {
    /// White
    White,
    /// Black
    Black,
}

impl Color {
    /// The opposite color.
    pub fn opposite(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self { Color::White => "White", Color::Black => "Black" })
    }
}

/// The three bye taxonomies of spec.md §4.4. This is the single source of
/// truth for bye meaning: callers must never infer a bye's type from the
/// points it carries or from a result string.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ByeType {
    /// A half-point bye the player pre-requested for this round.
    RequestedHalf,
    /// A zero-point bye given because the player's status is `Inactive`.
    InactiveZero,
    /// A full-point bye given to the odd player out by the pairer itself.
    /// At most one of these may be given to a player per tournament, short
    /// of the pigeonhole exception in spec.md §4.4.
    PairingAllocatedFull,
}

impl ByeType {
    /// Whether this bye type forbids the player receiving a second
    /// `PairingAllocatedFull` bye later in the tournament.
    pub fn counts_as_pairing_allocated(self) -> bool {
        matches!(self, ByeType::PairingAllocatedFull)
    }
}

/// The outcome of a single played game (not a bye).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum GameOutcome {
    /// White won
    WhiteWin,
    /// Black won
    BlackWin,
    /// The game was drawn
    Draw,
    /// The game was not played and is scored as a forfeit loss for both
    /// (or, in asymmetric forfeits, tracked per player by the caller); no
    /// color is considered assigned, and it does not count toward color
    /// imbalance or streaks.
    UnplayedForfeit,
}

/// One produced pairing: a board assignment within a single round and
/// section. A `black_id` of `None` marks a bye, in which case `bye_type`
/// must be `Some` (spec.md §3 invariant, enforced by the validator).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// The round this pairing belongs to
    pub round: u32,
    /// The 1-based board number within the section
    pub board: u32,
    /// The section this pairing belongs to
    pub section: SectionId,
    /// The player holding white
    pub white_id: PlayerId,
    /// The player holding black, or `None` for a bye
    pub black_id: Option<PlayerId>,
    /// The bye type, present iff `black_id` is `None`
    pub bye_type: Option<ByeType>,
    /// The reported outcome, if any
    pub result: Option<GameOutcome>,
}

impl Pairing {
    /// Whether this pairing is a bye.
    pub fn is_bye(&self) -> bool {
        self.black_id.is_none()
    }

    /// Whether every player in this pairing has a recorded result (byes are
    /// always considered complete; see spec.md §4.5).
    pub fn is_complete(&self) -> bool {
        self.is_bye() || self.result.is_some()
    }

    /// The two players in this pairing, as an iterator (one element for a
    /// bye).
    pub fn players(&self) -> impl Iterator<Item = PlayerId> + '_ {
        std::iter::once(self.white_id).chain(self.black_id)
    }
}

/// The round-completion state machine of spec.md §4.5, tracked per
/// (tournament, round, section).
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No pairings exist yet for this round.
    #[default]
    NotStarted,
    /// Pairings exist but no result has been submitted.
    Paired,
    /// At least one (but not all) result has been submitted.
    InProgress,
    /// Every pairing has a result, or is a bye.
    Complete,
}

impl RoundState {
    /// Computes the round state from a set of pairings for a single round.
    pub fn from_pairings(pairings: &[Pairing]) -> RoundState {
        if pairings.is_empty() {
            return RoundState::NotStarted;
        }
        let completed = pairings.iter().filter(|p| p.is_complete()).count();
        if completed == 0 {
            RoundState::Paired
        } else if completed == pairings.len() {
            RoundState::Complete
        } else {
            RoundState::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn section() -> SectionId {
        Uuid::new_v4().into()
    }

    fn pairing(section: SectionId, result: Option<GameOutcome>) -> Pairing {
        Pairing {
            round: 1,
            board: 1,
            section,
            white_id: Uuid::new_v4().into(),
            black_id: Some(Uuid::new_v4().into()),
            bye_type: None,
            result,
        }
    }

    #[test]
    fn bye_is_always_complete() {
        let p = Pairing {
            round: 1,
            board: 1,
            section: section(),
            white_id: Uuid::new_v4().into(),
            black_id: None,
            bye_type: Some(ByeType::PairingAllocatedFull),
            result: None,
        };
        assert!(p.is_bye());
        assert!(p.is_complete());
    }

    #[test]
    fn round_state_transitions() {
        let s = section();
        assert_eq!(RoundState::from_pairings(&[]), RoundState::NotStarted);
        let unplayed = vec![pairing(s, None), pairing(s, None)];
        assert_eq!(RoundState::from_pairings(&unplayed), RoundState::Paired);
        let mixed = vec![pairing(s, Some(GameOutcome::Draw)), pairing(s, None)];
        assert_eq!(RoundState::from_pairings(&mixed), RoundState::InProgress);
        let done = vec![
            pairing(s, Some(GameOutcome::Draw)),
            pairing(s, Some(GameOutcome::WhiteWin)),
        ];
        assert_eq!(RoundState::from_pairings(&done), RoundState::Complete);
    }
}
