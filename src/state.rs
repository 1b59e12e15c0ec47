//! The snapshot & player-state builder (spec.md §4.1).
//!
//! Pure: the same (players, rounds, section, round) always yields the same
//! `Vec<PlayerState>`. All I/O and legacy-encoding normalization happen
//! before this point, in the caller's `SnapshotSource` implementation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    r64,
    rounds::{ByeType, Color, FloatDirection, RoundRegistry},
    scoring::{build_histories, GameKind},
    settings::{ByeSettings, ScoringSettings},
};

/// The derived, per-pairing-computation state of a single player (spec.md
/// §3's `PlayerState`). Constructed fresh before each pairing run and
/// discarded after.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    /// The player this state describes
    pub player: PlayerId,
    /// The player's rating, copied from the registry for sort convenience
    pub rating: u32,
    /// The player's name, copied from the registry for canonical ordering
    pub name: String,
    /// Points awarded so far (wins, draws, and bye awards; never inferred
    /// from result codes alone)
    pub points: r64,
    /// Every opponent previously faced (does not include bye "opponents")
    pub opponents: HashSet<PlayerId>,
    /// Colors played, in round order; byes and unplayed forfeits contribute
    /// no entry (spec.md §9's "byes do not count in color streaks").
    pub colors_played: Vec<Color>,
    /// (# whites) − (# blacks) among `colors_played`
    pub color_imbalance: i32,
    /// Whether this player has already received a `PairingAllocatedFull` bye
    pub had_pairing_allocated_bye: bool,
    /// Down/up float markers from past rounds, in ascending round order
    pub float_history: Vec<(u32, FloatDirection)>,
    /// Virtual score adjustment for this round's bracketing only; never
    /// persisted to `points` or standings (spec.md §4.6). Populated by the
    /// acceleration step, defaults to zero.
    pub acceleration_bonus: r64,
}

impl PlayerState {
    /// The score used to place this player into a bracket: real points plus
    /// this round's acceleration bonus.
    pub fn effective_score(&self) -> r64 {
        self.points + self.acceleration_bonus
    }

    /// The color this player is due, if they hold an absolute preference
    /// (|imbalance| >= 2, or the last two games were the same color).
    pub fn absolute_color_preference(&self) -> Option<Color> {
        if self.color_imbalance >= 2 {
            return Some(Color::Black);
        }
        if self.color_imbalance <= -2 {
            return Some(Color::White);
        }
        let mut tail = self.colors_played.iter().rev();
        match (tail.next(), tail.next()) {
            (Some(a), Some(b)) if a == b => Some(a.opposite()),
            _ => None,
        }
    }

    /// The color this player is due under a "strong" preference
    /// (imbalance = ±1), distinct from an absolute preference.
    pub fn strong_color_preference(&self) -> Option<Color> {
        if self.absolute_color_preference().is_some() {
            return None;
        }
        match self.color_imbalance {
            1 => Some(Color::Black),
            -1 => Some(Color::White),
            _ => None,
        }
    }

    /// The color this player is due under a "mild" preference: simple
    /// alternation from their last game.
    pub fn mild_color_preference(&self) -> Option<Color> {
        if self.absolute_color_preference().is_some() || self.strong_color_preference().is_some() {
            return None;
        }
        self.colors_played.last().map(|c| c.opposite())
    }

    /// Any due color at all, cascading absolute -> strong -> mild.
    pub fn due_color(&self) -> Option<Color> {
        self.absolute_color_preference()
            .or_else(|| self.strong_color_preference())
            .or_else(|| self.mild_color_preference())
    }

    /// The most recent round in which this player floated, and which way.
    pub fn last_float(&self) -> Option<(u32, FloatDirection)> {
        self.float_history.last().copied()
    }

    /// How many of the last `window` rounds (by count of recorded floats,
    /// not by round distance) this player floated at all — used as the
    /// "fewest recent floats" tie-break of spec.md §4.2 step 6.
    pub fn recent_float_count(&self, window: usize) -> usize {
        self.float_history.len().min(window)
    }
}

/// Builds the canonically-ordered `PlayerState` list for `section` as of
/// `round_to_pair` (i.e. incorporating every completed pairing with
/// `round < round_to_pair`).
pub struct PlayerStateBuilder;

impl PlayerStateBuilder {
    /// Runs the builder. Ordered canonically by (-points, -rating, name,
    /// id) per spec.md §4.1.
    pub fn build(
        players: &PlayerRegistry,
        rounds: &RoundRegistry,
        section: SectionId,
        round_to_pair: u32,
        scoring: &ScoringSettings,
        bye_settings: &ByeSettings,
    ) -> Result<Vec<PlayerState>, PairingError> {
        if rounds.has_pairings(section, round_to_pair) {
            return Err(PairingError::AlreadyPaired(round_to_pair));
        }

        let pool: Vec<_> = players.bracketable_in_section(section).collect();
        let histories = build_histories(players, rounds, section, scoring, bye_settings);

        for (player, history) in &histories {
            let mut rounds_seen = HashSet::new();
            for game in history {
                if !rounds_seen.insert(game.round) {
                    return Err(PairingError::invariant(
                        format!("player {player} has two pairings recorded for round {}", game.round),
                        &[*player],
                    ));
                }
            }
        }

        let mut states = Vec::with_capacity(pool.len());
        for player in pool {
            let empty = Vec::new();
            let history = histories.get(&player.id).unwrap_or(&empty);

            let points = history.iter().map(|g| g.points_awarded).sum();
            let opponents: HashSet<PlayerId> = history.iter().filter_map(|g| g.opponent).collect();
            let colors_played: Vec<Color> = history.iter().filter_map(|g| g.color).collect();
            let color_imbalance = colors_played.iter().fold(0i32, |acc, c| {
                acc + match c {
                    Color::White => 1,
                    Color::Black => -1,
                }
            });
            let had_pairing_allocated_bye = history
                .iter()
                .any(|g| matches!(g.kind, GameKind::Bye(ByeType::PairingAllocatedFull)));
            let float_history = rounds.float_history(section, player.id, round_to_pair);

            states.push(PlayerState {
                player: player.id,
                rating: player.rating,
                name: player.name.clone(),
                points,
                opponents,
                colors_played,
                color_imbalance,
                had_pairing_allocated_bye,
                float_history,
                acceleration_bonus: r64::from_integer(0),
            });
        }

        states.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then_with(|| b.rating.cmp(&a.rating))
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.player.cmp(&b.player))
        });

        Ok(states)
    }
}
