//! Pairing variants (spec.md §4.7) and the dispatcher that selects one.
//!
//! Every variant is a pure function of (players, rounds, section, round,
//! config) to `Vec<Pairing>`; only the Dutch Swiss pairer additionally
//! reports per-player float direction, since floats are meaningful only to
//! its own bracketing scheme.

use std::collections::HashMap;

use crate::{
    error::PairingError,
    identifiers::SectionId,
    identifiers::PlayerId,
    players::PlayerRegistry,
    rounds::{FloatDirection, Pairing, RoundRegistry},
    settings::TournamentConfig,
};

/// Acceleration bonuses applied to brackets before Dutch pairing.
pub mod acceleration;
/// Bye allocation shared by the Dutch pairer.
pub mod bye;
/// The seven-step color assignment cascade.
pub mod color;
/// Groups-of-four round robins.
pub mod quad;
/// Berger-table round-robin scheduling.
pub mod round_robin;
/// Seeded single-elimination brackets.
pub mod single_elimination;
/// The Dutch Swiss-system pairer.
pub mod swiss;
/// Team-level Swiss pairing with per-board pairing inside each match.
pub mod team_swiss;

/// Produces round `round`'s pairings for `section`, dispatching on
/// `config.format`. Only `TournamentFormat::Swiss` produces a non-empty
/// float map; every other variant returns an empty one, since floats are a
/// concept specific to Dutch bracketing.
pub fn generate_section_pairings(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    round: u32,
    config: &TournamentConfig,
) -> Result<(Vec<Pairing>, HashMap<PlayerId, FloatDirection>), PairingError> {
    use crate::settings::TournamentFormat::*;
    match config.format {
        Swiss => swiss::pair_swiss_round(players, rounds, section, round, config),
        RoundRobin => round_robin::pair_round_robin(players, section, round).map(|p| (p, HashMap::new())),
        SingleElimination => {
            single_elimination::pair_single_elimination(players, rounds, section, round)
                .map(|p| (p, HashMap::new()))
        }
        Quad => quad::pair_quads(players, section, round, &config.quad).map(|p| (p, HashMap::new())),
        TeamSwiss => {
            team_swiss::pair_team_swiss(players, rounds, section, round).map(|p| (p, HashMap::new()))
        }
    }
}
