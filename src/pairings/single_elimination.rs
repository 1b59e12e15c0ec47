//! Seeded single-elimination bracket pairing (spec.md §4.7).
//!
//! Unlike Swiss and round-robin, a bracket round's pairings depend on which
//! seeds *won* their previous-round match, not merely on round number. Round
//! 1 is seeded by rating; every later round pairs the winners who advanced,
//! in bracket order.

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    rounds::{ByeType, GameOutcome, Pairing, RoundRegistry},
};

/// Produces round `round`'s pairings for a single-elimination bracket.
///
/// `round == 1`: players are seeded by rating descending (ties broken by
/// ascending id) into a bracket of size `2.pow(ceil(log2(n)))`; the lowest
/// seeds get a first-round bye so the field halves cleanly thereafter.
///
/// `round > 1`: advances the winner of each of the previous round's
/// pairings (a bye counts as a win for its sole occupant) and pairs
/// consecutive advancing players in bracket order.
pub fn pair_single_elimination(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    round: u32,
) -> Result<Vec<Pairing>, PairingError> {
    if round == 1 {
        return pair_first_round(players, section);
    }

    let previous = rounds.pairings_for(section, round - 1);
    if previous.is_empty() {
        return Err(PairingError::InvalidSnapshot(format!(
            "no round {} bracket to advance from",
            round - 1
        )));
    }

    let mut advancing = Vec::with_capacity(previous.len());
    for pairing in previous {
        advancing.push(winner_of(pairing)?);
    }

    if advancing.len() == 1 {
        return Ok(Vec::new());
    }

    let mut pairings = Vec::with_capacity(advancing.len() / 2);
    let mut board = 0u32;
    for pair in advancing.chunks(2) {
        board += 1;
        match pair {
            [a, b] => pairings.push(Pairing {
                round,
                board,
                section,
                white_id: *a,
                black_id: Some(*b),
                bye_type: None,
                result: None,
            }),
            [a] => pairings.push(Pairing {
                round,
                board,
                section,
                white_id: *a,
                black_id: None,
                bye_type: Some(ByeType::PairingAllocatedFull),
                result: None,
            }),
            _ => unreachable!("chunks(2) never yields more than 2"),
        }
    }
    Ok(pairings)
}

fn winner_of(pairing: &Pairing) -> Result<PlayerId, PairingError> {
    if pairing.is_bye() {
        return Ok(pairing.white_id);
    }
    match pairing.result {
        Some(GameOutcome::WhiteWin) => Ok(pairing.white_id),
        Some(GameOutcome::BlackWin) => Ok(pairing.black_id.expect("non-bye pairing has black")),
        Some(GameOutcome::UnplayedForfeit) => Err(PairingError::InvalidSnapshot(format!(
            "board {} ended in an unplayed forfeit with no declared winner",
            pairing.board
        ))),
        Some(GameOutcome::Draw) => Err(PairingError::InvalidSnapshot(format!(
            "board {} is drawn; single elimination requires a decisive result or arbiter-assigned winner",
            pairing.board
        ))),
        None => Err(PairingError::RoundIncomplete {
            round: pairing.round,
            missing_count: 1,
            sections: vec![pairing.section],
        }),
    }
}

fn pair_first_round(players: &PlayerRegistry, section: SectionId) -> Result<Vec<Pairing>, PairingError> {
    let mut seeded: Vec<PlayerId> = players.bracketable_in_section(section).map(|p| p.id).collect();
    seeded.sort_by(|a, b| {
        let pa = players.get(a).expect("seeded id came from this registry");
        let pb = players.get(b).expect("seeded id came from this registry");
        pb.rating.cmp(&pa.rating).then_with(|| a.cmp(b))
    });

    if seeded.is_empty() {
        return Ok(Vec::new());
    }

    let bracket_size = seeded.len().next_power_of_two();
    let slots = standard_bracket_slots(bracket_size);

    let mut pairings = Vec::with_capacity(bracket_size / 2);
    let mut board = 0u32;
    for chunk in slots.chunks(2) {
        let top_seed = chunk[0];
        let bottom_seed = chunk[1];
        let top = seeded.get(top_seed).copied();
        let bottom = seeded.get(bottom_seed).copied();
        board += 1;
        match (top, bottom) {
            (Some(a), Some(b)) => pairings.push(Pairing {
                round: 1,
                board,
                section,
                white_id: a,
                black_id: Some(b),
                bye_type: None,
                result: None,
            }),
            (Some(a), None) | (None, Some(a)) => pairings.push(Pairing {
                round: 1,
                board,
                section,
                white_id: a,
                black_id: None,
                bye_type: Some(ByeType::PairingAllocatedFull),
                result: None,
            }),
            (None, None) => {}
        }
    }
    Ok(pairings)
}

/// The standard tournament-bracket seed order for a field of `size`
/// (1 vs size, 2 vs size-1 by recursive halving), so that seed 1 and seed 2
/// can only meet in the final.
fn standard_bracket_slots(size: usize) -> Vec<usize> {
    let mut slots = vec![0usize, 1usize];
    while slots.len() < size {
        let round_size = slots.len() * 2;
        let mut next = Vec::with_capacity(round_size);
        for &slot in &slots {
            next.push(slot);
            next.push(round_size - 1 - slot);
        }
        slots = next;
    }
    slots
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::players::Player;

    fn rated_roster(ratings: &[u32]) -> (PlayerRegistry, SectionId, Vec<PlayerId>) {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let mut ids = Vec::new();
        for (i, &rating) in ratings.iter().enumerate() {
            let mut p = Player::new(format!("P{i}"), section);
            p.rating = rating;
            ids.push(p.id);
            players.register(p).unwrap();
        }
        (players, section, ids)
    }

    #[test]
    fn top_two_seeds_cannot_meet_in_round_one_of_an_eight_player_bracket() {
        let (players, section, ids) = rated_roster(&[2400, 2300, 2200, 2100, 2000, 1900, 1800, 1700]);
        let pairings = pair_first_round(&players, section).unwrap();
        assert_eq!(pairings.len(), 4);
        assert!(pairings.iter().all(|p| {
            let players_in = [p.white_id, p.black_id.unwrap()];
            !(players_in.contains(&ids[0]) && players_in.contains(&ids[1]))
        }));
    }

    #[test]
    fn non_power_of_two_field_gives_top_seeds_byes() {
        let (players, section, ids) = rated_roster(&[2400, 2300, 2200, 2100, 2000, 1900]);
        let pairings = pair_first_round(&players, section).unwrap();
        let byes: Vec<_> = pairings.iter().filter(|p| p.is_bye()).collect();
        assert_eq!(byes.len(), 2);
        for bye in byes {
            assert!(ids[0..2].contains(&bye.white_id) || ids[0] == bye.white_id);
        }
    }

    #[test]
    fn round_two_advances_winners_only() {
        let (players, section, ids) = rated_roster(&[2400, 2300, 2200, 2100]);
        let mut rounds = RoundRegistry::new();
        let r1 = vec![
            Pairing {
                round: 1,
                board: 1,
                section,
                white_id: ids[0],
                black_id: Some(ids[3]),
                bye_type: None,
                result: Some(GameOutcome::WhiteWin),
            },
            Pairing {
                round: 1,
                board: 2,
                section,
                white_id: ids[1],
                black_id: Some(ids[2]),
                bye_type: None,
                result: Some(GameOutcome::BlackWin),
            },
        ];
        rounds.store(section, 1, r1).unwrap();

        let r2 = pair_single_elimination(&players, &rounds, section, 2).unwrap();
        assert_eq!(r2.len(), 1);
        let in_match = [r2[0].white_id, r2[0].black_id.unwrap()];
        assert!(in_match.contains(&ids[0]));
        assert!(in_match.contains(&ids[2]));
    }

    #[test]
    fn incomplete_previous_round_blocks_advancement() {
        let (players, section, ids) = rated_roster(&[2400, 2300]);
        let mut rounds = RoundRegistry::new();
        rounds
            .store(
                section,
                1,
                vec![Pairing {
                    round: 1,
                    board: 1,
                    section,
                    white_id: ids[0],
                    black_id: Some(ids[1]),
                    bye_type: None,
                    result: None,
                }],
            )
            .unwrap();
        let err = pair_single_elimination(&players, &rounds, section, 2).unwrap_err();
        assert!(matches!(err, PairingError::RoundIncomplete { .. }));
    }
}
