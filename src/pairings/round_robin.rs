//! Round-robin (Berger table) scheduling (spec.md §4.7).
//!
//! Unlike the Dutch pairer, a round-robin's entire schedule is fixed at
//! round 1: every later round's pairings are a deterministic function of the
//! player list and the round number alone, never of results so far.

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    rounds::{ByeType, Pairing},
};

/// Produces round `round`'s pairings for a round-robin held in `section`,
/// using the standard Berger rotation: player 0 is fixed, the rest rotate
/// one position clockwise each round. An odd player count gets a ghost seat
/// whose "opponent" receives a pairing-allocated bye. Colors alternate by a
/// fixed parity rule so that across a full cycle each pair meets once with
/// each color split as evenly as the round count allows.
pub fn pair_round_robin(
    players: &PlayerRegistry,
    section: SectionId,
    round: u32,
) -> Result<Vec<Pairing>, PairingError> {
    let mut ids: Vec<PlayerId> = players.bracketable_in_section(section).map(|p| p.id).collect();
    ids.sort();

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let ghost = ids.len() % 2 == 1;
    let n = if ghost { ids.len() + 1 } else { ids.len() };
    let total_rounds = n - 1;
    if round == 0 || round as usize > total_rounds {
        return Err(PairingError::ConfigurationError(format!(
            "round {round} is out of range for a {n}-player round robin ({total_rounds} rounds)"
        )));
    }

    // Berger rotation: seat 0 is fixed to the first id; the rest of the
    // field (plus a ghost slot if the roster is odd) forms a ring of size
    // n-1 that rotates by (round - 1) positions each round. The ghost lives
    // inside that ring rather than being pinned to a fixed seat, so the bye
    // it produces rotates through every player in turn.
    let mut ring: Vec<Option<PlayerId>> = ids[1..].iter().map(|&id| Some(id)).collect();
    if ghost {
        ring.push(None);
    }
    let mut seats: Vec<Option<PlayerId>> = Vec::with_capacity(n);
    seats.push(ids.first().copied());
    for i in 1..n {
        let rotated = (i - 1 + (round as usize - 1)) % ring.len();
        seats.push(ring[rotated]);
    }

    let mut pairings = Vec::with_capacity(n / 2);
    let mut board = 0u32;
    for i in 0..n / 2 {
        let a = seats[i];
        let b = seats[n - 1 - i];
        board += 1;
        match (a, b) {
            (Some(a), Some(b)) => {
                let (white, black) = berger_colors(a, b, i, round);
                pairings.push(Pairing {
                    round,
                    board,
                    section,
                    white_id: white,
                    black_id: Some(black),
                    bye_type: None,
                    result: None,
                });
            }
            (Some(present), None) | (None, Some(present)) => {
                pairings.push(Pairing {
                    round,
                    board,
                    section,
                    white_id: present,
                    black_id: None,
                    bye_type: Some(ByeType::PairingAllocatedFull),
                    result: None,
                });
            }
            (None, None) => {}
        }
    }
    Ok(pairings)
}

/// The standard Berger color rule: board 0 (the fixed seat) alternates by
/// round parity; every other board takes the opposite of the board above
/// it, so colors stay as balanced as an odd round count allows.
fn berger_colors(a: PlayerId, b: PlayerId, board_index: usize, round: u32) -> (PlayerId, PlayerId) {
    let board_zero_is_white_a = round % 2 == 1;
    let a_is_white = if board_index == 0 {
        board_zero_is_white_a
    } else {
        (board_index % 2 == 0) == board_zero_is_white_a
    };
    if a_is_white {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::players::Player;

    fn roster(n: usize) -> (PlayerRegistry, SectionId, Vec<PlayerId>) {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let mut ids = Vec::new();
        for i in 0..n {
            let p = Player::new(format!("P{i}"), section);
            ids.push(p.id);
            players.register(p).unwrap();
        }
        ids.sort();
        (players, section, ids)
    }

    #[test]
    fn even_roster_has_no_byes_and_pairs_everyone_every_round() {
        let (players, section, ids) = roster(4);
        for round in 1..=3 {
            let pairings = pair_round_robin(&players, section, round).unwrap();
            assert_eq!(pairings.len(), 2);
            assert!(pairings.iter().all(|p| !p.is_bye()));
            let mut seen: Vec<PlayerId> = pairings.iter().flat_map(|p| p.players()).collect();
            seen.sort();
            assert_eq!(seen, ids);
        }
    }

    #[test]
    fn odd_roster_gives_exactly_one_bye_per_round() {
        let (players, section, _) = roster(5);
        for round in 1..=5 {
            let pairings = pair_round_robin(&players, section, round).unwrap();
            let byes: Vec<_> = pairings.iter().filter(|p| p.is_bye()).collect();
            assert_eq!(byes.len(), 1, "round {round} should have exactly one bye");
        }
    }

    #[test]
    fn every_pair_meets_exactly_once_across_the_full_cycle() {
        let (players, section, ids) = roster(4);
        let mut seen_pairs = std::collections::HashSet::new();
        for round in 1..=3 {
            let pairings = pair_round_robin(&players, section, round).unwrap();
            for p in pairings {
                let mut pair = [p.white_id, p.black_id.unwrap()];
                pair.sort();
                assert!(seen_pairs.insert(pair), "pair {pair:?} repeated");
            }
        }
        let expected_pairs = ids.len() * (ids.len() - 1) / 2;
        assert_eq!(seen_pairs.len(), expected_pairs);
    }

    #[test]
    fn round_out_of_range_is_a_configuration_error() {
        let (players, section, _) = roster(4);
        assert!(pair_round_robin(&players, section, 4).is_err());
    }
}
