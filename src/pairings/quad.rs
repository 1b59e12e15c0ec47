//! Groups-of-four round robin pairing ("quads", spec.md §4.7).
//!
//! Players are split into fixed groups of `quad.group_size` (normally 4) by
//! rating, then each full group plays a 3-round round robin using the
//! standard USCF quad table. A group that comes up short (the tail of an
//! odd-sized section) either gets a bye-bearing rotation of its own or, if
//! `quad.cross_group_pairings` is set, is folded into the previous group
//! and paired by the same rotation scaled up.

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    players::PlayerRegistry,
    rounds::{ByeType, Pairing},
    settings::QuadSettings,
};

/// The three-round USCF quad table for a full group of four: board-one and
/// board-two seat pairs for each round.
const QUAD_TABLE: [[(usize, usize); 2]; 3] = [
    [(0, 3), (1, 2)],
    [(2, 0), (3, 1)],
    [(0, 1), (2, 3)],
];

/// Produces round `round`'s (1-based, 1..=3) pairings for every quad group
/// in `section`.
pub fn pair_quads(
    players: &PlayerRegistry,
    section: SectionId,
    round: u32,
    settings: &QuadSettings,
) -> Result<Vec<Pairing>, PairingError> {
    if round == 0 || round > 3 {
        return Err(PairingError::ConfigurationError(format!(
            "round {round} is out of range for a quad (rounds 1..=3 only)"
        )));
    }

    let mut seeded: Vec<PlayerId> = players.bracketable_in_section(section).map(|p| p.id).collect();
    seeded.sort_by(|a, b| {
        let pa = players.get(a).expect("seeded id came from this registry");
        let pb = players.get(b).expect("seeded id came from this registry");
        pb.rating.cmp(&pa.rating).then_with(|| a.cmp(b))
    });

    let group_size = settings.group_size.max(2) as usize;
    let mut groups: Vec<Vec<PlayerId>> = seeded.chunks(group_size).map(|c| c.to_vec()).collect();

    if settings.cross_group_pairings {
        merge_short_final_group(&mut groups, group_size);
    }

    let mut pairings = Vec::new();
    let mut board = 0u32;
    for group in &groups {
        board = pair_one_group(group, section, round, group_size, board, &mut pairings);
    }
    Ok(pairings)
}

/// If the last group is short of a full quad, folds it into the
/// second-to-last group so its players get real opponents for all three
/// rounds instead of standing rotation byes within a rump group.
fn merge_short_final_group(groups: &mut Vec<Vec<PlayerId>>, group_size: usize) {
    if groups.len() < 2 {
        return;
    }
    let last_len = groups.last().expect("checked len >= 2").len();
    if last_len < group_size {
        let short = groups.pop().expect("checked len >= 2");
        groups.last_mut().expect("checked len >= 2").extend(short);
    }
}

/// Pairs a single group for `round`. A group of exactly `group_size` uses
/// the canonical quad table; any other size (a short rump group, or a
/// cross-group merge) falls back to a Berger-style rotation, which
/// degrades gracefully to the right shape at the small sizes a quad
/// actually produces: a lone leftover player byes every round, a pair
/// plays each other every round, and a trio rotates the bye one seat per
/// round — exactly spanning the 3 rounds a quad runs.
fn pair_one_group(
    group: &[PlayerId],
    section: SectionId,
    round: u32,
    group_size: usize,
    mut board: u32,
    out: &mut Vec<Pairing>,
) -> u32 {
    let boards: Vec<(Option<PlayerId>, Option<PlayerId>)> = if group.len() == group_size {
        let table_round = &QUAD_TABLE[(round - 1) as usize];
        table_round
            .iter()
            .map(|&(a, b)| (group.get(a).copied(), group.get(b).copied()))
            .collect()
    } else {
        berger_rotation(group, round)
    };

    for pair in boards {
        board += 1;
        match pair {
            (Some(white), Some(black)) => out.push(Pairing {
                round,
                board,
                section,
                white_id: white,
                black_id: Some(black),
                bye_type: None,
                result: None,
            }),
            (Some(present), None) | (None, Some(present)) => out.push(Pairing {
                round,
                board,
                section,
                white_id: present,
                black_id: None,
                bye_type: Some(ByeType::PairingAllocatedFull),
                result: None,
            }),
            (None, None) => board -= 1,
        }
    }
    board
}

/// A single round of the standard Berger rotation over `ids` (ghost seat
/// added if odd), fixing seat 0 and rotating the rest by `round - 1`
/// positions. Shared in spirit with `round_robin::pair_round_robin`, but
/// kept local since it only ever needs to run for `round <= 3` here.
fn berger_rotation(ids: &[PlayerId], round: u32) -> Vec<(Option<PlayerId>, Option<PlayerId>)> {
    if ids.is_empty() {
        return Vec::new();
    }
    let ghost = ids.len() % 2 == 1;
    let n = if ghost { ids.len() + 1 } else { ids.len() };

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

    (0..n / 2).map(|i| (seats[i], seats[n - 1 - i])).collect()
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
            let mut p = Player::new(format!("P{i}"), section);
            p.rating = 2000 - i as u32 * 10;
            ids.push(p.id);
            players.register(p).unwrap();
        }
        (players, section, ids)
    }

    #[test]
    fn eight_players_form_two_full_quads() {
        let (players, section, _) = roster(8);
        let settings = QuadSettings::default();
        for round in 1..=3 {
            let pairings = pair_quads(&players, section, round, &settings).unwrap();
            assert_eq!(pairings.len(), 4);
            assert!(pairings.iter().all(|p| !p.is_bye()));
        }
    }

    #[test]
    fn every_player_in_a_full_quad_meets_every_other_exactly_once() {
        let (players, section, ids) = roster(4);
        let settings = QuadSettings::default();
        let mut seen = std::collections::HashSet::new();
        for round in 1..=3 {
            let pairings = pair_quads(&players, section, round, &settings).unwrap();
            for p in pairings {
                let mut pair = [p.white_id, p.black_id.unwrap()];
                pair.sort();
                assert!(seen.insert(pair));
            }
        }
        assert_eq!(seen.len(), ids.len() * (ids.len() - 1) / 2);
    }

    #[test]
    fn a_trailing_pair_plays_each_other_every_round_with_no_byes() {
        let (players, section, _) = roster(6);
        let settings = QuadSettings::default();
        for round in 1..=3 {
            let pairings = pair_quads(&players, section, round, &settings).unwrap();
            let byes: Vec<_> = pairings.iter().filter(|p| p.is_bye()).collect();
            assert!(byes.is_empty(), "round {round} should have no byes for a leftover pair");
        }
    }

    #[test]
    fn a_trailing_trio_rotates_the_bye_across_three_rounds() {
        let (players, section, ids) = roster(7);
        let settings = QuadSettings::default();
        let trio = &ids[4..7];
        let mut byed = Vec::new();
        for round in 1..=3 {
            let pairings = pair_quads(&players, section, round, &settings).unwrap();
            let bye = pairings
                .iter()
                .find(|p| p.is_bye() && trio.contains(&p.white_id))
                .expect("trio has exactly one bye per round");
            byed.push(bye.white_id);
        }
        byed.sort();
        let mut expected = trio.to_vec();
        expected.sort();
        assert_eq!(byed, expected);
    }

    #[test]
    fn cross_group_pairings_folds_the_short_group_in() {
        let (players, section, _) = roster(6);
        let settings = QuadSettings {
            group_size: 4,
            cross_group_pairings: true,
        };
        let pairings = pair_quads(&players, section, 1, &settings).unwrap();
        assert!(pairings.iter().all(|p| !p.is_bye()));
        assert_eq!(pairings.len(), 3);
    }

    #[test]
    fn round_out_of_range_is_rejected() {
        let (players, section, _) = roster(4);
        assert!(pair_quads(&players, section, 4, &QuadSettings::default()).is_err());
    }
}
