//! The Dutch Swiss-system pairer (spec.md §4.2): the central algorithm.

use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    pairings::{
        acceleration,
        bye::{allocate_byes, bye_type_for_bucket, ByeBucket},
        color::assign_colors,
    },
    players::PlayerRegistry,
    rounds::{FloatDirection, Pairing, RoundRegistry},
    settings::TournamentConfig,
    state::{PlayerState, PlayerStateBuilder},
};

/// A resolved pair, prior to board numbering.
struct ProducedPair {
    white: PlayerId,
    black: PlayerId,
}

/// Runs the Dutch pairer for (section, round), returning the produced
/// pairings (unnumbered results stay `None`) and the float direction each
/// floated player experienced this round.
pub fn pair_swiss_round(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    round: u32,
    config: &TournamentConfig,
) -> Result<(Vec<Pairing>, HashMap<PlayerId, FloatDirection>), PairingError> {
    let states = PlayerStateBuilder::build(
        players,
        rounds,
        section,
        round,
        &config.scoring,
        &config.bye_settings,
    )?;

    let partition = allocate_byes(states, players, round, &config.bye_settings)?;

    let mut pool = partition.pool;
    acceleration::apply(&mut pool, &config.acceleration, round);

    let brackets = build_brackets(pool);
    let bracket_count = brackets.len();
    let mut floats: HashMap<PlayerId, FloatDirection> = HashMap::new();
    let mut produced: Vec<ProducedPair> = Vec::new();

    let mut carry: Vec<PlayerState> = Vec::new();
    for (idx, bracket) in brackets.into_iter().enumerate() {
        let has_next_bracket = idx + 1 < bracket_count;

        let mut combined = carry;
        combined.extend(bracket);
        sort_by_rating_desc(&mut combined);
        carry = Vec::new();

        let mut resection_attempts = 0;
        loop {
            // Keep `combined` even before every matching attempt: the
            // initial odd-pool float lands here, and so does any later
            // float forced by a failed match (which can cost a second
            // player its parity back).
            if combined.len() % 2 == 1 {
                let floater = combined.pop().expect("non-empty after odd check");
                floats.insert(floater.player, FloatDirection::Down);
                carry.push(floater);
                resection_attempts = 0;
                continue;
            }
            if combined.is_empty() {
                break;
            }
            let n = combined.len() / 2;
            let (s1, s2) = combined.split_at(n);
            let assignment = match_brackets(s1, s2);
            let violations: usize = (0..n)
                .filter(|&i| s1[i].opponents.contains(&s2[assignment[i]].player))
                .count();

            if violations == 0 {
                for i in 0..n {
                    let a = &s1[i];
                    let b = &s2[assignment[i]];
                    let (white, black) = assign_colors(a, b, true, i + 1);
                    produced.push(ProducedPair { white, black });
                }
                break;
            }

            if resection_attempts == 0 && combined.len() >= 4 {
                // A single resection: swap the lowest-rated S1 member with
                // the highest-rated S2 member and retry.
                let last_s1 = n - 1;
                combined.swap(last_s1, n);
                resection_attempts += 1;
                continue;
            }

            if has_next_bracket {
                let floater = combined.pop().expect("non-empty");
                floats.insert(floater.player, FloatDirection::Down);
                carry.push(floater);
                resection_attempts = 0;
                continue;
            }

            let bracket_ids: Vec<PlayerId> = combined.iter().map(|s| s.player).collect();
            return Err(PairingError::unpairable(
                "no legal Dutch assignment after transposition and resection",
                &bracket_ids,
            ));
        }
    }

    if !carry.is_empty() {
        let bracket_ids: Vec<PlayerId> = carry.iter().map(|s| s.player).collect();
        return Err(PairingError::invariant(
            "players remained unpaired after the final bracket",
            &bracket_ids,
        ));
    }

    let mut pairings = Vec::with_capacity(
        produced.len() + partition.requested.len() + partition.inactive.len() + 1,
    );
    let mut board = 0u32;
    for pair in produced {
        board += 1;
        pairings.push(Pairing {
            round,
            board,
            section,
            white_id: pair.white,
            black_id: Some(pair.black),
            bye_type: None,
            result: None,
        });
    }

    let mut bye_recipients: Vec<(PlayerId, ByeBucket)> = Vec::new();
    if let Some(p) = partition.pairing_allocated {
        bye_recipients.push((p, ByeBucket::PairingAllocated));
    }
    let mut requested = partition.requested.clone();
    requested.sort();
    bye_recipients.extend(requested.into_iter().map(|p| (p, ByeBucket::Requested)));
    let mut inactive = partition.inactive.clone();
    inactive.sort();
    bye_recipients.extend(inactive.into_iter().map(|p| (p, ByeBucket::Inactive)));

    for (player, bucket) in bye_recipients {
        board += 1;
        pairings.push(Pairing {
            round,
            board,
            section,
            white_id: player,
            black_id: None,
            bye_type: Some(bye_type_for_bucket(bucket)),
            result: None,
        });
    }

    Ok((pairings, floats))
}

/// Groups a pool of player states into score brackets, descending by
/// effective score.
fn build_brackets(mut pool: Vec<PlayerState>) -> Vec<Vec<PlayerState>> {
    sort_by_rating_desc(&mut pool);
    pool.sort_by(|a, b| b.effective_score().cmp(&a.effective_score()));

    let groups = pool.into_iter().group_by(|s| s.effective_score());
    groups.into_iter().map(|(_, group)| group.collect()).collect()
}

/// Sorts by rating descending, ties broken by ascending id.
fn sort_by_rating_desc(states: &mut [PlayerState]) {
    states.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.player.cmp(&b.player)));
}

/// Finds a minimum-cost assignment of `s1[i]` to `s2[assignment[i]]`,
/// penalizing repeat pairings heavily, then a pair whose due colors
/// collide (both players due the same color, so one's preference must go
/// unmet regardless of how `assign_colors` resolves it) moderately, and
/// otherwise preferring the natural Dutch diagonal (`s1[i]` with `s2[i]`)
/// as a deterministic tie-break. This is the "transposition search" of
/// spec.md §4.2: brute-force for small brackets and the bounded Hungarian
/// algorithm beyond that are the same code path here, since the Hungarian
/// algorithm always finds the provably optimal assignment in O(n^3).
pub(crate) fn match_brackets(s1: &[PlayerState], s2: &[PlayerState]) -> Vec<usize> {
    let n = s1.len();
    const REPEAT_PENALTY: i64 = 1_000_000;
    const COLOR_CONFLICT_PENALTY: i64 = 1_000;

    let mut cost = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in 0..n {
            let mut c = (i as i64 - j as i64).abs();
            if s1[i].opponents.contains(&s2[j].player) {
                c += REPEAT_PENALTY;
            } else if due_colors_collide(&s1[i], &s2[j]) {
                c += COLOR_CONFLICT_PENALTY;
            }
            cost[i][j] = c;
        }
    }
    hungarian_min_cost(&cost)
}

/// Whether `a` and `b` are both due the same color, so pairing them can
/// satisfy at most one of their preferences no matter how `assign_colors`
/// resolves it.
fn due_colors_collide(a: &PlayerState, b: &PlayerState) -> bool {
    matches!((a.due_color(), b.due_color()), (Some(wa), Some(wb)) if wa == wb)
}

/// Classic O(n^3) Kuhn-Munkres assignment algorithm for a square cost
/// matrix. Returns `assignment` such that `assignment[i]` is the column
/// matched to row `i`, minimizing total cost.
pub(crate) fn hungarian_min_cost(cost: &[Vec<i64>]) -> Vec<usize> {
    let n = cost.len();
    const INF: i64 = i64::MAX / 4;

    let mut u = vec![0i64; n + 1];
    let mut v = vec![0i64; n + 1];
    let mut p = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for i in 1..=n {
        p[0] = i;
        let mut j0 = 0usize;
        let mut minv = vec![INF; n + 1];
        let mut used = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0 = p[j0];
            let mut delta = INF;
            let mut j1 = 0usize;
            for j in 1..=n {
                if !used[j] {
                    let cur = cost[i0 - 1][j - 1] - u[i0] - v[j];
                    if cur < minv[j] {
                        minv[j] = cur;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[p[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if p[j0] == 0 {
                break;
            }
        }
        loop {
            let j1 = way[j0];
            p[j0] = p[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment = vec![0usize; n];
    for j in 1..=n {
        if p[j] != 0 {
            assignment[p[j] - 1] = j - 1;
        }
    }
    assignment
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        players::Player,
        rounds::GameOutcome,
        settings::TournamentConfig,
    };

    fn rated_player(players: &mut PlayerRegistry, section: crate::identifiers::SectionId, name: &str, rating: u32) -> PlayerId {
        let mut p = Player::new(name, section);
        p.rating = rating;
        let id = p.id;
        players.register(p).unwrap();
        id
    }

    fn colored_state(rating: u32, color_imbalance: i32) -> PlayerState {
        PlayerState {
            player: Uuid::new_v4().into(),
            rating,
            name: "player".into(),
            points: crate::r64::from_integer(0),
            opponents: std::collections::HashSet::new(),
            colors_played: Vec::new(),
            color_imbalance,
            had_pairing_allocated_bye: false,
            float_history: Vec::new(),
            acceleration_bonus: crate::r64::from_integer(0),
        }
    }

    #[test]
    fn match_brackets_trades_rank_distance_for_fewer_color_collisions() {
        // s1 and s2 each have one player due white and one due black, in the
        // same order, so the rank-preserving diagonal collides on both
        // boards. The transposition collides on neither, at the cost of a
        // larger rank distance — the matching objective must prefer it.
        let s1 = vec![colored_state(2000, -2), colored_state(1900, 2)];
        let s2 = vec![colored_state(1800, -2), colored_state(1700, 2)];
        let assignment = match_brackets(&s1, &s2);
        assert_eq!(assignment, vec![1, 0]);
    }

    #[test]
    fn round_one_pairs_top_half_against_bottom_half() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let ratings = [2200, 2100, 2050, 2000, 1950, 1900, 1800, 1700];
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let ids: Vec<PlayerId> = names
            .iter()
            .zip(ratings.iter())
            .map(|(n, r)| rated_player(&mut players, section, n, *r))
            .collect();

        let rounds = RoundRegistry::new();
        let config = TournamentConfig::default();
        let (pairings, floats) = pair_swiss_round(&players, &rounds, section, 1, &config).unwrap();

        assert!(floats.is_empty());
        assert_eq!(pairings.len(), 4);
        let expected = vec![
            (ids[0], ids[4]),
            (ids[1], ids[5]),
            (ids[2], ids[6]),
            (ids[3], ids[7]),
        ];
        for (pairing, (a, b)) in pairings.iter().zip(expected.iter()) {
            let pair = (pairing.white_id, pairing.black_id.unwrap());
            assert!(pair == (*a, *b) || pair == (*b, *a));
        }
    }

    #[test]
    fn odd_pool_gets_exactly_one_pairing_allocated_bye() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        for (name, rating) in [("A", 2000), ("B", 1900), ("C", 1800)] {
            rated_player(&mut players, section, name, rating);
        }
        let rounds = RoundRegistry::new();
        let config = TournamentConfig::default();
        let (pairings, _) = pair_swiss_round(&players, &rounds, section, 1, &config).unwrap();
        let byes: Vec<_> = pairings.iter().filter(|p| p.is_bye()).collect();
        assert_eq!(byes.len(), 1);
        assert_eq!(byes[0].bye_type, Some(crate::rounds::ByeType::PairingAllocatedFull));
    }

    #[test]
    fn fully_played_four_player_pocket_is_unpairable() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let ids: Vec<PlayerId> = ["A", "B", "C", "D"]
            .iter()
            .map(|n| rated_player(&mut players, section, n, 2000))
            .collect();

        let mut rounds = RoundRegistry::new();
        let all_pairs = [(0, 1), (2, 3), (0, 2), (1, 3), (0, 3), (1, 2)];
        for (round, (i, j)) in all_pairs.iter().enumerate() {
            let round = round as u32 + 1;
            rounds
                .store(
                    section,
                    round,
                    vec![Pairing {
                        round,
                        board: 1,
                        section,
                        white_id: ids[*i],
                        black_id: Some(ids[*j]),
                        bye_type: None,
                        result: Some(GameOutcome::Draw),
                    }],
                )
                .unwrap();
        }

        let config = TournamentConfig::default();
        let err = pair_swiss_round(&players, &rounds, section, 7, &config).unwrap_err();
        assert!(matches!(err, PairingError::UnpairableRound { .. }));
    }
}
