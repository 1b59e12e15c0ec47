//! Team-Swiss pairing (spec.md §4.7): Swiss pairing over team match points,
//! with board-by-board pairing inside each resulting match.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;

use crate::{
    error::PairingError,
    identifiers::{PlayerId, SectionId},
    pairings::swiss::hungarian_min_cost,
    players::PlayerRegistry,
    rounds::{GameOutcome, Pairing, RoundRegistry},
};

/// A team's derived state for one pairing computation: its accumulated
/// match points, the teams it has already faced, and its roster board-
/// ordered by descending rating (board 1 is the team's top board).
struct TeamState {
    name: String,
    match_points: i64, // in half-points: win=2, draw=1, loss=0
    opponents: HashSet<String>,
    roster: Vec<PlayerId>,
}

/// Produces round `round`'s pairings for a team event: teams are paired
/// Swiss-style on match points (repeat pairings avoided where possible),
/// then each match is filled in board by board.
pub fn pair_team_swiss(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    round: u32,
) -> Result<Vec<Pairing>, PairingError> {
    let teams = build_team_states(players, rounds, section, round)?;
    if teams.is_empty() {
        return Ok(Vec::new());
    }

    // Bracket teams by match points, highest first, carrying any team that
    // can't be paired within its own bracket down to the next one — the
    // same top-down float policy the individual Dutch pairer uses, minus
    // resection (team counts are small enough that a carried float nearly
    // always resolves immediately).
    let mut by_points: Vec<&TeamState> = teams.iter().collect();
    by_points.sort_by(|a, b| {
        b.match_points
            .cmp(&a.match_points)
            .then_with(|| a.name.cmp(&b.name))
    });
    let groups = by_points.into_iter().group_by(|t| t.match_points);
    let brackets: Vec<Vec<&TeamState>> = groups.into_iter().map(|(_, g)| g.collect()).collect();

    let mut matched_out: Vec<Pairing> = Vec::new();
    let mut board = 0u32;
    let mut bye_team: Option<&TeamState> = None;
    let mut carry: Vec<&TeamState> = Vec::new();

    for bracket in brackets {
        let mut combined = carry;
        combined.extend(bracket);
        carry = Vec::new();

        if combined.len() % 2 == 1 {
            let floater = combined.pop().expect("non-empty after odd check");
            carry.push(floater);
        }
        if combined.is_empty() {
            continue;
        }

        let n = combined.len() / 2;
        let (s1, s2) = combined.split_at(n);
        let assignment = match_teams(s1, s2);
        for (i, &opp_idx) in assignment.iter().enumerate() {
            let team_a = s1[i];
            let team_b = s2[opp_idx];
            let team1_is_white_base = (i % 2 == 0) == (round % 2 == 1);
            for board_pair in team_a.roster.iter().zip(team_b.roster.iter()) {
                board += 1;
                let (white, black) = if team1_is_white_base == (board % 2 == 1) {
                    (*board_pair.0, *board_pair.1)
                } else {
                    (*board_pair.1, *board_pair.0)
                };
                matched_out.push(Pairing {
                    round,
                    board,
                    section,
                    white_id: white,
                    black_id: Some(black),
                    bye_type: None,
                    result: None,
                });
            }
        }
    }

    if let Some(last) = carry.pop() {
        bye_team = Some(last);
    }

    if let Some(bye) = bye_team {
        for &player in &bye.roster {
            board += 1;
            matched_out.push(Pairing {
                round,
                board,
                section,
                white_id: player,
                black_id: None,
                bye_type: Some(crate::rounds::ByeType::PairingAllocatedFull),
                result: None,
            });
        }
    }

    Ok(matched_out)
}

/// Minimum-cost matching of the top half (`s1`) against the bottom half
/// (`s2`) of a bracket, mirrored so the top seed meets the bottom seed (for
/// 4 teams ranked 1..4: 1 vs 4, 2 vs 3) rather than paired straight across
/// — the same top-vs-bottom seeding convention a single-elimination bracket
/// uses. Heavily penalized for teams that have already played. Reuses the
/// same Hungarian solver the individual Dutch pairer uses for transposition
/// search.
fn match_teams(s1: &[&TeamState], s2: &[&TeamState]) -> Vec<usize> {
    let n = s1.len();
    const REPEAT_PENALTY: i64 = 1_000_000;
    let mut cost = vec![vec![0i64; n]; n];
    for i in 0..n {
        for j in 0..n {
            let mirrored_j = n as i64 - 1 - j as i64;
            let mut c = (i as i64 - mirrored_j).abs();
            if s1[i].opponents.contains(&s2[j].name) {
                c += REPEAT_PENALTY;
            }
            cost[i][j] = c;
        }
    }
    hungarian_min_cost(&cost)
}

/// Builds one `TeamState` per distinct `Player::team`, ordered within each
/// roster by rating descending. Players with no team are ignored (team
/// Swiss is only meaningful for fully-rostered teams).
fn build_team_states(
    players: &PlayerRegistry,
    rounds: &RoundRegistry,
    section: SectionId,
    round: u32,
) -> Result<Vec<TeamState>, PairingError> {
    let mut rosters: HashMap<String, Vec<PlayerId>> = HashMap::new();
    for player in players.bracketable_in_section(section) {
        if let Some(team) = &player.team {
            rosters.entry(team.clone()).or_default().push(player.id);
        }
    }

    let mut player_team: HashMap<PlayerId, String> = HashMap::new();
    for (team, roster) in &rosters {
        for &p in roster {
            player_team.insert(p, team.clone());
        }
    }

    let mut match_points: HashMap<String, i64> = HashMap::new();
    let mut opponents: HashMap<String, HashSet<String>> = HashMap::new();
    for past_round in 1..round {
        let mut game_points: HashMap<String, i64> = HashMap::new();
        let mut faced: HashMap<String, String> = HashMap::new();
        for pairing in rounds.pairings_for(section, past_round) {
            let Some(black) = pairing.black_id else { continue };
            let (Some(white_team), Some(black_team)) =
                (player_team.get(&pairing.white_id), player_team.get(&black))
            else {
                continue;
            };
            if white_team == black_team {
                continue;
            }
            let (white_points, black_points) = match pairing.result {
                Some(GameOutcome::WhiteWin) => (2, 0),
                Some(GameOutcome::BlackWin) => (0, 2),
                Some(GameOutcome::Draw) => (1, 1),
                Some(GameOutcome::UnplayedForfeit) | None => (0, 0),
            };
            *game_points.entry(white_team.clone()).or_default() += white_points;
            *game_points.entry(black_team.clone()).or_default() += black_points;
            faced.insert(white_team.clone(), black_team.clone());
            faced.insert(black_team.clone(), white_team.clone());
        }
        for (team, opp) in &faced {
            opponents.entry(team.clone()).or_default().insert(opp.clone());
        }
        let teams_this_round: HashSet<String> = faced.keys().cloned().collect();
        for team in teams_this_round {
            let own = *game_points.get(&team).unwrap_or(&0);
            let opp_team = &faced[&team];
            let opp = *game_points.get(opp_team).unwrap_or(&0);
            let delta = match own.cmp(&opp) {
                std::cmp::Ordering::Greater => 2,
                std::cmp::Ordering::Equal => 1,
                std::cmp::Ordering::Less => 0,
            };
            *match_points.entry(team).or_default() += delta;
        }
    }

    let mut states = Vec::with_capacity(rosters.len());
    for (name, mut roster) in rosters {
        roster.sort_by(|a, b| {
            let pa = players.get(a).expect("roster id came from this registry");
            let pb = players.get(b).expect("roster id came from this registry");
            pb.rating.cmp(&pa.rating).then_with(|| a.cmp(b))
        });
        states.push(TeamState {
            match_points: *match_points.get(&name).unwrap_or(&0),
            opponents: opponents.get(&name).cloned().unwrap_or_default(),
            roster,
            name,
        });
    }
    states.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(states)
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::players::Player;

    fn team_roster(
        players: &mut PlayerRegistry,
        section: SectionId,
        team: &str,
        ratings: &[u32],
    ) -> Vec<PlayerId> {
        let mut ids = Vec::new();
        for (i, &rating) in ratings.iter().enumerate() {
            let mut p = Player::new(format!("{team}-{i}"), section).with_team(team);
            p.rating = rating;
            ids.push(p.id);
            players.register(p).unwrap();
        }
        ids
    }

    #[test]
    fn four_teams_pair_top_half_against_bottom_half_in_round_one() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        team_roster(&mut players, section, "Alpha", &[2400, 2300]);
        team_roster(&mut players, section, "Bravo", &[2200, 2100]);
        team_roster(&mut players, section, "Charlie", &[2000, 1900]);
        team_roster(&mut players, section, "Delta", &[1800, 1700]);
        let rounds = RoundRegistry::new();

        let pairings = pair_team_swiss(&players, &rounds, section, 1).unwrap();
        assert_eq!(pairings.len(), 4);
        assert!(pairings.iter().all(|p| !p.is_bye()));
    }

    #[test]
    fn odd_team_count_gives_the_last_team_a_full_bye() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        team_roster(&mut players, section, "Alpha", &[2400, 2300]);
        team_roster(&mut players, section, "Bravo", &[2200, 2100]);
        team_roster(&mut players, section, "Charlie", &[2000, 1900]);
        let rounds = RoundRegistry::new();

        let pairings = pair_team_swiss(&players, &rounds, section, 1).unwrap();
        let byes: Vec<_> = pairings.iter().filter(|p| p.is_bye()).collect();
        assert_eq!(byes.len(), 2);
    }

    #[test]
    fn four_teams_seed_one_meets_seed_four_in_round_one() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let alpha = team_roster(&mut players, section, "Alpha", &[2400, 2300]);
        let bravo = team_roster(&mut players, section, "Bravo", &[2200, 2100]);
        let charlie = team_roster(&mut players, section, "Charlie", &[2000, 1900]);
        let delta = team_roster(&mut players, section, "Delta", &[1800, 1700]);
        let rounds = RoundRegistry::new();

        let pairings = pair_team_swiss(&players, &rounds, section, 1).unwrap();
        let match_of = |a: PlayerId, b: PlayerId| {
            pairings.iter().any(|p| {
                (p.white_id == a && p.black_id == Some(b)) || (p.white_id == b && p.black_id == Some(a))
            })
        };
        assert!(match_of(alpha[0], delta[0]), "seed 1 (Alpha) should meet seed 4 (Delta)");
        assert!(match_of(bravo[0], charlie[0]), "seed 2 (Bravo) should meet seed 3 (Charlie)");
    }

    #[test]
    fn board_colors_alternate_within_a_single_match() {
        let section: SectionId = Uuid::new_v4().into();
        let mut players = PlayerRegistry::new();
        let alpha = team_roster(&mut players, section, "Alpha", &[2400, 2300]);
        team_roster(&mut players, section, "Bravo", &[2200, 2100]);
        let rounds = RoundRegistry::new();

        let pairings = pair_team_swiss(&players, &rounds, section, 1).unwrap();
        assert_eq!(pairings.len(), 2);
        // Board 1: Alpha's top board has white. Board 2: the same match's
        // second board flips, so Alpha's second board has black.
        assert_eq!(pairings[0].white_id, alpha[0]);
        assert_eq!(pairings[1].black_id, Some(alpha[1]));
    }
}
