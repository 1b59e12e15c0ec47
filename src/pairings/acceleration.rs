//! Acceleration schemes (spec.md §4.6). Acceleration only ever adjusts
//! `PlayerState::acceleration_bonus`, the effective score used to build
//! brackets; it never touches `points` or standings.

use crate::{
    r64,
    settings::{AccelerationSettings, AccelerationType},
    state::PlayerState,
};

/// Applies `settings` to `states` in place, for pairing round `round`
/// (1-based). A no-op if acceleration is disabled or `round` is past the
/// configured window.
pub fn apply(states: &mut [PlayerState], settings: &AccelerationSettings, round: u32) {
    if !settings.enabled {
        return;
    }
    match settings.accel_type {
        AccelerationType::Standard => apply_standard(states, settings, round),
        AccelerationType::AddedScore => apply_added_score(states, settings, round),
        AccelerationType::Sixths => apply_sixths(states, round),
        AccelerationType::AllRounds => apply_all_rounds(states, settings),
    }
}

/// Ranks `states` by rating descending and returns the top `count` indices,
/// ties broken by ascending id (spec.md's universal determinism rule).
fn top_by_rating(states: &[PlayerState], count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..states.len()).collect();
    order.sort_by(|&i, &j| {
        states[j]
            .rating
            .cmp(&states[i].rating)
            .then_with(|| states[i].player.cmp(&states[j].player))
    });
    order.into_iter().take(count).collect()
}

fn half(len: usize) -> usize {
    len.div_ceil(2)
}

fn apply_standard(states: &mut [PlayerState], settings: &AccelerationSettings, round: u32) {
    let bonus = if round == 1 {
        r64::from_integer(1)
    } else if round == settings.break_point {
        r64::new(1, 2)
    } else {
        return;
    };
    let top = top_by_rating(states, half(states.len()));
    for i in top {
        states[i].acceleration_bonus = bonus;
    }
}

fn apply_added_score(states: &mut [PlayerState], settings: &AccelerationSettings, round: u32) {
    if round > settings.rounds {
        return;
    }
    let top = top_by_rating(states, half(states.len()));
    for i in top {
        states[i].acceleration_bonus = settings.added_score;
    }
}

fn apply_sixths(states: &mut [PlayerState], round: u32) {
    let len = states.len();
    match round {
        1 => {
            let top = top_by_rating(states, len.div_ceil(6));
            for i in top {
                states[i].acceleration_bonus = r64::from_integer(1);
            }
        }
        2 => {
            let top = top_by_rating(states, len.div_ceil(3));
            for i in top {
                states[i].acceleration_bonus = r64::new(1, 2);
            }
        }
        _ => {}
    }
}

fn apply_all_rounds(states: &mut [PlayerState], settings: &AccelerationSettings) {
    let top = top_by_rating(states, half(states.len()));
    for i in top {
        states[i].acceleration_bonus = settings.added_score;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use uuid::Uuid;

    use super::*;
    use crate::settings::AccelerationType;

    fn state(rating: u32) -> PlayerState {
        PlayerState {
            player: Uuid::new_v4().into(),
            rating,
            name: "p".into(),
            points: r64::from_integer(0),
            opponents: HashSet::new(),
            colors_played: Vec::new(),
            color_imbalance: 0,
            had_pairing_allocated_bye: false,
            float_history: Vec::new(),
            acceleration_bonus: r64::from_integer(0),
        }
    }

    #[test]
    fn disabled_is_a_no_op() {
        let mut states = vec![state(2000), state(1000)];
        let settings = AccelerationSettings {
            enabled: false,
            ..AccelerationSettings::default()
        };
        apply(&mut states, &settings, 1);
        assert!(states.iter().all(|s| s.acceleration_bonus == r64::from_integer(0)));
    }

    #[test]
    fn standard_gives_top_half_a_full_point_in_round_one() {
        let mut states = vec![state(2000), state(1800), state(1000), state(900)];
        let settings = AccelerationSettings {
            enabled: true,
            accel_type: AccelerationType::Standard,
            ..AccelerationSettings::default()
        };
        apply(&mut states, &settings, 1);
        assert_eq!(states[0].acceleration_bonus, r64::from_integer(1));
        assert_eq!(states[1].acceleration_bonus, r64::from_integer(1));
        assert_eq!(states[2].acceleration_bonus, r64::from_integer(0));
        assert_eq!(states[3].acceleration_bonus, r64::from_integer(0));
    }

    #[test]
    fn standard_tapers_to_half_point_at_break_point_then_stops() {
        let settings = AccelerationSettings {
            enabled: true,
            accel_type: AccelerationType::Standard,
            break_point: 2,
            ..AccelerationSettings::default()
        };

        let mut round_two = vec![state(2000), state(1000)];
        apply(&mut round_two, &settings, 2);
        assert_eq!(round_two[0].acceleration_bonus, r64::new(1, 2));

        // Fresh PlayerStates each round always start at zero bonus; a round
        // past the break point simply leaves them there.
        let mut round_three = vec![state(2000), state(1000)];
        apply(&mut round_three, &settings, 3);
        assert_eq!(round_three[0].acceleration_bonus, r64::from_integer(0));
    }
}
