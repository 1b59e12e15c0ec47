use serde::{Deserialize, Serialize};

use crate::{r64, rounds::ByeType};

/// Point awards for the three game outcomes (spec.md §3/§6). Bye point
/// values are not configured here: `requested-half` is always 0.5 and
/// `inactive-zero` is always 0.0 (spec.md §4.4's taxonomy table); only the
/// `pairing-allocated-full` award is configurable, via
/// [`crate::settings::ByeSettings::full_point_pairing_bye`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringSettings {
    /// Points for a win
    pub win: r64,
    /// Points for a draw
    pub draw: r64,
    /// Points for a loss
    pub loss: r64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        ScoringSettings {
            win: r64::from_integer(1),
            draw: r64::new(1, 2),
            loss: r64::from_integer(0),
        }
    }
}

impl ScoringSettings {
    /// The points awarded for a given bye type, per spec.md's bye-type
    /// table. `full_point_pairing_bye` gates whether a
    /// `PairingAllocatedFull` bye is worth 1.0 or 0.5.
    pub fn bye_points(&self, bye_type: ByeType, full_point_pairing_bye: bool) -> r64 {
        match bye_type {
            ByeType::RequestedHalf => r64::new(1, 2),
            ByeType::InactiveZero => r64::from_integer(0),
            ByeType::PairingAllocatedFull => {
                if full_point_pairing_bye {
                    r64::from_integer(1)
                } else {
                    r64::new(1, 2)
                }
            }
        }
    }
}
