//! Combo, multiplier, score and fall-speed bookkeeping.
//!
//! `ComboState` is a plain value; [`ComboState::apply_hit`] and
//! [`ComboState::apply_miss`] are the only ways multiplier and fall speed
//! change, and both depend only on the incoming state.

use crate::game::difficulty::DifficultyProfile;
use serde::Serialize;

pub const POINTS_PER_HIT: u64 = 10;

/// One rung of the combo ladder: reaching `min_combo` sets `multiplier` and
/// lets fall speed grow by `speed_factor` up to `cap_factor × base`. No rung
/// goes past the profile's ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComboTier {
    pub min_combo: u32,
    pub multiplier: u32,
    pub speed_factor: f32,
    pub cap_factor: f32,
}

/// Checked high to low; first match wins.
pub const COMBO_TIERS: [ComboTier; 3] = [
    ComboTier {
        min_combo: 20,
        multiplier: 4,
        speed_factor: 1.10,
        cap_factor: DifficultyProfile::CEILING_FACTOR,
    },
    ComboTier { min_combo: 10, multiplier: 3, speed_factor: 1.05, cap_factor: 1.5 },
    ComboTier { min_combo: 5, multiplier: 2, speed_factor: 1.02, cap_factor: 1.2 },
];

pub fn tier_for_combo(combo: u32) -> Option<&'static ComboTier> {
    COMBO_TIERS.iter().find(|t| combo >= t.min_combo)
}

#[inline(always)]
pub fn multiplier_for_combo(combo: u32) -> u32 {
    tier_for_combo(combo).map_or(1, |t| t.multiplier)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComboState {
    pub combo: u32,
    pub multiplier: u32,
    pub score: u64,
    pub high_score: u64,
    pub fall_speed: f32,
}

impl ComboState {
    /// Fresh session state at base speed, carrying the stored best.
    pub fn new(base_fall_speed: f32, high_score: u64) -> Self {
        Self {
            combo: 0,
            multiplier: 1,
            score: 0,
            high_score,
            fall_speed: base_fall_speed,
        }
    }

    /// Points the hit is worth are taken at the multiplier the new combo
    /// earns, so the fifth consecutive hit already scores double.
    pub fn apply_hit(&self, profile: &DifficultyProfile) -> Self {
        let combo = self.combo.saturating_add(1);
        let (multiplier, fall_speed) = match tier_for_combo(combo) {
            Some(t) => (
                t.multiplier,
                (self.fall_speed * t.speed_factor).min(profile.base_fall_speed * t.cap_factor),
            ),
            None => (1, self.fall_speed),
        };
        let fall_speed = fall_speed.min(profile.fall_speed_ceiling());
        Self {
            combo,
            multiplier,
            score: self.score.saturating_add(POINTS_PER_HIT * multiplier as u64),
            high_score: self.high_score,
            fall_speed,
        }
    }

    pub fn apply_miss(&self, profile: &DifficultyProfile) -> Self {
        Self {
            combo: 0,
            multiplier: 1,
            score: self.score,
            high_score: self.high_score,
            fall_speed: profile.base_fall_speed,
        }
    }

    /// Folds the session score into the best score. The flag is true only
    /// when the record was beaten.
    pub fn settle_high_score(&self) -> (Self, bool) {
        if self.score > self.high_score {
            (Self { high_score: self.score, ..*self }, true)
        } else {
            (*self, false)
        }
    }
}
