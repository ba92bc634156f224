use log::warn;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Player-selected preset. Frozen for the length of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
pub enum DifficultyTier {
    Easy,
    #[default]
    Medium,
    Hard,
}

pub const ALL_TIERS: [DifficultyTier; 3] = [
    DifficultyTier::Easy,
    DifficultyTier::Medium,
    DifficultyTier::Hard,
];

impl DifficultyTier {
    /// Spawn interval at base fall speed, strictly decreasing Easy→Hard.
    pub const fn base_interval_ms(self) -> f64 {
        match self {
            DifficultyTier::Easy => 1200.0,
            DifficultyTier::Medium => 900.0,
            DifficultyTier::Hard => 600.0,
        }
    }

    /// Menu selections arrive as free text; anything unknown is Medium.
    pub fn from_name_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!("Unknown difficulty '{}', falling back to Medium.", name);
            DifficultyTier::Medium
        })
    }
}

impl FromStr for DifficultyTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(DifficultyTier::Easy),
            "medium" => Ok(DifficultyTier::Medium),
            "hard" => Ok(DifficultyTier::Hard),
            other => Err(format!("unknown difficulty tier: {other}")),
        }
    }
}

impl fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DifficultyTier::Easy => "Easy",
            DifficultyTier::Medium => "Medium",
            DifficultyTier::Hard => "Hard",
        };
        f.write_str(name)
    }
}

/// Maps a tier and the session's base fall speed to the spawn cadence and
/// the fall-speed ceiling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DifficultyProfile {
    pub tier: DifficultyTier,
    pub base_fall_speed: f32,
}

impl DifficultyProfile {
    pub const CEILING_FACTOR: f32 = 2.0;

    pub fn new(tier: DifficultyTier, base_fall_speed: f32) -> Self {
        Self {
            tier,
            base_fall_speed,
        }
    }

    /// `baseInterval(tier) / (fall_speed / base)`. Non-positive or non-finite
    /// speeds are treated as base speed.
    pub fn spawn_interval_ms(&self, fall_speed: f32) -> f64 {
        let base = self.base_fall_speed as f64;
        let speed = fall_speed as f64;
        let ratio = if speed.is_finite() && speed > 0.0 && base > 0.0 {
            speed / base
        } else {
            1.0
        };
        self.tier.base_interval_ms() / ratio
    }

    #[inline(always)]
    pub fn fall_speed_ceiling(&self) -> f32 {
        self.base_fall_speed * Self::CEILING_FACTOR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: f32 = 1.5;

    #[test]
    fn interval_strictly_decreases_with_fall_speed() {
        for tier in ALL_TIERS {
            let profile = DifficultyProfile::new(tier, BASE);
            let mut prev = f64::INFINITY;
            let mut speed = BASE;
            while speed <= profile.fall_speed_ceiling() {
                let interval = profile.spawn_interval_ms(speed);
                assert!(interval < prev, "{tier}: {interval} !< {prev} at speed {speed}");
                prev = interval;
                speed += 0.05;
            }
        }
    }

    #[test]
    fn interval_strictly_decreases_easy_to_hard() {
        for speed in [1.5_f32, 1.8, 2.25, 3.0] {
            let easy = DifficultyProfile::new(DifficultyTier::Easy, BASE).spawn_interval_ms(speed);
            let medium =
                DifficultyProfile::new(DifficultyTier::Medium, BASE).spawn_interval_ms(speed);
            let hard = DifficultyProfile::new(DifficultyTier::Hard, BASE).spawn_interval_ms(speed);
            assert!(easy > medium && medium > hard, "speed {speed}");
        }
    }

    #[test]
    fn interval_at_base_speed_is_the_tier_base() {
        let profile = DifficultyProfile::new(DifficultyTier::Medium, BASE);
        assert_eq!(profile.spawn_interval_ms(BASE), 900.0);
        assert_eq!(profile.spawn_interval_ms(BASE * 2.0), 450.0);
    }

    #[test]
    fn degenerate_speed_falls_back_to_base_interval() {
        let profile = DifficultyProfile::new(DifficultyTier::Hard, BASE);
        assert_eq!(profile.spawn_interval_ms(0.0), 600.0);
        assert_eq!(profile.spawn_interval_ms(f32::NAN), 600.0);
    }

    #[test]
    fn unknown_tier_names_fall_back_to_medium() {
        assert_eq!(DifficultyTier::from_name_or_default("HARD"), DifficultyTier::Hard);
        assert_eq!(DifficultyTier::from_name_or_default(" easy "), DifficultyTier::Easy);
        assert_eq!(DifficultyTier::from_name_or_default("insane"), DifficultyTier::Medium);
        assert_eq!(DifficultyTier::from_name_or_default(""), DifficultyTier::Medium);
    }
}
