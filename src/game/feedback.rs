//! Observational cues for the renderer. Nothing here affects scoring.

use crate::core::input::{LANE_COUNT, Lane};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum LaneCue {
    Hit,
    Miss,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LaneFeedback {
    cues: [Option<LaneCue>; LANE_COUNT],
}

impl LaneFeedback {
    pub fn set(&mut self, lane: Lane, cue: LaneCue) {
        self.cues[lane.index()] = Some(cue);
    }

    pub fn clear(&mut self, lane: Lane) {
        self.cues[lane.index()] = None;
    }

    pub fn get(&self, lane: Lane) -> Option<LaneCue> {
        self.cues[lane.index()]
    }

    pub fn as_array(&self) -> [Option<LaneCue>; LANE_COUNT] {
        self.cues
    }
}

/// Floating "+points" text shown where a hit landed.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScorePopup {
    pub id: u64,
    pub lane: Lane,
    pub points: u64,
    pub age_ms: f64,
}

#[derive(Debug, Default)]
pub struct Popups {
    live: Vec<ScorePopup>,
    next_id: u64,
}

impl Popups {
    pub fn push(&mut self, lane: Lane, points: u64) {
        self.live.push(ScorePopup {
            id: self.next_id,
            lane,
            points,
            age_ms: 0.0,
        });
        self.next_id += 1;
    }

    /// Ages every popup and drops the ones older than `lifetime_ms`.
    pub fn age(&mut self, dt_ms: f64, lifetime_ms: f64) {
        for p in &mut self.live {
            p.age_ms += dt_ms;
        }
        self.live.retain(|p| p.age_ms < lifetime_ms);
    }

    pub fn live(&self) -> &[ScorePopup] {
        &self.live
    }
}

/// Energy bar drained by every accepted tap, hit or miss. It never refills
/// during a session and never goes below zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EnergyMeter {
    level: u32,
    max: u32,
}

impl EnergyMeter {
    /// `start` is clamped to `max`.
    pub fn new(start: u32, max: u32) -> Self {
        Self {
            level: start.min(max),
            max,
        }
    }

    pub fn drain(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    #[inline(always)]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline(always)]
    pub fn max(&self) -> u32 {
        self.max
    }
}

/// Headline text over the playfield: numbers while counting down, the
/// announcement on the last count, nothing once play is under way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Banner {
    Countdown(u32),
    Announcing,
    Done,
}

impl Banner {
    pub fn for_countdown(remaining: u32) -> Self {
        if remaining == 0 {
            Banner::Announcing
        } else {
            Banner::Countdown(remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cues_are_per_lane() {
        let mut fb = LaneFeedback::default();
        fb.set(Lane::Up, LaneCue::Hit);
        fb.set(Lane::Left, LaneCue::Miss);
        fb.clear(Lane::Left);
        assert_eq!(fb.as_array(), [None, None, Some(LaneCue::Hit), None]);
    }

    #[test]
    fn popups_expire_after_their_lifetime() {
        let mut popups = Popups::default();
        popups.push(Lane::Down, 20);
        popups.age(600.0, 1000.0);
        popups.push(Lane::Up, 10);
        popups.age(400.0, 1000.0);
        let ids: Vec<u64> = popups.live().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn energy_drains_to_zero_and_stays_there() {
        let mut energy = EnergyMeter::new(2, 20);
        energy.drain();
        assert_eq!(energy.level(), 1);
        energy.drain();
        energy.drain();
        energy.drain();
        assert_eq!(energy.level(), 0);
        assert_eq!(energy.max(), 20);
    }

    #[test]
    fn energy_start_is_clamped_to_max() {
        assert_eq!(EnergyMeter::new(25, 20).level(), 20);
    }

    #[test]
    fn banner_announces_on_the_last_count() {
        assert_eq!(Banner::for_countdown(3), Banner::Countdown(3));
        assert_eq!(Banner::for_countdown(0), Banner::Announcing);
    }
}
