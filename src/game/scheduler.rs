//! Spawner and ticker, the two periodic producers that feed the note field.
//!
//! Neither owns a timer; the Playing state arms the spawner through its
//! timer scope and calls [`tick`] once per render frame.

use crate::core::input::{ALL_LANES, Lane};
use crate::game::difficulty::DifficultyProfile;
use crate::game::note::NoteId;
use crate::game::notefield::NoteField;
use log::debug;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::fmt;

/// Source of spawn lanes. Injected so spawn sequences are reproducible.
pub trait LanePicker {
    fn pick(&mut self) -> Lane;
}

/// Uniform lane choice from any `rand` generator.
pub struct RandomLanes<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomLanes<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomLanes<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LanePicker for RandomLanes<R> {
    fn pick(&mut self) -> Lane {
        ALL_LANES[self.rng.random_range(0..ALL_LANES.len())]
    }
}

/// Replays a fixed lane script, cycling when it runs out.
#[derive(Debug, Clone)]
pub struct ScriptedLanes {
    script: VecDeque<Lane>,
}

impl ScriptedLanes {
    pub fn new(script: impl IntoIterator<Item = Lane>) -> Self {
        let script: VecDeque<Lane> = script.into_iter().collect();
        Self { script }
    }
}

impl LanePicker for ScriptedLanes {
    fn pick(&mut self) -> Lane {
        match self.script.pop_front() {
            Some(lane) => {
                self.script.push_back(lane);
                lane
            }
            None => Lane::Left,
        }
    }
}

/// Creates one note per firing and reports when the next one is due.
pub struct Spawner {
    profile: DifficultyProfile,
}

impl Spawner {
    pub fn new(profile: DifficultyProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    #[inline(always)]
    pub fn interval_ms(&self, fall_speed: f32) -> f64 {
        self.profile.spawn_interval_ms(fall_speed)
    }

    pub fn spawn(&self, field: &mut NoteField, lanes: &mut dyn LanePicker) -> NoteId {
        let lane = lanes.pick();
        let id = field.spawn(lane);
        debug!("Spawned note {:?} in lane {:?}", id, lane);
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickError {
    NonFiniteFallSpeed(f32),
    InvalidFrameDelta(f64),
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TickError::NonFiniteFallSpeed(v) => write!(f, "fall speed is not a usable number: {v}"),
            TickError::InvalidFrameDelta(v) => write!(f, "frame delta is not a usable duration: {v}ms"),
        }
    }
}

impl std::error::Error for TickError {}

/// Distance a note covers in `dt_ms` at `fall_speed` units per reference
/// frame.
pub fn fall_distance(fall_speed: f32, dt_ms: f64, reference_frame_ms: f64) -> Result<f32, TickError> {
    if !fall_speed.is_finite() || fall_speed < 0.0 {
        return Err(TickError::NonFiniteFallSpeed(fall_speed));
    }
    if !dt_ms.is_finite() || dt_ms < 0.0 || reference_frame_ms <= 0.0 {
        return Err(TickError::InvalidFrameDelta(dt_ms));
    }
    let distance = fall_speed as f64 * (dt_ms / reference_frame_ms);
    if !distance.is_finite() {
        return Err(TickError::InvalidFrameDelta(dt_ms));
    }
    Ok(distance as f32)
}

/// Advances the field by one frame. On error nothing is mutated. Returns the
/// number of notes dropped past the line without a judgement.
pub fn tick(
    field: &mut NoteField,
    fall_speed: f32,
    dt_ms: f64,
    reference_frame_ms: f64,
) -> Result<usize, TickError> {
    let distance = fall_distance(fall_speed, dt_ms, reference_frame_ms)?;
    Ok(field.advance(distance))
}
