use crate::config::Config;
use crate::core::input::{Glyph, LANE_COUNT, Lane};
use crate::core::timers::{Task, TimerScope, TimerToken, Timers};
use crate::game::combo::ComboState;
use crate::game::difficulty::{DifficultyProfile, DifficultyTier};
use crate::game::feedback::{EnergyMeter, LaneCue, LaneFeedback, Popups};
use crate::game::judgment::{self, Verdict};
use crate::game::notefield::NoteField;
use crate::game::scheduler::{self, LanePicker, Spawner};
use crate::screens::{Screen, ScreenAction};
use log::{debug, info, warn};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub hits: u32,
    /// Explicit failed taps only.
    pub misses: u32,
    /// Notes that fell past the line untouched. These cost nothing.
    pub dropped: u32,
    pub max_combo: u32,
}

/* ---------------------------- state ---------------------------- */

pub struct State {
    pub scope: TimerScope,
    pub field: NoteField,
    pub combo: ComboState,
    pub spawner: Spawner,
    pub time_left_ms: u64,
    pub feedback: LaneFeedback,
    pub dancing: bool,
    pub popups: Popups,
    pub energy: EnergyMeter,
    pub stats: SessionStats,
    clock_step_ms: u64,
    spawn_token: Option<TimerToken>,
    feedback_tokens: [Option<TimerToken>; LANE_COUNT],
    dance_token: Option<TimerToken>,
}

impl State {
    #[inline(always)]
    pub fn tier(&self) -> DifficultyTier {
        self.spawner.profile().tier
    }
}

/// Starts a session from scratch: empty field, zeroed combo at base speed,
/// full clock. Arms the play clock and the first spawn.
pub fn enter(timers: &mut Timers, config: &Config, tier: DifficultyTier, high_score: u64) -> State {
    let profile = DifficultyProfile::new(tier, config.base_fall_speed);
    let mut state = State {
        scope: TimerScope::new(),
        field: NoteField::new(config.line_distance, config.despawn_margin),
        combo: ComboState::new(config.base_fall_speed, high_score),
        spawner: Spawner::new(profile),
        time_left_ms: config.session_length_ms,
        feedback: LaneFeedback::default(),
        dancing: false,
        popups: Popups::default(),
        energy: EnergyMeter::new(config.start_energy, config.max_energy),
        stats: SessionStats::default(),
        clock_step_ms: config.clock_step_ms,
        spawn_token: None,
        feedback_tokens: [None; LANE_COUNT],
        dance_token: None,
    };
    state
        .scope
        .every(timers, config.clock_step_ms as f64, Task::PlayClock);
    arm_spawn(&mut state, timers);
    info!("Session started on {} ({} ms).", tier, state.time_left_ms);
    state
}

fn arm_spawn(state: &mut State, timers: &mut Timers) {
    let interval = state.spawner.interval_ms(state.combo.fall_speed);
    state.spawn_token = Some(state.scope.after(timers, interval, Task::Spawn));
}

/* ---------------------------- update --------------------------- */

pub fn on_task(
    state: &mut State,
    timers: &mut Timers,
    lanes: &mut dyn LanePicker,
    token: TimerToken,
    task: Task,
) -> ScreenAction {
    match task {
        Task::PlayClock => {
            state.time_left_ms = state.time_left_ms.saturating_sub(state.clock_step_ms);
            if state.time_left_ms == 0 {
                return ScreenAction::Navigate(Screen::GameOver);
            }
        }
        Task::Spawn => {
            state.scope.release(token);
            if state.spawn_token != Some(token) {
                return ScreenAction::None;
            }
            state.spawner.spawn(&mut state.field, lanes);
            // Re-armed each firing so a faster fall speed shortens the next gap.
            arm_spawn(state, timers);
        }
        Task::ClearFeedback(lane) => {
            state.scope.release(token);
            if state.feedback_tokens[lane.index()] == Some(token) {
                state.feedback_tokens[lane.index()] = None;
                state.feedback.clear(lane);
            }
        }
        Task::DanceIdle => {
            state.scope.release(token);
            if state.dance_token == Some(token) {
                state.dance_token = None;
                state.dancing = false;
            }
        }
        Task::AssetsReady | Task::CountdownStep => {}
    }
    ScreenAction::None
}

/// Runs the ticker for one render frame. A bad frame is logged and skipped.
pub fn frame(state: &mut State, config: &Config, dt_ms: f64) {
    match scheduler::tick(
        &mut state.field,
        state.combo.fall_speed,
        dt_ms,
        config.reference_frame_ms,
    ) {
        Ok(dropped) => {
            if dropped > 0 {
                debug!("{} note(s) passed the line untouched.", dropped);
                state.stats.dropped += dropped as u32;
            }
            state.popups.age(dt_ms, config.popup_ms);
        }
        Err(e) => warn!("Skipping tick: {e}"),
    }
}

/* -------------------------- input -> judge ---------------------- */

pub fn tap(
    state: &mut State,
    timers: &mut Timers,
    config: &Config,
    lane: Lane,
    glyph: Glyph,
) -> Verdict {
    let verdict = judgment::judge_and_claim(&mut state.field, lane, glyph, config.hit_window);
    state.energy.drain();
    match verdict {
        Verdict::Hit(id) => {
            let before = state.combo.score;
            state.combo = state.combo.apply_hit(state.spawner.profile());
            state.stats.hits += 1;
            state.stats.max_combo = state.stats.max_combo.max(state.combo.combo);
            state.popups.push(lane, state.combo.score - before);
            show_cue(state, timers, config, lane, LaneCue::Hit);
            start_dancing(state, timers, config);
            debug!(
                "Hit {:?} in {:?}: combo {} x{} score {}",
                id, lane, state.combo.combo, state.combo.multiplier, state.combo.score
            );
        }
        Verdict::Miss => {
            state.combo = state.combo.apply_miss(state.spawner.profile());
            state.stats.misses += 1;
            show_cue(state, timers, config, lane, LaneCue::Miss);
            debug!("Miss in {:?}", lane);
        }
    }
    verdict
}

fn show_cue(state: &mut State, timers: &mut Timers, config: &Config, lane: Lane, cue: LaneCue) {
    if let Some(old) = state.feedback_tokens[lane.index()].take() {
        state.scope.cancel(timers, old);
    }
    state.feedback.set(lane, cue);
    let token = state
        .scope
        .after(timers, config.feedback_ms, Task::ClearFeedback(lane));
    state.feedback_tokens[lane.index()] = Some(token);
}

fn start_dancing(state: &mut State, timers: &mut Timers, config: &Config) {
    if let Some(old) = state.dance_token.take() {
        state.scope.cancel(timers, old);
    }
    state.dancing = true;
    state.dance_token = Some(state.scope.after(timers, config.dance_idle_ms, Task::DanceIdle));
}

pub fn exit(state: &mut State, timers: &mut Timers) {
    state.scope.cancel_all(timers);
    state.spawn_token = None;
    state.feedback_tokens = [None; LANE_COUNT];
    state.dance_token = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timers::micros;
    use crate::game::scheduler::ScriptedLanes;

    fn run(state: &mut State, timers: &mut Timers, lanes: &mut dyn LanePicker, until_ms: f64) -> ScreenAction {
        let until = micros(until_ms);
        while let Some((token, task)) = timers.pop_due(until) {
            let action = on_task(state, timers, lanes, token, task);
            if action != ScreenAction::None {
                exit(state, timers);
                return action;
            }
        }
        timers.settle(until);
        ScreenAction::None
    }

    fn setup(tier: DifficultyTier) -> (Timers, Config, State) {
        let mut timers = Timers::new();
        let config = Config::default();
        let state = enter(&mut timers, &config, tier, 0);
        (timers, config, state)
    }

    #[test]
    fn clock_runs_out_after_sixty_seconds() {
        let (mut timers, _config, mut state) = setup(DifficultyTier::Easy);
        let mut lanes = ScriptedLanes::new([Lane::Left]);
        assert_eq!(run(&mut state, &mut timers, &mut lanes, 59_999.0), ScreenAction::None);
        assert_eq!(state.time_left_ms, 1000);
        assert_eq!(
            run(&mut state, &mut timers, &mut lanes, 60_000.0),
            ScreenAction::Navigate(Screen::GameOver)
        );
        assert_eq!(state.time_left_ms, 0);
        assert_eq!(timers.armed_count(), 0);
    }

    #[test]
    fn spawner_fires_at_the_tier_interval() {
        let (mut timers, _config, mut state) = setup(DifficultyTier::Medium);
        let mut lanes = ScriptedLanes::new([Lane::Up, Lane::Down]);
        run(&mut state, &mut timers, &mut lanes, 899.0);
        assert!(state.field.is_empty());
        run(&mut state, &mut timers, &mut lanes, 1800.0);
        let lanes_seen: Vec<Lane> = state.field.notes().iter().map(|n| n.lane).collect();
        assert_eq!(lanes_seen, vec![Lane::Up, Lane::Down]);
    }

    #[test]
    fn faster_fall_speed_shortens_the_next_spawn_gap() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Hard);
        let mut lanes = ScriptedLanes::new([Lane::Left]);
        state.combo.fall_speed = config.base_fall_speed * 2.0;
        run(&mut state, &mut timers, &mut lanes, 600.0);
        assert_eq!(state.field.len(), 1);
        run(&mut state, &mut timers, &mut lanes, 900.0);
        assert_eq!(state.field.len(), 2);
    }

    #[test]
    fn two_taps_on_one_note_score_once() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Medium);
        state.field.place(Lane::Down, config.line_distance - 5.0);
        let first = tap(&mut state, &mut timers, &config, Lane::Down, Glyph::Down);
        let second = tap(&mut state, &mut timers, &config, Lane::Down, Glyph::Down);
        assert!(matches!(first, Verdict::Hit(_)));
        assert_eq!(second, Verdict::Miss);
        assert_eq!(state.combo.score, 10);
        assert_eq!(state.combo.combo, 0);
        assert_eq!(state.stats.hits, 1);
        assert_eq!(state.stats.misses, 1);
    }

    #[test]
    fn untouched_notes_drop_silently_without_breaking_combo() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Medium);
        for _ in 0..7 {
            state.field.place(Lane::Right, config.line_distance);
            tap(&mut state, &mut timers, &config, Lane::Right, Glyph::Right);
        }
        assert_eq!(state.combo.combo, 7);
        state.field.place(Lane::Left, config.line_distance + config.despawn_margin - 0.1);
        frame(&mut state, &config, config.reference_frame_ms);
        assert!(state.field.is_empty());
        assert_eq!(state.stats.dropped, 1);
        assert_eq!(state.combo.combo, 7);
        assert_eq!(state.combo.multiplier, 2);
    }

    #[test]
    fn lane_cue_clears_after_its_duration_and_restarts_on_retap() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Easy);
        let mut lanes = ScriptedLanes::new([Lane::Left]);
        tap(&mut state, &mut timers, &config, Lane::Up, Glyph::Up);
        assert_eq!(state.feedback.get(Lane::Up), Some(LaneCue::Miss));
        run(&mut state, &mut timers, &mut lanes, 200.0);
        state.field.place(Lane::Up, config.line_distance);
        tap(&mut state, &mut timers, &config, Lane::Up, Glyph::Up);
        run(&mut state, &mut timers, &mut lanes, 300.0);
        assert_eq!(state.feedback.get(Lane::Up), Some(LaneCue::Hit));
        run(&mut state, &mut timers, &mut lanes, 450.0);
        assert_eq!(state.feedback.get(Lane::Up), None);
    }

    #[test]
    fn dancing_stops_three_seconds_after_the_last_hit() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Easy);
        let mut lanes = ScriptedLanes::new([Lane::Left]);
        state.field.place(Lane::Left, config.line_distance);
        tap(&mut state, &mut timers, &config, Lane::Left, Glyph::Left);
        assert!(state.dancing);
        run(&mut state, &mut timers, &mut lanes, 2000.0);
        state.field.place(Lane::Left, config.line_distance);
        tap(&mut state, &mut timers, &config, Lane::Left, Glyph::Left);
        run(&mut state, &mut timers, &mut lanes, 4500.0);
        assert!(state.dancing);
        run(&mut state, &mut timers, &mut lanes, 5000.0);
        assert!(!state.dancing);
    }

    #[test]
    fn every_tap_drains_energy_down_to_zero() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Medium);
        assert_eq!(state.energy.level(), config.start_energy);
        state.field.place(Lane::Left, config.line_distance);
        tap(&mut state, &mut timers, &config, Lane::Left, Glyph::Left);
        tap(&mut state, &mut timers, &config, Lane::Right, Glyph::Right);
        assert_eq!(state.energy.level(), config.start_energy - 2);
        for _ in 0..config.start_energy {
            tap(&mut state, &mut timers, &config, Lane::Up, Glyph::Up);
        }
        assert_eq!(state.energy.level(), 0);
        assert_eq!(state.energy.max(), config.max_energy);
    }

    #[test]
    fn hits_leave_score_popups_that_fade() {
        let (mut timers, config, mut state) = setup(DifficultyTier::Easy);
        state.field.place(Lane::Down, config.line_distance);
        tap(&mut state, &mut timers, &config, Lane::Down, Glyph::Down);
        assert_eq!(state.popups.live().len(), 1);
        assert_eq!(state.popups.live()[0].points, 10);
        frame(&mut state, &config, config.popup_ms);
        assert!(state.popups.live().is_empty());
    }

    #[test]
    fn bad_frame_changes_nothing() {
        let (_timers, config, mut state) = setup(DifficultyTier::Easy);
        let id = state.field.place(Lane::Down, 100.0);
        frame(&mut state, &config, f64::NAN);
        assert_eq!(state.field.get(id).map(|n| n.fall_progress), Some(100.0));
    }
}
