//! Session driver: owns the timer queue and the one active session state,
//! routes timer firings, frames and taps to it, and performs transitions.

use crate::config::Config;
use crate::core::input::{Glyph, LANE_COUNT, Lane};
use crate::core::timers::{self, Task, TimerToken, Timers};
use crate::game::difficulty::DifficultyTier;
use crate::game::feedback::{Banner, LaneCue, ScorePopup};
use crate::game::judgment::Verdict;
use crate::game::note::Note;
use crate::game::scheduler::LanePicker;
use crate::game::scores::ScoreStore;
use crate::screens::gameplay::SessionStats;
use crate::screens::{
    Screen, ScreenAction, SessionState, countdown, gameover, gameplay, loading, menu,
};
use log::{debug, info, warn};
use serde::Serialize;

enum Active {
    Loading(loading::State),
    Idle(menu::State),
    Countdown(countdown::State),
    Playing(gameplay::State),
    GameOver(gameover::State),
}

impl Active {
    fn screen(&self) -> Screen {
        match self {
            Active::Loading(_) => Screen::Loading,
            Active::Idle(_) => Screen::Idle,
            Active::Countdown(_) => Screen::Countdown,
            Active::Playing(_) => Screen::Playing,
            Active::GameOver(_) => Screen::GameOver,
        }
    }
}

/// Read-only view handed to renderers after each frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub session_state: SessionState,
    pub score: u64,
    pub combo: u32,
    pub multiplier: u32,
    pub time_left_ms: u64,
    pub high_score: u64,
    pub notes: Vec<Note>,
    pub lane_feedback: [Option<LaneCue>; LANE_COUNT],
    pub banner: Banner,
    pub dancing: bool,
    pub popups: Vec<ScorePopup>,
    pub stats: SessionStats,
    pub difficulty: DifficultyTier,
    pub fall_speed: f32,
    pub energy: u32,
    pub max_energy: u32,
    pub new_record: bool,
}

pub struct App {
    config: Config,
    timers: Timers,
    active: Active,
    high_score: u64,
    store: Box<dyn ScoreStore>,
    lanes: Box<dyn LanePicker>,
}

impl App {
    /// Enters Loading and reads the stored best score (0 if unreadable).
    pub fn new(config: Config, store: Box<dyn ScoreStore>, lanes: Box<dyn LanePicker>) -> Self {
        let mut timers = Timers::new();
        let high_score = store.load();
        let active = Active::Loading(loading::enter(&mut timers, &config));
        info!("Loading (best score {}).", high_score);
        Self {
            config,
            timers,
            active,
            high_score,
            store,
            lanes,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.active.screen()
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /* ---------------------------- update --------------------------- */

    /// One render frame: the ticker moves notes first, then every timer due
    /// within the frame fires in deadline order. A frame is atomic with
    /// respect to taps.
    pub fn frame(&mut self, dt_ms: f64) {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            warn!("Ignoring frame with unusable delta {dt_ms}ms.");
            return;
        }
        if let Active::Playing(state) = &mut self.active {
            gameplay::frame(state, &self.config, dt_ms);
        }
        let until = self.timers.now_us() + timers::micros(dt_ms);
        while let Some((token, task)) = self.timers.pop_due(until) {
            let action = self.dispatch(token, task);
            if let ScreenAction::Navigate(to) = action {
                self.navigate(to);
            }
        }
        self.timers.settle(until);
    }

    fn dispatch(&mut self, token: TimerToken, task: Task) -> ScreenAction {
        match &mut self.active {
            Active::Loading(state) if state.scope.owns(token) => loading::on_task(state, token, task),
            Active::Countdown(state) if state.scope.owns(token) => countdown::on_task(state, task),
            Active::Playing(state) if state.scope.owns(token) => {
                gameplay::on_task(state, &mut self.timers, self.lanes.as_mut(), token, task)
            }
            _ => {
                // Every scope is cancelled on exit, so this means a timer
                // was armed outside any scope.
                warn!("Dropping unowned timer {:?} ({:?}).", token, task);
                self.timers.cancel(token);
                ScreenAction::None
            }
        }
    }

    /* ------------------------ transitions -------------------------- */

    fn navigate(&mut self, to: Screen) -> bool {
        let from = self.active.screen();
        if !from.can_navigate(to) {
            warn!("Refusing transition {:?} -> {:?}.", from, to);
            return false;
        }

        let tier = self.selected_tier();

        // The outgoing state cancels everything it armed before the incoming
        // state arms anything.
        match &mut self.active {
            Active::Loading(s) => loading::exit(s, &mut self.timers),
            Active::Idle(s) => menu::exit(s, &mut self.timers),
            Active::Countdown(s) => countdown::exit(s, &mut self.timers),
            Active::Playing(s) => gameplay::exit(s, &mut self.timers),
            Active::GameOver(s) => gameover::exit(s, &mut self.timers),
        }

        let next = match (&self.active, to) {
            (_, Screen::Idle) => Active::Idle(menu::enter(tier)),
            (_, Screen::Countdown) => {
                Active::Countdown(countdown::enter(&mut self.timers, &self.config, tier))
            }
            (Active::Countdown(_), Screen::Playing) => Active::Playing(gameplay::enter(
                &mut self.timers,
                &self.config,
                tier,
                self.high_score,
            )),
            (Active::Playing(p), Screen::GameOver) => {
                let state = gameover::enter(p.combo, p.stats, tier, self.store.as_mut());
                self.high_score = state.result.high_score;
                Active::GameOver(state)
            }
            // `can_navigate` already rejected every other pairing.
            _ => return false,
        };
        self.active = next;
        info!("{:?} -> {:?}", from, to);
        true
    }

    /// Tier chosen in the menu or on the game-over screen, or the one frozen
    /// into a running session.
    fn selected_tier(&self) -> DifficultyTier {
        match &self.active {
            Active::Idle(s) => s.tier,
            Active::GameOver(s) => s.tier,
            Active::Countdown(s) => s.tier,
            Active::Playing(s) => s.tier(),
            Active::Loading(_) => self.config.default_difficulty,
        }
    }

    /* -------------------- collaborator signals --------------------- */

    /// Asset-ready signal; ends Loading early.
    pub fn assets_ready(&mut self) -> bool {
        self.screen() == Screen::Loading && self.navigate(Screen::Idle)
    }

    /// Idle -> Countdown.
    pub fn start(&mut self) -> bool {
        self.screen() == Screen::Idle && self.navigate(Screen::Countdown)
    }

    /// GameOver -> Countdown.
    pub fn replay(&mut self) -> bool {
        self.screen() == Screen::GameOver && self.navigate(Screen::Countdown)
    }

    /// GameOver -> Idle.
    pub fn to_menu(&mut self) -> bool {
        self.screen() == Screen::GameOver && self.navigate(Screen::Idle)
    }

    /// Only honoured in Idle or GameOver; unknown names select Medium.
    pub fn select_difficulty(&mut self, name: &str) -> Option<DifficultyTier> {
        match &mut self.active {
            Active::Idle(s) => Some(menu::select_difficulty(s, name)),
            Active::GameOver(s) => Some(gameover::select_difficulty(s, name)),
            _ => {
                debug!("Ignoring difficulty change to '{}' mid-session.", name);
                None
            }
        }
    }

    /// Routes a tap to the judge. `None` when not playing or the lane index
    /// is out of range; neither case touches any state.
    pub fn tap(&mut self, lane_index: i64, glyph: Glyph) -> Option<Verdict> {
        let Some(lane) = Lane::from_index(lane_index) else {
            debug!("Ignoring tap on out-of-range lane {}.", lane_index);
            return None;
        };
        match &mut self.active {
            Active::Playing(state) => Some(gameplay::tap(
                state,
                &mut self.timers,
                &self.config,
                lane,
                glyph,
            )),
            _ => None,
        }
    }

    /* --------------------------- snapshot -------------------------- */

    pub fn snapshot(&self) -> Snapshot {
        let mut snap = Snapshot {
            session_state: SessionState::Idle,
            score: 0,
            combo: 0,
            multiplier: 1,
            time_left_ms: 0,
            high_score: self.high_score,
            notes: Vec::new(),
            lane_feedback: [None; LANE_COUNT],
            banner: Banner::Done,
            dancing: false,
            popups: Vec::new(),
            stats: SessionStats::default(),
            difficulty: self.selected_tier(),
            fall_speed: self.config.base_fall_speed,
            energy: self.config.start_energy.min(self.config.max_energy),
            max_energy: self.config.max_energy,
            new_record: false,
        };
        match &self.active {
            Active::Loading(_) => snap.session_state = SessionState::Loading,
            Active::Idle(_) => {}
            Active::Countdown(s) => {
                snap.session_state = SessionState::Countdown(s.remaining);
                snap.time_left_ms = self.config.session_length_ms;
                snap.banner = countdown::banner(s);
            }
            Active::Playing(s) => {
                snap.session_state = SessionState::Playing(s.time_left_ms);
                snap.score = s.combo.score;
                snap.combo = s.combo.combo;
                snap.multiplier = s.combo.multiplier;
                snap.time_left_ms = s.time_left_ms;
                snap.notes = s.field.notes().to_vec();
                snap.lane_feedback = s.feedback.as_array();
                snap.dancing = s.dancing;
                snap.popups = s.popups.live().to_vec();
                snap.stats = s.stats;
                snap.fall_speed = s.combo.fall_speed;
                snap.energy = s.energy.level();
                snap.max_energy = s.energy.max();
            }
            Active::GameOver(s) => {
                snap.session_state = SessionState::GameOver;
                snap.score = s.result.score;
                snap.combo = s.result.combo;
                snap.multiplier = s.result.multiplier;
                snap.stats = s.stats;
                snap.new_record = s.new_record;
            }
        }
        snap
    }

    #[cfg(test)]
    pub(crate) fn playing_mut(&mut self) -> Option<&mut gameplay::State> {
        match &mut self.active {
            Active::Playing(s) => Some(s),
            _ => None,
        }
    }

    /// Timers currently armed by any state; zero outside Loading, Countdown
    /// and Playing.
    pub fn armed_timers(&self) -> usize {
        self.timers.armed_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::ALL_LANES;
    use crate::game::scheduler::ScriptedLanes;
    use crate::game::scores::MemoryScoreStore;

    fn app_with(store: MemoryScoreStore) -> App {
        App::new(
            Config::default(),
            Box::new(store),
            Box::new(ScriptedLanes::new(ALL_LANES)),
        )
    }

    fn to_playing(app: &mut App) {
        assert!(app.assets_ready());
        assert!(app.start());
        app.frame(4000.0);
        assert_eq!(app.screen(), Screen::Playing);
    }

    #[test]
    fn playing_to_game_over_persists_the_record_once() {
        let store = MemoryScoreStore::with_best(300);
        let mut app = app_with(store.clone());
        to_playing(&mut app);
        if let Some(state) = app.playing_mut() {
            state.combo.score = 340;
        }
        app.frame(60_000.0);
        assert_eq!(app.screen(), Screen::GameOver);
        assert_eq!(app.high_score(), 340);
        assert_eq!(store.save_count(), 1);
        app.frame(60_000.0);
        assert_eq!(store.save_count(), 1);
        assert_eq!(app.snapshot().high_score, 340);
        assert!(app.snapshot().new_record);
    }

    #[test]
    fn no_task_survives_into_game_over() {
        let mut app = app_with(MemoryScoreStore::default());
        to_playing(&mut app);
        for lane in 0..4 {
            app.tap(lane, ALL_LANES[lane as usize].glyph());
        }
        app.frame(60_000.0);
        assert_eq!(app.screen(), Screen::GameOver);
        assert_eq!(app.armed_timers(), 0);
        assert_eq!(app.tap(0, Glyph::Left), None);
    }
}
