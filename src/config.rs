use crate::game::difficulty::DifficultyTier;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;

// Playfield geometry (distance units)
pub const LINE_DISTANCE: f32 = 400.0;
pub const DESPAWN_MARGIN: f32 = 80.0;
pub const HIT_WINDOW: f32 = 60.0;

// Fall speed is measured in distance units per reference frame.
pub const BASE_FALL_SPEED: f32 = 1.5;
pub const REFERENCE_FRAME_MS: f64 = 1000.0 / 60.0;

// Session timing
pub const LOADING_DELAY_MS: f64 = 1500.0;
pub const COUNTDOWN_FROM: u32 = 3;
pub const COUNTDOWN_STEP_MS: f64 = 1000.0;
pub const SESSION_LENGTH_MS: u64 = 60_000;
pub const CLOCK_STEP_MS: u64 = 1000;

// Cues
pub const FEEDBACK_MS: f64 = 250.0;
pub const DANCE_IDLE_MS: f64 = 3000.0;
pub const POPUP_MS: f64 = 1000.0;

// Energy bar
pub const START_ENERGY: u32 = 16;
pub const MAX_ENERGY: u32 = 20;

pub const HIGH_SCORE_PATH: &str = "save/highscore.ini";

const SECTION: &str = "Options";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub line_distance: f32,
    pub despawn_margin: f32,
    pub hit_window: f32,
    pub base_fall_speed: f32,
    pub reference_frame_ms: f64,
    pub loading_delay_ms: f64,
    pub countdown_from: u32,
    pub countdown_step_ms: f64,
    pub session_length_ms: u64,
    pub clock_step_ms: u64,
    pub feedback_ms: f64,
    pub dance_idle_ms: f64,
    pub popup_ms: f64,
    pub start_energy: u32,
    pub max_energy: u32,
    pub default_difficulty: DifficultyTier,
    pub high_score_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_distance: LINE_DISTANCE,
            despawn_margin: DESPAWN_MARGIN,
            hit_window: HIT_WINDOW,
            base_fall_speed: BASE_FALL_SPEED,
            reference_frame_ms: REFERENCE_FRAME_MS,
            loading_delay_ms: LOADING_DELAY_MS,
            countdown_from: COUNTDOWN_FROM,
            countdown_step_ms: COUNTDOWN_STEP_MS,
            session_length_ms: SESSION_LENGTH_MS,
            clock_step_ms: CLOCK_STEP_MS,
            feedback_ms: FEEDBACK_MS,
            dance_idle_ms: DANCE_IDLE_MS,
            popup_ms: POPUP_MS,
            start_energy: START_ENERGY,
            max_energy: MAX_ENERGY,
            default_difficulty: DifficultyTier::Medium,
            high_score_path: PathBuf::from(HIGH_SCORE_PATH),
        }
    }
}

/// Reads `key`, falling back to `default` when it is missing or does not
/// parse (or parses to something `valid` rejects).
fn read_or<T: FromStr + std::fmt::Debug>(
    conf: &Ini,
    key: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T {
    match conf.get(SECTION, key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if valid(&v) => v,
            _ => {
                warn!("Config value {}='{}' is invalid, using {:?}.", key, raw, default);
                default
            }
        },
    }
}

fn positive_f32(v: &f32) -> bool {
    v.is_finite() && *v > 0.0
}

fn positive_f64(v: &f64) -> bool {
    v.is_finite() && *v > 0.0
}

fn non_negative_f64(v: &f64) -> bool {
    v.is_finite() && *v >= 0.0
}

/// Builds a config from INI text; every key is optional.
pub fn from_ini(conf: &Ini) -> Config {
    let d = Config::default();
    Config {
        line_distance: read_or(conf, "LineDistance", d.line_distance, positive_f32),
        despawn_margin: read_or(conf, "DespawnMargin", d.despawn_margin, |v: &f32| {
            v.is_finite() && *v >= 0.0
        }),
        hit_window: read_or(conf, "HitWindow", d.hit_window, positive_f32),
        base_fall_speed: read_or(conf, "BaseFallSpeed", d.base_fall_speed, positive_f32),
        reference_frame_ms: read_or(conf, "ReferenceFrameMs", d.reference_frame_ms, positive_f64),
        loading_delay_ms: read_or(conf, "LoadingDelayMs", d.loading_delay_ms, non_negative_f64),
        countdown_from: read_or(conf, "CountdownFrom", d.countdown_from, |_| true),
        countdown_step_ms: read_or(conf, "CountdownStepMs", d.countdown_step_ms, positive_f64),
        session_length_ms: read_or(conf, "SessionLengthMs", d.session_length_ms, |v| *v > 0),
        clock_step_ms: read_or(conf, "ClockStepMs", d.clock_step_ms, |v| *v > 0),
        feedback_ms: read_or(conf, "FeedbackMs", d.feedback_ms, positive_f64),
        dance_idle_ms: read_or(conf, "DanceIdleMs", d.dance_idle_ms, positive_f64),
        popup_ms: read_or(conf, "PopupMs", d.popup_ms, positive_f64),
        start_energy: read_or(conf, "StartEnergy", d.start_energy, |_| true),
        max_energy: read_or(conf, "MaxEnergy", d.max_energy, |v| *v > 0),
        default_difficulty: conf
            .get(SECTION, "DefaultDifficulty")
            .map_or(d.default_difficulty, |v| DifficultyTier::from_name_or_default(&v)),
        high_score_path: conf
            .get(SECTION, "HighScorePath")
            .filter(|v| !v.trim().is_empty())
            .map_or(d.high_score_path, |v| PathBuf::from(v.trim())),
    }
}

fn create_default_file(path: &Path) -> Result<(), std::io::Error> {
    info!("Config file not found, creating defaults at '{}'.", path.display());
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let d = Config::default();
    let mut conf = Ini::new();
    let mut put = |key: &str, value: String| {
        conf.set(SECTION, key, Some(value));
    };
    put("LineDistance", d.line_distance.to_string());
    put("DespawnMargin", d.despawn_margin.to_string());
    put("HitWindow", d.hit_window.to_string());
    put("BaseFallSpeed", d.base_fall_speed.to_string());
    put("ReferenceFrameMs", d.reference_frame_ms.to_string());
    put("LoadingDelayMs", d.loading_delay_ms.to_string());
    put("CountdownFrom", d.countdown_from.to_string());
    put("CountdownStepMs", d.countdown_step_ms.to_string());
    put("SessionLengthMs", d.session_length_ms.to_string());
    put("ClockStepMs", d.clock_step_ms.to_string());
    put("FeedbackMs", d.feedback_ms.to_string());
    put("DanceIdleMs", d.dance_idle_ms.to_string());
    put("PopupMs", d.popup_ms.to_string());
    put("StartEnergy", d.start_energy.to_string());
    put("MaxEnergy", d.max_energy.to_string());
    put("DefaultDifficulty", d.default_difficulty.to_string());
    put("HighScorePath", d.high_score_path.display().to_string());
    conf.write(path)
}

/// Loads the config at `path`, creating it with defaults when absent. Never
/// fails; problems are logged and defaults used.
pub fn load(path: &Path) -> Config {
    if !path.exists()
        && let Err(e) = create_default_file(path)
    {
        warn!("Failed to create default config file: {e}");
        return Config::default();
    }

    let mut conf = Ini::new();
    match conf.load(path) {
        Ok(_) => {
            let cfg = from_ini(&conf);
            info!("Loaded config from '{}'.", path.display());
            cfg
        }
        Err(e) => {
            warn!("Failed to load '{}': {}. Using defaults.", path.display(), e);
            Config::default()
        }
    }
}
