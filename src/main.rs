use log::{LevelFilter, info};
use std::error::Error;
use std::path::PathBuf;
use tapdance::App;
use tapdance::core::input::TapEvent;
use tapdance::game::scheduler::RandomLanes;
use tapdance::game::scores::IniScoreStore;
use tapdance::screens::Screen;

const CONFIG_PATH: &str = "tapdance.ini";
const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() -> Result<(), Box<dyn Error>> {
    // --- Logging Setup ---
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .filter_module("tapdance::game", LevelFilter::Debug)
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map_or_else(|| PathBuf::from(CONFIG_PATH), PathBuf::from);
    let difficulty = args.next();

    let config = tapdance::config::load(&config_path);
    let hit_window = config.hit_window;
    let line = config.line_distance;
    let store = IniScoreStore::new(config.high_score_path.clone());
    let lanes = RandomLanes::seeded(rand::random());
    let mut app = App::new(config, Box::new(store), Box::new(lanes));

    // --- Headless session ---
    // A simple autoplayer stands in for the player: it taps any note that is
    // well inside the hit window.
    while app.screen() != Screen::GameOver {
        app.frame(FRAME_MS);
        match app.screen() {
            Screen::Idle => {
                if let Some(name) = difficulty.as_deref() {
                    app.select_difficulty(name);
                }
                app.start();
            }
            Screen::Playing => {
                let targets: Vec<_> = app
                    .snapshot()
                    .notes
                    .iter()
                    .filter(|n| n.distance_to_line(line) < hit_window / 2.0)
                    .map(|n| TapEvent::on(n.lane))
                    .collect();
                for tap in targets {
                    app.tap(tap.lane, tap.glyph);
                }
            }
            _ => {}
        }
    }

    let snapshot = app.snapshot();
    info!(
        "Finished with {} points (best {}).",
        snapshot.score, snapshot.high_score
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
