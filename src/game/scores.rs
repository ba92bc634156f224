use configparser::ini::Ini;
use log::{info, warn};
use std::cell::Cell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

const SECTION: &str = "HighScore";
const KEY_BEST: &str = "Best";
const KEY_ACHIEVED_AT: &str = "AchievedAt";

/// Read/write contract for the single best-score record.
pub trait ScoreStore {
    /// 0 when the record is absent or unreadable.
    fn load(&self) -> u64;
    /// Overwrites the record.
    fn save(&mut self, score: u64) -> io::Result<()>;
}

// --- INI-backed store ---

pub struct IniScoreStore {
    path: PathBuf,
}

impl IniScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Parses the record out of INI text; anything malformed reads as 0.
pub fn parse_best(contents: &str) -> u64 {
    let mut conf = Ini::new();
    if let Err(e) = conf.read(contents.to_string()) {
        warn!("High score record is not valid INI ({}), treating as 0.", e);
        return 0;
    }
    match conf.get(SECTION, KEY_BEST) {
        Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
            warn!("High score value '{}' is not a score, treating as 0.", raw);
            0
        }),
        None => 0,
    }
}

impl ScoreStore for IniScoreStore {
    fn load(&self) -> u64 {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse_best(&contents),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No high score at '{}' yet.", self.path.display());
                0
            }
            Err(e) => {
                warn!("Failed to read '{}': {}. Treating high score as 0.", self.path.display(), e);
                0
            }
        }
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut conf = Ini::new();
        conf.set(SECTION, KEY_BEST, Some(score.to_string()));
        conf.set(
            SECTION,
            KEY_ACHIEVED_AT,
            Some(chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
        );
        conf.write(&self.path)?;
        info!("Saved high score {} to '{}'.", score, self.path.display());
        Ok(())
    }
}

// --- In-memory store ---

/// Keeps the record in memory and counts writes. Clones share state, so a
/// test can hand one to the app and keep another to inspect.
#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    best: Rc<Cell<u64>>,
    saves: Rc<Cell<u32>>,
}

impl MemoryScoreStore {
    pub fn with_best(best: u64) -> Self {
        let store = Self::default();
        store.best.set(best);
        store
    }

    pub fn best(&self) -> u64 {
        self.best.get()
    }

    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load(&self) -> u64 {
        self.best.get()
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        self.best.set(score);
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}
