use crate::core::timers::{TimerScope, Timers};
use crate::game::combo::ComboState;
use crate::game::difficulty::DifficultyTier;
use crate::game::scores::ScoreStore;
use crate::screens::gameplay::SessionStats;
use log::{info, warn};

/* ---------------------------- state ---------------------------- */

pub struct State {
    pub scope: TimerScope,
    /// Final combo state with the high score already settled.
    pub result: ComboState,
    pub stats: SessionStats,
    pub new_record: bool,
    /// Selectable again from the game-over menu.
    pub tier: DifficultyTier,
}

/// Settles the session. This is the only place the best score is written,
/// and only when it was beaten.
pub fn enter(
    final_combo: ComboState,
    stats: SessionStats,
    tier: DifficultyTier,
    store: &mut dyn ScoreStore,
) -> State {
    let (result, new_record) = final_combo.settle_high_score();
    if new_record {
        info!("New high score: {} (was {}).", result.high_score, final_combo.high_score);
        if let Err(e) = store.save(result.high_score) {
            warn!("Failed to persist high score {}: {}", result.high_score, e);
        }
    }
    info!(
        "Game over: score {}, {} hits, {} misses, {} dropped, best combo {}.",
        result.score, stats.hits, stats.misses, stats.dropped, stats.max_combo
    );
    State {
        scope: TimerScope::new(),
        result,
        stats,
        new_record,
        tier,
    }
}

pub fn select_difficulty(state: &mut State, name: &str) -> DifficultyTier {
    state.tier = DifficultyTier::from_name_or_default(name);
    info!("Difficulty set to {}.", state.tier);
    state.tier
}

pub fn exit(state: &mut State, timers: &mut Timers) {
    state.scope.cancel_all(timers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::scores::MemoryScoreStore;

    #[test]
    fn record_is_written_once_when_beaten() {
        let store = MemoryScoreStore::with_best(300);
        let mut handle = store.clone();
        let final_combo = ComboState { score: 340, ..ComboState::new(1.5, 300) };
        let state = enter(final_combo, SessionStats::default(), DifficultyTier::Medium, &mut handle);
        assert!(state.new_record);
        assert_eq!(state.result.high_score, 340);
        assert_eq!(store.best(), 340);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn record_is_left_alone_when_not_beaten() {
        let store = MemoryScoreStore::with_best(300);
        let mut handle = store.clone();
        let final_combo = ComboState { score: 300, ..ComboState::new(1.5, 300) };
        let state = enter(final_combo, SessionStats::default(), DifficultyTier::Easy, &mut handle);
        assert!(!state.new_record);
        assert_eq!(store.save_count(), 0);
    }
}
