use crate::core::timers::{TimerScope, Timers};
use crate::game::difficulty::DifficultyTier;
use log::info;

/* ---------------------------- state ---------------------------- */

/// The idle menu. Arms nothing; it only holds the difficulty selection.
pub struct State {
    pub scope: TimerScope,
    pub tier: DifficultyTier,
}

pub fn enter(tier: DifficultyTier) -> State {
    State {
        scope: TimerScope::new(),
        tier,
    }
}

/* -------------------------- input -> nav ----------------------- */

pub fn select_difficulty(state: &mut State, name: &str) -> DifficultyTier {
    state.tier = DifficultyTier::from_name_or_default(name);
    info!("Difficulty set to {}.", state.tier);
    state.tier
}

pub fn exit(state: &mut State, timers: &mut Timers) {
    state.scope.cancel_all(timers);
}
