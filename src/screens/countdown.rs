use crate::config::Config;
use crate::core::timers::{Task, TimerScope, Timers};
use crate::game::difficulty::DifficultyTier;
use crate::game::feedback::Banner;
use crate::screens::{Screen, ScreenAction};
use log::debug;

/* ---------------------------- state ---------------------------- */

pub struct State {
    pub scope: TimerScope,
    pub remaining: u32,
    /// Frozen for the session that follows.
    pub tier: DifficultyTier,
}

pub fn enter(timers: &mut Timers, config: &Config, tier: DifficultyTier) -> State {
    let mut scope = TimerScope::new();
    scope.every(timers, config.countdown_step_ms, Task::CountdownStep);
    State {
        scope,
        remaining: config.countdown_from,
        tier,
    }
}

/* ---------------------------- update --------------------------- */

/// `Countdown(n)` steps to `n-1`; the step after `Countdown(0)` starts play.
pub fn on_task(state: &mut State, task: Task) -> ScreenAction {
    match task {
        Task::CountdownStep if state.remaining == 0 => ScreenAction::Navigate(Screen::Playing),
        Task::CountdownStep => {
            state.remaining -= 1;
            debug!("Countdown {}", state.remaining);
            ScreenAction::None
        }
        _ => ScreenAction::None,
    }
}

pub fn banner(state: &State) -> Banner {
    Banner::for_countdown(state.remaining)
}

pub fn exit(state: &mut State, timers: &mut Timers) {
    state.scope.cancel_all(timers);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timers::micros;

    #[test]
    fn counts_down_then_starts_play() {
        let mut timers = Timers::new();
        let config = Config::default();
        let mut state = enter(&mut timers, &config, DifficultyTier::Hard);
        let mut seen = vec![banner(&state)];
        let mut actions = Vec::new();
        while let Some((_, task)) = timers.pop_due(micros(10_000.0)) {
            let action = on_task(&mut state, task);
            seen.push(banner(&state));
            actions.push(action);
            if action != ScreenAction::None {
                exit(&mut state, &mut timers);
            }
        }
        assert_eq!(
            seen,
            vec![
                Banner::Countdown(3),
                Banner::Countdown(2),
                Banner::Countdown(1),
                Banner::Announcing,
                Banner::Announcing,
            ]
        );
        assert_eq!(actions.last(), Some(&ScreenAction::Navigate(Screen::Playing)));
        assert_eq!(timers.now_us(), micros(4000.0));
        assert_eq!(timers.armed_count(), 0);
    }
}
