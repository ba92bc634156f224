use crate::config::Config;
use crate::core::timers::{Task, TimerScope, TimerToken, Timers};
use crate::screens::{Screen, ScreenAction};

/* ---------------------------- state ---------------------------- */

pub struct State {
    pub scope: TimerScope,
}

/// Arms the asset-readiness stand-in. A real asset-ready signal from the
/// host ends the state earlier.
pub fn enter(timers: &mut Timers, config: &Config) -> State {
    let mut scope = TimerScope::new();
    scope.after(timers, config.loading_delay_ms, Task::AssetsReady);
    State { scope }
}

/* ---------------------------- update --------------------------- */

pub fn on_task(state: &mut State, token: TimerToken, task: Task) -> ScreenAction {
    match task {
        Task::AssetsReady => {
            state.scope.release(token);
            ScreenAction::Navigate(Screen::Idle)
        }
        _ => ScreenAction::None,
    }
}

pub fn exit(state: &mut State, timers: &mut Timers) {
    state.scope.cancel_all(timers);
}
