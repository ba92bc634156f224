pub mod countdown;
pub mod gameover;
pub mod gameplay;
pub mod loading;
pub mod menu;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Loading,
    Idle,
    Countdown,
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Navigate(Screen),
}

/// The session state as seen by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Loading,
    Idle,
    Countdown(u32),
    Playing(u64),
    GameOver,
}

impl Screen {
    /// Edges of the session state machine; anything else is refused.
    pub fn can_navigate(self, to: Screen) -> bool {
        matches!(
            (self, to),
            (Screen::Loading, Screen::Idle)
                | (Screen::Idle, Screen::Countdown)
                | (Screen::Countdown, Screen::Playing)
                | (Screen::Playing, Screen::GameOver)
                | (Screen::GameOver, Screen::Countdown)
                | (Screen::GameOver, Screen::Idle)
        )
    }
}
