//! Virtual-clock timer queue.
//!
//! All periodic work in a session (spawner, countdown, play clock, cue
//! auto-clears) is scheduled here and fired from `App::frame`, one task at a
//! time in deadline order. Each session state arms its timers through a
//! [`TimerScope`] and cancels that scope on exit, so nothing armed by an old
//! state can fire into a new one.

use crate::core::input::Lane;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Task {
    AssetsReady,
    CountdownStep,
    PlayClock,
    Spawn,
    ClearFeedback(Lane),
    DanceIdle,
}

#[derive(Debug)]
struct Entry {
    token: TimerToken,
    task: Task,
    due_us: u64,
    period_us: Option<u64>,
}

/// Converts a millisecond duration to whole microseconds. Negative and NaN
/// durations are zero.
#[inline(always)]
pub fn micros(ms: f64) -> u64 {
    if ms.is_nan() || ms <= 0.0 {
        0
    } else {
        (ms * 1000.0).round() as u64
    }
}

/// The clock counts whole microseconds so fractional frame deltas add up
/// exactly and a deadline on a second boundary is never missed by rounding.
#[derive(Debug, Default)]
pub struct Timers {
    now_us: u64,
    next_id: u64,
    entries: Vec<Entry>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn now_us(&self) -> u64 {
        self.now_us
    }

    pub fn after(&mut self, delay_ms: f64, task: Task) -> TimerToken {
        self.arm(micros(delay_ms), None, task)
    }

    pub fn every(&mut self, period_ms: f64, task: Task) -> TimerToken {
        // A zero period would spin forever inside one frame.
        let period_us = micros(period_ms).max(1000);
        self.arm(period_us, Some(period_us), task)
    }

    fn arm(&mut self, delay_us: u64, period_us: Option<u64>, task: Task) -> TimerToken {
        let token = TimerToken(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            token,
            task,
            due_us: self.now_us.saturating_add(delay_us),
            period_us,
        });
        token
    }

    /// Returns `false` when the token was already cancelled or has fired.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.token != token);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn is_armed(&self, token: TimerToken) -> bool {
        self.entries.iter().any(|e| e.token == token)
    }

    pub fn armed_count(&self) -> usize {
        self.entries.len()
    }

    /// Pops the earliest task due at or before `until_us` and moves the clock
    /// to its deadline. Ties fire in arming order. Periodic entries are
    /// re-armed one period later; one-shots are consumed.
    pub fn pop_due(&mut self, until_us: u64) -> Option<(TimerToken, Task)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_us <= until_us)
            .min_by_key(|(_, e)| (e.due_us, e.token.0))
            .map(|(i, _)| i)?;

        let (token, task, due_us, period_us) = {
            let e = &self.entries[idx];
            (e.token, e.task, e.due_us, e.period_us)
        };
        self.now_us = self.now_us.max(due_us);
        match period_us {
            Some(period) => self.entries[idx].due_us = due_us.saturating_add(period),
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some((token, task))
    }

    /// Moves the clock forward once every task due before `until_us` has been
    /// popped.
    pub fn settle(&mut self, until_us: u64) {
        self.now_us = self.now_us.max(until_us);
    }
}

/// The set of timers armed by one session state.
#[derive(Debug, Default)]
pub struct TimerScope {
    tokens: Vec<TimerToken>,
}

impl TimerScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(&mut self, timers: &mut Timers, delay_ms: f64, task: Task) -> TimerToken {
        let token = timers.after(delay_ms, task);
        self.tokens.push(token);
        token
    }

    pub fn every(&mut self, timers: &mut Timers, period_ms: f64, task: Task) -> TimerToken {
        let token = timers.every(period_ms, task);
        self.tokens.push(token);
        token
    }

    /// Cancels one token this scope armed; a stale token is ignored.
    pub fn cancel(&mut self, timers: &mut Timers, token: TimerToken) {
        if let Some(pos) = self.tokens.iter().position(|t| *t == token) {
            self.tokens.swap_remove(pos);
            timers.cancel(token);
        }
    }

    /// Forgets a one-shot that has fired so the scope does not grow unbounded.
    pub fn release(&mut self, token: TimerToken) {
        self.tokens.retain(|t| *t != token);
    }

    pub fn owns(&self, token: TimerToken) -> bool {
        self.tokens.contains(&token)
    }

    pub fn cancel_all(&mut self, timers: &mut Timers) {
        for token in self.tokens.drain(..) {
            timers.cancel(token);
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
