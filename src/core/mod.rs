pub mod input;
pub mod timers;
