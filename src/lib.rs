pub mod app;
pub mod config;
pub mod core;
pub mod game;
pub mod screens;

pub use app::{App, Snapshot};
pub use config::Config;
