//! Snapshot rendering for the status panel

pub mod renderer;

pub use renderer::{DisplayMode, Renderer, Screen, SCREEN_COLS, SCREEN_ROWS};
