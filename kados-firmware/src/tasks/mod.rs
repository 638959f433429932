//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! `channels`.

pub mod display;
pub mod input;
pub mod station;

pub use display::display_task;
pub use input::input_task;
pub use station::{station_task, LED_COUNT};
