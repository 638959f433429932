//! Distance ranging drivers

pub mod hcsr04;

pub use hcsr04::{Hcsr04, PulseClock, RangeError, ECHO_TIMEOUT_US};
