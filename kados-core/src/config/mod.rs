//! Configuration types
//!
//! Board-agnostic configuration structures, populated from the embedded
//! `station.toml` at boot.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
