//! Configuration parsing
//!
//! The station configuration is embedded as TOML and parsed at boot.

pub mod toml;

pub use toml::{parse_config, ParseError};
