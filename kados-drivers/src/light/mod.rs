//! Ambient light sensing drivers

pub mod ldr;

pub use ldr::Ldr;
