//! Board-agnostic core logic for the waste classification station firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (camera, classifier, light strip, display)
//! - Activation windows (expiry-timestamp timers with one-shot close events)
//! - Motion detection from consecutive distance samples
//! - Classification throttling and detection selection policy
//! - The station controller's per-tick decision logic
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]
#![allow(async_fn_in_trait)]

pub mod classify;
pub mod config;
pub mod motion;
pub mod station;
pub mod traits;
pub mod window;
