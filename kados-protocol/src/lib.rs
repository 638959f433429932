//! Vision Module Communication Protocol
//!
//! This crate defines the UART-based protocol between the station controller
//! and the vision co-processor module. The module owns the camera and the
//! detection model; the controller asks it to capture a frame and to run
//! detection on a captured frame, and receives compact detection records back.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary frame format:
//! ```text
//! ┌──────┬────────┬──────┬─────────────┬──────────┐
//! │ SYNC │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B   │ 1B     │ 1B   │ 0–240B      │ 1B       │
//! └──────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The module never speaks unprompted — every reply corresponds to exactly
//! one controller command, which keeps the link state trivial to reason
//! about after a timeout or a resync.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod records;

pub use frame::{Frame, FrameError, FrameParser, FRAME_SYNC, MAX_PAYLOAD_SIZE};
pub use messages::{HostCommand, ModuleReply, NakCode};
pub use records::{Box2d, DetectionRecord, RecordError, MAX_DETECTIONS, MAX_LABEL_LEN};
