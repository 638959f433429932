//! Vision co-processor drivers

pub mod serial;

pub use serial::{LinkError, VisionFrame, VisionModule};
