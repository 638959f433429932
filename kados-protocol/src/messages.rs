//! Message types for the vision module link
//!
//! Message types are divided into two categories:
//! - Controller → Module: capture/inference commands, power control, heartbeat
//! - Module → Controller: frame metadata, detection records, heartbeat replies

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use crate::records::{DetectionRecord, MAX_DETECTIONS};

// Message type IDs: Controller → Module
pub const MSG_SNAP: u8 = 0x01;
pub const MSG_INFER: u8 = 0x02;
pub const MSG_PING: u8 = 0x03;
pub const MSG_STANDBY: u8 = 0x04;
pub const MSG_WAKE: u8 = 0x05;

// Message type IDs: Module → Controller
pub const MSG_FRAME_INFO: u8 = 0x41;
pub const MSG_DETECTIONS: u8 = 0x42;
pub const MSG_PONG: u8 = 0x43;
pub const MSG_NAK: u8 = 0x44;

/// Commands from the station controller to the vision module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand {
    /// Capture a frame into the module's buffer
    Snap,
    /// Run detection on a previously captured frame
    Infer { frame_id: u8 },
    /// Heartbeat request
    Ping,
    /// Power down the sensor until the next Wake
    Standby,
    /// Wake the sensor from standby
    Wake,
}

impl HostCommand {
    /// Encode this command into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            HostCommand::Snap => Ok(Frame::empty(MSG_SNAP)),
            HostCommand::Infer { frame_id } => Frame::new(MSG_INFER, &[*frame_id]),
            HostCommand::Ping => Ok(Frame::empty(MSG_PING)),
            HostCommand::Standby => Ok(Frame::empty(MSG_STANDBY)),
            HostCommand::Wake => Ok(Frame::empty(MSG_WAKE)),
        }
    }

    /// Parse a command from a frame (module side, and tests)
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_SNAP => Ok(HostCommand::Snap),
            MSG_INFER => {
                let frame_id = *frame.payload.first().ok_or(FrameError::InvalidFrame)?;
                Ok(HostCommand::Infer { frame_id })
            }
            MSG_PING => Ok(HostCommand::Ping),
            MSG_STANDBY => Ok(HostCommand::Standby),
            MSG_WAKE => Ok(HostCommand::Wake),
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

/// Reasons the module can refuse a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NakCode {
    /// Sensor did not deliver a frame
    CaptureFailed,
    /// Infer referenced a frame id the module no longer holds
    UnknownFrame,
    /// The detection model failed to run
    ModelError,
    /// A previous command is still in progress
    Busy,
}

// Wire format values
const NAK_CAPTURE_FAILED: u8 = 0x01;
const NAK_UNKNOWN_FRAME: u8 = 0x02;
const NAK_MODEL_ERROR: u8 = 0x03;
const NAK_BUSY: u8 = 0x04;

impl NakCode {
    /// Parse a code from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            NAK_CAPTURE_FAILED => Some(NakCode::CaptureFailed),
            NAK_UNKNOWN_FRAME => Some(NakCode::UnknownFrame),
            NAK_MODEL_ERROR => Some(NakCode::ModelError),
            NAK_BUSY => Some(NakCode::Busy),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            NakCode::CaptureFailed => NAK_CAPTURE_FAILED,
            NakCode::UnknownFrame => NAK_UNKNOWN_FRAME,
            NakCode::ModelError => NAK_MODEL_ERROR,
            NakCode::Busy => NAK_BUSY,
        }
    }
}

/// Replies from the vision module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleReply {
    /// A frame was captured into the module buffer
    ///
    /// `len` is the encoded frame size in bytes; zero means the sensor
    /// produced an empty frame.
    FrameInfo { id: u8, len: u32 },
    /// Detection records for an inferred frame
    Detections(Vec<DetectionRecord, MAX_DETECTIONS>),
    /// Heartbeat reply
    Pong,
    /// Command refused
    Nak(NakCode),
}

impl ModuleReply {
    /// Encode this reply into a frame (module side, and tests)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        match self {
            ModuleReply::FrameInfo { id, len } => {
                let mut payload = [0u8; 5];
                payload[0] = *id;
                payload[1..5].copy_from_slice(&len.to_be_bytes());
                Frame::new(MSG_FRAME_INFO, &payload)
            }
            ModuleReply::Detections(records) => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload
                    .push(records.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                for record in records {
                    record
                        .write_into(&mut payload)
                        .map_err(|_| FrameError::PayloadTooLarge)?;
                }
                Frame::new(MSG_DETECTIONS, &payload)
            }
            ModuleReply::Pong => Ok(Frame::empty(MSG_PONG)),
            ModuleReply::Nak(code) => Frame::new(MSG_NAK, &[code.to_byte()]),
        }
    }

    /// Parse a reply from a frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.msg_type {
            MSG_FRAME_INFO => {
                if frame.payload.len() != 5 {
                    return Err(FrameError::InvalidFrame);
                }
                let len = u32::from_be_bytes([
                    frame.payload[1],
                    frame.payload[2],
                    frame.payload[3],
                    frame.payload[4],
                ]);
                Ok(ModuleReply::FrameInfo {
                    id: frame.payload[0],
                    len,
                })
            }
            MSG_DETECTIONS => {
                let count = *frame.payload.first().ok_or(FrameError::InvalidFrame)? as usize;
                if count > MAX_DETECTIONS {
                    return Err(FrameError::InvalidFrame);
                }

                let mut records = Vec::new();
                let mut at = 1;
                for _ in 0..count {
                    let (record, consumed) = DetectionRecord::read_from(&frame.payload[at..])
                        .map_err(|_| FrameError::InvalidFrame)?;
                    at += consumed;
                    // Cannot overflow: count is bounded by MAX_DETECTIONS
                    let _ = records.push(record);
                }

                Ok(ModuleReply::Detections(records))
            }
            MSG_PONG => Ok(ModuleReply::Pong),
            MSG_NAK => {
                let byte = *frame.payload.first().ok_or(FrameError::InvalidFrame)?;
                let code = NakCode::from_byte(byte).ok_or(FrameError::InvalidFrame)?;
                Ok(ModuleReply::Nak(code))
            }
            _ => Err(FrameError::InvalidFrame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Box2d;
    use heapless::String;

    fn record(label: &str, conf: u16) -> DetectionRecord {
        let mut l = String::new();
        let _ = l.push_str(label);
        DetectionRecord {
            label: l,
            confidence_x10: conf,
            bbox: Box2d::default(),
        }
    }

    #[test]
    fn test_snap_command() {
        let frame = HostCommand::Snap.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_SNAP);
        assert!(frame.payload.is_empty());
        assert_eq!(HostCommand::from_frame(&frame), Ok(HostCommand::Snap));
    }

    #[test]
    fn test_infer_command_carries_frame_id() {
        let frame = HostCommand::Infer { frame_id: 9 }.to_frame().unwrap();
        assert_eq!(frame.msg_type, MSG_INFER);
        assert_eq!(frame.payload[0], 9);
    }

    #[test]
    fn test_frame_info_roundtrip() {
        let original = ModuleReply::FrameInfo {
            id: 3,
            len: 614_400,
        };
        let frame = original.to_frame().unwrap();
        assert_eq!(ModuleReply::from_frame(&frame), Ok(original));
    }

    #[test]
    fn test_detections_roundtrip() {
        let mut records = Vec::new();
        records.push(record("plastic", 550)).unwrap();
        records.push(record("paper", 720)).unwrap();

        let original = ModuleReply::Detections(records);
        let frame = original.to_frame().unwrap();
        let parsed = ModuleReply::from_frame(&frame).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_empty_detections() {
        let original = ModuleReply::Detections(Vec::new());
        let frame = original.to_frame().unwrap();
        assert_eq!(ModuleReply::from_frame(&frame), Ok(original));
    }

    #[test]
    fn test_nak_roundtrip() {
        let original = ModuleReply::Nak(NakCode::CaptureFailed);
        let frame = original.to_frame().unwrap();
        assert_eq!(ModuleReply::from_frame(&frame), Ok(original));
    }

    #[test]
    fn test_reply_rejects_unknown_type() {
        let frame = Frame::empty(0x7F);
        assert_eq!(
            ModuleReply::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_detections_rejects_bad_count() {
        let frame = Frame::new(MSG_DETECTIONS, &[(MAX_DETECTIONS + 1) as u8]).unwrap();
        assert_eq!(
            ModuleReply::from_frame(&frame),
            Err(FrameError::InvalidFrame)
        );
    }
}
