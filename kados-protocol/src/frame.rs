//! Frame codec for the vision module link.
//!
//! Every message travels as `SYNC LEN TYPE PAYLOAD.. XOR`, where the
//! checksum is the XOR of LEN, TYPE and each payload byte. The sync byte
//! starts every frame, so a receiver that joins mid-stream (or abandons a
//! half-read reply) locks back on at the next frame boundary.

use heapless::Vec;

/// Frame synchronization byte
pub const FRAME_SYNC: u8 = 0xA5;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 240;

/// Maximum complete frame size (SYNC + LENGTH + TYPE + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + 4;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Build a frame around a payload slice
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Build a payload-less frame
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// XOR of LEN, TYPE and every payload byte
    fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
        payload
            .iter()
            .fold(length ^ msg_type, |acc, &byte| acc ^ byte)
    }

    /// Serialize into `out`, returning the number of bytes written
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let wire_len = self.payload.len() + 4;
        if out.len() < wire_len {
            return Err(FrameError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        out[0] = FRAME_SYNC;
        out[1] = length;
        out[2] = self.msg_type;
        out[3..wire_len - 1].copy_from_slice(&self.payload);
        out[wire_len - 1] = Self::checksum(length, self.msg_type, &self.payload);

        Ok(wire_len)
    }

    /// Serialize into an owned buffer
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut wire = [0u8; MAX_FRAME_SIZE];
        let written = self.encode(&mut wire)?;
        Vec::from_slice(&wire[..written]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Byte-at-a-time frame assembler.
///
/// Anything received before a sync byte is dropped on the floor, which is
/// what lets the link recover from noise or a truncated frame without any
/// out-of-band help.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    pending: Vec<u8, MAX_PAYLOAD_SIZE>,
    announced_len: u8,
    msg_type: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Hunting for the sync byte
    Sync,
    /// Next byte is the payload length
    Length,
    /// Next byte is the message type
    Type,
    /// Collecting payload bytes
    Payload,
    /// Next byte is the checksum
    Checksum,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Parser in its hunting state
    pub fn new() -> Self {
        Self {
            state: ParseState::Sync,
            pending: Vec::new(),
            announced_len: 0,
            msg_type: 0,
        }
    }

    /// Drop any partial frame and hunt for the next sync byte.
    ///
    /// Clients call this before each new command, so a reply abandoned
    /// mid-parse by a timeout can not bleed into the next exchange.
    pub fn reset(&mut self) {
        self.state = ParseState::Sync;
        self.pending.clear();
        self.announced_len = 0;
        self.msg_type = 0;
    }

    /// Advance the parser by one received byte.
    ///
    /// Yields `Ok(Some(frame))` on the byte that completes a valid frame,
    /// `Ok(None)` while a frame is still accumulating, and `Err` when the
    /// frame in progress had to be discarded (the parser has already reset
    /// itself and is hunting again).
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ParseState::Sync => {
                if byte == FRAME_SYNC {
                    self.state = ParseState::Length;
                }
                Ok(None)
            }
            ParseState::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                self.announced_len = byte;
                self.state = ParseState::Type;
                Ok(None)
            }
            ParseState::Type => {
                self.msg_type = byte;
                self.pending.clear();
                self.state = if self.announced_len == 0 {
                    ParseState::Checksum
                } else {
                    ParseState::Payload
                };
                Ok(None)
            }
            ParseState::Payload => {
                // Capacity holds announced_len bytes; the length check above bounds it
                let _ = self.pending.push(byte);
                if self.pending.len() == self.announced_len as usize {
                    self.state = ParseState::Checksum;
                }
                Ok(None)
            }
            ParseState::Checksum => {
                let wanted = Frame::checksum(self.announced_len, self.msg_type, &self.pending);
                if byte != wanted {
                    self.reset();
                    return Err(FrameError::InvalidChecksum);
                }

                let frame = Frame {
                    msg_type: self.msg_type,
                    payload: self.pending.clone(),
                };
                self.reset();
                Ok(Some(frame))
            }
        }
    }

    /// Advance the parser over a received chunk, stopping at the first
    /// complete frame. Bytes after that frame are left unconsumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_encode_empty_payload() {
        let frame = Frame::empty(0x01); // SNAP command
        let mut wire = [0u8; 8];
        let written = frame.encode(&mut wire).unwrap();

        assert_eq!(written, 4);
        assert_eq!(wire[..4], [FRAME_SYNC, 0, 0x01, 0x01]);
    }

    #[test]
    fn test_frame_encode_with_payload() {
        let frame = Frame::new(0x02, &[7]).unwrap(); // INFER frame id 7
        let mut wire = [0u8; 8];
        let written = frame.encode(&mut wire).unwrap();

        assert_eq!(written, 5);
        assert_eq!(wire[..5], [FRAME_SYNC, 1, 0x02, 7, 1 ^ 0x02 ^ 7]);
    }

    #[test]
    fn test_frame_roundtrip() {
        let original = Frame::new(0x42, &[1, 2, 3, 4, 5]).unwrap();
        let wire = original.encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&wire).unwrap().unwrap();

        assert_eq!(parsed, original);
    }

    #[test]
    fn test_parser_invalid_checksum() {
        let mut wire = Frame::empty(0x03).encode_to_vec().unwrap();
        *wire.last_mut().unwrap() ^= 0xFF;

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&wire), Err(FrameError::InvalidChecksum));
    }

    #[test]
    fn test_parser_resync_after_garbage() {
        let wire = Frame::empty(0x43).encode_to_vec().unwrap(); // PONG

        let mut noisy = Vec::<u8, 20>::new();
        noisy.extend_from_slice(&[0x00, 0xFF, 0x5A, 0x01]).unwrap();
        noisy.extend_from_slice(&wire).unwrap();

        let mut parser = FrameParser::new();
        let parsed = parser.feed_bytes(&noisy).unwrap().unwrap();

        assert_eq!(parsed.msg_type, 0x43);
    }

    #[test]
    fn test_parser_recovers_after_checksum_error() {
        let bad = {
            let mut wire = Frame::empty(0x43).encode_to_vec().unwrap();
            *wire.last_mut().unwrap() ^= 0xFF;
            wire
        };
        let good = Frame::new(0x41, &[1, 0, 0, 4, 0]).unwrap();

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&bad), Err(FrameError::InvalidChecksum));

        let parsed = parser
            .feed_bytes(&good.encode_to_vec().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(parsed.msg_type, 0x41);
    }

    #[test]
    fn test_parser_reset_drops_partial_frame() {
        let wire = Frame::new(0x42, &[9, 9, 9]).unwrap().encode_to_vec().unwrap();

        let mut parser = FrameParser::new();
        // Half a frame arrives, then the client times out and resets
        parser.feed_bytes(&wire[..3]).unwrap();
        parser.reset();

        // A fresh complete frame still parses
        let parsed = parser.feed_bytes(&wire).unwrap().unwrap();
        assert_eq!(parsed.payload.len(), 3);
    }

    #[test]
    fn test_payload_too_large() {
        let oversized = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(Frame::new(0x42, &oversized), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_parser_rejects_oversized_length_byte() {
        let mut parser = FrameParser::new();
        parser.feed(FRAME_SYNC).unwrap();
        assert_eq!(parser.feed(0xFF), Err(FrameError::InvalidFrame));
    }
}
