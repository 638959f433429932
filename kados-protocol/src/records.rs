//! Detection records returned by the vision module

use heapless::{String, Vec};

use crate::frame::MAX_PAYLOAD_SIZE;

/// Maximum detections per reply
pub const MAX_DETECTIONS: usize = 8;

/// Maximum raw model label length
pub const MAX_LABEL_LEN: usize = 16;

/// Wire size of the fixed part of a record (confidence + bounding box)
const RECORD_FIXED_LEN: usize = 2 + 8;

/// Errors that can occur decoding detection records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordError {
    /// Record is cut short
    Truncated,
    /// Label is longer than the wire format allows
    LabelTooLong,
    /// Label is not valid UTF-8
    InvalidLabel,
}

/// Axis-aligned bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Box2d {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

/// One detection from the vision module
///
/// `confidence_x10` is tenths of a percent (720 = 72.0%). The label is the
/// raw model class name; mapping onto display categories happens on the
/// controller side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionRecord {
    pub label: String<MAX_LABEL_LEN>,
    pub confidence_x10: u16,
    pub bbox: Box2d,
}

impl DetectionRecord {
    /// Wire format: [label_len][label bytes][conf_x10 BE][x BE][y BE][w BE][h BE]
    pub fn write_into(&self, out: &mut Vec<u8, MAX_PAYLOAD_SIZE>) -> Result<(), RecordError> {
        let label = self.label.as_bytes();
        out.push(label.len() as u8).map_err(|_| RecordError::Truncated)?;
        out.extend_from_slice(label)
            .map_err(|_| RecordError::Truncated)?;
        for half in [
            self.confidence_x10,
            self.bbox.x,
            self.bbox.y,
            self.bbox.w,
            self.bbox.h,
        ] {
            out.extend_from_slice(&half.to_be_bytes())
                .map_err(|_| RecordError::Truncated)?;
        }
        Ok(())
    }

    /// Decode one record from the start of `bytes`.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn read_from(bytes: &[u8]) -> Result<(Self, usize), RecordError> {
        let label_len = *bytes.first().ok_or(RecordError::Truncated)? as usize;
        if label_len > MAX_LABEL_LEN {
            return Err(RecordError::LabelTooLong);
        }

        let total = 1 + label_len + RECORD_FIXED_LEN;
        if bytes.len() < total {
            return Err(RecordError::Truncated);
        }

        let label_str =
            core::str::from_utf8(&bytes[1..1 + label_len]).map_err(|_| RecordError::InvalidLabel)?;
        let mut label = String::new();
        label.push_str(label_str).map_err(|_| RecordError::LabelTooLong)?;

        let mut fields = [0u16; 5];
        let mut at = 1 + label_len;
        for field in &mut fields {
            *field = u16::from_be_bytes([bytes[at], bytes[at + 1]]);
            at += 2;
        }

        Ok((
            Self {
                label,
                confidence_x10: fields[0],
                bbox: Box2d {
                    x: fields[1],
                    y: fields[2],
                    w: fields[3],
                    h: fields[4],
                },
            },
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(label: &str, conf: u16) -> DetectionRecord {
        let mut l = String::new();
        let _ = l.push_str(label);
        DetectionRecord {
            label: l,
            confidence_x10: conf,
            bbox: Box2d {
                x: 10,
                y: 20,
                w: 100,
                h: 200,
            },
        }
    }

    #[test]
    fn test_record_roundtrip() {
        let original = record("cardboard", 815);
        let mut wire = Vec::new();
        original.write_into(&mut wire).unwrap();

        let (decoded, consumed) = DetectionRecord::read_from(&wire).unwrap();
        assert_eq!(consumed, wire.len());
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_record_wire_layout() {
        let mut wire = Vec::new();
        record("paper", 720).write_into(&mut wire).unwrap();

        assert_eq!(wire[0], 5); // label length
        assert_eq!(&wire[1..6], b"paper");
        assert_eq!(u16::from_be_bytes([wire[6], wire[7]]), 720);
        assert_eq!(u16::from_be_bytes([wire[8], wire[9]]), 10); // bbox x
    }

    #[test]
    fn test_record_truncated() {
        let mut wire = Vec::new();
        record("paper", 720).write_into(&mut wire).unwrap();

        let result = DetectionRecord::read_from(&wire[..wire.len() - 1]);
        assert_eq!(result, Err(RecordError::Truncated));
    }

    #[test]
    fn test_record_label_too_long() {
        // Claimed label length beyond the maximum
        let wire = [MAX_LABEL_LEN as u8 + 1, b'x'];
        assert_eq!(
            DetectionRecord::read_from(&wire),
            Err(RecordError::LabelTooLong)
        );
    }

    #[test]
    fn test_record_invalid_utf8() {
        let mut wire = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
        record("ab", 100).write_into(&mut wire).unwrap();
        wire[1] = 0xFF; // corrupt a label byte
        assert_eq!(
            DetectionRecord::read_from(&wire),
            Err(RecordError::InvalidLabel)
        );
    }
}
