//! Serial vision co-processor client
//!
//! The vision module owns the camera sensor and the detection model; the
//! station talks to it over the framed UART protocol in kados-protocol.
//! `Snap` captures a frame into the module's buffer and answers with the
//! frame's id and size; `Infer` runs detection on a buffered frame and
//! answers with compact detection records. Frame pixels never cross the
//! link.
//!
//! Every exchange is strictly request/reply. The parser is reset before
//! each command, so a reply abandoned mid-parse (the caller timing out a
//! hung module) can not bleed into the next exchange.

use embedded_io_async::{Read, Write};

use kados_core::traits::{
    Camera, CameraError, CameraFrame, Classifier, ClassifierError, Detections,
};
use kados_protocol::{FrameParser, HostCommand, ModuleReply, NakCode};

/// Errors on the module link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// UART read or write failed
    Io,
    /// The peer closed the stream
    Closed,
    /// The module answered with something unexpected
    Protocol,
    /// The module refused the command
    Nak(NakCode),
}

/// A frame held in the module's buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisionFrame {
    /// Buffer slot id, passed back for inference
    pub id: u8,
    /// Encoded frame size in bytes
    pub len: u32,
}

impl CameraFrame for VisionFrame {
    fn len(&self) -> usize {
        self.len as usize
    }
}

/// Client for the serial vision module
pub struct VisionModule<U> {
    io: U,
    parser: FrameParser,
}

impl<U> VisionModule<U>
where
    U: Read + Write,
{
    /// Create a client over a claimed UART
    pub fn new(io: U) -> Self {
        Self {
            io,
            parser: FrameParser::new(),
        }
    }

    /// Send one command, discarding any half-parsed earlier reply
    async fn send(&mut self, command: HostCommand) -> Result<(), LinkError> {
        self.parser.reset();

        let frame = command.to_frame().map_err(|_| LinkError::Protocol)?;
        let encoded = frame.encode_to_vec().map_err(|_| LinkError::Protocol)?;
        self.io
            .write_all(&encoded)
            .await
            .map_err(|_| LinkError::Io)?;
        Ok(())
    }

    /// Read until one complete reply parses.
    ///
    /// Checksum failures drop the damaged frame and keep reading; the
    /// caller's timeout bounds the whole exchange.
    async fn recv(&mut self) -> Result<ModuleReply, LinkError> {
        let mut buf = [0u8; 32];
        loop {
            let n = self.io.read(&mut buf).await.map_err(|_| LinkError::Io)?;
            if n == 0 {
                return Err(LinkError::Closed);
            }

            for &byte in &buf[..n] {
                match self.parser.feed(byte) {
                    Ok(Some(frame)) => {
                        return ModuleReply::from_frame(&frame)
                            .map_err(|_| LinkError::Protocol);
                    }
                    Ok(None) => {}
                    Err(_) => {
                        // Damaged frame; the parser has already resynced
                    }
                }
            }
        }
    }

    async fn exchange(&mut self, command: HostCommand) -> Result<ModuleReply, LinkError> {
        self.send(command).await?;
        match self.recv().await? {
            ModuleReply::Nak(code) => Err(LinkError::Nak(code)),
            reply => Ok(reply),
        }
    }

    /// Heartbeat round trip
    pub async fn ping(&mut self) -> Result<(), LinkError> {
        match self.exchange(HostCommand::Ping).await? {
            ModuleReply::Pong => Ok(()),
            _ => Err(LinkError::Protocol),
        }
    }

    /// Power the sensor down; used during teardown
    pub async fn standby(&mut self) -> Result<(), LinkError> {
        self.send(HostCommand::Standby).await
    }

    /// Wake the sensor from standby
    pub async fn wake(&mut self) -> Result<(), LinkError> {
        self.send(HostCommand::Wake).await
    }
}

impl<U> Camera for VisionModule<U>
where
    U: Read + Write,
{
    type Frame = VisionFrame;

    async fn capture(&mut self) -> Result<VisionFrame, CameraError> {
        match self.exchange(HostCommand::Snap).await {
            Ok(ModuleReply::FrameInfo { id, len }) => Ok(VisionFrame { id, len }),
            Ok(_) => Err(CameraError::Link),
            Err(LinkError::Nak(NakCode::CaptureFailed)) => Err(CameraError::Capture),
            Err(_) => Err(CameraError::Link),
        }
    }
}

impl<U> Classifier<VisionFrame> for VisionModule<U>
where
    U: Read + Write,
{
    async fn infer(&mut self, frame: &VisionFrame) -> Result<Detections, ClassifierError> {
        let command = HostCommand::Infer { frame_id: frame.id };
        match self.exchange(command).await {
            Ok(ModuleReply::Detections(records)) => Ok(records),
            Ok(_) => Err(ClassifierError::Link),
            Err(LinkError::Nak(NakCode::ModelError)) => Err(ClassifierError::Inference),
            Err(_) => Err(ClassifierError::Link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use heapless::{String, Vec};
    use kados_protocol::{Box2d, DetectionRecord};

    /// Scripted UART: records writes, serves reads from queued replies
    #[derive(Default)]
    struct ScriptedUart {
        sent: Vec<u8, 256>,
        replies: Vec<u8, 512>,
        read_at: usize,
    }

    impl ScriptedUart {
        fn queue_reply(&mut self, reply: &ModuleReply) {
            let frame = reply.to_frame().unwrap();
            let encoded = frame.encode_to_vec().unwrap();
            self.replies.extend_from_slice(&encoded).unwrap();
        }
    }

    #[derive(Debug)]
    struct UartError;

    impl embedded_io_async::Error for UartError {
        fn kind(&self) -> embedded_io_async::ErrorKind {
            embedded_io_async::ErrorKind::Other
        }
    }

    impl embedded_io_async::ErrorType for ScriptedUart {
        type Error = UartError;
    }

    impl Read for ScriptedUart {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
            let remaining = &self.replies[self.read_at..];
            if remaining.is_empty() {
                return Ok(0); // peer closed
            }
            let n = remaining.len().min(buf.len());
            buf[..n].copy_from_slice(&remaining[..n]);
            self.read_at += n;
            Ok(n)
        }
    }

    impl Write for ScriptedUart {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, UartError> {
            self.sent.extend_from_slice(buf).map_err(|_| UartError)?;
            Ok(buf.len())
        }
    }

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
    fn test_capture_maps_frame_info() {
        let mut uart = ScriptedUart::default();
        uart.queue_reply(&ModuleReply::FrameInfo { id: 4, len: 9216 });

        let mut module = VisionModule::new(uart);
        let frame = block_on(module.capture()).unwrap();
        assert_eq!(frame.id, 4);
        assert_eq!(CameraFrame::len(&frame), 9216);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_capture_nak_is_capture_error() {
        let mut uart = ScriptedUart::default();
        uart.queue_reply(&ModuleReply::Nak(NakCode::CaptureFailed));

        let mut module = VisionModule::new(uart);
        assert_eq!(block_on(module.capture()), Err(CameraError::Capture));
    }

    #[test]
    fn test_capture_on_dead_link() {
        let uart = ScriptedUart::default(); // no reply queued
        let mut module = VisionModule::new(uart);
        assert_eq!(block_on(module.capture()), Err(CameraError::Link));
    }

    #[test]
    fn test_infer_returns_records() {
        let mut records = Vec::new();
        records.push(record("organic", 707)).unwrap();

        let mut uart = ScriptedUart::default();
        uart.queue_reply(&ModuleReply::Detections(records.clone()));

        let mut module = VisionModule::new(uart);
        let frame = VisionFrame { id: 2, len: 100 };
        let detections = block_on(module.infer(&frame)).unwrap();
        assert_eq!(detections, records);

        // The INFER command carried the frame id
        let sent = &module.io.sent;
        assert_eq!(sent[2], 0x02); // MSG_INFER
        assert_eq!(sent[3], 2); // frame id
    }

    #[test]
    fn test_infer_model_nak_is_inference_error() {
        let mut uart = ScriptedUart::default();
        uart.queue_reply(&ModuleReply::Nak(NakCode::ModelError));

        let mut module = VisionModule::new(uart);
        let frame = VisionFrame { id: 0, len: 100 };
        assert_eq!(
            block_on(module.infer(&frame)),
            Err(ClassifierError::Inference)
        );
    }

    #[test]
    fn test_recv_skips_damaged_frame() {
        let mut uart = ScriptedUart::default();
        // Corrupted pong, then a clean frame info
        let mut bad = ModuleReply::Pong.to_frame().unwrap().encode_to_vec().unwrap();
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        uart.replies.extend_from_slice(&bad).unwrap();
        uart.queue_reply(&ModuleReply::FrameInfo { id: 1, len: 64 });

        let mut module = VisionModule::new(uart);
        let frame = block_on(module.capture()).unwrap();
        assert_eq!(frame.id, 1);
    }

    #[test]
    fn test_ping_round_trip() {
        let mut uart = ScriptedUart::default();
        uart.queue_reply(&ModuleReply::Pong);

        let mut module = VisionModule::new(uart);
        assert!(block_on(module.ping()).is_ok());
    }
}
