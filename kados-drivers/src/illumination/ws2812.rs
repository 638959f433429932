//! WS2812 LED ring over SPI
//!
//! The WS2812 one-wire waveform is synthesized on the SPI MOSI line: with
//! the bus clocked at 2.4 MHz, every data bit becomes three SPI bits
//! (`100` for zero, `110` for one), which lands each bit symbol at the
//! 1.25 µs the LEDs expect. Colors go out in GRB order, followed by a
//! stretch of idle-low bytes long enough to latch.

use embedded_hal::spi::SpiBus;

use kados_core::traits::{LightStrip, Rgb, StripError};

/// Largest ring this driver can buffer
pub const MAX_PIXELS: usize = 16;

/// SPI bytes per color byte (8 data bits × 3 SPI bits)
const SPI_BYTES_PER_BYTE: usize = 3;

/// SPI bytes per pixel (three GRB color bytes)
const SPI_BYTES_PER_PIXEL: usize = 3 * SPI_BYTES_PER_BYTE;

/// Idle-low tail that latches the shifted colors (> 50 µs at 2.4 MHz)
const LATCH_BYTES: usize = 20;

/// WS2812 driver over a claimed SPI bus
pub struct Ws2812Spi<SPI, const N: usize> {
    spi: SPI,
    pixels: [Rgb; N],
}

impl<SPI, const N: usize> Ws2812Spi<SPI, N>
where
    SPI: SpiBus<u8>,
{
    /// Create a driver; all pixels start off
    ///
    /// `N` must fit the transmit buffer sized for [`MAX_PIXELS`].
    pub fn new(spi: SPI) -> Self {
        const {
            assert!(N <= MAX_PIXELS);
        }
        Self {
            spi,
            pixels: [Rgb::OFF; N],
        }
    }
}

/// Expand one color byte into its three-bits-per-bit SPI form
fn encode_byte(byte: u8) -> [u8; SPI_BYTES_PER_BYTE] {
    let mut acc: u32 = 0;
    for bit in 0..8 {
        let symbol = if byte & (0x80 >> bit) != 0 { 0b110 } else { 0b100 };
        acc = (acc << 3) | symbol;
    }
    [(acc >> 16) as u8, (acc >> 8) as u8, acc as u8]
}

impl<SPI, const N: usize> LightStrip for Ws2812Spi<SPI, N>
where
    SPI: SpiBus<u8>,
{
    fn set_all(&mut self, color: Rgb) {
        self.pixels = [color; N];
    }

    fn show(&mut self) -> Result<(), StripError> {
        let mut buffer = [0u8; MAX_PIXELS * SPI_BYTES_PER_PIXEL + LATCH_BYTES];
        let mut at = 0;

        for pixel in &self.pixels {
            // WS2812 shifts green first
            for channel in [pixel.g, pixel.r, pixel.b] {
                buffer[at..at + SPI_BYTES_PER_BYTE].copy_from_slice(&encode_byte(channel));
                at += SPI_BYTES_PER_BYTE;
            }
        }

        // Latch tail is already zeroed
        let total = at + LATCH_BYTES;
        self.spi
            .write(&buffer[..total])
            .map_err(|_| StripError::Bus)?;
        self.spi.flush().map_err(|_| StripError::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct CapturingSpi {
        written: heapless::Vec<u8, 512>,
    }

    impl embedded_hal::spi::ErrorType for CapturingSpi {
        type Error = Infallible;
    }

    impl SpiBus<u8> for CapturingSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            words.fill(0);
            Ok(())
        }
        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            self.written.extend_from_slice(words).unwrap();
            Ok(())
        }
        fn transfer(&mut self, read: &mut [u8], _write: &[u8]) -> Result<(), Infallible> {
            read.fill(0);
            Ok(())
        }
        fn transfer_in_place(&mut self, _words: &mut [u8]) -> Result<(), Infallible> {
            Ok(())
        }
        fn flush(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    #[test]
    fn test_encode_byte_symbols() {
        // All zeros: 100 repeated; all ones: 110 repeated
        assert_eq!(encode_byte(0x00), [0x92, 0x49, 0x24]);
        assert_eq!(encode_byte(0xFF), [0xDB, 0x6D, 0xB6]);
    }

    #[test]
    fn test_show_emits_grb_and_latch() {
        let mut strip: Ws2812Spi<_, 2> = Ws2812Spi::new(CapturingSpi::default());
        strip.set_all(Rgb::new(0xFF, 0x00, 0x00)); // pure red
        strip.show().unwrap();

        let written = &strip.spi.written;
        assert_eq!(written.len(), 2 * SPI_BYTES_PER_PIXEL + LATCH_BYTES);

        // Green channel (zero) first, then red (full)
        assert_eq!(&written[0..3], &encode_byte(0x00));
        assert_eq!(&written[3..6], &encode_byte(0xFF));

        // Latch tail is idle-low
        assert!(written[2 * SPI_BYTES_PER_PIXEL..].iter().all(|&b| b == 0));
    }
}
