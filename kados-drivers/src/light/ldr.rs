//! LDR ambient light sensor
//!
//! A photoresistor module with a comparator and a digital output. The
//! output is inverted: the line sits low in bright surroundings and is
//! asserted high when it gets dark.

use embedded_hal::digital::InputPin;

/// Digital LDR module driver
pub struct Ldr<PIN> {
    pin: PIN,
}

impl<PIN: InputPin> Ldr<PIN> {
    /// Create a driver over a claimed input pin
    pub fn new(pin: PIN) -> Self {
        Self { pin }
    }

    /// Whether the surroundings are dark.
    ///
    /// A pin read fault reads as "not dark" - a broken sensor must not be
    /// able to keep the illumination firing.
    pub fn is_dark(&mut self) -> bool {
        self.pin.is_high().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{Error, ErrorKind, ErrorType};

    struct FakePin {
        level: Result<bool, PinFault>,
    }

    #[derive(Debug)]
    struct PinFault;

    impl Error for PinFault {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    impl ErrorType for FakePin {
        type Error = PinFault;
    }

    impl InputPin for FakePin {
        fn is_high(&mut self) -> Result<bool, PinFault> {
            self.level.as_ref().map(|&level| level).map_err(|_| PinFault)
        }
        fn is_low(&mut self) -> Result<bool, PinFault> {
            self.is_high().map(|high| !high)
        }
    }

    #[test]
    fn test_high_line_reads_dark() {
        let mut ldr = Ldr::new(FakePin { level: Ok(true) });
        assert!(ldr.is_dark());
    }

    #[test]
    fn test_low_line_reads_bright() {
        let mut ldr = Ldr::new(FakePin { level: Ok(false) });
        assert!(!ldr.is_dark());
    }

    #[test]
    fn test_fault_reads_not_dark() {
        let mut ldr = Ldr::new(FakePin {
            level: Err(PinFault),
        });
        assert!(!ldr.is_dark());
    }
}
