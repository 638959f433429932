//! HC-SR04 ultrasonic range sensor
//!
//! The sensor is triggered with a 10 µs pulse and answers with an echo
//! pulse whose width is the round-trip time of the ping. Both echo edges
//! are awaited in bounded busy-wait loops that compare a monotonic clock
//! against one deadline computed at call entry - a stuck echo line returns
//! "no reading" instead of spinning forever, and waiting for the first
//! edge can never eat into the budget of the second.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Default echo timeout, measured from the trigger pulse
///
/// 100 ms is far beyond the sensor's ~4 m range; hitting it means a stuck
/// line or nothing to reflect off, not a long-distance reading.
pub const ECHO_TIMEOUT_US: u64 = 100_000;

/// Trigger pulse width
const TRIGGER_PULSE_US: u32 = 10;

/// Monotonic microsecond clock for pulse timing
///
/// The firmware backs this with the system timer; tests substitute a
/// scripted clock to drive the deadline logic deterministically.
pub trait PulseClock {
    /// Microseconds since some fixed origin
    fn now_us(&mut self) -> u64;
}

/// Errors that can occur during a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangeError {
    /// A trigger or echo pin operation failed
    Pin,
}

/// HC-SR04 driver
pub struct Hcsr04<TRIG, ECHO, D, C> {
    trigger: TRIG,
    echo: ECHO,
    delay: D,
    clock: C,
    timeout_us: u64,
}

impl<TRIG, ECHO, D, C> Hcsr04<TRIG, ECHO, D, C>
where
    TRIG: OutputPin,
    ECHO: InputPin,
    D: DelayNs,
    C: PulseClock,
{
    /// Create a driver over a claimed trigger output and echo input
    pub fn new(trigger: TRIG, echo: ECHO, delay: D, clock: C, timeout_us: u64) -> Self {
        Self {
            trigger,
            echo,
            delay,
            clock,
            timeout_us,
        }
    }

    /// Measure the distance to the nearest reflector.
    ///
    /// Returns `Ok(Some(mm))`, or `Ok(None)` when the echo never arrived
    /// (or never ended) inside the timeout. Only toggles the trigger pin;
    /// no other state is touched.
    pub fn measure(&mut self) -> Result<Option<u32>, RangeError> {
        self.trigger.set_high().map_err(|_| RangeError::Pin)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trigger.set_low().map_err(|_| RangeError::Pin)?;

        // One deadline for both edge waits, fixed here and never recomputed.
        let deadline = self.clock.now_us().saturating_add(self.timeout_us);

        // Echo rising edge marks the pulse start
        let pulse_start = loop {
            let now = self.clock.now_us();
            if now >= deadline {
                return Ok(None);
            }
            if self.echo.is_high().map_err(|_| RangeError::Pin)? {
                break now;
            }
        };

        // Echo falling edge marks the pulse end, against the same deadline
        let pulse_end = loop {
            let now = self.clock.now_us();
            if now >= deadline {
                return Ok(None);
            }
            if self.echo.is_low().map_err(|_| RangeError::Pin)? {
                break now;
            }
        };

        Ok(Some(pulse_to_mm(pulse_end - pulse_start)))
    }
}

/// Round-trip pulse width to one-way distance.
///
/// Sound travels 343 m/s, and the pulse covers the distance twice:
/// mm = µs × 343000 / 1e6 / 2 = µs × 343 / 2000.
fn pulse_to_mm(pulse_us: u64) -> u32 {
    (pulse_us * 343 / 2000) as u32
}
