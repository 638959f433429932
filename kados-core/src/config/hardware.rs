//! Hardware configuration types
//!
//! Pin assignments and peripheral parameters. The pin numbers document the
//! board wiring; the firmware claims the matching GPIOs at startup.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ultrasonic ranger wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeHwConfig {
    /// Trigger output GPIO
    pub trigger_pin: u8,
    /// Echo input GPIO
    pub echo_pin: u8,
    /// Echo timeout (ms); also the stuck-line bound
    pub timeout_ms: u16,
}

impl Default for RangeHwConfig {
    fn default() -> Self {
        Self {
            trigger_pin: 17,
            echo_pin: 27,
            timeout_ms: 100,
        }
    }
}

/// Ambient light sensor wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightHwConfig {
    /// Sensor input GPIO (high = dark)
    pub pin: u8,
}

impl Default for LightHwConfig {
    fn default() -> Self {
        Self { pin: 22 }
    }
}

/// LED ring parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LedHwConfig {
    /// Number of elements on the ring
    pub count: u8,
    /// Packed 0xRRGGBB illumination color
    pub color: u32,
    /// Brightness percentage applied to the color (0-100)
    pub brightness_pct: u8,
}

impl Default for LedHwConfig {
    fn default() -> Self {
        Self {
            count: 12,
            color: 0xFFFFFF,
            brightness_pct: 50,
        }
    }
}

/// Status display parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayHwConfig {
    /// I2C address of the panel
    pub address: u8,
}

impl Default for DisplayHwConfig {
    fn default() -> Self {
        Self { address: 0x3C }
    }
}
