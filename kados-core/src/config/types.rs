//! Behaviour configuration type definitions
//!
//! Timing, thresholds, and UI behaviour. Hardware wiring lives in
//! [`super::hardware`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::hardware::{DisplayHwConfig, LedHwConfig, LightHwConfig, RangeHwConfig};

/// Presence and motion thresholds, and the loop cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectionConfig {
    /// Object counts as present at or below this distance (mm)
    pub presence_mm: u32,
    /// Jump between consecutive samples that counts as motion (mm)
    pub motion_delta_mm: u32,
    /// Main loop polling interval (ms)
    pub poll_interval_ms: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            presence_mm: 500,
            motion_delta_mm: 50,
            poll_interval_ms: 200,
        }
    }
}

/// Durations of the two activation windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WindowConfig {
    /// Camera stays active this long after a presence trigger (ms)
    pub camera_ms: u32,
    /// Lights stay on this long after a trigger in the dark (ms)
    pub light_ms: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            camera_ms: 15_000,
            light_ms: 10_000,
        }
    }
}

/// Vision module behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VisionConfig {
    /// Minimum spacing between classification attempts (ms)
    pub cooldown_ms: u32,
    /// Confidence a detection must exceed (tenths of a percent)
    pub accept_threshold_x10: u16,
    /// UART baud rate to the module
    pub baud: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 1000,
            accept_threshold_x10: 600,
            baud: 115_200,
        }
    }
}

/// Front panel behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UiConfig {
    /// Minimum spacing between recognized mode button presses (ms)
    pub debounce_ms: u16,
    /// How long the startup banner is shown (ms)
    pub banner_ms: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            banner_ms: 3000,
        }
    }
}

/// Complete station configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationConfig {
    pub detection: DetectionConfig,
    pub windows: WindowConfig,
    pub vision: VisionConfig,
    pub ui: UiConfig,
    pub range: RangeHwConfig,
    pub light: LightHwConfig,
    pub leds: LedHwConfig,
    pub display: DisplayHwConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_station_behaviour() {
        let config = StationConfig::default();
        assert_eq!(config.detection.presence_mm, 500);
        assert_eq!(config.detection.poll_interval_ms, 200);
        assert_eq!(config.windows.camera_ms, 15_000);
        assert_eq!(config.windows.light_ms, 10_000);
        assert_eq!(config.vision.cooldown_ms, 1000);
        assert_eq!(config.vision.accept_threshold_x10, 600);
    }
}
