//! Simple TOML parser for the station configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! station.toml. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays, inline tables, multi-line strings
//! - Datetime values, floats
//! - Dotted keys or nested sections
//!
//! Unknown sections and keys are ignored, so an older firmware can read a
//! newer config file.

use kados_core::config::StationConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Malformed section header
    InvalidSection,
    /// Malformed key = value line
    InvalidLine,
    /// Value does not fit the expected type
    InvalidValue,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Station,
    Windows,
    Range,
    Light,
    Leds,
    Vision,
    Display,
    Ui,
    /// Recognized as a header but not known to this firmware
    Unknown,
}

/// Parse TOML configuration into a StationConfig
///
/// Starts from the built-in defaults; the file only overrides what it
/// mentions.
pub fn parse_config(input: &str) -> Result<StationConfig, ParseError> {
    let mut config = StationConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Section header
        if let Some(name) = line.strip_prefix('[') {
            let name = name.strip_suffix(']').ok_or(ParseError::InvalidSection)?;
            section = match name.trim() {
                "station" => Section::Station,
                "windows" => Section::Windows,
                "range" => Section::Range,
                "light" => Section::Light,
                "leds" => Section::Leds,
                "vision" => Section::Vision,
                "display" => Section::Display,
                "ui" => Section::Ui,
                _ => Section::Unknown,
            };
            continue;
        }

        // Key = value
        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        let key = key.trim();
        let value = strip_comment(value.trim());

        apply_value(&mut config, section, key, value)?;
    }

    Ok(config)
}

/// Drop a trailing comment from a value
fn strip_comment(value: &str) -> &str {
    // A '#' inside a quoted string stays; only handle the unquoted case
    if value.starts_with('"') {
        return value;
    }
    match value.split_once('#') {
        Some((before, _)) => before.trim(),
        None => value,
    }
}

/// Apply one key/value pair to the config being built
fn apply_value(
    config: &mut StationConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    match section {
        Section::Station => match key {
            "poll_interval_ms" => config.detection.poll_interval_ms = parse_u32(value)?,
            "presence_mm" => config.detection.presence_mm = parse_u32(value)?,
            "motion_delta_mm" => config.detection.motion_delta_mm = parse_u32(value)?,
            _ => {}
        },
        Section::Windows => match key {
            "camera_ms" => config.windows.camera_ms = parse_u32(value)?,
            "light_ms" => config.windows.light_ms = parse_u32(value)?,
            _ => {}
        },
        Section::Range => match key {
            "trigger_pin" => config.range.trigger_pin = parse_u32(value)? as u8,
            "echo_pin" => config.range.echo_pin = parse_u32(value)? as u8,
            "timeout_ms" => config.range.timeout_ms = parse_u32(value)? as u16,
            _ => {}
        },
        Section::Light => {
            if key == "pin" {
                config.light.pin = parse_u32(value)? as u8;
            }
        }
        Section::Leds => match key {
            "count" => config.leds.count = parse_u32(value)? as u8,
            "color" => config.leds.color = parse_color(value)?,
            "brightness" => config.leds.brightness_pct = parse_u32(value)? as u8,
            _ => {}
        },
        Section::Vision => match key {
            "cooldown_ms" => config.vision.cooldown_ms = parse_u32(value)?,
            "accept_percent" => {
                let percent = parse_u32(value)?;
                if percent > 100 {
                    return Err(ParseError::InvalidValue);
                }
                config.vision.accept_threshold_x10 = (percent * 10) as u16;
            }
            "baud" => config.vision.baud = parse_u32(value)?,
            _ => {}
        },
        Section::Display => {
            if key == "address" {
                config.display.address = parse_hex_byte(value)?;
            }
        }
        Section::Ui => match key {
            "debounce_ms" => config.ui.debounce_ms = parse_u32(value)? as u16,
            "banner_ms" => config.ui.banner_ms = parse_u32(value)? as u16,
            _ => {}
        },
        Section::Root | Section::Unknown => {}
    }

    Ok(())
}

/// Parse a plain decimal integer
fn parse_u32(value: &str) -> Result<u32, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a quoted "rrggbb" or "0xrrggbb" color
fn parse_color(value: &str) -> Result<u32, ParseError> {
    let hex = unquote(value)?.trim_start_matches("0x");
    if hex.len() != 6 {
        return Err(ParseError::InvalidValue);
    }
    u32::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidValue)
}

/// Parse a quoted "0xNN" byte (I2C address)
fn parse_hex_byte(value: &str) -> Result<u8, ParseError> {
    let hex = unquote(value)?
        .strip_prefix("0x")
        .ok_or(ParseError::InvalidValue)?;
    u8::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidValue)
}

/// Strip surrounding double quotes
fn unquote(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let input = r#"
# Station wiring and behaviour
[station]
poll_interval_ms = 250
presence_mm = 450
motion_delta_mm = 60

[windows]
camera_ms = 12000
light_ms = 8000

[leds]
count = 8
color = "ff8800"
brightness = 75

[vision]
cooldown_ms = 2000
accept_percent = 70

[display]
address = "0x3D"
"#;

        let config = parse_config(input).unwrap();
        assert_eq!(config.detection.poll_interval_ms, 250);
        assert_eq!(config.detection.presence_mm, 450);
        assert_eq!(config.windows.camera_ms, 12_000);
        assert_eq!(config.leds.count, 8);
        assert_eq!(config.leds.color, 0xFF8800);
        assert_eq!(config.vision.accept_threshold_x10, 700);
        assert_eq!(config.display.address, 0x3D);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[station]\npresence_mm = 300\n").unwrap();
        assert_eq!(config.detection.presence_mm, 300);
        // Untouched values stay at their defaults
        assert_eq!(config.detection.poll_interval_ms, 200);
        assert_eq!(config.windows.light_ms, 10_000);
    }

    #[test]
    fn test_trailing_comments_are_stripped() {
        let config = parse_config("[station]\npresence_mm = 300 # close only\n").unwrap();
        assert_eq!(config.detection.presence_mm, 300);
    }

    #[test]
    fn test_unknown_sections_and_keys_ignored() {
        let input = "[station]\nfuture_knob = 1\n[telemetry]\nenabled = 1\n";
        let config = parse_config(input).unwrap();
        assert_eq!(config, StationConfig::default());
    }

    #[test]
    fn test_invalid_color_rejected() {
        assert_eq!(
            parse_config("[leds]\ncolor = \"red\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[leds]\ncolor = ffffff\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_accept_percent_bounds() {
        assert_eq!(
            parse_config("[vision]\naccept_percent = 101\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_malformed_section_rejected() {
        assert_eq!(
            parse_config("[station\npresence_mm = 1\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_embedded_station_toml_parses() {
        let config = parse_config(include_str!("../../station.toml")).unwrap();
        assert_eq!(config, StationConfig::default());
    }
}
