//! Build script for kados-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates station.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate station.toml configuration at compile time
fn validate_config() {
    // Re-run if station.toml changes
    println!("cargo:rerun-if-changed=station.toml");

    let config_path = Path::new("station.toml");

    if !config_path.exists() {
        panic!(
            "\nERROR: station.toml not found!\n\
             The firmware embeds a station.toml configuration file.\n\
             Please create one in the kados-firmware directory.\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("\nERROR: Failed to read station.toml: {}\n", e),
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => panic!("\nERROR: Invalid TOML syntax in station.toml:\n{}\n", e),
    };

    let mut errors = Vec::new();

    validate_required_sections(&config, &mut errors);
    validate_station(&config, &mut errors);
    validate_leds(&config, &mut errors);
    validate_vision(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\nERROR: Invalid station.toml configuration:\n{}\n",
            errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=station.toml validated successfully");
}

/// Validate that required sections exist
fn validate_required_sections(config: &toml::Value, errors: &mut Vec<String>) {
    for section in ["station", "windows", "leds", "vision"] {
        if config.get(section).is_none() {
            errors.push(format!("Missing required [{}] section", section));
        }
    }
}

/// Validate station timing and thresholds
fn validate_station(config: &toml::Value, errors: &mut Vec<String>) {
    let station = match config.get("station").and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    if let Some(toml::Value::Integer(poll)) = station.get("poll_interval_ms") {
        if *poll < 50 || *poll > 5000 {
            errors.push("[station] poll_interval_ms must be 50-5000".to_string());
        }
    }

    if let Some(toml::Value::Integer(presence)) = station.get("presence_mm") {
        // HC-SR04 usable range is roughly 20-4000 mm
        if *presence < 20 || *presence > 4000 {
            errors.push("[station] presence_mm must be 20-4000".to_string());
        }
    }
}

/// Validate LED ring parameters
fn validate_leds(config: &toml::Value, errors: &mut Vec<String>) {
    let leds = match config.get("leds").and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    if let Some(toml::Value::Integer(count)) = leds.get("count") {
        if *count < 1 || *count > 16 {
            errors.push("[leds] count must be 1-16".to_string());
        }
    }

    if let Some(toml::Value::Integer(brightness)) = leds.get("brightness") {
        if *brightness < 0 || *brightness > 100 {
            errors.push("[leds] brightness must be 0-100".to_string());
        }
    }

    if let Some(toml::Value::String(color)) = leds.get("color") {
        let hex = color.trim_start_matches("0x");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            errors.push("[leds] color must be a 6-digit hex string".to_string());
        }
    }
}

/// Validate vision module parameters
fn validate_vision(config: &toml::Value, errors: &mut Vec<String>) {
    let vision = match config.get("vision").and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    if let Some(toml::Value::Integer(percent)) = vision.get("accept_percent") {
        if *percent < 0 || *percent > 100 {
            errors.push("[vision] accept_percent must be 0-100".to_string());
        }
    }

    if let Some(toml::Value::Integer(cooldown)) = vision.get("cooldown_ms") {
        if *cooldown < 100 {
            errors.push("[vision] cooldown_ms must be at least 100".to_string());
        }
    }
}
