//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in kados-core for the station's peripherals:
//!
//! - HC-SR04 ultrasonic ranger (trigger/echo pulse timing with deadline)
//! - LDR ambient light sensor
//! - WS2812 LED ring over SPI, with the expiry-tracked illumination controller
//! - SSD1306 OLED status display
//! - Serial vision co-processor module (camera + classifier)

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod illumination;
pub mod light;
pub mod range;
pub mod vision;
