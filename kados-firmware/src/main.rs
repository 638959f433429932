//! Kados - Waste Classification Station Firmware
//!
//! Main firmware binary for RP2040-based waste classification stations.
//! An ultrasonic ranger watches the drop zone; anything placed in front of
//! it wakes the vision module, lights the ring when it is dark, and puts
//! the classification verdict on the status panel.
//!
//! Named after the Greek "kados" (κάδος) meaning "bin" - the collection
//! vessel this station watches over.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C1, UART0};
use embassy_rp::spi::{self, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use kados_core::config::StationConfig;
use kados_core::traits::Rgb;
use kados_drivers::display::Ssd1306;
use kados_drivers::illumination::{Illumination, Ws2812Spi};
use kados_drivers::light::Ldr;
use kados_drivers::range::Hcsr04;
use kados_drivers::vision::VisionModule;

mod channels;
mod config;
mod display;
mod tasks;

use crate::channels::VISION;
use crate::config::parse_config;
use crate::tasks::station::UptimeClock;
use crate::tasks::LED_COUNT;

/// Embedded configuration (compiled into the firmware)
/// Edit station.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../station.toml");

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C1_IRQ => i2c::InterruptHandler<I2C1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Kados firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();

    // Ultrasonic ranger
    // Pin assignments are board-specific (station board: TRIG=GPIO17, ECHO=GPIO27)
    let trigger = Output::new(p.PIN_17, Level::Low);
    let echo = Input::new(p.PIN_27, Pull::Down);
    let echo_timeout_us = config.range.timeout_ms as u64 * 1000;
    let ranger = Hcsr04::new(trigger, echo, Delay, UptimeClock, echo_timeout_us);

    // Ambient light sensor (GPIO22; the module drives the line high in the dark)
    let ldr = Ldr::new(Input::new(p.PIN_22, Pull::None));

    info!("Sensors initialized");

    // LED ring on SPI0 TX (SCK=GPIO18 unused by the ring, MOSI=GPIO19),
    // clocked so each WS2812 bit symbol lands at 1.25 us
    let mut spi_config = spi::Config::default();
    spi_config.frequency = 2_400_000;
    let led_spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_18, p.PIN_19, spi_config);

    if config.leds.count as usize != LED_COUNT {
        warn!(
            "Config says {} LEDs, firmware ring size is {}",
            config.leds.count, LED_COUNT
        );
    }

    let color = Rgb::from_hex(config.leds.color).scaled(config.leds.brightness_pct);
    let ring: Ws2812Spi<_, LED_COUNT> = Ws2812Spi::new(led_spi);
    let mut lights = Illumination::new(ring, color, config.windows.light_ms as u64);

    // Start with the ring dark
    if lights.deactivate().is_err() {
        warn!("Initial LED blanking failed");
    }

    info!("LED ring initialized");

    // Vision module on UART0 (TX=GPIO0, RX=GPIO1)
    let uart_config = {
        let mut cfg = UartConfig::default();
        cfg.baudrate = config.vision.baud;
        cfg
    };

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);

    VISION.lock().await.replace(VisionModule::new(uart));
    info!("UART initialized for vision module");

    // Status panel on I2C1 (SDA=GPIO2, SCL=GPIO3)
    let i2c = I2c::new_async(p.I2C1, p.PIN_3, p.PIN_2, Irqs, i2c::Config::default());
    let panel = Ssd1306::new(i2c, config.display.address);

    // Front panel inputs (mode button GPIO14, service switch GPIO15, both to ground)
    let mode_button = Input::new(p.PIN_14, Pull::Up);
    let service_switch = Input::new(p.PIN_15, Pull::Up);

    // Spawn tasks
    spawner
        .spawn(tasks::input_task(
            mode_button,
            service_switch,
            config.ui.debounce_ms as u64,
        ))
        .unwrap();
    spawner
        .spawn(tasks::display_task(panel, config.ui.banner_ms as u64))
        .unwrap();
    spawner
        .spawn(tasks::station_task(ranger, ldr, lights, config))
        .unwrap();

    info!("All tasks spawned, station running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Parse the embedded configuration
///
/// build.rs validates station.toml on the host, so a parse failure here
/// means the parser and the validator disagree; fall back to the built-in
/// defaults rather than refusing to boot.
fn load_config() -> StationConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in default configuration");
            StationConfig::default()
        }
    }
}
