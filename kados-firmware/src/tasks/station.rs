//! Station control loop task
//!
//! Runs the per-tick sequence: measure distance, read ambient light, fold
//! the observation into the controller, fire the illumination and the
//! throttled classifier as directed, and publish a snapshot for the
//! display. Every hardware fault is absorbed at the tick boundary - the
//! loop only ends when the service switch requests a shutdown.

use defmt::*;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::{with_timeout, Delay, Duration, Instant, Ticker};
use portable_atomic::Ordering;

use kados_core::classify::Verdict;
use kados_core::config::StationConfig;
use kados_core::station::{StationController, StationParams};
use kados_drivers::illumination::{Illumination, Ws2812Spi};
use kados_drivers::light::Ldr;
use kados_drivers::range::{Hcsr04, PulseClock};

use crate::channels::{SHUTDOWN, SNAPSHOT, VISION};

/// Ring size compiled into the firmware; station.toml documents the wiring
pub const LED_COUNT: usize = 12;

/// Bound on one vision exchange; a hung module costs at most this long
const VISION_REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// System-timer clock for echo pulse timing
pub struct UptimeClock;

impl PulseClock for UptimeClock {
    fn now_us(&mut self) -> u64 {
        Instant::now().as_micros()
    }
}

type Ranger = Hcsr04<Output<'static>, Input<'static>, Delay, UptimeClock>;
type LedRing = Ws2812Spi<Spi<'static, SPI0, Blocking>, LED_COUNT>;

/// Station control loop
#[embassy_executor::task]
pub async fn station_task(
    mut ranger: Ranger,
    mut ldr: Ldr<Input<'static>>,
    mut lights: Illumination<LedRing>,
    config: StationConfig,
) {
    info!("Station task started");

    wake_vision().await;
    info!("Motion detection active");

    let mut controller = StationController::new(StationParams::from(&config));

    let mut ticker = Ticker::every(Duration::from_millis(
        config.detection.poll_interval_ms as u64,
    ));
    let started = Instant::now();

    loop {
        if SHUTDOWN.load(Ordering::Relaxed) {
            teardown(&mut lights, &mut controller).await;
            return;
        }

        let now_ms = started.elapsed().as_millis();

        // 1. Measure; a pin fault reads as "no reading" and the tick goes on
        let sample_mm = match ranger.measure() {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Ranger fault: {:?}", e);
                None
            }
        };
        let dark = ldr.is_dark();

        // 2.-3. Fold the observation in and plan the rest of the tick
        let plan = controller.observe(now_ms, sample_mm, dark);

        if let Some(mm) = sample_mm {
            debug!(
                "Distance: {} mm | Object: {} | Dark: {} | Motion: {}",
                mm, plan.object_detected, dark, plan.motion
            );
        }

        if plan.light_trigger {
            match lights.activate(now_ms) {
                Ok(()) => info!("Lights on - object in the dark"),
                Err(e) => warn!("Light activation failed: {:?}", e),
            }
        }

        if plan.classify {
            classify_tick(&mut controller, now_ms).await;
        } else if plan.camera_closed {
            info!("Camera idle - waiting for motion");
        }

        // 4. Blank the lights once their window lapses
        match lights.maintain(now_ms) {
            Ok(true) => info!("Lights off"),
            Ok(false) => {}
            Err(e) => warn!("Light blanking failed: {:?}", e),
        }

        // 5. Publish the tick's snapshot for the display task
        SNAPSHOT.signal(controller.snapshot(now_ms, lights.is_active(now_ms)));

        // 6. The only suspension point of the loop
        ticker.next().await;
    }
}

/// Wake the vision module and confirm it answers.
///
/// A dead module is logged and left alone - the loop still runs, and every
/// later capture attempt reports `CameraError` through the throttle.
async fn wake_vision() {
    let mut vision = VISION.lock().await;
    let Some(module) = vision.as_mut() else {
        return;
    };

    match with_timeout(VISION_REPLY_TIMEOUT, module.wake()).await {
        Ok(Ok(())) => {}
        _ => {
            warn!("Vision module wake failed");
            return;
        }
    }
    match with_timeout(VISION_REPLY_TIMEOUT, module.ping()).await {
        Ok(Ok(())) => info!("Vision module ready"),
        _ => warn!("Vision module not answering"),
    }
}

/// One throttled classification attempt under the vision lock.
///
/// The lock is scoped to exactly the capture+infer span - never held
/// across the tick sleep.
async fn classify_tick(controller: &mut StationController, now_ms: u64) {
    let mut vision = VISION.lock().await;
    let Some(module) = vision.as_mut() else {
        return;
    };

    match with_timeout(
        VISION_REPLY_TIMEOUT,
        controller.try_classify(now_ms, module),
    )
    .await
    {
        Ok(Some(verdict)) => {
            debug!("Classified: {:?} ({})", verdict, verdict.confidence_x10());
        }
        Ok(None) => {
            // Cooldown running; nothing was attempted
        }
        Err(_) => {
            // The attempt consumed its cooldown slot before hanging
            warn!("Vision module timed out");
            controller.record_verdict(Verdict::CameraError);
        }
    }
}

/// Release every resource, swallowing individual failures so one broken
/// release can not block the others.
async fn teardown(lights: &mut Illumination<LedRing>, controller: &mut StationController) {
    info!("Shutting down station...");

    if lights.deactivate().is_err() {
        warn!("LED blanking failed during teardown");
    }

    {
        let mut vision = VISION.lock().await;
        if let Some(module) = vision.as_mut() {
            match with_timeout(VISION_REPLY_TIMEOUT, module.standby()).await {
                Ok(Ok(())) => {}
                _ => warn!("Vision module standby failed during teardown"),
            }
        }
    }

    controller.shutdown();
    info!("Station stopped");
}
