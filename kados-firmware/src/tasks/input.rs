//! Front panel input task
//!
//! Two inputs, both active-low: the mode button cycles the display view,
//! the service switch requests a station shutdown. Button presses are
//! debounced by dropping presses that land inside the debounce interval
//! after the previous accepted one.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Instant, Timer};
use portable_atomic::Ordering;

use crate::channels::{DISPLAY_MODE, SHUTDOWN};
use crate::display::DisplayMode;

/// Settle time before the service switch is believed
const SWITCH_SETTLE_MS: u64 = 50;

/// Front panel input task
#[embassy_executor::task]
pub async fn input_task(
    mut mode_button: Input<'static>,
    mut service_switch: Input<'static>,
    debounce_ms: u64,
) {
    info!("Input task started");

    let debounce = Duration::from_millis(debounce_ms);
    let mut last_press: Option<Instant> = None;

    loop {
        match select(
            mode_button.wait_for_falling_edge(),
            service_switch.wait_for_falling_edge(),
        )
        .await
        {
            Either::First(()) => {
                let now = Instant::now();
                if last_press.is_some_and(|t| now - t < debounce) {
                    continue;
                }
                last_press = Some(now);

                let mode =
                    DisplayMode::from_index(DISPLAY_MODE.load(Ordering::Relaxed)).next();
                DISPLAY_MODE.store(mode.index(), Ordering::Relaxed);
                info!("Display mode: {}", mode.name());
            }
            Either::Second(()) => {
                // Settle check so a bumped connector does not stop the station
                Timer::after_millis(SWITCH_SETTLE_MS).await;
                if service_switch.is_low() {
                    info!("Service switch thrown - requesting shutdown");
                    SHUTDOWN.store(true, Ordering::Relaxed);
                    return;
                }
            }
        }
    }
}
