//! Display task
//!
//! Shows the startup banner, then renders every published snapshot in the
//! currently selected view. On shutdown the panel is cleared and turned
//! off as this task's share of the teardown.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C1;
use embassy_time::{Duration, Ticker, Timer};
use portable_atomic::Ordering;

use kados_core::traits::StationDisplay;
use kados_drivers::display::Ssd1306;

use crate::channels::{DISPLAY_MODE, SHUTDOWN, SNAPSHOT};
use crate::display::{DisplayMode, Renderer, SCREEN_ROWS};

type Panel = Ssd1306<I2c<'static, I2C1, Async>>;

/// Display task - renders snapshots to the status panel
#[embassy_executor::task]
pub async fn display_task(mut panel: Panel, banner_ms: u64) {
    info!("Display task started");

    if panel.init().await.is_err() {
        // Keep rendering into the buffer anyway; the panel may come back
        warn!("Display init failed");
    }

    let mut renderer = Renderer::new();
    renderer.render_banner();
    push_screen(&renderer, &mut panel).await;
    Timer::after_millis(banner_ms).await;

    // The ticker arm exists to notice a shutdown while no snapshots arrive
    let mut ticker = Ticker::every(Duration::from_millis(100));

    loop {
        match select(SNAPSHOT.wait(), ticker.next()).await {
            Either::First(snapshot) => {
                let mode = DisplayMode::from_index(DISPLAY_MODE.load(Ordering::Relaxed));
                renderer.render_snapshot(&snapshot, mode);
                push_screen(&renderer, &mut panel).await;
            }
            Either::Second(()) => {}
        }

        if SHUTDOWN.load(Ordering::Relaxed) {
            panel.clear();
            if panel.flush().await.is_err() {
                warn!("Display clear failed during teardown");
            }
            if panel.set_display_on(false).await.is_err() {
                warn!("Display off failed during teardown");
            }
            info!("Display stopped");
            return;
        }
    }
}

/// Copy the rendered screen into the panel buffer and flush it
async fn push_screen(renderer: &Renderer, panel: &mut Panel) {
    panel.clear();
    for row in 0..SCREEN_ROWS {
        panel.text(row, 0, renderer.screen().line(row));
    }
    if panel.flush().await.is_err() {
        warn!("Display flush failed");
    }
}
