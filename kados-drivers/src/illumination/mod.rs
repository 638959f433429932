//! Timed illumination control
//!
//! Couples a light strip with an activation window: motion in the dark
//! turns the ring fully on and (re)bases an expiry timestamp; once the
//! window lapses the ring is blanked exactly once.

pub mod ws2812;

pub use ws2812::Ws2812Spi;

use kados_core::traits::{LightStrip, Rgb, StripError};
use kados_core::window::ActivationWindow;

/// Expiry-tracked illumination controller
pub struct Illumination<S> {
    strip: S,
    window: ActivationWindow,
    duration_ms: u64,
    color: Rgb,
    /// Whether the strip is currently lit; tracks the hardware, not the window
    lit: bool,
}

impl<S: LightStrip> Illumination<S> {
    /// Create a controller; the strip is assumed blanked
    pub fn new(strip: S, color: Rgb, duration_ms: u64) -> Self {
        Self {
            strip,
            window: ActivationWindow::new(),
            duration_ms,
            color,
            lit: false,
        }
    }

    /// Light the ring and (re)base the window to `now + duration`.
    ///
    /// A re-trigger before expiry always extends the window; it never
    /// accumulates and never shortens.
    pub fn activate(&mut self, now_ms: u64) -> Result<(), StripError> {
        self.strip.set_all(self.color);
        self.strip.show()?;
        self.lit = true;
        self.window.arm(now_ms, self.duration_ms);
        Ok(())
    }

    /// Blank the ring without touching the window.
    ///
    /// Window cleanup is `maintain`'s job; teardown also comes through here.
    pub fn deactivate(&mut self) -> Result<(), StripError> {
        self.strip.set_all(Rgb::OFF);
        self.strip.show()?;
        self.lit = false;
        Ok(())
    }

    /// Whether the illumination window is active at `now`.
    ///
    /// Computed from the expiry timestamp, never from the strip state.
    pub fn is_active(&self, now_ms: u64) -> bool {
        self.window.is_active(now_ms)
    }

    /// Blank the ring once when the window has lapsed.
    ///
    /// Returns `Ok(true)` when this call turned the ring off. Clears the
    /// window afterwards so the blanking does not repeat every tick.
    pub fn maintain(&mut self, now_ms: u64) -> Result<bool, StripError> {
        if self.lit && !self.window.is_active(now_ms) {
            self.deactivate()?;
            self.window.disarm();
            return Ok(true);
        }
        Ok(false)
    }
}
