//! Inter-task communication
//!
//! Static signals, atomics, and the shared vision resource used between
//! Embassy tasks.

use embassy_rp::peripherals::UART0;
use embassy_rp::uart::BufferedUart;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use portable_atomic::{AtomicBool, AtomicU8};

use kados_core::station::StationSnapshot;
use kados_drivers::vision::VisionModule;

/// Latest station snapshot for the display task
///
/// Latest-value semantics: the display only ever cares about the newest
/// state, so a slow flush drops stale snapshots instead of queueing them.
pub static SNAPSHOT: Signal<CriticalSectionRawMutex, StationSnapshot> = Signal::new();

/// Set once by the input task when the service switch is thrown.
/// Every task observes it and runs its own teardown.
pub static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Current display view (a `DisplayMode` index, cycled by the mode button)
pub static DISPLAY_MODE: AtomicU8 = AtomicU8::new(0);

/// The shared vision module (camera + classifier on one UART)
///
/// Locked for the whole capture+infer span, so the periodic station loop
/// and any future preview consumer can never interleave an exchange.
pub static VISION: Mutex<
    CriticalSectionRawMutex,
    Option<VisionModule<BufferedUart<'static, UART0>>>,
> = Mutex::new(None);
