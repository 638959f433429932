//! Motion detection from consecutive distance samples
//!
//! A motion event is a jump of more than the delta threshold between two
//! consecutive readings. The first reading after construction, after a
//! reset, or after a measurement gap only establishes the baseline - it can
//! never signal motion on its own.

/// Distance-delta motion detector
#[derive(Debug, Clone)]
pub struct MotionState {
    /// Baseline from the previous tick, if one exists
    previous_mm: Option<u32>,
    /// Jump size that counts as motion
    delta_mm: u32,
}

impl MotionState {
    /// Create a detector with the given delta threshold in millimetres
    pub const fn new(delta_mm: u32) -> Self {
        Self {
            previous_mm: None,
            delta_mm,
        }
    }

    /// Fold in one tick's distance sample.
    ///
    /// `None` means the ranger timed out this tick; that clears the
    /// baseline, so the next valid reading starts a fresh comparison
    /// rather than being compared against a stale one.
    pub fn observe(&mut self, sample_mm: Option<u32>) -> bool {
        match (sample_mm, self.previous_mm) {
            (None, _) => {
                self.previous_mm = None;
                false
            }
            (Some(distance), None) => {
                self.previous_mm = Some(distance);
                false
            }
            (Some(distance), Some(previous)) => {
                let moved = distance.abs_diff(previous) > self.delta_mm;
                self.previous_mm = Some(distance);
                moved
            }
        }
    }

    /// Drop the baseline; the next sample can not signal motion
    pub fn reset(&mut self) {
        self.previous_mm = None;
    }
}
