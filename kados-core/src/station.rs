//! Station controller
//!
//! Pure per-tick decision logic. The firmware task owns the hardware I/O
//! and feeds one observation in per tick; the controller owns the camera
//! window, the motion baseline, the classification throttle, and the
//! current verdict, and tells the task what the tick should do.
//!
//! The light window is deliberately not here - it lives with the strip in
//! the illumination controller, so the two windows can not share state by
//! accident. This controller only decides when the light window should be
//! armed.

use crate::classify::{ClassificationThrottle, Verdict};
use crate::config::StationConfig;
use crate::motion::MotionState;
use crate::traits::{Camera, Classifier};
use crate::window::{ActivationWindow, WindowEvent};

/// Timing and threshold parameters for the controller
#[derive(Debug, Clone, Copy)]
pub struct StationParams {
    /// Object counts as present at or below this distance
    pub presence_mm: u32,
    /// Jump between consecutive samples that counts as motion
    pub motion_delta_mm: u32,
    /// How long the camera stays active after a presence trigger
    pub camera_window_ms: u64,
    /// Minimum spacing between classification attempts
    pub cooldown_ms: u64,
    /// Confidence a detection must exceed (tenths of a percent)
    pub accept_threshold_x10: u16,
}

impl From<&StationConfig> for StationParams {
    fn from(config: &StationConfig) -> Self {
        Self {
            presence_mm: config.detection.presence_mm,
            motion_delta_mm: config.detection.motion_delta_mm,
            camera_window_ms: config.windows.camera_ms as u64,
            cooldown_ms: config.vision.cooldown_ms as u64,
            accept_threshold_x10: config.vision.accept_threshold_x10,
        }
    }
}

/// What the firmware should do with the rest of the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickPlan {
    /// An object is within the presence threshold
    pub object_detected: bool,
    /// Consecutive samples jumped by more than the motion delta
    pub motion: bool,
    /// The camera window is active; run the throttled classifier
    pub classify: bool,
    /// The camera window expired this tick (the verdict was just reset)
    pub camera_closed: bool,
    /// Arm the illumination window (object seen in the dark)
    pub light_trigger: bool,
}

/// Externally visible station state, rebuilt from controller state every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StationSnapshot {
    /// Latest distance sample, if the ranger delivered one
    pub distance_mm: Option<u32>,
    /// Ambient light sensor reported darkness
    pub dark: bool,
    /// Motion detected between the two latest samples
    pub motion: bool,
    /// Illumination window active
    pub light_on: bool,
    /// Camera window active
    pub camera_active: bool,
    /// Current classification verdict
    pub verdict: Verdict,
}

/// The sensor-fusion controller for the station's main loop
pub struct StationController {
    params: StationParams,
    motion: MotionState,
    camera_window: ActivationWindow,
    throttle: ClassificationThrottle,
    verdict: Verdict,
    /// Latest observation, kept only for the snapshot
    last_sample_mm: Option<u32>,
    last_dark: bool,
    last_motion: bool,
}

impl StationController {
    /// Create a controller; everything starts idle and `Waiting`
    pub fn new(params: StationParams) -> Self {
        Self {
            params,
            motion: MotionState::new(params.motion_delta_mm),
            camera_window: ActivationWindow::new(),
            throttle: ClassificationThrottle::new(
                params.cooldown_ms,
                params.accept_threshold_x10,
            ),
            verdict: Verdict::Waiting,
            last_sample_mm: None,
            last_dark: false,
            last_motion: false,
        }
    }

    /// Fold one observation into the controller and plan the tick.
    ///
    /// A `None` sample (ranger timeout or fault) skips the presence branch
    /// for this tick, but the camera window expiry check still runs - an
    /// expired window must close whether or not the ranger answered.
    pub fn observe(&mut self, now_ms: u64, sample_mm: Option<u32>, dark: bool) -> TickPlan {
        self.last_sample_mm = sample_mm;
        self.last_dark = dark;
        self.last_motion = self.motion.observe(sample_mm);

        let object_detected = matches!(sample_mm, Some(d) if d <= self.params.presence_mm);
        if object_detected {
            // Presence always re-arms the camera, light or dark
            self.camera_window.arm(now_ms, self.params.camera_window_ms);
        }

        let camera_closed = self.camera_window.poll(now_ms) == WindowEvent::Closed;
        if camera_closed {
            self.verdict = Verdict::Waiting;
        }

        TickPlan {
            object_detected,
            motion: self.last_motion,
            classify: self.camera_window.is_active(now_ms),
            camera_closed,
            light_trigger: object_detected && dark,
        }
    }

    /// One throttled capture+infer attempt; updates the current verdict.
    ///
    /// The caller must hold the vision resource lock across this call.
    /// Returns `None` while the cooldown is running.
    pub async fn try_classify<V>(&mut self, now_ms: u64, vision: &mut V) -> Option<Verdict>
    where
        V: Camera,
        V: Classifier<<V as Camera>::Frame>,
    {
        let verdict = self.throttle.try_classify(now_ms, vision).await?;
        self.verdict = verdict;
        Some(verdict)
    }

    /// Force the current verdict, bypassing the throttle.
    ///
    /// Used when the vision exchange is abandoned from outside (timeout on
    /// a hung module) - the attempt already consumed its cooldown slot.
    pub fn record_verdict(&mut self, verdict: Verdict) {
        self.verdict = verdict;
    }

    /// Current classification verdict
    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Whether the camera window is active at `now`
    pub fn camera_active(&self, now_ms: u64) -> bool {
        self.camera_window.is_active(now_ms)
    }

    /// Build the externally visible state.
    ///
    /// A pure function of the controller state and `light_on`; building it
    /// twice without an intervening tick yields identical values.
    pub fn snapshot(&self, now_ms: u64, light_on: bool) -> StationSnapshot {
        StationSnapshot {
            distance_mm: self.last_sample_mm,
            dark: self.last_dark,
            motion: self.last_motion,
            light_on,
            camera_active: self.camera_window.is_active(now_ms),
            verdict: self.verdict,
        }
    }

    /// Drop all activation state; used during teardown
    pub fn shutdown(&mut self) {
        self.camera_window.disarm();
        self.motion.reset();
        self.verdict = Verdict::Waiting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use crate::traits::{CameraError, CameraFrame, ClassifierError, Detections};
    use embassy_futures::block_on;
    use heapless::String;
    use kados_protocol::{Box2d, DetectionRecord};

    const SECOND: u64 = 1000;

    fn params() -> StationParams {
        StationParams {
            presence_mm: 500,
            motion_delta_mm: 50,
            camera_window_ms: 15_000,
            cooldown_ms: 1000,
            accept_threshold_x10: 600,
        }
    }

    struct TestFrame;

    impl CameraFrame for TestFrame {
        fn len(&self) -> usize {
            1024
        }
    }

    struct FixedVision {
        label: &'static str,
        confidence_x10: u16,
    }

    impl Camera for FixedVision {
        type Frame = TestFrame;

        async fn capture(&mut self) -> Result<TestFrame, CameraError> {
            Ok(TestFrame)
        }
    }

    impl Classifier<TestFrame> for FixedVision {
        async fn infer(&mut self, _frame: &TestFrame) -> Result<Detections, ClassifierError> {
            let mut label = String::new();
            let _ = label.push_str(self.label);
            let mut detections = Detections::new();
            detections
                .push(DetectionRecord {
                    label,
                    confidence_x10: self.confidence_x10,
                    bbox: Box2d::default(),
                })
                .map_err(|_| ClassifierError::Inference)?;
            Ok(detections)
        }
    }

    #[test]
    fn test_presence_arms_camera_window() {
        let mut controller = StationController::new(params());

        let plan = controller.observe(0, Some(1000), false);
        assert!(!plan.object_detected);
        assert!(!plan.classify);

        let plan = controller.observe(SECOND, Some(400), false);
        assert!(plan.object_detected);
        assert!(plan.classify);
        assert!(controller.camera_active(SECOND));
    }

    #[test]
    fn test_camera_window_closes_once_and_resets_verdict() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), false);
        controller.record_verdict(Verdict::Identified {
            category: Category::Paper,
            confidence_x10: 720,
        });

        // Expiry tick: one-shot close, verdict back to Waiting
        let plan = controller.observe(16 * SECOND, Some(1000), false);
        assert!(plan.camera_closed);
        assert!(!plan.classify);
        assert_eq!(controller.verdict(), Verdict::Waiting);

        // Later ticks stay quiet
        let plan = controller.observe(17 * SECOND, Some(1000), false);
        assert!(!plan.camera_closed);
    }

    #[test]
    fn test_light_trigger_requires_darkness() {
        let mut controller = StationController::new(params());

        let plan = controller.observe(0, Some(400), false);
        assert!(!plan.light_trigger);

        let plan = controller.observe(SECOND, Some(400), true);
        assert!(plan.light_trigger);
    }

    #[test]
    fn test_light_trigger_timing_scenario() {
        // Readings [1000, 1000, 400, 1000] mm, one per second: the trigger
        // fires on the first present reading and only there.
        let mut controller = StationController::new(params());

        let script = [(0, 1000), (SECOND, 1000), (2 * SECOND, 400), (3 * SECOND, 1000)];
        let mut triggers = heapless::Vec::<u64, 4>::new();
        for (t, mm) in script {
            if controller.observe(t, Some(mm), true).light_trigger {
                triggers.push(t).unwrap();
            }
        }
        assert_eq!(triggers.as_slice(), &[2 * SECOND]);
    }

    #[test]
    fn test_no_reading_skips_presence_but_still_expires() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), false);

        // Ranger goes quiet; window expiry must still be noticed
        let plan = controller.observe(16 * SECOND, None, false);
        assert!(!plan.object_detected);
        assert!(plan.camera_closed);
    }

    #[test]
    fn test_represence_extends_camera_window() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), false);
        controller.observe(10 * SECOND, Some(400), false);

        // Would have expired at 15 s from the first arm; re-armed at 10 s
        assert!(controller.camera_active(20 * SECOND));
        assert!(!controller.camera_active(25 * SECOND));
    }

    #[test]
    fn test_classify_updates_verdict() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), false);

        let mut vision = FixedVision {
            label: "cardboard",
            confidence_x10: 815,
        };
        let verdict = block_on(controller.try_classify(0, &mut vision));
        assert_eq!(
            verdict,
            Some(Verdict::Identified {
                category: Category::Cardboard,
                confidence_x10: 815
            })
        );
        assert_eq!(controller.verdict(), verdict.unwrap());

        // Within the cooldown nothing happens and the verdict stays
        assert!(block_on(controller.try_classify(500, &mut vision)).is_none());
        assert_eq!(controller.verdict().label(), "CARDBOARD");
    }

    #[test]
    fn test_snapshot_is_pure() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), true);

        let a = controller.snapshot(0, true);
        let b = controller.snapshot(0, true);
        assert_eq!(a, b);

        assert_eq!(a.distance_mm, Some(400));
        assert!(a.dark);
        assert!(a.camera_active);
        assert_eq!(a.verdict, Verdict::Waiting);
    }

    #[test]
    fn test_shutdown_clears_activation_state() {
        let mut controller = StationController::new(params());
        controller.observe(0, Some(400), true);
        controller.record_verdict(Verdict::Unidentified);

        controller.shutdown();
        assert!(!controller.camera_active(0));
        assert_eq!(controller.verdict(), Verdict::Waiting);

        // No stale close edge after teardown
        let plan = controller.observe(SECOND, Some(1000), false);
        assert!(!plan.camera_closed);
    }
}
