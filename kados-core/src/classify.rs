//! Classification policy
//!
//! Turns raw detection records from the vision module into a display
//! verdict, and rate-limits how often the module is asked to work.

use kados_protocol::DetectionRecord;

use crate::traits::{Camera, CameraFrame, Classifier};

/// Display categories for sorted waste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Category {
    Plastic,
    Paper,
    Cardboard,
    Organic,
    Glass,
}

impl Category {
    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plastic => "PLASTIC",
            Category::Paper => "PAPER",
            Category::Cardboard => "CARDBOARD",
            Category::Organic => "ORGANIC",
            Category::Glass => "GLASS",
        }
    }
}

/// Mapping from raw model labels to display categories.
///
/// A label missing from this table is not an error; its detections simply
/// never qualify for selection.
const LABEL_MAP: &[(&str, Category)] = &[
    ("plastic", Category::Plastic),
    ("paper", Category::Paper),
    ("cardboard", Category::Cardboard),
    ("organic", Category::Organic),
    ("green-glass", Category::Glass),
];

/// Map a raw model label onto its display category
pub fn map_label(label: &str) -> Option<Category> {
    LABEL_MAP
        .iter()
        .find(|(raw, _)| *raw == label)
        .map(|(_, category)| *category)
}

/// The current classification verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    /// Camera idle, nothing classified yet
    Waiting,
    /// Nothing above threshold mapped onto a known category
    Unidentified,
    /// Frame capture or inference failed
    CameraError,
    /// Best qualifying detection
    Identified {
        category: Category,
        /// Tenths of a percent, 0-1000
        confidence_x10: u16,
    },
}

impl Verdict {
    /// Display text for the verdict
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Waiting => "WAITING...",
            Verdict::Unidentified => "UNIDENTIFIED",
            Verdict::CameraError => "CAMERA ERROR",
            Verdict::Identified { category, .. } => category.as_str(),
        }
    }

    /// Confidence in tenths of a percent; sentinels report zero
    pub fn confidence_x10(&self) -> u16 {
        match self {
            Verdict::Identified { confidence_x10, .. } => *confidence_x10,
            _ => 0,
        }
    }
}

/// Pick the best qualifying detection.
///
/// A detection qualifies when its confidence strictly exceeds the threshold
/// and its label maps onto a known category. Among qualifying detections the
/// single highest-confidence one wins; everything else is ignored outright -
/// a sub-threshold or unmapped detection is never reported, not even as
/// "unidentified".
pub fn select_best(detections: &[DetectionRecord], threshold_x10: u16) -> Verdict {
    let mut best: Option<(Category, u16)> = None;

    for detection in detections {
        if detection.confidence_x10 <= threshold_x10 {
            continue;
        }
        let Some(category) = map_label(detection.label.as_str()) else {
            continue;
        };
        if best.map_or(true, |(_, conf)| detection.confidence_x10 > conf) {
            best = Some((category, detection.confidence_x10));
        }
    }

    match best {
        Some((category, confidence_x10)) => Verdict::Identified {
            category,
            confidence_x10,
        },
        None => Verdict::Unidentified,
    }
}

/// Rate limiter around the capture+infer exchange
///
/// Every attempt consumes the cooldown slot, successful or not - a failed
/// capture does not get to retry any faster than a clean one, which keeps a
/// broken camera from being hammered in a tight loop.
#[derive(Debug, Clone)]
pub struct ClassificationThrottle {
    cooldown_ms: u64,
    threshold_x10: u16,
    last_attempt_ms: Option<u64>,
}

impl ClassificationThrottle {
    /// Create a throttle with the given cooldown and acceptance threshold
    pub const fn new(cooldown_ms: u64, threshold_x10: u16) -> Self {
        Self {
            cooldown_ms,
            threshold_x10,
            last_attempt_ms: None,
        }
    }

    /// Whether enough time has passed since the previous attempt
    pub fn ready(&self, now_ms: u64) -> bool {
        match self.last_attempt_ms {
            None => true,
            Some(t) => now_ms.saturating_sub(t) >= self.cooldown_ms,
        }
    }

    /// One rate-limited capture+infer attempt.
    ///
    /// Returns `None` without touching the hardware while the cooldown is
    /// running. The caller must hold the vision resource lock for the
    /// duration of this call.
    pub async fn try_classify<V>(&mut self, now_ms: u64, vision: &mut V) -> Option<Verdict>
    where
        V: Camera,
        V: Classifier<<V as Camera>::Frame>,
    {
        if !self.ready(now_ms) {
            return None;
        }
        self.last_attempt_ms = Some(now_ms);

        let frame = match vision.capture().await {
            Ok(frame) if !frame.is_empty() => frame,
            Ok(_) | Err(_) => return Some(Verdict::CameraError),
        };

        match vision.infer(&frame).await {
            Ok(detections) => Some(select_best(&detections, self.threshold_x10)),
            Err(_) => Some(Verdict::CameraError),
        }
    }
}
