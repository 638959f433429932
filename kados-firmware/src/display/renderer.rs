//! Screen rendering
//!
//! Builds text screens from station snapshots. The panel is a 128x64 OLED
//! driven as 8 rows of 21 characters; the mode button cycles between a
//! combined status view, a large classification view, and a raw sensor
//! view.

use core::fmt::Write;

use heapless::String;

use kados_core::classify::Verdict;
use kados_core::station::StationSnapshot;

/// Text grid dimensions
pub const SCREEN_ROWS: u8 = 8;
pub const SCREEN_COLS: usize = 21;

/// A screen of text ready for the panel driver
pub struct Screen {
    lines: [String<SCREEN_COLS>; SCREEN_ROWS as usize],
}

impl Screen {
    /// Create an empty screen
    pub const fn new() -> Self {
        Self {
            lines: [const { String::new() }; SCREEN_ROWS as usize],
        }
    }

    /// Clear all rows
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.clear();
        }
    }

    /// Set text at a specific row, truncated to the panel width
    pub fn set_line(&mut self, row: u8, text: &str) {
        if let Some(line) = self.lines.get_mut(row as usize) {
            line.clear();
            for ch in text.chars().take(SCREEN_COLS) {
                let _ = line.push(ch);
            }
        }
    }

    /// Get a line of text
    pub fn line(&self, row: u8) -> &str {
        self.lines
            .get(row as usize)
            .map(|line| line.as_str())
            .unwrap_or("")
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Display views cycled by the mode button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Classification plus camera/light status
    Status,
    /// Classification only, centered
    Classification,
    /// Raw sensor readings
    Sensors,
}

impl DisplayMode {
    /// Decode a mode from its stored index; unknown values read as Status
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => DisplayMode::Classification,
            2 => DisplayMode::Sensors,
            _ => DisplayMode::Status,
        }
    }

    /// Index for atomic storage
    pub fn index(self) -> u8 {
        match self {
            DisplayMode::Status => 0,
            DisplayMode::Classification => 1,
            DisplayMode::Sensors => 2,
        }
    }

    /// The next view in the cycle
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Status => DisplayMode::Classification,
            DisplayMode::Classification => DisplayMode::Sensors,
            DisplayMode::Sensors => DisplayMode::Status,
        }
    }

    /// Human-readable name for logging
    pub fn name(self) -> &'static str {
        match self {
            DisplayMode::Status => "status",
            DisplayMode::Classification => "classification",
            DisplayMode::Sensors => "sensors",
        }
    }
}

/// Screen renderer for the station views
pub struct Renderer {
    screen: Screen,
}

impl Renderer {
    /// Create a new renderer
    pub const fn new() -> Self {
        Self {
            screen: Screen::new(),
        }
    }

    /// Get the current screen buffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Render the startup banner
    pub fn render_banner(&mut self) {
        self.screen.clear();
        self.screen.set_line(2, "        KADOS");
        self.screen.set_line(4, "  WASTE  CLASSIFIER");
        self.screen.set_line(6, "     starting...");
    }

    /// Render a snapshot in the given view
    pub fn render_snapshot(&mut self, snapshot: &StationSnapshot, mode: DisplayMode) {
        match mode {
            DisplayMode::Status => self.render_status(snapshot),
            DisplayMode::Classification => self.render_classification(snapshot),
            DisplayMode::Sensors => self.render_sensors(snapshot),
        }
    }

    fn render_status(&mut self, snapshot: &StationSnapshot) {
        self.screen.clear();
        self.screen.set_line(0, "      CLASSIFIER");

        match snapshot.verdict {
            Verdict::Identified { confidence_x10, .. } => {
                let mut line: String<SCREEN_COLS> = String::new();
                let _ = write!(line, "Type: {}", snapshot.verdict.label());
                self.screen.set_line(2, &line);

                line.clear();
                let _ = write!(
                    line,
                    "Conf: {}.{}%",
                    confidence_x10 / 10,
                    confidence_x10 % 10
                );
                self.screen.set_line(3, &line);
            }
            verdict => {
                self.set_centered(2, verdict.label());
            }
        }

        let cam = if snapshot.camera_active {
            "CAM: ACTIVE"
        } else {
            "CAM: IDLE"
        };
        let led = if snapshot.light_on { "LED: ON" } else { "LED: OFF" };
        let mut line: String<SCREEN_COLS> = String::new();
        let _ = write!(line, "{}  {}", cam, led);
        self.screen.set_line(5, &line);

        self.screen.set_line(7, &distance_line(snapshot));
    }

    fn render_classification(&mut self, snapshot: &StationSnapshot) {
        self.screen.clear();
        self.set_centered(3, snapshot.verdict.label());

        if let Verdict::Identified { confidence_x10, .. } = snapshot.verdict {
            let mut line: String<SCREEN_COLS> = String::new();
            let _ = write!(line, "{}.{}%", confidence_x10 / 10, confidence_x10 % 10);
            self.set_centered(5, &line);
        }
    }

    fn render_sensors(&mut self, snapshot: &StationSnapshot) {
        self.screen.clear();
        self.screen.set_line(0, "       SENSORS");
        self.screen.set_line(2, &distance_line(snapshot));

        let mut line: String<SCREEN_COLS> = String::new();
        let _ = write!(line, "Dark:   {}", if snapshot.dark { "yes" } else { "no" });
        self.screen.set_line(3, &line);

        line.clear();
        let _ = write!(
            line,
            "Motion: {}",
            if snapshot.motion { "yes" } else { "no" }
        );
        self.screen.set_line(4, &line);

        line.clear();
        let _ = write!(
            line,
            "Cam: {}  Led: {}",
            if snapshot.camera_active { "on" } else { "off" },
            if snapshot.light_on { "on" } else { "off" }
        );
        self.screen.set_line(6, &line);
    }

    /// Center text on a row
    fn set_centered(&mut self, row: u8, text: &str) {
        let pad = SCREEN_COLS.saturating_sub(text.chars().count()) / 2;
        let mut line: String<SCREEN_COLS> = String::new();
        for _ in 0..pad {
            let _ = line.push(' ');
        }
        for ch in text.chars() {
            let _ = line.push(ch);
        }
        self.screen.set_line(row, &line);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn distance_line(snapshot: &StationSnapshot) -> String<SCREEN_COLS> {
    let mut line: String<SCREEN_COLS> = String::new();
    match snapshot.distance_mm {
        Some(mm) => {
            let _ = write!(line, "Dist: {}.{} cm", mm / 10, mm % 10);
        }
        None => {
            let _ = write!(line, "Dist: ---");
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use kados_core::classify::Category;

    fn snapshot(verdict: Verdict) -> StationSnapshot {
        StationSnapshot {
            distance_mm: Some(412),
            dark: true,
            motion: false,
            light_on: true,
            camera_active: true,
            verdict,
        }
    }

    #[test]
    fn test_status_view_identified() {
        let mut renderer = Renderer::new();
        renderer.render_snapshot(
            &snapshot(Verdict::Identified {
                category: Category::Paper,
                confidence_x10: 724,
            }),
            DisplayMode::Status,
        );

        assert_eq!(renderer.screen().line(2), "Type: PAPER");
        assert_eq!(renderer.screen().line(3), "Conf: 72.4%");
        assert_eq!(renderer.screen().line(5), "CAM: ACTIVE  LED: ON");
        assert_eq!(renderer.screen().line(7), "Dist: 41.2 cm");
    }

    #[test]
    fn test_status_view_sentinel_is_centered() {
        let mut renderer = Renderer::new();
        renderer.render_snapshot(&snapshot(Verdict::Waiting), DisplayMode::Status);

        let line = renderer.screen().line(2);
        assert_eq!(line.trim(), "WAITING...");
        assert!(line.starts_with(' '));
    }

    #[test]
    fn test_sensor_view_handles_missing_reading() {
        let mut renderer = Renderer::new();
        let mut snap = snapshot(Verdict::Waiting);
        snap.distance_mm = None;
        renderer.render_snapshot(&snap, DisplayMode::Sensors);

        assert_eq!(renderer.screen().line(2), "Dist: ---");
        assert_eq!(renderer.screen().line(3), "Dark:   yes");
    }

    #[test]
    fn test_mode_cycle() {
        let mut mode = DisplayMode::Status;
        mode = mode.next();
        assert_eq!(mode, DisplayMode::Classification);
        mode = mode.next();
        assert_eq!(mode, DisplayMode::Sensors);
        mode = mode.next();
        assert_eq!(mode, DisplayMode::Status);

        assert_eq!(DisplayMode::from_index(DisplayMode::Sensors.index()), DisplayMode::Sensors);
        assert_eq!(DisplayMode::from_index(99), DisplayMode::Status);
    }

    #[test]
    fn test_long_text_truncates_at_panel_width() {
        let mut screen = Screen::new();
        screen.set_line(0, "0123456789012345678901234567");
        assert_eq!(screen.line(0).len(), SCREEN_COLS);
    }
}
