//! Status display trait
//!
//! The display is a text panel of 8 rows by 21 columns. The renderer in the
//! firmware decides the layout; the driver only moves characters.

/// Errors that can occur with the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Bus transfer to the panel failed
    Bus,
}

/// Trait for the station's local status display
pub trait StationDisplay {
    /// Blank the frame buffer
    fn clear(&mut self);

    /// Draw text at a position
    ///
    /// - `row`: Row number (0-7)
    /// - `col`: Column number (0-20)
    ///
    /// Text past the right edge is dropped.
    fn text(&mut self, row: u8, col: u8, text: &str);

    /// Push the frame buffer to the panel
    async fn flush(&mut self) -> Result<(), DisplayError>;
}
