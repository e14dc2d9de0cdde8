//! Controller RAM address window
//!
//! A window `(x0, y0)..=(x1, y1)` arms the controller to receive a stream of
//! pixel words that fill it row by row. Coordinates are inclusive and go on
//! the wire as big-endian 16-bit pairs: `[x0_hi, x0_lo, x1_hi, x1_lo]`.

use crate::error::DriverError;

/// Validated, inclusive pixel rectangle inside a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressWindow {
    x0: u16,
    y0: u16,
    x1: u16,
    y1: u16,
}

impl AddressWindow {
    /// Window from corner coordinates.
    ///
    /// Requires `x0 <= x1 < width` and `y0 <= y1 < height`, otherwise
    /// [`DriverError::Range`].
    pub fn new(x0: u16, y0: u16, x1: u16, y1: u16, width: u16, height: u16) -> Result<Self, DriverError> {
        if x0 <= x1 && x1 < width && y0 <= y1 && y1 < height {
            Ok(Self { x0, y0, x1, y1 })
        } else {
            Err(DriverError::Range)
        }
    }

    /// Window from origin and size. A zero-sized rectangle is out of range.
    pub fn from_rect(x: u16, y: u16, w: u16, h: u16, width: u16, height: u16) -> Result<Self, DriverError> {
        let x1 = w.checked_sub(1).and_then(|dw| x.checked_add(dw));
        let y1 = h.checked_sub(1).and_then(|dh| y.checked_add(dh));
        match (x1, y1) {
            (Some(x1), Some(y1)) => Self::new(x, y, x1, y1, width, height),
            _ => Err(DriverError::Range),
        }
    }

    /// The whole panel.
    pub fn full(width: u16, height: u16) -> Result<Self, DriverError> {
        Self::from_rect(0, 0, width, height, width, height)
    }

    /// Re-check against a panel, e.g. for a window built for another size.
    pub fn fits(&self, width: u16, height: u16) -> bool {
        self.x1 < width && self.y1 < height
    }

    /// First column
    pub const fn x0(&self) -> u16 {
        self.x0
    }

    /// First row
    pub const fn y0(&self) -> u16 {
        self.y0
    }

    /// Last column (inclusive)
    pub const fn x1(&self) -> u16 {
        self.x1
    }

    /// Last row (inclusive)
    pub const fn y1(&self) -> u16 {
        self.y1
    }

    /// CASET parameters: `[x0_hi, x0_lo, x1_hi, x1_lo]`.
    pub const fn column_params(&self) -> [u8; 4] {
        span_params(self.x0, self.x1)
    }

    /// RASET parameters: `[y0_hi, y0_lo, y1_hi, y1_lo]`.
    pub const fn row_params(&self) -> [u8; 4] {
        span_params(self.y0, self.y1)
    }

    /// Columns covered.
    pub fn width(&self) -> u32 {
        u32::from(self.x1).saturating_sub(u32::from(self.x0)).saturating_add(1)
    }

    /// Rows covered.
    pub fn height(&self) -> u32 {
        u32::from(self.y1).saturating_sub(u32::from(self.y0)).saturating_add(1)
    }

    /// Pixel words needed to fill the window.
    pub fn pixel_count(&self) -> u32 {
        self.width().saturating_mul(self.height())
    }
}

const fn span_params(start: u16, end: u16) -> [u8; 4] {
    let [start_hi, start_lo] = start.to_be_bytes();
    let [end_hi, end_lo] = end.to_be_bytes();
    [start_hi, start_lo, end_hi, end_lo]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_big_endian() {
        let w = AddressWindow::new(0, 0, 239, 134, 240, 135).unwrap();
        assert_eq!(w.column_params(), [0x00, 0x00, 0x00, 0xEF]);
        assert_eq!(w.row_params(), [0x00, 0x00, 0x00, 0x86]);

        let tall = AddressWindow::new(0, 256, 0, 319, 240, 320).unwrap();
        assert_eq!(tall.row_params(), [0x01, 0x00, 0x01, 0x3F]);
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(AddressWindow::new(10, 0, 9, 0, 240, 135), Err(DriverError::Range), "x0 > x1");
        assert_eq!(AddressWindow::new(0, 0, 240, 0, 240, 135), Err(DriverError::Range), "x1 == width");
        assert_eq!(AddressWindow::new(0, 5, 0, 4, 240, 135), Err(DriverError::Range), "y0 > y1");
        assert_eq!(AddressWindow::new(0, 0, 0, 135, 240, 135), Err(DriverError::Range), "y1 == height");
    }

    #[test]
    fn test_from_rect() {
        let w = AddressWindow::from_rect(10, 20, 5, 3, 240, 135);
        assert_eq!(w, AddressWindow::new(10, 20, 14, 22, 240, 135));
        assert_eq!(w.map(|w| w.pixel_count()), Ok(15));

        assert_eq!(AddressWindow::from_rect(0, 0, 0, 1, 240, 135), Err(DriverError::Range));
        assert_eq!(AddressWindow::from_rect(u16::MAX, 0, 2, 1, 240, 135), Err(DriverError::Range));
        assert_eq!(AddressWindow::from_rect(230, 0, 11, 1, 240, 135), Err(DriverError::Range));
    }

    #[test]
    fn test_full() {
        let full = AddressWindow::full(240, 135);
        assert_eq!(full.map(|w| w.pixel_count()), Ok(240 * 135));
        assert_eq!(AddressWindow::full(0, 135), Err(DriverError::Range));
    }

    #[test]
    fn test_fits() {
        let w = AddressWindow::new(0, 0, 239, 319, 240, 320).unwrap();
        assert!(w.fits(240, 320));
        assert!(!w.fits(240, 135));
    }
}
