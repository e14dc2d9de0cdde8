//! Page-organized monochrome frame buffer
//!
//! The SSD1306 RAM is split into pages of 8 rows. One byte covers one column
//! of one page, least significant bit on top:
//!
//! ```text
//! byte index = (y / 8) * width + x
//! bit        = y % 8
//! ```
//!
//! The buffer mirrors that layout so a page goes out as a single data burst.

// Indices are bounds-checked against width/height before use and every
// product stays below `MAX_BYTES`.
#![allow(clippy::arithmetic_side_effects)]

use crate::config::{SSD1306_HEIGHT, SSD1306_WIDTH};
use crate::error::DriverError;
use crate::state::LockState;

/// Rows per RAM page.
pub const PAGE_HEIGHT: u16 = 8;

/// Storage for the largest supported panel (128×64).
pub const MAX_BYTES: usize = SSD1306_WIDTH as usize * SSD1306_HEIGHT as usize / 8;

/// 1-bit pixel buffer in controller page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    bytes: [u8; MAX_BYTES],
    width: u16,
    height: u16,
    lock: LockState,
}

impl PixelBuffer {
    /// Cleared, locked buffer for a `width`×`height` panel.
    ///
    /// `height` must be a multiple of 8 and the panel no larger than
    /// 128×64, otherwise [`DriverError::InvalidConfig`].
    pub fn new(width: u16, height: u16) -> Result<Self, DriverError> {
        let fits = width > 0
            && height > 0
            && width <= SSD1306_WIDTH
            && height <= SSD1306_HEIGHT
            && height % PAGE_HEIGHT == 0;
        if !fits {
            return Err(DriverError::InvalidConfig);
        }
        Ok(Self {
            bytes: [0; MAX_BYTES],
            width,
            height,
            lock: LockState::Locked,
        })
    }

    /// Active bytes: `width * height / 8`.
    pub fn len(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) / 8
    }

    /// Never true for a constructed buffer.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Panel width in pixels
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Panel height in pixels
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of RAM pages.
    pub const fn pages(&self) -> u16 {
        self.height / PAGE_HEIGHT
    }

    /// Byte index and bit mask of a pixel, `None` off the panel.
    pub fn index(&self, x: u16, y: u16) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = usize::from(y / PAGE_HEIGHT) * usize::from(self.width) + usize::from(x);
        Some((index, 1 << (y % PAGE_HEIGHT)))
    }

    /// `(page, column)` holding byte `index`, `None` past the active length.
    pub fn position(&self, index: usize) -> Option<(u16, u16)> {
        if index >= self.len() {
            return None;
        }
        let width = usize::from(self.width);
        let page = u16::try_from(index / width).ok()?;
        let column = u16::try_from(index % width).ok()?;
        Some((page, column))
    }

    /// Light (`true`) or clear a pixel.
    pub fn set(&mut self, x: u16, y: u16, on: bool) -> Result<(), DriverError> {
        let (index, mask) = self.index(x, y).ok_or(DriverError::Range)?;
        let byte = self.bytes.get_mut(index).ok_or(DriverError::Range)?;
        if on {
            *byte |= mask;
        } else {
            *byte &= !mask;
        }
        Ok(())
    }

    /// Whether a pixel is lit.
    pub fn get(&self, x: u16, y: u16) -> Result<bool, DriverError> {
        let (index, mask) = self.index(x, y).ok_or(DriverError::Range)?;
        self.bytes
            .get(index)
            .map(|byte| byte & mask != 0)
            .ok_or(DriverError::Range)
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Set every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        let value = if on { 0xFF } else { 0x00 };
        let len = self.len();
        if let Some(active) = self.bytes.get_mut(..len) {
            active.fill(value);
        }
    }

    /// Bytes of one page, `None` past the last page.
    pub fn page(&self, page: u16) -> Option<&[u8]> {
        if page >= self.pages() {
            return None;
        }
        let width = usize::from(self.width);
        let start = usize::from(page) * width;
        self.bytes.get(start..start + width)
    }

    /// Active bytes in RAM order.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.get(..self.len()).unwrap_or(&[])
    }

    /// Refuse flushes until [`PixelBuffer::unlock`].
    pub fn lock(&mut self) {
        self.lock = LockState::Locked;
    }

    /// Allow flushes.
    pub fn unlock(&mut self) {
        self.lock = LockState::Unlocked;
    }

    /// Current lock state.
    pub const fn lock_state(&self) -> LockState {
        self.lock
    }

    /// `true` while flushes are refused.
    pub fn is_locked(&self) -> bool {
        self.lock == LockState::Locked
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_lengths() {
        assert_eq!(PixelBuffer::new(128, 64).unwrap().len(), 1024);
        assert_eq!(PixelBuffer::new(128, 32).unwrap().len(), 512);
        assert_eq!(PixelBuffer::new(128, 32).unwrap().pages(), 4);
    }

    #[test]
    fn test_rejects_unsupported_sizes() {
        assert_eq!(PixelBuffer::new(129, 64), Err(DriverError::InvalidConfig));
        assert_eq!(PixelBuffer::new(128, 60), Err(DriverError::InvalidConfig), "partial page");
        assert_eq!(PixelBuffer::new(0, 64), Err(DriverError::InvalidConfig));
    }

    #[test]
    fn test_page_layout() {
        let mut buf = PixelBuffer::new(128, 64).unwrap();
        buf.set(3, 0, true).unwrap();
        buf.set(3, 7, true).unwrap();
        buf.set(5, 9, true).unwrap();
        assert_eq!(buf.as_bytes()[3], 0b1000_0001, "top row is the LSB");
        assert_eq!(buf.as_bytes()[128 + 5], 0b0000_0010, "row 9 is bit 1 of page 1");
    }

    #[test]
    fn test_set_get_and_clear_pixel() {
        let mut buf = PixelBuffer::new(128, 32).unwrap();
        buf.set(127, 31, true).unwrap();
        assert_eq!(buf.get(127, 31), Ok(true));
        assert_eq!(buf.get(126, 31), Ok(false));
        buf.set(127, 31, false).unwrap();
        assert_eq!(buf.get(127, 31), Ok(false));
    }

    #[test]
    fn test_out_of_range() {
        let mut buf = PixelBuffer::new(128, 32).unwrap();
        assert_eq!(buf.set(128, 0, true), Err(DriverError::Range));
        assert_eq!(buf.get(0, 32), Err(DriverError::Range));
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_position_inverts_index() {
        let buf = PixelBuffer::new(128, 64).unwrap();
        let (index, _) = buf.index(17, 42).unwrap();
        assert_eq!(buf.position(index), Some((5, 17)));
        assert_eq!(buf.position(1024), None);
    }

    #[test]
    fn test_fill_only_touches_active_bytes() {
        let mut buf = PixelBuffer::new(128, 32).unwrap();
        buf.fill(true);
        assert!(buf.as_bytes().iter().all(|&b| b == 0xFF));
        assert!(buf.bytes[512..].iter().all(|&b| b == 0));
        buf.clear();
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_page_slices() {
        let mut buf = PixelBuffer::new(128, 64).unwrap();
        buf.set(0, 63, true).unwrap();
        assert_eq!(buf.page(7).map(|p| (p.len(), p[0])), Some((128, 0x80)));
        assert!(buf.page(8).is_none());
    }

    #[test]
    fn test_lock_toggles() {
        let mut buf = PixelBuffer::new(128, 64).unwrap();
        assert!(buf.is_locked(), "new buffers start locked");
        buf.unlock();
        assert_eq!(buf.lock_state(), LockState::Unlocked);
        buf.lock();
        assert!(buf.is_locked());
    }
}
