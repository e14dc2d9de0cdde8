//! SSD1306 monochrome OLED driver
//!
//! 128×64 or 128×32 panels on I2C (or SPI with a D/C line). Pixels are drawn
//! into an owned [`PixelBuffer`] and reach the panel only on
//! [`Ssd1306::flush`], which rewrites every RAM page.
//!
//! # Wire format (I2C)
//!
//! ```text
//! START 0x78 0x00 <command> <params...> STOP      command stream
//! START 0x78 0x40 <pixel bytes...> STOP           display data
//! ```
//!
//! Command parameters travel in the command stream, so the init table and
//! the runtime commands share [`command::PROTOCOL`].

pub mod buffer;
pub mod command;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::digital::OutputPin;
use platform::{transaction, Bus, DataMode, NoPin};

pub use buffer::PixelBuffer;
pub use command::Command;

use crate::config::{ColorDepth, DeviceConfig};
use crate::error::DriverError;
use crate::sequencer;
use crate::state::ControllerState;

/// SSD1306 controller behind a [`Bus`].
pub struct Ssd1306<B, RST = NoPin> {
    bus: B,
    reset: Option<RST>,
    config: DeviceConfig,
    buffer: PixelBuffer,
    state: ControllerState,
}

impl<B, RST> Ssd1306<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    /// Wrap a transport. No bus traffic until [`Ssd1306::init`].
    ///
    /// The configuration must describe a monochrome 128×64 or 128×32 panel.
    pub fn new(bus: B, reset: Option<RST>, config: DeviceConfig) -> Result<Self, DriverError> {
        config.validate()?;
        config.check_reset_line(reset.is_some())?;
        if config.depth != ColorDepth::Mono1 || command::init_table_for(config.height).is_none() {
            return Err(DriverError::InvalidConfig);
        }
        let buffer = PixelBuffer::new(config.width, config.height)?;
        Ok(Self {
            bus,
            reset,
            config,
            buffer,
            state: ControllerState::Uninitialized,
        })
    }

    /// Reset (if wired), replay the bring-up table and switch the panel on.
    ///
    /// On success the buffer is cleared and unlocked, on failure it is locked.
    /// Calling it again while `Ready` runs the whole sequence again.
    pub fn init(&mut self) -> Result<(), DriverError> {
        let table = command::init_table_for(self.config.height).ok_or(DriverError::InvalidConfig)?;
        self.state.begin_init()?;

        let result =
            sequencer::initialize(&mut self.bus, self.reset.as_mut(), table, &command::PROTOCOL);
        self.state.finish_init(result.is_ok());

        if result.is_ok() {
            self.buffer.clear();
            self.buffer.unlock();
            #[cfg(feature = "defmt")]
            defmt::info!("ssd1306: ready ({=u16}x{=u16})", self.config.width, self.config.height);
        } else {
            self.buffer.lock();
        }
        result
    }

    /// Switch the panel off and return to `Uninitialized` with the buffer
    /// locked. The state changes even when the display-off command fails.
    pub fn deinit(&mut self) -> Result<(), DriverError> {
        if self.state == ControllerState::Busy {
            return Err(DriverError::Busy);
        }
        let result = sequencer::send_command(
            &mut self.bus,
            &command::PROTOCOL,
            Command::DisplayOff.byte(),
            &[],
        );
        self.state = ControllerState::Uninitialized;
        self.buffer.lock();
        result.map_err(DriverError::from)
    }

    /// Light or clear one pixel in the buffer. No bus traffic.
    pub fn set_pixel(&mut self, x: u16, y: u16, on: bool) -> Result<(), DriverError> {
        self.exclusive(|this| this.buffer.set(x, y, on))
    }

    /// Read one pixel back from the buffer.
    pub fn get_pixel(&self, x: u16, y: u16) -> Result<bool, DriverError> {
        if !self.state.is_ready() {
            return Err(DriverError::NotInitialized);
        }
        self.buffer.get(x, y)
    }

    /// Turn every buffered pixel off. No bus traffic.
    pub fn clear(&mut self) -> Result<(), DriverError> {
        self.exclusive(|this| {
            this.buffer.clear();
            Ok(())
        })
    }

    /// Write the whole buffer to the panel, one page at a time.
    ///
    /// Each page is addressed with `0xB0 | page, 0x00, 0x10` and then
    /// streamed as `width` data bytes. Fails with [`DriverError::Busy`]
    /// while the buffer is locked.
    pub fn flush(&mut self) -> Result<(), DriverError> {
        if self.state == ControllerState::Uninitialized {
            return Err(DriverError::NotInitialized);
        }
        if self.buffer.is_locked() {
            #[cfg(feature = "defmt")]
            defmt::warn!("ssd1306: flush rejected, buffer locked");
            return Err(DriverError::Busy);
        }
        self.exclusive(|this| {
            let Self { bus, buffer, .. } = this;
            for page in 0..buffer.pages() {
                let index = u8::try_from(page).map_err(|_| DriverError::Range)?;
                let bytes = buffer.page(page).ok_or(DriverError::Range)?;
                transaction(bus, DataMode::Command, |b| {
                    b.write_bytes(&command::cursor(index, 0))
                })?;
                transaction(bus, DataMode::Data, |b| b.write_bytes(bytes))?;
            }
            Ok(())
        })
    }

    /// Point the RAM cursor at `column` of `page` (page addressing mode).
    pub fn set_pos(&mut self, page: u8, column: u8) -> Result<(), DriverError> {
        if u16::from(page) >= self.buffer.pages() || u16::from(column) >= self.config.width {
            return Err(DriverError::Range);
        }
        self.exclusive(|this| {
            transaction(&mut this.bus, DataMode::Command, |b| {
                b.write_bytes(&command::cursor(page, column))
            })
            .map_err(DriverError::from)
        })
    }

    /// Panel contrast, 0x00..=0xFF.
    pub fn set_contrast(&mut self, value: u8) -> Result<(), DriverError> {
        self.command(Command::Contrast, &[value])
    }

    /// Display on (`0xAF`) or off (`0xAE`). RAM is retained while off.
    pub fn set_display_power(&mut self, on: bool) -> Result<(), DriverError> {
        let command = if on {
            Command::DisplayOn
        } else {
            Command::DisplayOff
        };
        self.command(command, &[])
    }

    /// Inverted (`0xA7`) or normal (`0xA6`) pixel polarity.
    pub fn set_inversion(&mut self, inverted: bool) -> Result<(), DriverError> {
        let command = if inverted {
            Command::InvertDisplay
        } else {
            Command::NormalDisplay
        };
        self.command(command, &[])
    }

    /// Refuse flushes until [`Ssd1306::unlock`].
    pub fn lock(&mut self) {
        self.buffer.lock();
    }

    /// Allow flushes again.
    pub fn unlock(&mut self) {
        self.buffer.unlock();
    }

    /// Current controller state.
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Configuration the driver was built with.
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The pixel buffer.
    pub const fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Give back the transport and the reset line.
    pub fn release(self) -> (B, Option<RST>) {
        (self.bus, self.reset)
    }

    fn command(&mut self, command: Command, params: &[u8]) -> Result<(), DriverError> {
        self.exclusive(|this| {
            sequencer::send_command(&mut this.bus, &command::PROTOCOL, command.byte(), params)
                .map_err(DriverError::from)
        })
    }

    /// Hold `Busy` around `op`, restoring `Ready` on every exit path.
    fn exclusive<R>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<R, DriverError>,
    ) -> Result<R, DriverError> {
        self.state.acquire()?;
        let result = op(self);
        self.state.release();
        result
    }
}

// ---------------------------------------------------------------------------
// DrawTarget: pixels land in the buffer, flush() sends them
// ---------------------------------------------------------------------------

impl<B, RST> DrawTarget for Ssd1306<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    type Color = BinaryColor;
    type Error = DriverError;

    /// Off-panel pixels are skipped.
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.exclusive(|this| {
            for Pixel(point, color) in pixels {
                let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                    continue;
                };
                if this.buffer.index(x, y).is_some() {
                    this.buffer.set(x, y, color.is_on())?;
                }
            }
            Ok(())
        })
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.exclusive(|this| {
            this.buffer.fill(color.is_on());
            Ok(())
        })
    }
}

impl<B, RST> OriginDimensions for Ssd1306<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.config.width.into(), self.config.height.into())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{Line, PrimitiveStyle};
    use platform::mocks::{BusEvent, MockBus};
    use platform::TransportError;

    fn driver(height: u16) -> Ssd1306<MockBus> {
        let config = DeviceConfig::ssd1306_hardware_i2c(128, height);
        Ssd1306::new(MockBus::new(), None, config).unwrap()
    }

    fn ready(height: u16) -> Ssd1306<MockBus> {
        let mut oled = driver(height);
        oled.init().unwrap();
        oled.bus.clear();
        oled
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn test_rejects_color_config() {
        let config = DeviceConfig::st7789v_hardware_spi(5, 16, None);
        assert_eq!(
            Ssd1306::new(MockBus::new(), None::<NoPin>, config).err(),
            Some(DriverError::InvalidConfig)
        );
    }

    #[test]
    fn test_reset_line_must_match_config() {
        let config = DeviceConfig::ssd1306_hardware_i2c(128, 64);
        assert_eq!(
            Ssd1306::new(MockBus::new(), Some(NoPin), config).err(),
            Some(DriverError::InvalidConfig)
        );
        assert!(Ssd1306::new(MockBus::new(), Some(NoPin), config.with_reset(4)).is_ok());
    }

    // -----------------------------------------------------------------------
    // init / deinit
    // -----------------------------------------------------------------------

    #[test]
    fn test_init_sends_table_then_display_on() {
        let mut oled = driver(64);
        oled.init().unwrap();
        let commands = oled.bus.commands();
        assert_eq!(commands.first(), Some(&0xAE));
        assert_eq!(commands.last(), Some(&0xAF));
        assert_eq!(commands.len(), 25, "24 table bytes + display on");
        assert!(oled.bus.data().is_empty(), "bring-up sends no display data");
        assert_eq!(oled.state(), ControllerState::Ready);
        assert!(!oled.buffer().is_locked());
    }

    #[test]
    fn test_init_failure_leaves_uninitialized() {
        let config = DeviceConfig::ssd1306_hardware_i2c(128, 64);
        let mut oled = Ssd1306::new(MockBus::new().fail_after(4), None::<NoPin>, config).unwrap();
        let err = oled.init().unwrap_err();
        assert!(matches!(err, DriverError::InitFailed { step: Some(2), .. }), "{err:?}");
        assert_eq!(oled.state(), ControllerState::Uninitialized);
        assert!(oled.buffer().is_locked());
    }

    #[test]
    fn test_failed_reinit_locks_buffer() {
        let config = DeviceConfig::ssd1306_hardware_i2c(128, 64);
        // the first bring-up uses 25 writes, the second fails on its third
        let mut oled = Ssd1306::new(MockBus::new().fail_after(27), None::<NoPin>, config).unwrap();
        oled.init().unwrap();
        assert!(!oled.buffer().is_locked());

        assert!(oled.init().is_err());
        assert_eq!(oled.state(), ControllerState::Uninitialized);
        assert!(oled.buffer().is_locked());
    }

    #[test]
    fn test_deinit_locks_and_turns_off() {
        let mut oled = ready(64);
        oled.deinit().unwrap();
        assert_eq!(oled.bus.commands(), [0xAE]);
        assert_eq!(oled.state(), ControllerState::Uninitialized);
        assert_eq!(oled.flush(), Err(DriverError::NotInitialized));
        assert_eq!(oled.set_pixel(0, 0, true), Err(DriverError::NotInitialized));
    }

    // -----------------------------------------------------------------------
    // Pixels and flush
    // -----------------------------------------------------------------------

    #[test]
    fn test_pixel_ops_need_init() {
        let mut oled = driver(64);
        assert_eq!(oled.set_pixel(0, 0, true), Err(DriverError::NotInitialized));
        assert_eq!(oled.get_pixel(0, 0), Err(DriverError::NotInitialized));
        assert_eq!(oled.clear(), Err(DriverError::NotInitialized));
    }

    #[test]
    fn test_set_pixel_is_buffer_only() {
        let mut oled = ready(64);
        oled.set_pixel(10, 20, true).unwrap();
        assert_eq!(oled.get_pixel(10, 20), Ok(true));
        assert!(oled.bus.events().is_empty());
        assert_eq!(oled.set_pixel(128, 0, true), Err(DriverError::Range));
        assert_eq!(oled.state(), ControllerState::Ready, "range error restores Ready");
    }

    #[test]
    fn test_flush_addresses_each_page() {
        let mut oled = ready(32);
        oled.set_pixel(0, 8, true).unwrap();
        oled.flush().unwrap();

        let cursors: Vec<u8> = oled.bus.commands();
        assert_eq!(
            cursors,
            [0xB0, 0x00, 0x10, 0xB1, 0x00, 0x10, 0xB2, 0x00, 0x10, 0xB3, 0x00, 0x10]
        );
        let data = oled.bus.data();
        assert_eq!(data.len(), 512);
        assert_eq!(data[128], 0x01, "row 8 is bit 0 of page 1, column 0");
        assert_eq!(oled.state(), ControllerState::Ready);
    }

    #[test]
    fn test_flush_rejected_while_locked() {
        let mut oled = ready(64);
        oled.lock();
        assert_eq!(oled.flush(), Err(DriverError::Busy));
        assert!(oled.bus.events().is_empty());
        oled.unlock();
        assert_eq!(oled.flush(), Ok(()));
    }

    #[test]
    fn test_flush_failure_restores_ready() {
        let config = DeviceConfig::ssd1306_hardware_i2c(128, 64);
        // 24 table bytes + display on succeed, the first cursor byte fails
        let mut oled = Ssd1306::new(MockBus::new().fail_after(25), None::<NoPin>, config).unwrap();
        oled.init().unwrap();
        assert_eq!(oled.flush(), Err(DriverError::Transport(TransportError::Bus)));
        assert_eq!(oled.state(), ControllerState::Ready);
        assert!(!oled.bus.is_selected());
    }

    // -----------------------------------------------------------------------
    // Runtime commands
    // -----------------------------------------------------------------------

    #[test]
    fn test_runtime_commands() {
        let mut oled = ready(64);
        oled.set_contrast(0x7F).unwrap();
        oled.set_inversion(true).unwrap();
        oled.set_display_power(false).unwrap();
        assert_eq!(oled.bus.commands(), [0x81, 0x7F, 0xA7, 0xAE]);
    }

    #[test]
    fn test_set_pos() {
        let mut oled = ready(64);
        oled.set_pos(3, 0x5A).unwrap();
        assert_eq!(
            oled.bus.events(),
            [
                BusEvent::Select,
                BusEvent::Mode(DataMode::Command),
                BusEvent::Write(0xB3),
                BusEvent::Write(0x0A),
                BusEvent::Write(0x15),
                BusEvent::Deselect,
            ]
        );
        assert_eq!(oled.set_pos(8, 0), Err(DriverError::Range));
        assert_eq!(oled.set_pos(0, 128), Err(DriverError::Range));
    }

    // -----------------------------------------------------------------------
    // DrawTarget
    // -----------------------------------------------------------------------

    #[test]
    fn test_draw_target_skips_off_panel_pixels() {
        let mut oled = ready(64);
        Line::new(Point::new(-5, 0), Point::new(130, 0))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(&mut oled)
            .unwrap();
        assert_eq!(oled.get_pixel(0, 0), Ok(true));
        assert_eq!(oled.get_pixel(127, 0), Ok(true));
        assert_eq!(oled.size(), Size::new(128, 64));
    }

    #[test]
    fn test_draw_target_clear_fills() {
        let mut oled = ready(32);
        DrawTarget::clear(&mut oled, BinaryColor::On).unwrap();
        assert!(oled.buffer().as_bytes().iter().all(|&b| b == 0xFF));
    }
}
