//! ST7789V RGB565 TFT driver
//!
//! 240×135 panels on 4-wire SPI. There is no frame buffer: every write arms
//! a RAM window and streams 16-bit pixel words into it.
//!
//! ```text
//! CS↓ DC=0 2A        CS↑   CS↓ DC=1 x0h x0l x1h x1l CS↑
//! CS↓ DC=0 2B        CS↑   CS↓ DC=1 y0h y0l y1h y1l CS↑
//! CS↓ DC=0 2C        CS↑   CS↓ DC=1 <pixel words...>   CS↑
//! ```

pub mod command;

use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal::digital::OutputPin;
use platform::{transaction, Bus, DataMode, NoPin, TransportError};

pub use command::Command;

use crate::config::{ColorDepth, DeviceConfig};
use crate::error::DriverError;
use crate::sequencer;
use crate::state::ControllerState;
use crate::window::AddressWindow;

/// Pixel words staged per `write_bytes` call for solid fills.
const BURST_WORDS: usize = 32;

/// ST7789V controller behind a [`Bus`].
pub struct St7789v<B, RST = NoPin> {
    bus: B,
    reset: Option<RST>,
    config: DeviceConfig,
    state: ControllerState,
}

impl<B, RST> St7789v<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    /// Wrap a transport. No bus traffic until [`St7789v::init`].
    pub fn new(bus: B, reset: Option<RST>, config: DeviceConfig) -> Result<Self, DriverError> {
        config.validate()?;
        config.check_reset_line(reset.is_some())?;
        if config.depth != ColorDepth::Rgb565 {
            return Err(DriverError::InvalidConfig);
        }
        Ok(Self {
            bus,
            reset,
            config,
            state: ControllerState::Uninitialized,
        })
    }

    /// Reset (if wired), replay the bring-up table and switch the panel on.
    ///
    /// Calling it again while `Ready` runs the whole sequence again.
    pub fn init(&mut self) -> Result<(), DriverError> {
        self.state.begin_init()?;
        let result = sequencer::initialize(
            &mut self.bus,
            self.reset.as_mut(),
            &command::INIT_240X135,
            &command::PROTOCOL,
        );
        self.state.finish_init(result.is_ok());

        #[cfg(feature = "defmt")]
        if result.is_ok() {
            defmt::info!("st7789v: ready ({=u16}x{=u16})", self.config.width, self.config.height);
        }
        result
    }

    /// Arm the RAM window `(x0, y0)..=(x1, y1)` for the next pixel words.
    ///
    /// Out-of-range windows fail with [`DriverError::Range`] before any byte
    /// is sent.
    pub fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DriverError> {
        let window = AddressWindow::new(x0, y0, x1, y1, self.config.width, self.config.height)?;
        self.exclusive(|this| write_window(&mut this.bus, &window).map_err(DriverError::from))
    }

    /// Set one pixel to an RGB565 `color`.
    ///
    /// Arms the window `(x, y)..=(x + 1, y + 1)`, clamped to the last
    /// row/column at the panel edge, then sends exactly one word.
    pub fn put_pixel(&mut self, x: u16, y: u16, color: u16) -> Result<(), DriverError> {
        let (width, height) = (self.config.width, self.config.height);
        if x >= width || y >= height {
            return Err(DriverError::Range);
        }
        let x1 = x.saturating_add(1).min(width.saturating_sub(1));
        let y1 = y.saturating_add(1).min(height.saturating_sub(1));
        let window = AddressWindow::new(x, y, x1, y1, width, height)?;
        self.exclusive(|this| {
            write_window(&mut this.bus, &window)?;
            transaction(&mut this.bus, DataMode::Data, |b| b.write_word(color))
                .map_err(DriverError::from)
        })
    }

    /// Stream `colors` into `window`, row by row, in one data transaction.
    ///
    /// At most `window.pixel_count()` words are taken from the iterator.
    pub fn write_pixels<I>(&mut self, window: AddressWindow, colors: I) -> Result<(), DriverError>
    where
        I: IntoIterator<Item = u16>,
    {
        if !window.fits(self.config.width, self.config.height) {
            return Err(DriverError::Range);
        }
        let count = usize::try_from(window.pixel_count()).unwrap_or(usize::MAX);
        self.exclusive(|this| {
            write_window(&mut this.bus, &window)?;
            transaction(&mut this.bus, DataMode::Data, |b| {
                colors.into_iter().take(count).try_for_each(|c| b.write_word(c))
            })
            .map_err(DriverError::from)
        })
    }

    /// Fill a `w`×`h` rectangle at `(x, y)` with one color.
    ///
    /// A zero-sized rectangle is a no-op.
    pub fn fill_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: u16) -> Result<(), DriverError> {
        if !self.state.is_ready() {
            return Err(self.not_ready());
        }
        if w == 0 || h == 0 {
            return Ok(());
        }
        let window = AddressWindow::from_rect(x, y, w, h, self.config.width, self.config.height)?;
        self.fill_window(&window, color)
    }

    /// Fill the whole panel with one color.
    pub fn clear_screen(&mut self, color: u16) -> Result<(), DriverError> {
        let window = AddressWindow::full(self.config.width, self.config.height)?;
        self.fill_window(&window, color)
    }

    /// Display on (`DISPON`) or off (`DISPOFF`). RAM is retained while off.
    pub fn set_display_power(&mut self, on: bool) -> Result<(), DriverError> {
        let command = if on {
            Command::DisplayOn
        } else {
            Command::DisplayOff
        };
        self.command(command, &[], 0)
    }

    /// Inverted (`INVON`) or normal (`INVOFF`) colors.
    pub fn set_inversion(&mut self, inverted: bool) -> Result<(), DriverError> {
        let command = if inverted {
            Command::InversionOn
        } else {
            Command::InversionOff
        };
        self.command(command, &[], 0)
    }

    /// Enter sleep mode (`SLPIN`) and wait for the controller to settle.
    pub fn sleep(&mut self) -> Result<(), DriverError> {
        self.command(Command::SleepIn, &[], command::SLEEP_IN_DELAY_US)
    }

    /// Leave sleep mode (`SLPOUT`) and wait for the supply to stabilize.
    pub fn wake(&mut self) -> Result<(), DriverError> {
        self.command(Command::SleepOut, &[], command::SLEEP_OUT_DELAY_US)
    }

    /// Send a read command and clock `buf.len()` bytes back, all inside one
    /// chip-select transaction.
    pub fn read_register(&mut self, command: u8, buf: &mut [u8]) -> Result<(), DriverError> {
        self.exclusive(|this| {
            transaction(&mut this.bus, DataMode::Command, |b| {
                b.write_byte(command)?;
                b.set_data_mode(DataMode::Data)?;
                buf.iter_mut().try_for_each(|slot| {
                    *slot = b.read_byte()?;
                    Ok::<(), TransportError>(())
                })
            })
            .map_err(DriverError::from)
        })
    }

    /// `RDDID`: manufacturer, version and driver ID bytes.
    pub fn read_display_id(&mut self) -> Result<[u8; 3], DriverError> {
        let mut id = [0; 3];
        self.read_register(Command::ReadDisplayId.byte(), &mut id)?;
        Ok(id)
    }

    /// `RDDST`: the four display status bytes.
    pub fn read_display_status(&mut self) -> Result<[u8; 4], DriverError> {
        let mut status = [0; 4];
        self.read_register(Command::ReadDisplayStatus.byte(), &mut status)?;
        Ok(status)
    }

    /// Current controller state.
    pub const fn state(&self) -> ControllerState {
        self.state
    }

    /// Configuration the driver was built with.
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Give back the transport and the reset line.
    pub fn release(self) -> (B, Option<RST>) {
        (self.bus, self.reset)
    }

    fn fill_window(&mut self, window: &AddressWindow, color: u16) -> Result<(), DriverError> {
        self.exclusive(|this| {
            write_window(&mut this.bus, window)?;
            transaction(&mut this.bus, DataMode::Data, |b| {
                stream_solid(b, color, window.pixel_count())
            })
            .map_err(DriverError::from)
        })
    }

    fn command(&mut self, command: Command, params: &[u8], settle_us: u32) -> Result<(), DriverError> {
        self.exclusive(|this| {
            sequencer::send_command(&mut this.bus, &command::PROTOCOL, command.byte(), params)?;
            if settle_us > 0 {
                this.bus.delay_us(settle_us);
            }
            Ok(())
        })
    }

    fn not_ready(&self) -> DriverError {
        match self.state {
            ControllerState::Busy => DriverError::Busy,
            _ => DriverError::NotInitialized,
        }
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

/// CASET, RASET, then RAMWR.
fn write_window<B: Bus + ?Sized>(bus: &mut B, window: &AddressWindow) -> Result<(), TransportError> {
    let protocol = &command::PROTOCOL;
    sequencer::send_command(bus, protocol, Command::ColumnAddressSet.byte(), &window.column_params())?;
    sequencer::send_command(bus, protocol, Command::RowAddressSet.byte(), &window.row_params())?;
    sequencer::send_command(bus, protocol, Command::MemoryWrite.byte(), &[])
}

/// `count` copies of one word, staged in bursts.
fn stream_solid<B: Bus + ?Sized>(bus: &mut B, color: u16, count: u32) -> Result<(), TransportError> {
    let [high, low] = color.to_be_bytes();
    let mut burst = [0u8; BURST_WORDS * 2];
    for pair in burst.chunks_exact_mut(2) {
        pair.copy_from_slice(&[high, low]);
    }
    let mut left = usize::try_from(count).unwrap_or(usize::MAX);
    while left > 0 {
        let words = left.min(BURST_WORDS);
        let bytes = burst.get(..words.saturating_mul(2)).unwrap_or(&burst);
        bus.write_bytes(bytes)?;
        left = left.saturating_sub(words);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// DrawTarget: every call goes straight to panel RAM
// ---------------------------------------------------------------------------

impl<B, RST> DrawTarget for St7789v<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    type Color = Rgb565;
    type Error = DriverError;

    /// One windowed write per pixel; off-panel pixels are skipped.
    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = (self.config.width, self.config.height);
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u16::try_from(point.x), u16::try_from(point.y)) else {
                continue;
            };
            if x < width && y < height {
                self.put_pixel(x, y, color.into_storage())?;
            }
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        if area.is_zero_sized() {
            return Ok(());
        }
        let (Ok(x), Ok(y)) = (u16::try_from(area.top_left.x), u16::try_from(area.top_left.y)) else {
            return Err(DriverError::Range);
        };
        let (Ok(w), Ok(h)) = (u16::try_from(area.size.width), u16::try_from(area.size.height)) else {
            return Err(DriverError::Range);
        };
        self.fill_rect(x, y, w, h, color.into_storage())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.clear_screen(color.into_storage())
    }
}

impl<B, RST> OriginDimensions for St7789v<B, RST>
where
    B: Bus,
    RST: OutputPin,
{
    fn size(&self) -> Size {
        Size::new(self.config.width.into(), self.config.height.into())
    }
}
