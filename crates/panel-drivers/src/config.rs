//! Device configuration
//!
//! One [`DeviceConfig`] describes one physical controller: which transport
//! reaches it, which pins that transport uses, the serial settings, and the
//! panel geometry. It is built once, validated, and owned by its driver.

use platform::{I2cConfig, I2cPins, PinId, SpiConfig, SpiPins};

use crate::error::DriverError;

// ---------------------------------------------------------------------------
// Panel defaults
// ---------------------------------------------------------------------------

/// SSD1306 default panel width in pixels.
pub const SSD1306_WIDTH: u16 = 128;
/// SSD1306 default panel height in pixels.
pub const SSD1306_HEIGHT: u16 = 64;
/// ST7789V default panel width in pixels.
pub const ST7789V_WIDTH: u16 = 240;
/// ST7789V default panel height in pixels.
pub const ST7789V_HEIGHT: u16 = 135;

/// Largest frame the ST7789V RAM holds (240×320).
const ST7789V_MAX_WIDTH: u16 = 240;
const ST7789V_MAX_HEIGHT: u16 = 320;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which transport reaches the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterfaceKind {
    /// `embedded_hal::i2c::I2c` peripheral
    HardwareI2c,
    /// Bit-banged I2C on two GPIOs
    SoftwareI2c,
    /// `embedded_hal::spi::SpiBus` peripheral
    HardwareSpi,
    /// Bit-banged SPI on GPIOs
    SoftwareSpi,
}

impl InterfaceKind {
    /// `true` for the SPI transports.
    pub const fn is_spi(self) -> bool {
        matches!(self, Self::HardwareSpi | Self::SoftwareSpi)
    }

    /// `true` for the bit-banged transports.
    pub const fn is_software(self) -> bool {
        matches!(self, Self::SoftwareI2c | Self::SoftwareSpi)
    }
}

/// Board pins wired to the controller. Unused lines are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinAssignment {
    /// SCL / SCK
    pub clock: Option<PinId>,
    /// SDA / MOSI
    pub data: Option<PinId>,
    /// Chip-select (SPI)
    pub chip_select: Option<PinId>,
    /// Data/command select (SPI)
    pub data_command: Option<PinId>,
    /// Reset
    pub reset: Option<PinId>,
}

/// Pixel format held by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorDepth {
    /// 1 bit per pixel, page organized
    Mono1,
    /// 16 bits per pixel, RGB 5-6-5
    Rgb565,
}

impl ColorDepth {
    /// Bits per pixel.
    pub const fn bits_per_pixel(self) -> u8 {
        match self {
            Self::Mono1 => 1,
            Self::Rgb565 => 16,
        }
    }
}

/// Description of one controller instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Transport kind
    pub interface: InterfaceKind,
    /// Pin assignments
    pub pins: PinAssignment,
    /// SPI settings (ignored by I2C transports)
    pub spi: SpiConfig,
    /// I2C settings (ignored by SPI transports)
    pub i2c: I2cConfig,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// Pixel format
    pub depth: ColorDepth,
}

impl DeviceConfig {
    /// SSD1306 over bit-banged I2C at the default address.
    pub const fn ssd1306_i2c(width: u16, height: u16, scl: PinId, sda: PinId) -> Self {
        Self {
            interface: InterfaceKind::SoftwareI2c,
            pins: PinAssignment {
                clock: Some(scl),
                data: Some(sda),
                chip_select: None,
                data_command: None,
                reset: None,
            },
            spi: SpiConfig::DEFAULT,
            i2c: I2cConfig::DEFAULT,
            width,
            height,
            depth: ColorDepth::Mono1,
        }
    }

    /// SSD1306 on an I2C peripheral at the default address.
    pub const fn ssd1306_hardware_i2c(width: u16, height: u16) -> Self {
        Self {
            interface: InterfaceKind::HardwareI2c,
            pins: PinAssignment {
                clock: None,
                data: None,
                chip_select: None,
                data_command: None,
                reset: None,
            },
            spi: SpiConfig::DEFAULT,
            i2c: I2cConfig::DEFAULT,
            width,
            height,
            depth: ColorDepth::Mono1,
        }
    }

    /// 240×135 ST7789V over bit-banged SPI.
    pub const fn st7789v_software_spi(
        scl: PinId,
        sda: PinId,
        cs: PinId,
        dc: PinId,
        rst: Option<PinId>,
    ) -> Self {
        Self {
            interface: InterfaceKind::SoftwareSpi,
            pins: PinAssignment {
                clock: Some(scl),
                data: Some(sda),
                chip_select: Some(cs),
                data_command: Some(dc),
                reset: rst,
            },
            spi: SpiConfig::DEFAULT,
            i2c: I2cConfig::DEFAULT,
            width: ST7789V_WIDTH,
            height: ST7789V_HEIGHT,
            depth: ColorDepth::Rgb565,
        }
    }

    /// 240×135 ST7789V on an SPI peripheral (clock and data owned by the HAL).
    pub const fn st7789v_hardware_spi(cs: PinId, dc: PinId, rst: Option<PinId>) -> Self {
        Self {
            interface: InterfaceKind::HardwareSpi,
            pins: PinAssignment {
                clock: None,
                data: None,
                chip_select: Some(cs),
                data_command: Some(dc),
                reset: rst,
            },
            spi: SpiConfig::DEFAULT,
            i2c: I2cConfig::DEFAULT,
            width: ST7789V_WIDTH,
            height: ST7789V_HEIGHT,
            depth: ColorDepth::Rgb565,
        }
    }

    /// Replace the SPI settings.
    #[must_use]
    pub const fn with_spi(mut self, spi: SpiConfig) -> Self {
        self.spi = spi;
        self
    }

    /// Replace the I2C settings.
    #[must_use]
    pub const fn with_i2c(mut self, i2c: I2cConfig) -> Self {
        self.i2c = i2c;
        self
    }

    /// Replace the panel geometry.
    #[must_use]
    pub const fn with_size(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Record the reset pin.
    #[must_use]
    pub const fn with_reset(mut self, reset: PinId) -> Self {
        self.pins.reset = Some(reset);
        self
    }

    /// Check that a driver was handed a reset line exactly when this
    /// configuration assigns one.
    pub fn check_reset_line(&self, wired: bool) -> Result<(), DriverError> {
        if self.pins.reset.is_some() == wired {
            Ok(())
        } else {
            Err(DriverError::InvalidConfig)
        }
    }

    /// Pins for [`platform::SoftwareSpiBus`], when this is a bit-banged SPI
    /// configuration with clock, data and D/C assigned.
    pub fn spi_pins(&self) -> Option<SpiPins> {
        if self.interface != InterfaceKind::SoftwareSpi {
            return None;
        }
        Some(SpiPins {
            sck: self.pins.clock?,
            sda: self.pins.data?,
            cs: self.pins.chip_select,
            dc: self.pins.data_command?,
        })
    }

    /// Pins for [`platform::SoftwareI2cBus`], when this is a bit-banged I2C
    /// configuration with clock and data assigned.
    pub fn i2c_pins(&self) -> Option<I2cPins> {
        if self.interface != InterfaceKind::SoftwareI2c {
            return None;
        }
        Some(I2cPins {
            scl: self.pins.clock?,
            sda: self.pins.data?,
        })
    }

    /// Number of bytes one full frame occupies in controller RAM.
    pub fn frame_bytes(&self) -> usize {
        let bits = usize::from(self.width)
            .saturating_mul(usize::from(self.height))
            .saturating_mul(usize::from(self.depth.bits_per_pixel()));
        bits / 8
    }

    /// Reject geometry or wiring the controller cannot work with.
    ///
    /// - monochrome: width 1..=128, height 32 or 64
    /// - RGB565: width 1..=240, height 1..=320
    /// - bit-banged transports need their clock/data (and D/C for SPI) pins
    /// - SPI needs a D/C pin, I2C a 7-bit address
    pub fn validate(&self) -> Result<(), DriverError> {
        let geometry_ok = match self.depth {
            ColorDepth::Mono1 => {
                (1..=SSD1306_WIDTH).contains(&self.width) && matches!(self.height, 32 | 64)
            }
            ColorDepth::Rgb565 => {
                (1..=ST7789V_MAX_WIDTH).contains(&self.width)
                    && (1..=ST7789V_MAX_HEIGHT).contains(&self.height)
            }
        };
        if !geometry_ok {
            return Err(DriverError::InvalidConfig);
        }

        let software = self.interface.is_software();
        let wiring_ok = if self.interface.is_spi() {
            self.pins.data_command.is_some() && (!software || self.spi_pins().is_some())
        } else {
            self.i2c.address <= 0x7F && (!software || self.i2c_pins().is_some())
        };
        if !wiring_ok {
            return Err(DriverError::InvalidConfig);
        }
        Ok(())
    }
}
