//! Bit-banged SPI master
//!
//! Drives SCK/SDA/CS/DC through the [`Gpio`] collaborator. For mode 0 each
//! bit is: SDA driven, SCK high, SCK low. Bytes go out in the configured bit
//! order (MSB first by default), so the wire matches a hardware SPI
//! peripheral running the same [`SpiConfig`].
//!
//! Read-back uses the 3-wire scheme of ST7789-class controllers: SDA is
//! switched to input for the duration of the byte and restored afterwards.

use embedded_hal::delay::DelayNs;

use crate::bus::{Bus, DataMode, TransportError};
use crate::gpio::{Gpio, PinId, PinState};
use crate::peripheral::SpiConfig;

/// Pins used by [`SoftwareSpiBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiPins {
    /// Serial clock
    pub sck: PinId,
    /// Serial data (MOSI, bidirectional for read-back)
    pub sda: PinId,
    /// Chip-select, active low (`None` when tied low on the board)
    pub cs: Option<PinId>,
    /// Data/command select
    pub dc: PinId,
}

/// Software SPI transport.
pub struct SoftwareSpiBus<G, D> {
    gpio: G,
    delay: D,
    pins: SpiPins,
    config: SpiConfig,
}

impl<G, D> SoftwareSpiBus<G, D>
where
    G: Gpio,
    D: DelayNs,
{
    /// Configure the pins as outputs and park them at their idle levels:
    /// SCK idle (per mode), SDA low, CS high, DC low.
    pub fn new(gpio: G, delay: D, pins: SpiPins, config: SpiConfig) -> Result<Self, TransportError> {
        let mut bus = Self {
            gpio,
            delay,
            pins,
            config,
        };
        bus.park()?;
        Ok(bus)
    }

    /// Give back the GPIO and delay providers.
    pub fn release(self) -> (G, D) {
        (self.gpio, self.delay)
    }

    /// Pins in use.
    pub fn pins(&self) -> SpiPins {
        self.pins
    }

    fn park(&mut self) -> Result<(), TransportError> {
        let SpiPins { sck, sda, cs, dc } = self.pins;
        for pin in [Some(sck), Some(sda), cs, Some(dc)].into_iter().flatten() {
            self.gpio
                .configure_output(pin)
                .map_err(|_| TransportError::Pin)?;
        }
        self.set(sck, self.config.mode.clock_idle())?;
        self.set(sda, PinState::Low)?;
        if let Some(cs) = cs {
            self.set(cs, PinState::High)?;
        }
        self.set(dc, PinState::Low)
    }

    fn set(&mut self, pin: PinId, level: PinState) -> Result<(), TransportError> {
        self.gpio.write(pin, level).map_err(|_| TransportError::Pin)
    }

    fn half_period(&mut self) {
        let ns = self.config.half_period_ns();
        if ns > 0 {
            self.delay.delay_ns(ns);
        }
    }

    /// Clock one bit out on SDA.
    fn clock_out(&mut self, bit: bool) -> Result<(), TransportError> {
        let SpiPins { sck, sda, .. } = self.pins;
        let idle = self.config.mode.clock_idle();
        if self.config.mode.samples_on_trailing_edge() {
            self.set(sck, !idle)?;
            self.set(sda, PinState::from(bit))?;
        } else {
            self.set(sda, PinState::from(bit))?;
            self.set(sck, !idle)?;
        }
        self.half_period();
        self.set(sck, idle)?;
        self.half_period();
        Ok(())
    }

    /// Clock one bit in from SDA (already switched to input).
    fn clock_in(&mut self) -> Result<bool, TransportError> {
        let SpiPins { sck, sda, .. } = self.pins;
        let idle = self.config.mode.clock_idle();
        self.set(sck, !idle)?;
        let bit = if self.config.mode.samples_on_trailing_edge() {
            self.half_period();
            self.set(sck, idle)?;
            self.gpio.read(sda).map_err(|_| TransportError::Pin)?
        } else {
            let level = self.gpio.read(sda).map_err(|_| TransportError::Pin)?;
            self.half_period();
            self.set(sck, idle)?;
            level
        };
        self.half_period();
        Ok(bit.into())
    }
}

impl<G, D> Bus for SoftwareSpiBus<G, D>
where
    G: Gpio,
    D: DelayNs,
{
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        let order = self.config.bit_order;
        (0..8).try_for_each(|i| self.clock_out(order.bit(value, i)))
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        match self.pins.cs {
            Some(cs) => self.set(cs, PinState::Low),
            None => Ok(()),
        }
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        match self.pins.cs {
            Some(cs) => self.set(cs, PinState::High),
            None => Ok(()),
        }
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        self.set(self.pins.dc, PinState::from(mode.is_data()))
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let sda = self.pins.sda;
        let order = self.config.bit_order;
        self.gpio
            .configure_input(sda)
            .map_err(|_| TransportError::Pin)?;
        let result: Result<u8, TransportError> =
            (0..8).try_fold(0u8, |acc, i| Ok(order.accumulate(acc, self.clock_in()?, i)));
        let restored = self
            .gpio
            .configure_output(sda)
            .map_err(|_| TransportError::Pin);
        let byte = result?;
        restored?;
        Ok(byte)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
