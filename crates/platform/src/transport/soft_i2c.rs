//! Bit-banged I2C master (write-only)
//!
//! One transaction is START, the 7-bit address with R/W = 0, one control
//! byte tagging the payload as command (0x00) or data (0x40), the payload,
//! then STOP. Every byte is followed by an acknowledge clock with SDA
//! released; a high SDA on that clock is a NACK.
//!
//! The control byte is emitted lazily in front of the first payload byte so
//! that a mode switch right after START costs nothing. Switching mode after
//! payload has gone out closes the transaction and opens a fresh one.

use embedded_hal::delay::DelayNs;

use crate::bus::{Bus, DataMode, TransportError};
use crate::gpio::{Gpio, PinId, PinState};
use crate::peripheral::{AddressMode, BitOrder, I2cConfig};

/// Pins used by [`SoftwareI2cBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cPins {
    /// Serial clock
    pub scl: PinId,
    /// Serial data
    pub sda: PinId,
}

/// Software I2C transport.
pub struct SoftwareI2cBus<G, D> {
    gpio: G,
    delay: D,
    pins: I2cPins,
    config: I2cConfig,
    mode: DataMode,
    in_transaction: bool,
    control_sent: bool,
}

impl<G, D> SoftwareI2cBus<G, D>
where
    G: Gpio,
    D: DelayNs,
{
    /// Configure SCL/SDA as outputs and release both lines high.
    ///
    /// 10-bit addressing is not implemented and yields
    /// [`TransportError::Unsupported`].
    pub fn new(gpio: G, delay: D, pins: I2cPins, config: I2cConfig) -> Result<Self, TransportError> {
        if config.address_mode == AddressMode::TenBit {
            return Err(TransportError::Unsupported);
        }
        let mut bus = Self {
            gpio,
            delay,
            pins,
            config,
            mode: DataMode::Command,
            in_transaction: false,
            control_sent: false,
        };
        for pin in [pins.scl, pins.sda] {
            bus.gpio
                .configure_output(pin)
                .map_err(|_| TransportError::Pin)?;
        }
        bus.set(pins.sda, PinState::High)?;
        bus.set(pins.scl, PinState::High)?;
        Ok(bus)
    }

    /// Give back the GPIO and delay providers.
    pub fn release(self) -> (G, D) {
        (self.gpio, self.delay)
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

    /// SDA falls while SCL is high.
    fn start(&mut self) -> Result<(), TransportError> {
        let I2cPins { scl, sda } = self.pins;
        self.set(sda, PinState::High)?;
        self.set(scl, PinState::High)?;
        self.half_period();
        self.set(sda, PinState::Low)?;
        self.half_period();
        self.set(scl, PinState::Low)
    }

    /// SDA rises while SCL is high.
    fn stop(&mut self) -> Result<(), TransportError> {
        let I2cPins { scl, sda } = self.pins;
        self.set(sda, PinState::Low)?;
        self.half_period();
        self.set(scl, PinState::High)?;
        self.half_period();
        self.set(sda, PinState::High)?;
        self.half_period();
        Ok(())
    }

    /// Clock out eight bits MSB first, then sample the acknowledge bit.
    fn shift_out(&mut self, value: u8) -> Result<(), TransportError> {
        let I2cPins { scl, sda } = self.pins;
        for index in 0..8 {
            let bit = BitOrder::MsbFirst.bit(value, index);
            self.set(sda, PinState::from(bit))?;
            self.half_period();
            self.set(scl, PinState::High)?;
            self.half_period();
            self.set(scl, PinState::Low)?;
        }

        self.gpio
            .configure_input(sda)
            .map_err(|_| TransportError::Pin)?;
        self.half_period();
        let sampled = self
            .set(scl, PinState::High)
            .and_then(|()| self.gpio.read(sda).map_err(|_| TransportError::Pin));
        self.half_period();
        let lowered = self.set(scl, PinState::Low);
        let restored = self
            .gpio
            .configure_output(sda)
            .map_err(|_| TransportError::Pin);
        let ack = sampled?;
        lowered?;
        restored?;

        match ack {
            PinState::Low => Ok(()),
            PinState::High => Err(TransportError::Nack),
        }
    }

    /// START + address byte. A NACK on the address releases the bus.
    fn open(&mut self) -> Result<(), TransportError> {
        self.start()?;
        let address = self.config.address.wrapping_shl(1);
        match self.shift_out(address) {
            Err(TransportError::Nack) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("i2c: no ACK from address {=u8:#x}", self.config.address);
                self.stop()?;
                Err(TransportError::Nack)
            }
            other => other,
        }
    }
}

impl<G, D> Bus for SoftwareI2cBus<G, D>
where
    G: Gpio,
    D: DelayNs,
{
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        if !self.control_sent {
            self.shift_out(self.mode.i2c_control_byte())?;
            self.control_sent = true;
        }
        self.shift_out(value)
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        self.open()?;
        self.in_transaction = true;
        self.control_sent = false;
        Ok(())
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.control_sent = false;
        self.stop()
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        if mode != self.mode && self.in_transaction && self.control_sent {
            self.in_transaction = false;
            self.control_sent = false;
            self.stop()?;
            self.open()?;
            self.in_transaction = true;
        }
        self.mode = mode;
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        Err(TransportError::Unsupported)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}
