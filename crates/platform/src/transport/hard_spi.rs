//! SPI peripheral transport
//!
//! Wraps an `embedded_hal::spi::SpiBus` plus the CS and D/C output pins. The
//! peripheral is expected to be configured by the HAL with the same
//! [`SpiConfig`](crate::SpiConfig) the board would hand the bit-banged
//! transport.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::bus::{Bus, DataMode, TransportError};

/// Hardware SPI transport.
pub struct HardwareSpiBus<SPI, CS, DC, D> {
    spi: SPI,
    cs: CS,
    dc: DC,
    delay: D,
}

impl<SPI, CS, DC, D> HardwareSpiBus<SPI, CS, DC, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the peripheral and park CS high, D/C low.
    pub fn new(spi: SPI, mut cs: CS, mut dc: DC, delay: D) -> Result<Self, TransportError> {
        cs.set_high().map_err(|_| TransportError::Pin)?;
        dc.set_low().map_err(|_| TransportError::Pin)?;
        Ok(Self { spi, cs, dc, delay })
    }

    /// Give back the peripheral, pins and delay.
    pub fn release(self) -> (SPI, CS, DC, D) {
        (self.spi, self.cs, self.dc, self.delay)
    }
}

impl<SPI, CS, DC, D> Bus for HardwareSpiBus<SPI, CS, DC, D>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
    DC: OutputPin,
    D: DelayNs,
{
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        self.spi.write(&[value]).map_err(|_| TransportError::Bus)
    }

    fn write_word(&mut self, value: u16) -> Result<(), TransportError> {
        self.spi
            .write(&value.to_be_bytes())
            .map_err(|_| TransportError::Bus)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.spi.write(bytes).map_err(|_| TransportError::Bus)
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        self.cs.set_low().map_err(|_| TransportError::Pin)
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        // CS must not rise while the last byte is still shifting out
        let flushed = self.spi.flush().map_err(|_| TransportError::Bus);
        self.cs.set_high().map_err(|_| TransportError::Pin)?;
        flushed
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        if mode.is_data() {
            self.dc.set_high()
        } else {
            self.dc.set_low()
        }
        .map_err(|_| TransportError::Pin)
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let mut buf = [0u8; 1];
        self.spi.read(&mut buf).map_err(|_| TransportError::Bus)?;
        let [byte] = buf;
        Ok(byte)
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::bus::transaction;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};
    use std::vec;

    type TestBus = HardwareSpiBus<SpiMock<u8>, PinMock, PinMock, NoopDelay>;

    fn finish(bus: TestBus) {
        let (mut spi, mut cs, mut dc, _) = bus.release();
        spi.done();
        cs.done();
        dc.done();
    }

    #[test]
    fn test_command_then_parameters() {
        let spi = SpiMock::new(&[
            SpiTransaction::write(0x2A),
            SpiTransaction::flush(),
            SpiTransaction::write_vec(vec![0x00, 0x00, 0x00, 0xEF]),
            SpiTransaction::flush(),
        ]);
        let cs = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let dc = PinMock::new(&[
            PinTransaction::set(State::Low),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ]);
        let mut bus = HardwareSpiBus::new(spi, cs, dc, NoopDelay).unwrap();
        transaction(&mut bus, DataMode::Command, |b| b.write_byte(0x2A)).unwrap();
        transaction(&mut bus, DataMode::Data, |b| b.write_bytes(&[0x00, 0x00, 0x00, 0xEF])).unwrap();
        finish(bus);
    }

    #[test]
    fn test_word_is_big_endian() {
        let spi = SpiMock::new(&[SpiTransaction::write_vec(vec![0xF8, 0x00])]);
        let cs = PinMock::new(&[PinTransaction::set(State::High)]);
        let dc = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut bus = HardwareSpiBus::new(spi, cs, dc, NoopDelay).unwrap();
        bus.write_word(0xF800).unwrap();
        finish(bus);
    }

    #[test]
    fn test_read_byte() {
        let spi = SpiMock::new(&[SpiTransaction::read(0x85)]);
        let cs = PinMock::new(&[PinTransaction::set(State::High)]);
        let dc = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut bus = HardwareSpiBus::new(spi, cs, dc, NoopDelay).unwrap();
        assert_eq!(bus.read_byte().unwrap(), 0x85);
        finish(bus);
    }

    #[test]
    fn test_select_pin_error_maps_to_pin() {
        use embedded_hal_mock::eh1::MockError;
        use std::io::ErrorKind;

        let spi = SpiMock::new(&[]);
        let cs = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low).with_error(MockError::Io(ErrorKind::NotConnected)),
        ]);
        let dc = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut bus = HardwareSpiBus::new(spi, cs, dc, NoopDelay).unwrap();
        let result = transaction(&mut bus, DataMode::Command, |b| b.write_byte(0x01));
        assert_eq!(result, Err(TransportError::Pin));
        finish(bus);
    }
}
