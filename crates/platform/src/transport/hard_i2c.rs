//! I2C peripheral transport
//!
//! Bytes are staged in a fixed chunk whose first byte is the control byte
//! for the current [`DataMode`]. The chunk goes out as one
//! `I2c::write(address, ..)` when it fills up, when the mode changes, or when
//! the transaction closes, so a 128-byte SSD1306 page costs four bus writes.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use heapless::Vec;

use crate::bus::{Bus, DataMode, TransportError};
use crate::peripheral::{AddressMode, I2cConfig};

/// Bytes per bus write: one control byte plus 32 payload bytes.
pub const I2C_CHUNK_CAPACITY: usize = 33;

/// Hardware I2C transport.
pub struct HardwareI2cBus<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    mode: DataMode,
    chunk: Vec<u8, I2C_CHUNK_CAPACITY>,
}

impl<I2C, D> HardwareI2cBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Wrap a configured peripheral. Only 7-bit addressing is supported.
    pub fn new(i2c: I2C, delay: D, config: I2cConfig) -> Result<Self, TransportError> {
        if config.address_mode == AddressMode::TenBit {
            return Err(TransportError::Unsupported);
        }
        Ok(Self {
            i2c,
            delay,
            address: config.address,
            mode: DataMode::Command,
            chunk: Vec::new(),
        })
    }

    /// Give back the peripheral and delay.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Send the staged chunk, if it carries any payload.
    fn flush_chunk(&mut self) -> Result<(), TransportError> {
        let result = if self.chunk.len() > 1 {
            self.i2c
                .write(self.address, &self.chunk)
                .map_err(|e| map_error(e.kind()))
        } else {
            Ok(())
        };
        self.chunk.clear();
        result
    }
}

fn map_error(kind: ErrorKind) -> TransportError {
    match kind {
        ErrorKind::NoAcknowledge(_) => TransportError::Nack,
        _ => TransportError::Bus,
    }
}

impl<I2C, D> Bus for HardwareI2cBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        if self.chunk.is_full() {
            self.flush_chunk()?;
        }
        if self.chunk.is_empty() {
            self.chunk
                .push(self.mode.i2c_control_byte())
                .map_err(|_| TransportError::Bus)?;
        }
        self.chunk.push(value).map_err(|_| TransportError::Bus)
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        self.chunk.clear();
        Ok(())
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        self.flush_chunk()
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        if mode != self.mode {
            self.flush_chunk()?;
            self.mode = mode;
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        Err(TransportError::Unsupported)
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
    use embedded_hal::i2c::NoAcknowledgeSource;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    use std::vec::Vec as StdVec;

    const ADDR: u8 = 0x3C;

    fn bus(expectations: &[I2cTransaction]) -> HardwareI2cBus<I2cMock, NoopDelay> {
        HardwareI2cBus::new(I2cMock::new(expectations), NoopDelay, I2cConfig::DEFAULT).unwrap()
    }

    fn finish(bus: HardwareI2cBus<I2cMock, NoopDelay>) {
        let (mut i2c, _) = bus.release();
        i2c.done();
    }

    #[test]
    fn test_command_transaction_is_one_write() {
        let mut i2c = bus(&[I2cTransaction::write(ADDR, vec![0x00, 0xAE, 0xD5, 0x80])]);
        transaction(&mut i2c, DataMode::Command, |b| b.write_bytes(&[0xAE, 0xD5, 0x80])).unwrap();
        finish(i2c);
    }

    #[test]
    fn test_page_is_split_into_chunks() {
        let page: StdVec<u8> = (0u8..128).collect();
        let expectations: StdVec<I2cTransaction> = page
            .chunks(I2C_CHUNK_CAPACITY - 1)
            .map(|payload| {
                let mut bytes = vec![0x40];
                bytes.extend_from_slice(payload);
                I2cTransaction::write(ADDR, bytes)
            })
            .collect();
        assert_eq!(expectations.len(), 4);

        let mut i2c = bus(&expectations);
        transaction(&mut i2c, DataMode::Data, |b| b.write_bytes(&page)).unwrap();
        finish(i2c);
    }

    #[test]
    fn test_mode_change_flushes() {
        let mut i2c = bus(&[
            I2cTransaction::write(ADDR, vec![0x00, 0xB0]),
            I2cTransaction::write(ADDR, vec![0x40, 0x55, 0xAA]),
        ]);
        transaction(&mut i2c, DataMode::Command, |b| {
            b.write_byte(0xB0)?;
            b.set_data_mode(DataMode::Data)?;
            b.write_bytes(&[0x55, 0xAA])
        })
        .unwrap();
        finish(i2c);
    }

    #[test]
    fn test_empty_transaction_sends_nothing() {
        let mut i2c = bus(&[]);
        transaction(&mut i2c, DataMode::Data, |_| Ok(())).unwrap();
        finish(i2c);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            map_error(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            TransportError::Nack
        );
        assert_eq!(map_error(ErrorKind::ArbitrationLoss), TransportError::Bus);
    }

    #[test]
    fn test_peripheral_failure_surfaces_on_close() {
        let mut i2c =
            bus(&[I2cTransaction::write(ADDR, vec![0x00, 0xAF]).with_error(ErrorKind::Other)]);
        let result = transaction(&mut i2c, DataMode::Command, |b| b.write_byte(0xAF));
        assert_eq!(result, Err(TransportError::Bus));
        finish(i2c);
    }

    #[test]
    fn test_read_is_unsupported() {
        let mut i2c = bus(&[]);
        assert_eq!(i2c.read_byte(), Err(TransportError::Unsupported));
        finish(i2c);
    }
}
