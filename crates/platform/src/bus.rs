//! Byte-level bus contract shared by every transport
//!
//! A panel controller sees two kinds of bytes: command bytes and
//! parameter/pixel data. SPI controllers tell them apart with a dedicated D/C
//! line; I2C controllers with a leading control byte inside the transaction.
//! [`Bus`] hides that difference behind [`Bus::set_data_mode`].

/// How the controller interprets the bytes that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataMode {
    /// Register / command byte (D/C low, I2C control byte 0x00)
    Command,
    /// Parameter or pixel data (D/C high, I2C control byte 0x40)
    Data,
}

impl DataMode {
    /// `true` for [`DataMode::Data`].
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Data)
    }

    /// SSD1306-style I2C control byte (Co = 0, D/C# in bit 6).
    pub const fn i2c_control_byte(self) -> u8 {
        match self {
            Self::Command => 0x00,
            Self::Data => 0x40,
        }
    }
}

impl From<bool> for DataMode {
    fn from(is_data: bool) -> Self {
        if is_data {
            Self::Data
        } else {
            Self::Command
        }
    }
}

/// Errors raised by a transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// SPI/I2C peripheral failed to send or receive
    #[error("bus peripheral error")]
    Bus,
    /// GPIO operation failed
    #[error("GPIO error")]
    Pin,
    /// I2C device did not acknowledge
    #[error("device did not acknowledge")]
    Nack,
    /// The transport cannot perform this operation
    #[error("operation not supported by this transport")]
    Unsupported,
}

/// Transport a panel driver writes through.
///
/// All operations are blocking. Implementations must put bytes on the wire
/// MSB first and send words high byte first.
pub trait Bus {
    /// Send one byte in the current [`DataMode`].
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError>;

    /// Send a 16-bit word, high byte then low byte.
    fn write_word(&mut self, value: u16) -> Result<(), TransportError> {
        let [high, low] = value.to_be_bytes();
        self.write_byte(high)?;
        self.write_byte(low)
    }

    /// Send a run of bytes in the current [`DataMode`].
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        bytes.iter().try_for_each(|&b| self.write_byte(b))
    }

    /// Open a transaction (CS low / I2C START + address).
    fn assert_select(&mut self) -> Result<(), TransportError>;

    /// Close the transaction (CS high / I2C STOP).
    fn deassert_select(&mut self) -> Result<(), TransportError>;

    /// Tag the following bytes as command or data.
    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError>;

    /// Clock one byte in from the controller.
    fn read_byte(&mut self) -> Result<u8, TransportError>;

    /// Block for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

impl<B: Bus + ?Sized> Bus for &mut B {
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        B::write_byte(self, value)
    }

    fn write_word(&mut self, value: u16) -> Result<(), TransportError> {
        B::write_word(self, value)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        B::write_bytes(self, bytes)
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        B::assert_select(self)
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        B::deassert_select(self)
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        B::set_data_mode(self, mode)
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        B::read_byte(self)
    }

    fn delay_us(&mut self, us: u32) {
        B::delay_us(self, us);
    }
}

/// Run `op` inside one select-asserted transaction tagged with `mode`.
///
/// The select line is released on every exit path. When both `op` and the
/// release fail, the error from `op` is returned.
pub fn transaction<B, R, F>(bus: &mut B, mode: DataMode, op: F) -> Result<R, TransportError>
where
    B: Bus + ?Sized,
    F: FnOnce(&mut B) -> Result<R, TransportError>,
{
    bus.assert_select()?;
    let result = bus.set_data_mode(mode).and_then(|()| op(bus));
    let released = bus.deassert_select();
    let value = result?;
    released?;
    Ok(value)
}
