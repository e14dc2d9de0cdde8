//! [`Bus`](crate::Bus) implementations
//!
//! | Transport          | Wire            | Command/data tag      |
//! |--------------------|-----------------|-----------------------|
//! | [`SoftwareSpiBus`] | GPIO bit-bang   | D/C pin               |
//! | [`HardwareSpiBus`] | `SpiBus`        | D/C pin               |
//! | [`SoftwareI2cBus`] | GPIO bit-bang   | control byte 0x00/0x40 |
//! | [`HardwareI2cBus`] | `I2c`           | control byte 0x00/0x40 |
//!
//! A software and a hardware transport configured alike put identical byte
//! sequences on the wire.

mod hard_i2c;
mod hard_spi;
mod soft_i2c;
mod soft_spi;

pub use hard_i2c::{HardwareI2cBus, I2C_CHUNK_CAPACITY};
pub use hard_spi::HardwareSpiBus;
pub use soft_i2c::{I2cPins, SoftwareI2cBus};
pub use soft_spi::{SoftwareSpiBus, SpiPins};
