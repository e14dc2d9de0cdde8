//! Bus Abstraction Layer for small display controllers
//!
//! This crate provides the transport each panel driver writes through: a
//! byte-level [`Bus`] trait with a data/command selector, and four
//! implementations of it selected at construction time.
//!
//! # Architecture Layers
//!
//! ```text
//! Panel drivers (panel-drivers crate: SSD1306, ST7789V)
//!         ↓
//! Bus trait (this crate - command/data tagging, chip-select scoping)
//!         ↓
//! Transports (bit-banged over Gpio, or embedded-hal SPI/I2C peripherals)
//!         ↓
//! Board HAL (GPIO registers, SPI/I2C peripherals)
//! ```
//!
//! # Transports
//!
//! - [`SoftwareSpiBus`] - bit-banged 4-wire SPI (3-wire read-back on SDA)
//! - [`HardwareSpiBus`] - [`embedded_hal::spi::SpiBus`] + CS/DC pins
//! - [`SoftwareI2cBus`] - bit-banged I2C master with control-byte tagging
//! - [`HardwareI2cBus`] - [`embedded_hal::i2c::I2c`] with control-byte tagging
//!
//! # Features
//!
//! - `std`: Enable the recording mocks in [`mocks`] (for testing)
//! - `defmt`: Enable defmt logging and `defmt::Format` derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{bus, Bus, DataMode, TransportError};
//!
//! fn column_set<B: Bus>(bus: &mut B) -> Result<(), TransportError> {
//!     bus::transaction(bus, DataMode::Command, |bus| bus.write_byte(0x2A))?;
//!     bus::transaction(bus, DataMode::Data, |bus| bus.write_bytes(&[0x00, 0x00, 0x00, 0xEF]))
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // accessors and builders
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod bus;
pub mod gpio;
pub mod peripheral;
pub mod transport;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export the bus contract
pub use bus::{transaction, Bus, DataMode, TransportError};

// Re-export GPIO types
pub use gpio::{Gpio, NoPin, PinId, PinState};

// Re-export peripheral types
pub use peripheral::{AddressMode, BitOrder, I2cConfig, SpiConfig, SpiMode};

// Re-export transports
pub use transport::{
    HardwareI2cBus, HardwareSpiBus, I2cPins, SoftwareI2cBus, SoftwareSpiBus, SpiPins,
};
