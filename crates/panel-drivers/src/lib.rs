//! Panel controller drivers
//!
//! Drivers for two small display controllers, both written against the
//! [`platform::Bus`] transport so the same driver runs over a bit-banged or
//! a peripheral-backed bus:
//!
//! | Driver        | Panel                     | Bus         | Pixel path                |
//! |---------------|---------------------------|-------------|---------------------------|
//! | [`Ssd1306`]   | 128×64 / 128×32 mono OLED | I2C         | page buffer + [`Ssd1306::flush`] |
//! | [`St7789v`]   | 240×135 RGB565 TFT        | 4-wire SPI  | direct window writes      |
//!
//! # Bring-up
//!
//! Both controllers start with a hardware reset (when a reset line is wired)
//! and then replay a static init table through the shared
//! [`sequencer`]: command byte, parameter bytes, then the entry's delay.
//! The controller is marked [`ControllerState::Ready`] only after the final
//! display-on command went out.
//!
//! # Example
//!
//! ```no_run
//! use embedded_hal::delay::DelayNs;
//! use panel_drivers::{DeviceConfig, DriverError, St7789v};
//! use platform::{Gpio, NoPin, SoftwareSpiBus};
//!
//! fn bring_up<G: Gpio, D: DelayNs>(gpio: G, delay: D) -> Result<(), DriverError> {
//!     let config = DeviceConfig::st7789v_software_spi(18, 23, 5, 16, None);
//!     let pins = config.spi_pins().ok_or(DriverError::InvalidConfig)?;
//!     let bus = SoftwareSpiBus::new(gpio, delay, pins, config.spi)?;
//!     let mut panel = St7789v::new(bus, None::<NoPin>, config)?;
//!     panel.init()?;
//!     panel.clear_screen(0x0000)?;
//!     panel.put_pixel(0, 0, 0xFFFF)
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

pub mod config;
pub mod error;
pub mod sequencer;
pub mod ssd1306;
pub mod st7789v;
pub mod state;
pub mod window;

// Re-export configuration
pub use config::{ColorDepth, DeviceConfig, InterfaceKind, PinAssignment};

// Re-export errors and state
pub use error::DriverError;
pub use state::{ControllerState, LockState};

// Re-export the protocol layer
pub use sequencer::{CommandEntry, CommandProtocol, Delay, InitTable};
pub use window::AddressWindow;

// Re-export drivers
pub use ssd1306::{PixelBuffer, Ssd1306};
pub use st7789v::St7789v;
