//! Init-table sequencer
//!
//! A controller is brought up by replaying a static table of
//! [`CommandEntry`]s: the command byte, its parameter bytes, then the
//! entry's delay, strictly in that order. Controllers differ only in how
//! parameters are tagged on the bus and in the final display-on command,
//! which [`CommandProtocol`] captures.

use embedded_hal::digital::OutputPin;
use platform::{transaction, Bus, DataMode, TransportError};

use crate::error::DriverError;

/// Reset line hold time, low and high phases (µs).
pub const RESET_HOLD_US: u32 = 10_000;

/// Wait after one init-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Delay {
    /// Milliseconds
    pub ms: u16,
    /// Additional microseconds
    pub us: u16,
}

impl Delay {
    /// No wait.
    pub const NONE: Self = Self { ms: 0, us: 0 };

    /// `ms` milliseconds.
    pub const fn ms(ms: u16) -> Self {
        Self { ms, us: 0 }
    }

    /// Total wait in microseconds: `ms * 1000 + us`.
    pub const fn total_us(self) -> u32 {
        (self.ms as u32).saturating_mul(1000).saturating_add(self.us as u32)
    }
}

/// One command of an init table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandEntry {
    /// Command byte
    pub command: u8,
    /// Parameter bytes, sent in order after the command
    pub params: &'static [u8],
    /// Wait applied after the last parameter
    pub delay: Delay,
}

impl CommandEntry {
    /// Command with parameters and no wait.
    pub const fn new(command: u8, params: &'static [u8]) -> Self {
        Self {
            command,
            params,
            delay: Delay::NONE,
        }
    }

    /// Command without parameters.
    pub const fn bare(command: u8) -> Self {
        Self::new(command, &[])
    }

    /// Same entry, waiting `ms` afterwards.
    #[must_use]
    pub const fn delay_ms(mut self, ms: u16) -> Self {
        self.delay.ms = ms;
        self
    }

    /// Same entry, waiting an extra `us` afterwards.
    #[must_use]
    pub const fn delay_us(mut self, us: u16) -> Self {
        self.delay.us = us;
        self
    }
}

/// Ordered, static bring-up table for one panel SKU.
pub type InitTable = &'static [CommandEntry];

/// How a controller expects commands on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandProtocol {
    /// Tag for parameter bytes: [`DataMode::Data`] for MIPI-DCS style
    /// controllers (ST7789V), [`DataMode::Command`] when parameters travel
    /// in the command stream (SSD1306).
    pub parameter_mode: DataMode,
    /// Command issued after the table to switch the panel on.
    pub display_on: u8,
}

/// Send one command and its parameters.
///
/// Command-stream parameters share the command's transaction. Data-tagged
/// parameters go out in a second transaction with D/C high.
pub fn send_command<B: Bus + ?Sized>(
    bus: &mut B,
    protocol: &CommandProtocol,
    command: u8,
    params: &[u8],
) -> Result<(), TransportError> {
    match protocol.parameter_mode {
        DataMode::Command => transaction(bus, DataMode::Command, |b| {
            b.write_byte(command)?;
            b.write_bytes(params)
        }),
        DataMode::Data => {
            transaction(bus, DataMode::Command, |b| b.write_byte(command))?;
            if params.is_empty() {
                return Ok(());
            }
            transaction(bus, DataMode::Data, |b| b.write_bytes(params))
        }
    }
}

/// Pulse the reset line: low for [`RESET_HOLD_US`], then high for
/// [`RESET_HOLD_US`].
pub fn hardware_reset<B, RST>(bus: &mut B, reset: &mut RST) -> Result<(), TransportError>
where
    B: Bus + ?Sized,
    RST: OutputPin,
{
    reset.set_low().map_err(|_| TransportError::Pin)?;
    bus.delay_us(RESET_HOLD_US);
    reset.set_high().map_err(|_| TransportError::Pin)?;
    bus.delay_us(RESET_HOLD_US);
    Ok(())
}

/// Replay `table`, then send the display-on command.
///
/// Stops at the first transport failure and reports the index of the
/// failing entry; the display-on command counts as step `table.len()`.
pub fn run<B: Bus + ?Sized>(
    bus: &mut B,
    table: &[CommandEntry],
    protocol: &CommandProtocol,
) -> Result<(), DriverError> {
    for (step, entry) in table.iter().enumerate() {
        send_command(bus, protocol, entry.command, entry.params).map_err(|source| {
            #[cfg(feature = "defmt")]
            defmt::warn!("init: command {=u8:#x} failed at step {=usize}", entry.command, step);
            DriverError::InitFailed {
                step: Some(step),
                source,
            }
        })?;
        let wait = entry.delay.total_us();
        if wait > 0 {
            bus.delay_us(wait);
        }
    }
    send_command(bus, protocol, protocol.display_on, &[]).map_err(|source| {
        DriverError::InitFailed {
            step: Some(table.len()),
            source,
        }
    })
}

/// Full bring-up: optional hardware reset, then [`run`].
pub fn initialize<B, RST>(
    bus: &mut B,
    reset: Option<&mut RST>,
    table: &[CommandEntry],
    protocol: &CommandProtocol,
) -> Result<(), DriverError>
where
    B: Bus + ?Sized,
    RST: OutputPin,
{
    #[cfg(feature = "defmt")]
    defmt::debug!("init: {=usize} table entries", table.len());

    if let Some(reset) = reset {
        hardware_reset(bus, reset)
            .map_err(|source| DriverError::InitFailed { step: None, source })?;
    }
    run(bus, table, protocol)
}
