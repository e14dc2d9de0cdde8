//! GPIO pin collaborator
//!
//! The bit-banged transports address pins by number, the way a board
//! configuration names them, and need to flip the shared SDA line between
//! output and input for read-back and I2C acknowledge bits.
//! `embedded_hal::digital` has no direction switching, hence [`Gpio`].

use core::convert::Infallible;

/// Board-level pin number.
pub type PinId = u8;

/// Pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    /// High (logic 1)
    High,
    /// Low (logic 0)
    Low,
}

impl From<bool> for PinState {
    fn from(value: bool) -> Self {
        if value {
            Self::High
        } else {
            Self::Low
        }
    }
}

impl From<PinState> for bool {
    fn from(value: PinState) -> Self {
        matches!(value, PinState::High)
    }
}

impl core::ops::Not for PinState {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::High => Self::Low,
            Self::Low => Self::High,
        }
    }
}

/// Pin-number addressed GPIO access.
pub trait Gpio {
    /// Error type
    type Error: core::fmt::Debug;

    /// Switch `pin` to push-pull output.
    fn configure_output(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Switch `pin` to input.
    fn configure_input(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Drive an output pin.
    fn write(&mut self, pin: PinId, level: PinState) -> Result<(), Self::Error>;

    /// Sample an input pin.
    fn read(&mut self, pin: PinId) -> Result<PinState, Self::Error>;
}

impl<G: Gpio + ?Sized> Gpio for &mut G {
    type Error = G::Error;

    fn configure_output(&mut self, pin: PinId) -> Result<(), Self::Error> {
        G::configure_output(self, pin)
    }

    fn configure_input(&mut self, pin: PinId) -> Result<(), Self::Error> {
        G::configure_input(self, pin)
    }

    fn write(&mut self, pin: PinId, level: PinState) -> Result<(), Self::Error> {
        G::write(self, pin, level)
    }

    fn read(&mut self, pin: PinId) -> Result<PinState, Self::Error> {
        G::read(self, pin)
    }
}

/// Placeholder for an output line that is not wired (reset, chip-select).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPin;

impl embedded_hal::digital::ErrorType for NoPin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_state_conversions() {
        assert_eq!(PinState::from(true), PinState::High);
        assert!(!bool::from(PinState::Low));
        assert_eq!(!PinState::High, PinState::Low);
    }
}
