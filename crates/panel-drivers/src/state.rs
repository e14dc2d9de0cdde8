//! Controller lifecycle
//!
//! ```text
//!                 init() ok
//! Uninitialized ───────────► Ready ◄──┐
//!       ▲                      │      │ op done (ok or err)
//!       │ init() err / deinit  │ op   │
//!       └──────────────────────┴─► Busy
//! ```
//!
//! `Busy` is held for the duration of one bus operation and restored on
//! every exit path.

use crate::error::DriverError;

/// Lifecycle of one controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerState {
    /// Not brought up yet, or bring-up failed
    #[default]
    Uninitialized,
    /// Accepts pixel and window operations
    Ready,
    /// An operation is in progress
    Busy,
}

impl ControllerState {
    /// `true` when pixel operations are accepted.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// `Ready → Busy` for one operation.
    pub fn acquire(&mut self) -> Result<(), DriverError> {
        match *self {
            Self::Ready => {
                *self = Self::Busy;
                Ok(())
            }
            Self::Busy => Err(DriverError::Busy),
            Self::Uninitialized => Err(DriverError::NotInitialized),
        }
    }

    /// `Busy → Ready` after an operation, whatever its outcome.
    pub fn release(&mut self) {
        if *self == Self::Busy {
            *self = Self::Ready;
        }
    }

    /// Enter bring-up. Allowed from `Uninitialized` and `Ready` (re-init).
    pub fn begin_init(&mut self) -> Result<(), DriverError> {
        if *self == Self::Busy {
            return Err(DriverError::Busy);
        }
        *self = Self::Busy;
        Ok(())
    }

    /// Leave bring-up: `Ready` on success, `Uninitialized` on failure.
    pub fn finish_init(&mut self, succeeded: bool) {
        *self = if succeeded {
            Self::Ready
        } else {
            Self::Uninitialized
        };
    }
}

/// Guard on the monochrome pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LockState {
    /// Flush is refused
    #[default]
    Locked,
    /// Flush is allowed
    Unlocked,
}
