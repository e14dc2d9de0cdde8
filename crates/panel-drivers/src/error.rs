//! Driver error type

use platform::TransportError;

/// Errors returned by the panel drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// The transport failed outside of initialization.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// Bring-up aborted. `step` is the index of the failing init-table
    /// entry (the table length for the display-on command), `None` when the
    /// hardware reset failed.
    #[error("initialization failed at step {step:?}: {source}")]
    InitFailed {
        /// Failing step
        step: Option<usize>,
        /// Underlying transport failure
        source: TransportError,
    },
    /// Coordinates or window outside the panel.
    #[error("coordinates outside the panel")]
    Range,
    /// Controller is mid-operation, or the pixel buffer is locked.
    #[error("controller or pixel buffer busy")]
    Busy,
    /// Operation needs a successful `init()` first.
    #[error("controller not initialized")]
    NotInitialized,
    /// The device configuration cannot drive this controller.
    #[error("invalid device configuration")]
    InvalidConfig,
}
