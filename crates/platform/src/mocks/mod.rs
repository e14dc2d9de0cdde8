//! Recording test doubles
//!
//! [`MockBus`] records the byte-level [`Bus`] traffic a driver produces.
//! [`MockGpio`] records pin-level traffic from the bit-banged transports and
//! can decode it back into SPI or I2C bytes.
//!
//! Only compiled for tests or with the `std` feature.

#![allow(clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::collections::VecDeque;
use std::vec::Vec;

use crate::bus::{Bus, DataMode, TransportError};
use crate::gpio::{Gpio, PinId, PinState};
use crate::peripheral::SpiConfig;
use crate::transport::{I2cPins, SpiPins};

// ---------------------------------------------------------------------------
// MockBus
// ---------------------------------------------------------------------------

/// One recorded [`Bus`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// `assert_select`
    Select,
    /// `deassert_select`
    Deselect,
    /// `set_data_mode`
    Mode(DataMode),
    /// One byte written
    Write(u8),
    /// One byte read
    Read(u8),
    /// `delay_us`
    Delay(u32),
}

/// In-memory [`Bus`] that records every call.
#[derive(Debug, Default)]
pub struct MockBus {
    events: Vec<BusEvent>,
    reads: VecDeque<u8>,
    writes_left: Option<usize>,
    selected: bool,
    mode: Option<DataMode>,
}

impl MockBus {
    /// Empty recorder, never fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes returned by `read_byte` (0x00 once exhausted).
    #[must_use]
    pub fn with_read_responses(mut self, bytes: &[u8]) -> Self {
        self.reads.extend(bytes.iter().copied());
        self
    }

    /// Let `n` writes succeed, then fail every further write with
    /// [`TransportError::Bus`].
    #[must_use]
    pub fn fail_after(mut self, n: usize) -> Self {
        self.writes_left = Some(n);
        self
    }

    /// Everything recorded so far.
    pub fn events(&self) -> &[BusEvent] {
        &self.events
    }

    /// Forget recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// All written bytes regardless of mode.
    pub fn written(&self) -> Vec<u8> {
        self.wire().into_iter().map(|(_, b)| b).collect()
    }

    /// Bytes written in command mode.
    pub fn commands(&self) -> Vec<u8> {
        self.filtered(DataMode::Command)
    }

    /// Bytes written in data mode.
    pub fn data(&self) -> Vec<u8> {
        self.filtered(DataMode::Data)
    }

    /// Written bytes tagged with the mode active at the time.
    pub fn wire(&self) -> Vec<(DataMode, u8)> {
        let mut mode = DataMode::Command;
        let mut out = Vec::new();
        for event in &self.events {
            match *event {
                BusEvent::Mode(m) => mode = m,
                BusEvent::Write(b) => out.push((mode, b)),
                _ => {}
            }
        }
        out
    }

    /// Sum of all requested delays.
    pub fn total_delay_us(&self) -> u64 {
        self.events
            .iter()
            .map(|e| match e {
                BusEvent::Delay(us) => u64::from(*us),
                _ => 0,
            })
            .sum()
    }

    /// `true` between `assert_select` and `deassert_select`.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Mode set by the last `set_data_mode`.
    pub fn mode(&self) -> Option<DataMode> {
        self.mode
    }

    fn filtered(&self, mode: DataMode) -> Vec<u8> {
        self.wire()
            .into_iter()
            .filter(|(m, _)| *m == mode)
            .map(|(_, b)| b)
            .collect()
    }
}

impl Bus for MockBus {
    fn write_byte(&mut self, value: u8) -> Result<(), TransportError> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(TransportError::Bus);
            }
            *left -= 1;
        }
        self.events.push(BusEvent::Write(value));
        Ok(())
    }

    fn assert_select(&mut self) -> Result<(), TransportError> {
        self.selected = true;
        self.events.push(BusEvent::Select);
        Ok(())
    }

    fn deassert_select(&mut self) -> Result<(), TransportError> {
        self.selected = false;
        self.events.push(BusEvent::Deselect);
        Ok(())
    }

    fn set_data_mode(&mut self, mode: DataMode) -> Result<(), TransportError> {
        self.mode = Some(mode);
        self.events.push(BusEvent::Mode(mode));
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, TransportError> {
        let byte = self.reads.pop_front().unwrap_or(0);
        self.events.push(BusEvent::Read(byte));
        Ok(byte)
    }

    fn delay_us(&mut self, us: u32) {
        self.events.push(BusEvent::Delay(us));
    }
}

// ---------------------------------------------------------------------------
// MockGpio
// ---------------------------------------------------------------------------

/// One recorded [`Gpio`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinEvent {
    /// Pin switched to output
    Output(PinId),
    /// Pin switched to input
    Input(PinId),
    /// Output driven
    Write(PinId, PinState),
    /// Input sampled
    Read(PinId, PinState),
}

/// Error returned by a failing [`MockGpio`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPinError;

const PIN_COUNT: usize = 256;

/// In-memory [`Gpio`] that records every call.
#[derive(Debug)]
pub struct MockGpio {
    events: Vec<PinEvent>,
    inputs: VecDeque<PinState>,
    ops_left: Option<usize>,
    levels: [Option<PinState>; PIN_COUNT],
    outputs: [bool; PIN_COUNT],
}

impl Default for MockGpio {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            inputs: VecDeque::new(),
            ops_left: None,
            levels: [None; PIN_COUNT],
            outputs: [false; PIN_COUNT],
        }
    }
}

impl MockGpio {
    /// Recorder whose inputs read low (I2C ACK) unless scripted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels returned by successive `read` calls.
    #[must_use]
    pub fn with_inputs(mut self, levels: &[PinState]) -> Self {
        self.inputs.extend(levels.iter().copied());
        self
    }

    /// Let `n` configure/write calls succeed, then fail.
    #[must_use]
    pub fn fail_after(mut self, n: usize) -> Self {
        self.ops_left = Some(n);
        self
    }

    /// Everything recorded so far.
    pub fn events(&self) -> &[PinEvent] {
        &self.events
    }

    /// Forget recorded events. Pin levels and directions are kept.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Last level driven on `pin`.
    pub fn level(&self, pin: PinId) -> Option<PinState> {
        self.levels[usize::from(pin)]
    }

    /// `true` when `pin` is currently an output.
    pub fn is_output(&self, pin: PinId) -> bool {
        self.outputs[usize::from(pin)]
    }

    /// Decode recorded traffic as SPI.
    ///
    /// SDA is sampled on each sampling edge of SCK while CS is low and SDA
    /// is an output; every eight bits form a byte tagged by the D/C level.
    pub fn decode_spi(&self, pins: &SpiPins, config: &SpiConfig) -> Vec<(DataMode, u8)> {
        let idle = config.mode.clock_idle();
        let sample_level = if config.mode.samples_on_trailing_edge() {
            idle
        } else {
            !idle
        };
        let mut levels: [Option<PinState>; PIN_COUNT] = [None; PIN_COUNT];
        let mut sda_output = true;
        let (mut acc, mut count) = (0u8, 0u32);
        let mut out = Vec::new();

        for event in &self.events {
            match *event {
                PinEvent::Output(pin) if pin == pins.sda => sda_output = true,
                PinEvent::Input(pin) if pin == pins.sda => sda_output = false,
                PinEvent::Write(pin, level) => {
                    let previous = levels[usize::from(pin)];
                    levels[usize::from(pin)] = Some(level);
                    // a pin's first write is not an edge
                    let edge = previous == Some(!level);
                    let selected = pins
                        .cs
                        .map_or(true, |cs| levels[usize::from(cs)] == Some(PinState::Low));
                    if pin == pins.sck && edge && level == sample_level && selected && sda_output {
                        let bit = levels[usize::from(pins.sda)].is_some_and(bool::from);
                        acc = config.bit_order.accumulate(acc, bit, count);
                        count += 1;
                        if count == 8 {
                            let dc = levels[usize::from(pins.dc)].is_some_and(bool::from);
                            out.push((DataMode::from(dc), acc));
                            acc = 0;
                            count = 0;
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Decode recorded traffic as I2C write transactions.
    ///
    /// Each START..STOP span yields its bytes (address byte first); the
    /// ninth clock of every byte is the acknowledge slot and is skipped.
    pub fn decode_i2c(&self, pins: &I2cPins) -> Vec<Vec<u8>> {
        let mut scl = PinState::High;
        let mut sda = PinState::High;
        let mut current: Option<Vec<u8>> = None;
        let (mut acc, mut count) = (0u8, 0u32);
        let mut out = Vec::new();

        for event in &self.events {
            let PinEvent::Write(pin, level) = *event else {
                continue;
            };
            if pin == pins.sda {
                let previous = sda;
                sda = level;
                if scl == PinState::High && previous != level {
                    if level == PinState::Low {
                        current = Some(Vec::new());
                        acc = 0;
                        count = 0;
                    } else if let Some(bytes) = current.take() {
                        out.push(bytes);
                    }
                }
            } else if pin == pins.scl {
                let rising = scl == PinState::Low && level == PinState::High;
                scl = level;
                if let (true, Some(bytes)) = (rising, current.as_mut()) {
                    if count < 8 {
                        acc = (acc << 1) | u8::from(bool::from(sda));
                        count += 1;
                        if count == 8 {
                            bytes.push(acc);
                        }
                    } else {
                        acc = 0;
                        count = 0;
                    }
                }
            }
        }
        out
    }

    fn take_op(&mut self) -> Result<(), MockPinError> {
        if let Some(left) = self.ops_left.as_mut() {
            if *left == 0 {
                return Err(MockPinError);
            }
            *left -= 1;
        }
        Ok(())
    }
}

impl Gpio for MockGpio {
    type Error = MockPinError;

    fn configure_output(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.take_op()?;
        self.outputs[usize::from(pin)] = true;
        self.events.push(PinEvent::Output(pin));
        Ok(())
    }

    fn configure_input(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.take_op()?;
        self.outputs[usize::from(pin)] = false;
        self.events.push(PinEvent::Input(pin));
        Ok(())
    }

    fn write(&mut self, pin: PinId, level: PinState) -> Result<(), Self::Error> {
        self.take_op()?;
        self.levels[usize::from(pin)] = Some(level);
        self.events.push(PinEvent::Write(pin, level));
        Ok(())
    }

    fn read(&mut self, pin: PinId) -> Result<PinState, Self::Error> {
        let level = self.inputs.pop_front().unwrap_or(PinState::Low);
        self.events.push(PinEvent::Read(pin, level));
        Ok(level)
    }
}
