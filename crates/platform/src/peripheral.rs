//! Serial peripheral configuration
//!
//! Shared by the hardware and bit-banged transports so that both clock the
//! same bits for the same settings.

use crate::gpio::PinState;

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// SPI mode (CPOL, CPHA)
    pub mode: SpiMode,
    /// Bit order
    pub bit_order: BitOrder,
}

impl SpiConfig {
    /// 14 MHz, mode 0, MSB first.
    pub const DEFAULT: Self = Self {
        frequency: 14_000_000,
        mode: SpiMode::Mode0,
        bit_order: BitOrder::MsbFirst,
    };

    /// Half of one SCK period in nanoseconds (0 when `frequency` is 0).
    pub const fn half_period_ns(&self) -> u32 {
        half_period_ns(self.frequency)
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// SPI modes (CPOL, CPHA)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiMode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl SpiMode {
    /// SCK level between transfers.
    pub const fn clock_idle(self) -> PinState {
        match self {
            Self::Mode0 | Self::Mode1 => PinState::Low,
            Self::Mode2 | Self::Mode3 => PinState::High,
        }
    }

    /// `true` when data is sampled on the trailing clock edge.
    pub const fn samples_on_trailing_edge(self) -> bool {
        matches!(self, Self::Mode1 | Self::Mode3)
    }
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

impl BitOrder {
    /// Bit `index` (0 = first on the wire) of `value`.
    #[allow(clippy::arithmetic_side_effects)] // shift amounts are masked to 0..=7
    pub const fn bit(self, value: u8, index: u32) -> bool {
        let index = index & 0x07;
        let shift = match self {
            Self::MsbFirst => 7 - index,
            Self::LsbFirst => index,
        };
        (value >> shift) & 0x01 != 0
    }

    /// Shift `bit` into `acc` in wire order.
    #[allow(clippy::arithmetic_side_effects)] // shift amounts are masked to 0..=7
    pub const fn accumulate(self, acc: u8, bit: bool, index: u32) -> u8 {
        match self {
            Self::MsbFirst => (acc << 1) | bit as u8,
            Self::LsbFirst => acc | ((bit as u8) << (index & 0x07)),
        }
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Device address (7-bit form, e.g. 0x3C for an 8-bit 0x78)
    pub address: u8,
    /// Addressing mode
    pub address_mode: AddressMode,
}

impl I2cConfig {
    /// 400 kHz fast mode, SSD1306 default address.
    pub const DEFAULT: Self = Self {
        frequency: 400_000,
        address: 0x3C,
        address_mode: AddressMode::SevenBit,
    };

    /// Half of one SCL period in nanoseconds (0 when `frequency` is 0).
    pub const fn half_period_ns(&self) -> u32 {
        half_period_ns(self.frequency)
    }
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// I2C addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    /// 7-bit addressing
    SevenBit,
    /// 10-bit addressing
    TenBit,
}

const fn half_period_ns(frequency: u32) -> u32 {
    match 500_000_000u32.checked_div(frequency) {
        Some(ns) => ns,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_order_msb_first() {
        let bits: [bool; 8] = core::array::from_fn(|i| BitOrder::MsbFirst.bit(0xA5, i as u32));
        assert_eq!(bits, [true, false, true, false, false, true, false, true]);
    }

    #[test]
    fn test_bit_order_accumulate_inverts_bit() {
        for order in [BitOrder::MsbFirst, BitOrder::LsbFirst] {
            let value = 0x3Cu8;
            let rebuilt = (0..8).fold(0u8, |acc, i| order.accumulate(acc, order.bit(value, i), i));
            assert_eq!(rebuilt, value, "{order:?}");
        }
    }

    #[test]
    fn test_half_periods() {
        assert_eq!(SpiConfig::DEFAULT.half_period_ns(), 35);
        assert_eq!(I2cConfig::DEFAULT.half_period_ns(), 1250);
        let stopped = SpiConfig {
            frequency: 0,
            ..SpiConfig::DEFAULT
        };
        assert_eq!(stopped.half_period_ns(), 0);
    }

    #[test]
    fn test_clock_idle_levels() {
        assert_eq!(SpiMode::Mode0.clock_idle(), PinState::Low);
        assert_eq!(SpiMode::Mode3.clock_idle(), PinState::High);
        assert!(SpiMode::Mode1.samples_on_trailing_edge());
    }
}
