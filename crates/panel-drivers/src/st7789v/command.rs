//! ST7789V command set (system function commands, MIPI-DCS numbering)

use platform::DataMode;

use crate::sequencer::{CommandEntry, CommandProtocol};

/// ST7789V system function command codes.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// No operation
    Nop = 0x00,
    /// Software reset, wait 5 ms (120 ms when leaving sleep)
    SoftwareReset = 0x01,
    /// Read display ID: 3 bytes
    ReadDisplayId = 0x04,
    /// Read display status: 4 bytes
    ReadDisplayStatus = 0x09,
    /// Read display power mode
    ReadPowerMode = 0x0A,
    /// Read memory data access control
    ReadMadctl = 0x0B,
    /// Read interface pixel format
    ReadPixelFormat = 0x0C,
    /// Read display image mode
    ReadImageMode = 0x0D,
    /// Read display signal mode
    ReadSignalMode = 0x0E,
    /// Read self-diagnostic result
    ReadSelfDiagnostic = 0x0F,
    /// Enter sleep mode
    SleepIn = 0x10,
    /// Leave sleep mode
    SleepOut = 0x11,
    /// Partial display mode on
    PartialOn = 0x12,
    /// Normal display mode on
    NormalOn = 0x13,
    /// Display inversion off
    InversionOff = 0x20,
    /// Display inversion on
    InversionOn = 0x21,
    /// Gamma curve select: 1 byte
    GammaSet = 0x26,
    /// Display off
    DisplayOff = 0x28,
    /// Display on
    DisplayOn = 0x29,
    /// Column address set: 4 bytes
    ColumnAddressSet = 0x2A,
    /// Row address set: 4 bytes
    RowAddressSet = 0x2B,
    /// Memory write, pixel words follow
    MemoryWrite = 0x2C,
    /// Memory read
    MemoryRead = 0x2E,
    /// Partial area: 4 bytes
    PartialArea = 0x30,
    /// Vertical scrolling definition: 6 bytes
    VerticalScrollDefinition = 0x33,
    /// Tearing effect line off
    TearingOff = 0x34,
    /// Tearing effect line on: 1 byte
    TearingOn = 0x35,
    /// Memory data access control: 1 byte
    Madctl = 0x36,
    /// Vertical scroll start address: 2 bytes
    VerticalScrollStart = 0x37,
    /// Idle mode off
    IdleOff = 0x38,
    /// Idle mode on
    IdleOn = 0x39,
    /// Interface pixel format: 1 byte (0x55 = 16-bit RGB565)
    PixelFormat = 0x3A,
    /// Memory write continue
    MemoryWriteContinue = 0x3C,
    /// Memory read continue
    MemoryReadContinue = 0x3E,
    /// Tear scanline: 2 bytes
    TearScanline = 0x44,
    /// Get scanline
    GetScanline = 0x45,
    /// Display brightness: 1 byte
    Brightness = 0x51,
    /// Read display brightness
    ReadBrightness = 0x52,
    /// CTRL display: 1 byte
    ControlDisplay = 0x53,
    /// Read CTRL display
    ReadControlDisplay = 0x54,
    /// Content adaptive brightness control and color enhancement: 1 byte
    AdaptiveBrightness = 0x55,
    /// Read content adaptive brightness control
    ReadAdaptiveBrightness = 0x56,
    /// CABC minimum brightness: 1 byte
    MinimumBrightness = 0x5E,
    /// Read CABC minimum brightness
    ReadMinimumBrightness = 0x5F,
    /// Read automatic brightness control self-diagnostic result
    ReadBrightnessDiagnostic = 0x68,
    /// Read ID1
    ReadId1 = 0xDA,
    /// Read ID2
    ReadId2 = 0xDB,
    /// Read ID3
    ReadId3 = 0xDC,
}

impl Command {
    /// Command byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Parameters are display data (D/C high), display on with DISPON.
pub const PROTOCOL: CommandProtocol = CommandProtocol {
    parameter_mode: DataMode::Data,
    display_on: Command::DisplayOn.byte(),
};

/// 240×135 bring-up: RGB565, full-panel window, default orientation.
pub static INIT_240X135: [CommandEntry; 7] = [
    CommandEntry::bare(Command::SoftwareReset.byte()).delay_ms(120),
    CommandEntry::bare(Command::SleepOut.byte()).delay_ms(10),
    CommandEntry::new(Command::PixelFormat.byte(), &[0x55]).delay_ms(10),
    CommandEntry::new(Command::ColumnAddressSet.byte(), &[0x00, 0x00, 0x00, 0xEF]),
    CommandEntry::new(Command::RowAddressSet.byte(), &[0x00, 0x00, 0x00, 0x86]),
    CommandEntry::new(Command::Madctl.byte(), &[0x00]),
    CommandEntry::bare(Command::NormalOn.byte()).delay_ms(10),
];

/// Wait after SLPIN before the next command (µs).
pub const SLEEP_IN_DELAY_US: u32 = 5_000;

/// Wait after SLPOUT before the next command (µs).
pub const SLEEP_OUT_DELAY_US: u32 = 120_000;

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_init_table_commands_and_delays() {
        let commands: Vec<(u8, u32)> = INIT_240X135
            .iter()
            .map(|e| (e.command, e.delay.total_us()))
            .collect();
        assert_eq!(
            commands,
            [
                (0x01, 120_000),
                (0x11, 10_000),
                (0x3A, 10_000),
                (0x2A, 0),
                (0x2B, 0),
                (0x36, 0),
                (0x13, 10_000),
            ]
        );
    }

    #[test]
    fn test_init_window_covers_default_panel() {
        assert_eq!(INIT_240X135[3].params, [0x00, 0x00, 0x00, 239]);
        assert_eq!(INIT_240X135[4].params, [0x00, 0x00, 0x00, 134]);
    }

    #[test]
    fn test_protocol_tags_parameters_as_data() {
        assert_eq!(PROTOCOL.parameter_mode, DataMode::Data);
        assert_eq!(PROTOCOL.display_on, 0x29);
    }
}
