//! SSD1306 command set and bring-up tables

use platform::DataMode;

use crate::sequencer::{CommandEntry, CommandProtocol};

/// SSD1306 command codes.
///
/// Parameters of these commands travel in the command stream (control
/// byte 0x00), not as display data.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Lower column start nibble, OR the nibble in (page addressing mode).
    LowerColumn = 0x00,
    /// Higher column start nibble, OR the nibble in (page addressing mode).
    HigherColumn = 0x10,
    /// Memory addressing mode: 1 byte (0x00 horizontal, 0x01 vertical, 0x02 page).
    MemoryMode = 0x20,
    /// Display start line, OR the line (0..=63) in.
    StartLine = 0x40,
    /// Contrast: 1 byte.
    Contrast = 0x81,
    /// Charge pump: 1 byte (0x14 enable, 0x10 disable).
    ChargePump = 0x8D,
    /// Segment remap: column 127 mapped to SEG0.
    SegmentRemap = 0xA1,
    /// Output follows RAM content.
    ResumeFromRam = 0xA4,
    /// Normal display (1 = lit).
    NormalDisplay = 0xA6,
    /// Inverted display (0 = lit).
    InvertDisplay = 0xA7,
    /// Multiplex ratio: 1 byte (rows - 1).
    Multiplex = 0xA8,
    /// Display off (sleep).
    DisplayOff = 0xAE,
    /// Display on.
    DisplayOn = 0xAF,
    /// Page start address, OR the page (0..=7) in (page addressing mode).
    PageStart = 0xB0,
    /// COM output scan direction: remapped (COM[N-1] → COM0).
    ComScanDescending = 0xC8,
    /// Display offset: 1 byte.
    DisplayOffset = 0xD3,
    /// Clock divide ratio / oscillator frequency: 1 byte.
    ClockDivide = 0xD5,
    /// Pre-charge period: 1 byte.
    PreCharge = 0xD9,
    /// COM pins hardware configuration: 1 byte.
    ComPins = 0xDA,
    /// VCOMH deselect level: 1 byte.
    VcomDeselect = 0xDB,
}

impl Command {
    /// Command byte.
    pub const fn byte(self) -> u8 {
        self as u8
    }
}

/// Parameters in the command stream, display on with 0xAF.
pub const PROTOCOL: CommandProtocol = CommandProtocol {
    parameter_mode: DataMode::Command,
    display_on: Command::DisplayOn.byte(),
};

/// 128×64 bring-up, internal charge pump, page addressing.
pub static INIT_128X64: [CommandEntry; 15] = init_table(&[0x3F], &[0x12]);

/// 128×32 bring-up, internal charge pump, page addressing.
pub static INIT_128X32: [CommandEntry; 15] = init_table(&[0x1F], &[0x02]);

/// The two SKUs differ only in the multiplex ratio and the COM pin layout.
const fn init_table(multiplex: &'static [u8], com_pins: &'static [u8]) -> [CommandEntry; 15] {
    [
        CommandEntry::bare(Command::DisplayOff.byte()),
        CommandEntry::new(Command::ClockDivide.byte(), &[0x80]),
        CommandEntry::new(Command::Multiplex.byte(), multiplex),
        CommandEntry::new(Command::DisplayOffset.byte(), &[0x00]),
        CommandEntry::bare(Command::StartLine.byte()),
        CommandEntry::new(Command::ChargePump.byte(), &[0x14]),
        CommandEntry::new(Command::MemoryMode.byte(), &[0x02]),
        CommandEntry::bare(Command::SegmentRemap.byte()),
        CommandEntry::bare(Command::ComScanDescending.byte()),
        CommandEntry::new(Command::ComPins.byte(), com_pins),
        CommandEntry::new(Command::Contrast.byte(), &[0xCF]),
        CommandEntry::new(Command::PreCharge.byte(), &[0xF1]),
        CommandEntry::new(Command::VcomDeselect.byte(), &[0x40]),
        CommandEntry::bare(Command::ResumeFromRam.byte()),
        CommandEntry::bare(Command::NormalDisplay.byte()),
    ]
}

/// Bring-up table for a panel height, `None` for unsupported heights.
pub fn init_table_for(height: u16) -> Option<&'static [CommandEntry]> {
    match height {
        64 => Some(&INIT_128X64),
        32 => Some(&INIT_128X32),
        _ => None,
    }
}

/// Page + column cursor in page addressing mode:
/// `[0xB0 | page, col & 0x0F, 0x10 | col >> 4]`.
pub const fn cursor(page: u8, column: u8) -> [u8; 3] {
    [
        Command::PageStart.byte() | (page & 0x07),
        Command::LowerColumn.byte() | (column & 0x0F),
        Command::HigherColumn.byte() | (column >> 4),
    ]
}
