/// Total addressable memory in bytes.
pub const MEMORY_SIZE: usize = 4096;

/// Programs are loaded at, and begin executing from, this address.
/// Everything below it is reserved for the interpreter (only the font is used).
pub const PROGRAM_START: u16 = 0x200;

/// The largest program image that fits between `PROGRAM_START` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const DISPLAY_SIZE: usize = DISPLAY_WIDTH * DISPLAY_HEIGHT;

/// Maximum number of nested subroutine calls.
pub const STACK_DEPTH: usize = 16;

pub const REGISTER_COUNT: usize = 16;
pub const KEY_COUNT: usize = 16;

/// Index of the flag register VF.
pub const VF: usize = 0xF;

/// Rate at which the host is expected to call `Machine::tick_timers`.
pub const TIMER_HZ: u32 = 60;

/// Instructions executed per 60Hz frame by a typical host.
pub const DEFAULT_INSTRUCTIONS_PER_FRAME: u32 = 10;

/// Bytes per glyph in the font set; `Fx29` multiplies by this.
pub const FONT_GLYPH_SIZE: u16 = 5;

/// # Font Set
/// The hexadecimal digits 0..F as 4x5 sprites, one byte per row.
/// Only the high nibble of each byte is lit.
///
/// ```text
/// "0"     Binary   Hex
/// ****    11110000 0xF0
/// *  *    10010000 0x90
/// *  *    10010000 0x90
/// *  *    10010000 0x90
/// ****    11110000 0xF0
/// ```
///
/// Lives at 0x000..0x050.
pub const FONT_SET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
