/// Size of the addressable memory image in bytes (0x000..0xFFF).
pub const MEM_SIZE: usize = 0xFFF;

/// Address where ROMs are loaded and where execution begins.
pub const ROM_START: u16 = 0x200;

/// Largest ROM that fits between ROM_START and the end of memory.
pub const MAX_ROM_SIZE: usize = MEM_SIZE - ROM_START as usize;

/// Maximum number of return addresses the call stack can hold.
pub const STACK_DEPTH: usize = 16;

/// Number of keys on the hexadecimal keypad.
pub const NUM_KEYS: usize = 16;

pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;

/// Address of the built-in character sprites and the size of one glyph.
pub const FONT_START: u16 = 0x000;
pub const FONT_GLYPH_SIZE: u16 = 5;

/// Default scheduler rates and display scale.
pub const DEFAULT_INSTRUCTION_RATE: u32 = 250;
pub const DEFAULT_TICK_RATE: u32 = 60;
pub const DEFAULT_REFRESH_RATE: u32 = 60;
pub const DEFAULT_SCALE: u32 = 10;

/// The 16 built-in character sprites (0..F), 5 bytes per glyph.
pub const FONT: [u8; 80] = [
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
