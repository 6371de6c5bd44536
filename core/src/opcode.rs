/// # Opcodes
///
/// Opcodes are 16-bit words fetched big-endian from program memory. The
/// dispatch table cases on masked bit patterns; the remaining nibbles carry
/// operands:
/// - `[_X__]` the Vx register index
/// - `[__Y_]` the Vy register index
/// - `[___N]` a 4-bit constant (sprite height)
/// - `[__NN]` an 8-bit constant
/// - `[_NNN]` a 12-bit address
pub trait Opcode {
    /// The Vx register index.
    fn x(&self) -> u8;

    /// The Vy register index.
    fn y(&self) -> u8;

    /// The low nibble constant.
    fn n(&self) -> u8;

    /// The low byte constant.
    fn nn(&self) -> u8;

    /// The 12-bit address.
    fn nnn(&self) -> u16;
}

impl Opcode for u16 {
    fn x(&self) -> u8 {
        ((self & 0x0F00) >> 8) as u8
    }

    fn y(&self) -> u8 {
        ((self & 0x00F0) >> 4) as u8
    }

    fn n(&self) -> u8 {
        (self & 0x000F) as u8
    }

    fn nn(&self) -> u8 {
        (self & 0x00FF) as u8
    }

    fn nnn(&self) -> u16 {
        self & 0x0FFF
    }
}
