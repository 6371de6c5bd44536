use crate::constants::{FONT, FONT_START, MAX_ROM_SIZE, MEM_SIZE, ROM_START};
use crate::error::CoreError;

/// The flat memory image.
///
/// 4095 addressable bytes. The character fontset is baked in at 0x000 when
/// the image is created and is never mutated afterwards; ROMs load at 0x200.
/// Every access is bounds-checked: going outside the image is a fatal
/// condition, not a wraparound.
pub struct Memory {
    bytes: [u8; MEM_SIZE],
}

impl Memory {
    pub fn new() -> Self {
        let mut bytes = [0; MEM_SIZE];
        let font_start = FONT_START as usize;
        bytes[font_start..font_start + FONT.len()].copy_from_slice(&FONT);
        Memory { bytes }
    }

    /// Copy a ROM into memory starting at 0x200.
    ///
    /// Fails if the ROM is empty or too large to fit.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), CoreError> {
        if rom.is_empty() {
            return Err(CoreError::RomEmpty);
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(CoreError::RomTooLarge { len: rom.len() });
        }
        let start = ROM_START as usize;
        self.bytes[start..start + rom.len()].copy_from_slice(rom);
        Ok(())
    }

    pub fn read(&self, addr: usize) -> Result<u8, CoreError> {
        self.bytes
            .get(addr)
            .copied()
            .ok_or(CoreError::OutOfBounds { addr })
    }

    pub fn write(&mut self, addr: usize, value: u8) -> Result<(), CoreError> {
        match self.bytes.get_mut(addr) {
            Some(byte) => {
                *byte = value;
                Ok(())
            }
            None => Err(CoreError::OutOfBounds { addr }),
        }
    }

    /// Fetch the big-endian opcode word at `pc`.
    pub fn fetch(&self, pc: u16) -> Result<u16, CoreError> {
        let hi = self.read(pc as usize)?;
        let lo = self.read(pc as usize + 1)?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
