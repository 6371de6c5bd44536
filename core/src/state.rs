use crate::constants::{NUM_KEYS, ROM_START, STACK_DEPTH};

/// Whether the interpreter is executing instructions or suspended on FX0A.
///
/// The wait-for-key is modeled as an explicit state instead of an inline
/// spin loop so the host loop can keep pumping events (and quit cleanly)
/// while the interpreter is suspended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Running,
    /// Suspended until the next key-down event, whose index lands in `dest`.
    AwaitingKey { dest: u8 },
}

/// The CPU register file, call stack, timers, and key latch.
///
/// Registers
/// - (v) 16 8-bit registers V0..VF; VF doubles as the flags register and is
///   overwritten by the arithmetic, shift, and draw instructions
/// - (i) a 16-bit memory index register
/// - (pc) a 16-bit program counter, starting at 0x200
///
/// Stack
/// - 16 return addresses with an explicit depth counter (sp)
///
/// Timers
/// - two independent 8-bit countdown timers (delay & sound), decremented at
///   a fixed tick rate and clamped at zero
///
/// Input
/// - a 16-entry latch of the pressed state of keys 0..F
pub struct Cpu {
    pub v: [u8; 16],
    pub i: u16,
    pub pc: u16,
    pub sp: u8,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub keys: [bool; NUM_KEYS],
    pub mode: Mode,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            v: [0; 16],
            i: 0,
            pc: ROM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            keys: [false; NUM_KEYS],
            mode: Mode::Running,
        }
    }

    /// Skip the next instruction by advancing past it.
    pub fn skip(&mut self) {
        self.pc += 2;
    }

    /// One timer tick: decrement each strictly-positive timer by one.
    ///
    /// Zero-valued timers stay at zero; there is no underflow.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
