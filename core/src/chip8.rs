use std::io::Read;

use crate::dispatch;
use crate::error::CoreError;
use crate::framebuffer::{FrameBuffer, Pixels, Rect};
use crate::memory::Memory;
use crate::state::{Cpu, Mode};

/// One interpreter session.
///
/// Owns the memory image, the CPU state, and the logical framebuffer; all
/// mutation happens through this object, on one thread. A multi-threaded
/// host must treat the whole surface as a single critical section behind
/// one mutex (the audio callback may read the sound timer from another
/// thread).
///
/// Supplies interfaces for:
/// - loading a ROM
/// - advancing the CPU by single cycles and the timers by single ticks
/// - pressing and releasing keys (which also resumes a wait-for-key)
/// - reading the pixel grid and draining the dirty-region list
pub struct Chip8 {
    cpu: Cpu,
    memory: Memory,
    frame: FrameBuffer,
}

impl Chip8 {
    pub fn new() -> Self {
        Chip8 {
            cpu: Cpu::new(),
            memory: Memory::new(),
            frame: FrameBuffer::new(),
        }
    }

    /// Load a ROM from a byte source into memory at 0x200.
    ///
    /// Fails if the source cannot be read, is empty, or holds more than
    /// the 3583 bytes that fit.
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), CoreError> {
        let mut rom = Vec::new();
        reader.read_to_end(&mut rom)?;
        self.memory.load(&rom)
    }

    /// Run one fetch-decode-dispatch-execute cycle.
    ///
    /// Does nothing while the interpreter is suspended on a wait-for-key;
    /// the host keeps polling and a key press resumes execution.
    pub fn step(&mut self) -> Result<(), CoreError> {
        match self.cpu.mode {
            Mode::Running => dispatch::step(&mut self.cpu, &mut self.memory, &mut self.frame),
            Mode::AwaitingKey { .. } => Ok(()),
        }
    }

    /// Apply one timer tick to both countdown timers.
    ///
    /// Suspension on wait-for-key freezes the timers too; that is original
    /// machine behavior, not an oversight.
    pub fn tick_timers(&mut self) {
        if self.cpu.mode == Mode::Running {
            self.cpu.tick_timers();
        }
    }

    /// Latch a key as pressed, resuming a pending wait-for-key.
    pub fn key_press(&mut self, key: u8) {
        self.cpu.keys[key as usize & 0xF] = true;
        if let Mode::AwaitingKey { dest } = self.cpu.mode {
            self.cpu.v[dest as usize] = key & 0xF;
            self.cpu.mode = Mode::Running;
        }
    }

    /// Latch a key as released.
    pub fn key_release(&mut self, key: u8) {
        self.cpu.keys[key as usize & 0xF] = false;
    }

    /// Whether the audio collaborator should currently be playing.
    pub fn sound_active(&self) -> bool {
        self.cpu.sound_timer > 0
    }

    pub fn pixels(&self) -> &Pixels {
        self.frame.pixels()
    }

    /// Drain the dirty-region list accumulated since the last flush.
    pub fn take_dirty(&mut self) -> Vec<Rect> {
        self.frame.take_dirty()
    }

    pub fn mode(&self) -> Mode {
        self.cpu.mode
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}
