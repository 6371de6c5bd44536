use crate::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};

/// The pixel grid is indexed as [y][x]; 1 is on, 0 is off.
pub type Pixels = [[u8; DISPLAY_WIDTH]; DISPLAY_HEIGHT];

/// A region of the framebuffer changed since the last presentation flush,
/// in logical (unscaled) pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u8,
    pub y: u8,
    pub w: u8,
    pub h: u8,
}

impl Rect {
    fn pixel(x: usize, y: usize) -> Self {
        Rect {
            x: x as u8,
            y: y as u8,
            w: 1,
            h: 1,
        }
    }

    fn full() -> Self {
        Rect {
            x: 0,
            y: 0,
            w: DISPLAY_WIDTH as u8,
            h: DISPLAY_HEIGHT as u8,
        }
    }
}

/// The logical 64x32 monochrome display.
///
/// Draw handlers mutate only this grid; presentation is pull-based. Every
/// change is also recorded in an accumulating dirty list that the
/// presentation collaborator takes (and thereby clears) once per refresh.
pub struct FrameBuffer {
    pixels: Pixels,
    dirty: Vec<Rect>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT],
            dirty: Vec::new(),
        }
    }

    /// Turn every pixel off and mark the whole grid dirty.
    pub fn clear(&mut self) {
        self.pixels = [[0; DISPLAY_WIDTH]; DISPLAY_HEIGHT];
        self.dirty.push(Rect::full());
    }

    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y][x]
    }

    /// XOR one pixel, record it as dirty, and return its new state.
    ///
    /// Callers detect a sprite collision by a toggle that returns 0: the
    /// pixel was previously on and has just been turned off.
    pub fn toggle(&mut self, x: usize, y: usize) -> u8 {
        self.pixels[y][x] ^= 1;
        self.dirty.push(Rect::pixel(x, y));
        self.pixels[y][x]
    }

    pub fn pixels(&self) -> &Pixels {
        &self.pixels
    }

    /// Hand over the accumulated dirty list, leaving it empty.
    pub fn take_dirty(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.dirty)
    }

    pub fn dirty(&self) -> &[Rect] {
        &self.dirty
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}
