use sdl2::pixels::Color;
use sdl2::rect::Rect as SdlRect;
use sdl2::render::WindowCanvas;

use chip8_core::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chip8_core::{Pixels, Rect};

const ON: Color = Color::RGB(0xFF, 0xFF, 0xFF);
const OFF: Color = Color::RGB(0x00, 0x00, 0x00);

/// # Display
///
/// Presents the interpreter's logical 64x32 framebuffer in an SDL2 window,
/// one filled square of `scale` x `scale` screen pixels per logical pixel.
/// Rendering is pull-based: once per refresh the host hands over the pixel
/// grid together with the dirty-region list, and only the dirty regions are
/// repainted.
pub struct Display {
    canvas: WindowCanvas,
    scale: u32,
}

impl Display {
    /// Create a window bound to an SDL2 context.
    pub fn new(sdl: &sdl2::Sdl, scale: u32) -> Result<Self, String> {
        let video = sdl.video()?;
        let window = video
            .window(
                "chip8",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

        Ok(Display { canvas, scale })
    }

    /// Wipe the window to the off color and present it.
    pub fn clear(&mut self) {
        self.canvas.set_draw_color(OFF);
        self.canvas.clear();
        self.canvas.present();
    }

    /// Repaint the dirty regions of the frame and present the result.
    ///
    /// With an empty dirty list nothing changed since the last flush and
    /// the call is a no-op.
    pub fn blit(&mut self, pixels: &Pixels, dirty: &[Rect]) -> Result<(), String> {
        if dirty.is_empty() {
            return Ok(());
        }
        for region in dirty {
            for y in region.y..region.y + region.h {
                for x in region.x..region.x + region.w {
                    self.draw_pixel(pixels, x as usize, y as usize)?;
                }
            }
        }
        self.canvas.present();
        Ok(())
    }

    fn draw_pixel(&mut self, pixels: &Pixels, x: usize, y: usize) -> Result<(), String> {
        let color = if pixels[y][x] == 1 { ON } else { OFF };
        self.canvas.set_draw_color(color);
        self.canvas.fill_rect(SdlRect::new(
            (x as u32 * self.scale) as i32,
            (y as u32 * self.scale) as i32,
            self.scale,
            self.scale,
        ))
    }
}
