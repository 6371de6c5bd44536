use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Instant;

use sdl2::event::Event;
use sdl2::keyboard::Keycode;

use chip8_core::{Chip8, Config, Scheduler};
use chip8_display::Display;

use crate::audio::Beeper;
use crate::keymap::keymap;

/// Host loop: load the ROM, then drive the interpreter off the scheduler's
/// three lanes until the window is closed or Escape is pressed.
///
/// The loop keeps pumping events while the interpreter is suspended on a
/// wait-for-key, so the next key-down resumes it and quitting stays
/// possible.
pub fn run(rom: &Path, config: Config) -> Result<(), Box<dyn Error>> {
    let mut scheduler = Scheduler::new(&config)?;
    let mut chip8 = Chip8::new();

    let file = File::open(rom)?;
    chip8.load_rom(&mut BufReader::new(file))?;
    log::info!("loaded ROM {}", rom.display());

    let sdl = sdl2::init()?;
    let mut display = Display::new(&sdl, config.scale)?;
    let beeper = Beeper::new(&sdl)?;
    let mut events = sdl.event_pump()?;

    display.clear();

    'event: loop {
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'event,
                Event::KeyDown {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_press(kc);
                    }
                }
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        chip8.key_release(kc);
                    }
                }
                _ => continue,
            }
        }

        let now = Instant::now();
        if scheduler.cycle_due(now) {
            chip8.step()?;
        }
        if scheduler.tick_due(now) {
            chip8.tick_timers();
        }
        if scheduler.refresh_due(now) {
            let dirty = chip8.take_dirty();
            display.blit(chip8.pixels(), &dirty)?;
            beeper.set_active(chip8.sound_active());
        }

        let idle = scheduler.idle_until();
        let now = Instant::now();
        if idle > now {
            std::thread::sleep(idle - now);
        }
    }

    Ok(())
}
