use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

/// A fixed-pitch square wave, mixed only while the device is resumed.
struct SquareWave {
    phase: f32,
    phase_inc: f32,
    volume: f32,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = if self.phase < 0.5 {
                self.volume
            } else {
                -self.volume
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}

/// # Beeper
/// The audio collaborator. The core only exposes whether the sound timer
/// is nonzero; the beeper plays a square wave while that holds and is
/// silent otherwise.
pub struct Beeper {
    device: AudioDevice<SquareWave>,
}

impl Beeper {
    pub fn new(sdl: &sdl2::Sdl) -> Result<Self, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(44_100),
            channels: Some(1),
            samples: None,
        };
        let device = audio.open_playback(None, &desired, |spec| SquareWave {
            phase: 0.0,
            phase_inc: 440.0 / spec.freq as f32,
            volume: 0.25,
        })?;
        Ok(Beeper { device })
    }

    /// Gate playback on the core's sound-active signal.
    pub fn set_active(&self, active: bool) {
        if active {
            self.device.resume();
        } else {
            self.device.pause();
        }
    }
}
