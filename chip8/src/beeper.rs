use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired, AudioStatus};

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.05;

/// A square wave at a fixed pitch.
struct SquareWave {
    phase_inc: f32,
    phase: f32,
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
/// Plays a tone for as long as the sound timer is nonzero.
/// Polled once per frame, so a tone lasts at least one frame.
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
            phase_inc: TONE_HZ / spec.freq as f32,
            phase: 0.0,
            volume: VOLUME,
        })?;
        Ok(Beeper { device })
    }

    pub fn set_playing(&self, playing: bool) {
        match (playing, self.device.status()) {
            (true, AudioStatus::Playing) | (false, AudioStatus::Paused) => {}
            (true, _) => self.device.resume(),
            (false, _) => self.device.pause(),
        }
    }
}
