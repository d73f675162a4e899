use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use chipvm::constants::{DEFAULT_INSTRUCTIONS_PER_FRAME, TIMER_HZ};
use chipvm_display::Palette;

/// Run a program image on the virtual machine.
///
/// Keys 1234/QWER/ASDF/ZXCV form the hex keypad. Hold Space to run
/// unthrottled, Tab switches palettes and Escape quits.
#[derive(Debug, Parser)]
#[command(name = "chip8", version)]
pub struct Config {
    /// Path to the program image, loaded at 0x200
    pub rom: PathBuf,

    /// Instructions executed per frame
    #[arg(long, default_value_t = DEFAULT_INSTRUCTIONS_PER_FRAME)]
    pub ipf: u32,

    /// Frames per second; the timers tick once per frame
    #[arg(long, default_value_t = TIMER_HZ, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Window pixels per display pixel
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub scale: u32,

    /// Display colours: mono or phosphor
    #[arg(long, default_value_t = Palette::Mono)]
    pub palette: Palette,

    /// Seed for the random number generator, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exit on the first machine fault instead of stalling on it
    #[arg(long)]
    pub halt_on_fault: bool,
}

impl Config {
    /// Wall-clock time budget of a single frame.
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs(1) / self.fps
    }
}
