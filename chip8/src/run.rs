use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use sdl2::event::Event;

use chipvm::Machine;
use chipvm_display::Display;

use crate::beeper::Beeper;
use crate::config::Config;
use crate::keymap::{keymap, Input};

pub fn run(config: &Config) -> Result<()> {
    let mut machine = match config.seed {
        Some(seed) => Machine::with_seed(seed),
        None => Machine::new(),
    };

    // Load ROM
    let file = File::open(&config.rom)
        .with_context(|| format!("unable to open {}", config.rom.display()))?;
    machine
        .load_rom(&mut BufReader::new(file))
        .with_context(|| format!("unable to load {}", config.rom.display()))?;
    info!("loaded {}", config.rom.display());

    // Get SDL2 context
    let sdl = sdl2::init().map_err(anyhow::Error::msg)?;
    let mut display =
        Display::new(&sdl, config.scale, config.palette).map_err(anyhow::Error::msg)?;
    let beeper = Beeper::new(&sdl).map_err(anyhow::Error::msg)?;
    let mut events = sdl.event_pump().map_err(anyhow::Error::msg)?;
    display
        .render(machine.frame_buffer())
        .map_err(anyhow::Error::msg)?;

    let frame_time = config.frame_duration();
    info!(
        "running at {} instructions per frame, {} frames per second",
        config.ipf, config.fps
    );

    // Whether or not the frame rate should be respected
    let mut fast_forward = false;

    'frame: loop {
        let frame_start = Instant::now();

        // Handle input
        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'frame,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match keymap(key) {
                    Some(Input::Key(k)) => machine.press_key(k)?,
                    Some(Input::FastForward) => fast_forward = true,
                    Some(Input::TogglePalette) => {
                        display.toggle_palette();
                        info!("palette: {}", display.palette());
                        display
                            .render(machine.frame_buffer())
                            .map_err(anyhow::Error::msg)?;
                    }
                    Some(Input::Quit) => break 'frame,
                    None => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => match keymap(key) {
                    Some(Input::Key(k)) => machine.release_key(k)?,
                    Some(Input::FastForward) => fast_forward = false,
                    _ => continue,
                },
                _ => continue,
            };
        }

        // Update state
        for _ in 0..config.ipf {
            if let Err(err) = machine.step() {
                if config.halt_on_fault {
                    return Err(err).context("machine halted");
                }
                // The fault repeats until the state changes; wait for the next frame
                break;
            }
        }
        machine.tick_timers();

        // If the draw flag is set, unset it and render the current frame
        if let Some(frame) = machine.take_frame() {
            display.render(frame).map_err(anyhow::Error::msg)?;
        }
        beeper.set_playing(machine.sound_timer() > 0);

        // Handle timing
        let elapsed = frame_start.elapsed();
        if !fast_forward && frame_time > elapsed {
            std::thread::sleep(frame_time - elapsed);
        }
    }

    info!("quit");
    Ok(())
}
