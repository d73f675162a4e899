use std::fmt;
use std::str::FromStr;

use sdl2::pixels::PixelFormatEnum;

use chipvm::constants::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use chipvm::FrameBuffer;

/// Bytes per pixel in an RGB24 texture.
const BYTES_PER_PIXEL: usize = 3;

/// Colours for unlit and lit pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Palette {
    /// White on black
    Mono,
    /// Green on black, like an old phosphor monitor
    Phosphor,
}

impl Palette {
    /// RGB of a pixel that's off and of one that's on.
    pub fn colors(self) -> ([u8; 3], [u8; 3]) {
        match self {
            Palette::Mono => ([0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF]),
            Palette::Phosphor => ([0x00, 0x00, 0x00], [0x64, 0xDC, 0x64]),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Palette::Mono => Palette::Phosphor,
            Palette::Phosphor => Palette::Mono,
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mono" => Ok(Palette::Mono),
            "phosphor" | "green" => Ok(Palette::Phosphor),
            other => Err(format!("unknown palette '{}' (expected mono or phosphor)", other)),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Palette::Mono => f.write_str("mono"),
            Palette::Phosphor => f.write_str("phosphor"),
        }
    }
}

/// # Display
/// The display is composed of 64x32 black/white pixels.
/// The on/off state of these pixels is encoded as 1/0 respectively in a flat row-major array.
/// The display only gets a call to `render` when the FrameBuffer is updated.
pub struct Display {
    canvas: sdl2::render::WindowCanvas,
    palette: Palette,
}

impl Display {
    /// Creates a new display object bound to an sdl2 context.
    ///
    /// # Arguments
    /// * `sdl` an sdl2 context with which to draw
    /// * `scale` the size multiplier for each pixel
    /// * `palette` the colours to draw with
    pub fn new(sdl: &sdl2::Sdl, scale: u32, palette: Palette) -> Result<Self, String> {
        let video_subsystem = sdl.video()?;
        let window = video_subsystem
            .window(
                "chipvm",
                DISPLAY_WIDTH as u32 * scale,
                DISPLAY_HEIGHT as u32 * scale,
            )
            .position_centered()
            .opengl()
            .build()
            .map_err(|e| e.to_string())?;
        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;

        Ok(Display { canvas, palette })
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Switches palettes; takes effect on the next `render`.
    pub fn toggle_palette(&mut self) {
        self.palette = self.palette.toggled();
    }

    /// Paints a FrameBuffer into an SDL2 RGB24 texture buffer.
    ///
    /// Each row of the texture is `pitch` bytes long, which may be more than
    /// the 3 bytes per pixel the row actually needs.
    ///
    /// # Arguments
    /// * `frame` the FrameBuffer to paint
    /// * `palette` the colours to paint with
    /// * `buffer` the locked texture memory
    /// * `pitch` the length of one texture row in bytes
    fn paint(frame: &FrameBuffer, palette: Palette, buffer: &mut [u8], pitch: usize) {
        let (off, on) = palette.colors();
        for (y, row) in frame.chunks_exact(DISPLAY_WIDTH).enumerate() {
            for (x, &pixel) in row.iter().enumerate() {
                let offset = y * pitch + x * BYTES_PER_PIXEL;
                let color = if pixel == 0 { off } else { on };
                buffer[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color);
            }
        }
    }

    /// Paints the FrameBuffer into a streaming texture and presents it.
    ///
    /// # Arguments
    /// * `frame` the FrameBuffer to show
    pub fn render(&mut self, frame: &FrameBuffer) -> Result<(), String> {
        let texture_creator = self.canvas.texture_creator();

        let mut texture = texture_creator
            .create_texture_streaming(
                PixelFormatEnum::RGB24,
                DISPLAY_WIDTH as u32,
                DISPLAY_HEIGHT as u32,
            )
            .map_err(|e| e.to_string())?;

        let palette = self.palette;
        texture.with_lock(None, |buffer: &mut [u8], pitch: usize| {
            Display::paint(frame, palette, buffer, pitch);
        })?;

        self.canvas.copy(&texture, None, None)?;
        self.canvas.present();
        Ok(())
    }
}
