use crate::constants::{
    DISPLAY_SIZE, FONT_SET, KEY_COUNT, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, STACK_DEPTH,
};
use crate::error::MachineError;

/// The architectural state of the machine
///
/// ## CPU
/// Registers
/// - (v) 16 primary 8-bit registers (V0..VF)
///     - V0..VE are general purpose
///     - VF doubles as the carry/borrow/collision flag and is clobbered by those instructions
/// - (i) the address register; 12 bits are meaningful but it's stored unmasked
///
/// Counter
/// - (pc) the program counter; always points at the next instruction to fetch
///
/// Stack
/// - (stack) 16 return addresses
/// - (sp) the number of addresses currently on the stack
///
/// Timers
/// - 2 8-bit timers (delay & sound) decremented at 60Hz while nonzero
///
/// ## Memory
/// - 4096 bytes; the font set lives at 0x000 and programs are loaded at 0x200
/// - 64x32 frame buffer, one byte (0 or 1) per pixel, row-major
///     - `draw_flag` is raised whenever it changes
///
/// ## Input
/// - the pressed status of keys 0..F
#[derive(Copy, Clone)]
pub struct State {
    pub v: [u8; REGISTER_COUNT],
    pub i: u16,
    pub pc: u16,
    pub sp: usize,
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub memory: [u8; MEMORY_SIZE],
    pub frame_buffer: FrameBuffer,
    pub draw_flag: bool,
    pub keys: [bool; KEY_COUNT],
}

impl State {
    pub fn new() -> Self {
        let mut memory = [0; MEMORY_SIZE];
        memory[..FONT_SET.len()].copy_from_slice(&FONT_SET);

        State {
            v: [0; REGISTER_COUNT],
            i: 0,
            pc: PROGRAM_START,
            sp: 0,
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            memory,
            frame_buffer: [0; DISPLAY_SIZE],
            draw_flag: false,
            keys: [false; KEY_COUNT],
        }
    }

    /// `len` bytes of memory starting at `address`, or the first address that doesn't exist.
    pub fn memory_at(&self, address: usize, len: usize) -> Result<&[u8], MachineError> {
        check_bounds(address, len)?;
        Ok(&self.memory[address..address + len])
    }

    /// Mutable counterpart of `memory_at`.
    pub fn memory_at_mut(&mut self, address: usize, len: usize) -> Result<&mut [u8], MachineError> {
        check_bounds(address, len)?;
        Ok(&mut self.memory[address..address + len])
    }

    /// The lowest-indexed key currently held down.
    pub fn first_pressed_key(&self) -> Option<u8> {
        self.keys.iter().position(|&pressed| pressed).map(|key| key as u8)
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

fn check_bounds(address: usize, len: usize) -> Result<(), MachineError> {
    if address + len > MEMORY_SIZE {
        // Report the first byte that's missing, not the start of the range
        let address = address.max(MEMORY_SIZE);
        return Err(MachineError::MemoryOutOfBounds { address });
    }
    Ok(())
}

/// The FrameBuffer is indexed as `x + y * DISPLAY_WIDTH`
pub type FrameBuffer = [u8; DISPLAY_SIZE];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_at_program_start() {
        let state = State::new();
        assert_eq!(state.pc, 0x200);
        assert_eq!(state.sp, 0);
        assert_eq!(state.i, 0);
        assert!(!state.draw_flag);
    }

    #[test]
    fn test_new_state_loads_font_and_nothing_else() {
        let state = State::new();
        assert_eq!(state.memory[0x00..0x05], [0xF0, 0x90, 0x90, 0x90, 0xF0]);
        assert_eq!(state.memory[0x4B..0x50], [0xF0, 0x80, 0xF0, 0x80, 0x80]);
        assert!(state.memory[0x50..].iter().all(|&b| b == 0));
        assert!(state.frame_buffer.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_memory_at_rejects_reads_past_the_end() {
        let state = State::new();
        assert!(state.memory_at(0xFFD, 3).is_ok());
        match state.memory_at(0xFFE, 3) {
            Err(MachineError::MemoryOutOfBounds { address }) => assert_eq!(address, 0x1000),
            _ => panic!("expected an out of bounds error"),
        }
    }

    #[test]
    fn test_first_pressed_key_is_lowest_index() {
        let mut state = State::new();
        assert_eq!(state.first_pressed_key(), None);
        state.keys[0xC] = true;
        state.keys[0x3] = true;
        assert_eq!(state.first_pressed_key(), Some(0x3));
    }
}
