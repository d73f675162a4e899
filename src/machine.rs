use std::io::Read;

use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::{DISPLAY_SIZE, KEY_COUNT, MAX_PROGRAM_SIZE, PROGRAM_START};
use crate::error::MachineError;
use crate::instruction::Instruction;
use crate::opcode::InstructionWord;
use crate::operations::{self, Flow};
use crate::state::{FrameBuffer, State};

/// What the machine will do on its next step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Fetch and execute the instruction at pc.
    Running,
    /// Parked on an `Fx0A`; stays here until a step sees a key held down,
    /// at which point the key goes into `register`.
    WaitingForKey { register: u8 },
}

/// # Machine
/// The bytecode virtual machine.
///
/// Tracks:
///  - the architectural `state`
///  - the `mode`, i.e. whether it's blocked on a keypress
///  - a random number generator for `Cxkk`, seeded once
///
/// Supplies interfaces for:
/// - loading programs
/// - pressing and releasing keys
/// - executing a single instruction
/// - ticking its timers
/// - inspecting its frame buffer and sound timer for rendering by some host
///
/// A host drives it one frame at a time: `step` some number of times, `tick_timers`
/// once, then redraw if `take_frame` hands back a frame and beep while
/// `sound_timer` is nonzero.
pub struct Machine {
    state: State,
    mode: Mode,
    rng: StdRng,
}

impl Machine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// A machine whose `Cxkk` results are reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Machine {
            state: State::new(),
            mode: Mode::Running,
            rng,
        }
    }

    /// Copy a program image into memory at 0x200.
    ///
    /// # Arguments
    /// * `program` the raw bytecode; at most 3584 bytes
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MachineError> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::ProgramTooLarge {
                size: program.len(),
                max: MAX_PROGRAM_SIZE,
            });
        }
        let start = PROGRAM_START as usize;
        self.state.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    /// Load a program from some source, e.g. a ROM file.
    ///
    /// # Arguments
    /// * `reader` a reader that yields the whole program image
    pub fn load_rom(&mut self, reader: &mut dyn Read) -> Result<(), MachineError> {
        let mut program = Vec::with_capacity(MAX_PROGRAM_SIZE);
        reader.read_to_end(&mut program)?;
        self.load_program(&program)
    }

    /// Executes exactly one instruction.
    ///
    /// Every error is also logged as a warning. After an error the state is
    /// untouched, so stepping again hits the same fault; it's up to the caller
    /// whether that's a stall or a halt.
    pub fn step(&mut self) -> Result<(), MachineError> {
        let pc = self.state.pc;
        self.execute().map_err(|err| {
            warn!("{:#05X}: {}", pc, err);
            err
        })
    }

    fn execute(&mut self) -> Result<(), MachineError> {
        let word = self.fetch()?;
        let instruction = Instruction::decode(word)?;
        trace!(
            "{:03X} {} {:<16} v{:02X?} i{:03X}",
            self.state.pc,
            word,
            instruction.to_string(),
            self.state.v,
            self.state.i
        );
        let flow = operations::execute(instruction, &mut self.state, &mut self.rng)?;
        self.advance(flow);
        Ok(())
    }

    /// Gets the word currently pointed at by the pc.
    /// Memory is stored as bytes, but instructions are 16 bits so we combine two subsequent bytes.
    fn fetch(&self) -> Result<InstructionWord, MachineError> {
        let bytes = self.state.memory_at(self.state.pc as usize, 2)?;
        Ok(InstructionWord::from_bytes(bytes[0], bytes[1]))
    }

    /// Moves the pc and tracks transitions in and out of waiting for a key.
    fn advance(&mut self, flow: Flow) {
        let pc = self.state.pc;
        let mode = match flow {
            Flow::Next => {
                self.state.pc = pc.wrapping_add(2);
                Mode::Running
            }
            Flow::Skip => {
                self.state.pc = pc.wrapping_add(4);
                Mode::Running
            }
            Flow::Jump(addr) => {
                self.state.pc = addr;
                Mode::Running
            }
            Flow::Block { register } => Mode::WaitingForKey { register },
        };
        if mode != self.mode {
            debug!("{:#05X}: {:?} -> {:?}", pc, self.mode, mode);
            self.mode = mode;
        }
    }

    /// Decrements both timers towards 0; meant to be called at 60Hz.
    pub fn tick_timers(&mut self) {
        self.state.delay_timer = self.state.delay_timer.saturating_sub(1);
        self.state.sound_timer = self.state.sound_timer.saturating_sub(1);
    }

    /// Set the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF
    pub fn press_key(&mut self, key: u8) -> Result<(), MachineError> {
        self.set_key(key, true)
    }

    /// Unset the pressed status of key
    ///
    /// # Arguments
    /// * `key` the keypad index 0x0..=0xF
    pub fn release_key(&mut self, key: u8) -> Result<(), MachineError> {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: u8, pressed: bool) -> Result<(), MachineError> {
        if key as usize >= KEY_COUNT {
            return Err(MachineError::InvalidKey { key });
        }
        self.state.keys[key as usize] = pressed;
        Ok(())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_waiting_for_key(&self) -> bool {
        matches!(self.mode, Mode::WaitingForKey { .. })
    }

    /// A single pixel, 0 or 1, indexed as `x + y * 64`.
    pub fn pixel(&self, index: usize) -> Option<u8> {
        if index < DISPLAY_SIZE {
            Some(self.state.frame_buffer[index])
        } else {
            None
        }
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.state.frame_buffer
    }

    /// Whether the frame buffer changed since the flag was last cleared.
    pub fn is_dirty(&self) -> bool {
        self.state.draw_flag
    }

    pub fn clear_dirty(&mut self) {
        self.state.draw_flag = false;
    }

    /// Returns the FrameBuffer if the display should be redrawn, clearing the flag.
    pub fn take_frame(&mut self) -> Option<&FrameBuffer> {
        if self.state.draw_flag {
            self.state.draw_flag = false;
            Some(&self.state.frame_buffer)
        } else {
            None
        }
    }

    pub fn delay_timer(&self) -> u8 {
        self.state.delay_timer
    }

    /// Nonzero means a tone should be playing this frame.
    pub fn sound_timer(&self) -> u8 {
        self.state.sound_timer
    }

    /// Read-only view of everything, for debuggers and tests.
    pub fn state(&self) -> &State {
        &self.state
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MEMORY_SIZE, VF};
    use crate::error::DecodeStage;

    fn machine_with(program: &[u8]) -> Machine {
        let mut machine = Machine::with_seed(0);
        machine.load_program(program).unwrap();
        machine
    }

    #[test]
    fn test_new_machine_is_running_at_program_start() {
        let machine = Machine::new();
        assert_eq!(machine.state().pc, 0x200);
        assert_eq!(machine.mode(), Mode::Running);
        assert!(!machine.is_dirty());
        assert_eq!(machine.sound_timer(), 0);
    }

    #[test]
    fn test_machine_fetches_big_endian() {
        let machine = machine_with(&[0xAA, 0xBB]);
        assert_eq!(machine.fetch().unwrap(), InstructionWord(0xAABB));
    }

    #[test]
    fn test_load_then_add() {
        let mut machine = machine_with(&[0x60, 0x05, 0x70, 0x03]);
        machine.step().unwrap();
        machine.step().unwrap();
        assert_eq!(machine.state().v[0x0], 8);
        assert_eq!(machine.state().pc, 0x204);
    }

    #[test]
    fn test_load_program_rejects_oversize_images() {
        let mut machine = Machine::new();
        assert!(machine.load_program(&[0x12; MAX_PROGRAM_SIZE]).is_ok());
        match machine.load_program(&[0; MAX_PROGRAM_SIZE + 1]) {
            Err(MachineError::ProgramTooLarge { size, max }) => {
                assert_eq!(size, 3585);
                assert_eq!(max, 3584);
            }
            other => panic!("expected ProgramTooLarge, got {:?}", other),
        }
        assert_eq!(machine.state().memory[MEMORY_SIZE - 1], 0x12);
    }

    #[test]
    fn test_load_rom_reads_everything() {
        let mut machine = Machine::new();
        let mut rom: &[u8] = &[0x00, 0xE0, 0x12, 0x00];
        machine.load_rom(&mut rom).unwrap();
        assert_eq!(machine.state().memory[0x200..0x204], [0x00, 0xE0, 0x12, 0x00]);
    }

    #[test]
    fn test_call_and_return() {
        // 200: CALL 206; 202: LD V1, 01; 204: JP 204; 206: LD V2, 02; 208: RET
        let mut machine = machine_with(&[
            0x22, 0x06, 0x61, 0x01, 0x12, 0x04, 0x62, 0x02, 0x00, 0xEE,
        ]);
        machine.step().unwrap();
        assert_eq!(machine.state().pc, 0x206);
        assert_eq!(machine.state().sp, 1);
        machine.step().unwrap();
        machine.step().unwrap();
        assert_eq!(machine.state().pc, 0x202);
        assert_eq!(machine.state().sp, 0);
        machine.step().unwrap();
        assert_eq!(machine.state().v[0x1..0x3], [0x01, 0x02]);
    }

    #[test]
    fn test_skip_advances_by_four() {
        let mut machine = machine_with(&[0x30, 0x00]);
        machine.step().unwrap();
        assert_eq!(machine.state().pc, 0x204);
    }

    #[test]
    fn test_return_with_empty_stack_is_reported() {
        let mut machine = machine_with(&[0x00, 0xEE]);
        assert!(matches!(
            machine.step(),
            Err(MachineError::StackUnderflow { pc: 0x200 })
        ));
        assert_eq!(machine.state().pc, 0x200);
    }

    #[test]
    fn test_unknown_instruction_stalls() {
        let mut machine = machine_with(&[0x81, 0x2F]);
        for _ in 0..3 {
            match machine.step() {
                Err(MachineError::UnknownInstruction { word, stage }) => {
                    assert_eq!(word, InstructionWord(0x812F));
                    assert_eq!(stage, DecodeStage::Arithmetic);
                }
                other => panic!("expected UnknownInstruction, got {:?}", other),
            }
            assert_eq!(machine.state().pc, 0x200);
        }
    }

    #[test]
    fn test_fetch_past_memory_is_reported() {
        let mut machine = machine_with(&[0x1F, 0xFF]);
        machine.step().unwrap();
        assert!(matches!(
            machine.step(),
            Err(MachineError::MemoryOutOfBounds { address: 0x1000 })
        ));
    }

    #[test]
    fn test_waits_for_key_without_advancing() {
        let mut machine = machine_with(&[0xF3, 0x0A]);
        for _ in 0..5 {
            machine.step().unwrap();
            assert_eq!(machine.state().pc, 0x200);
            assert_eq!(machine.mode(), Mode::WaitingForKey { register: 0x3 });
            assert!(machine.is_waiting_for_key());
        }

        machine.press_key(0xB).unwrap();
        machine.press_key(0x7).unwrap();
        // Pressing doesn't resolve the wait by itself; the next step does
        assert!(machine.is_waiting_for_key());
        machine.step().unwrap();
        assert_eq!(machine.state().pc, 0x202);
        assert_eq!(machine.state().v[0x3], 0x7);
        assert_eq!(machine.mode(), Mode::Running);
    }

    #[test]
    fn test_key_held_before_wait_is_taken_immediately() {
        let mut machine = machine_with(&[0xF0, 0x0A]);
        machine.press_key(0x2).unwrap();
        machine.step().unwrap();
        assert_eq!(machine.state().v[0x0], 0x2);
        assert_eq!(machine.mode(), Mode::Running);
    }

    #[test]
    fn test_key_presses_are_idempotent() {
        let mut machine = Machine::new();
        machine.press_key(0x5).unwrap();
        machine.press_key(0x5).unwrap();
        assert!(machine.state().keys[0x5]);
        machine.release_key(0x5).unwrap();
        machine.release_key(0x5).unwrap();
        assert!(!machine.state().keys[0x5]);
    }

    #[test]
    fn test_keys_off_the_pad_are_rejected() {
        let mut machine = Machine::new();
        assert!(matches!(
            machine.press_key(0x10),
            Err(MachineError::InvalidKey { key: 0x10 })
        ));
        assert!(machine.release_key(0xFF).is_err());
    }

    #[test]
    fn test_timers_tick_down_to_zero() {
        // LD V0, 3C; LD DT, V0; LD ST, V0
        let mut machine = machine_with(&[0x60, 0x3C, 0xF0, 0x15, 0xF0, 0x18]);
        for _ in 0..3 {
            machine.step().unwrap();
        }
        assert_eq!(machine.delay_timer(), 60);
        machine.tick_timers();
        assert_eq!(machine.delay_timer(), 59);
        assert_eq!(machine.sound_timer(), 59);
        for _ in 0..60 {
            machine.tick_timers();
        }
        assert_eq!(machine.delay_timer(), 0);
        assert_eq!(machine.sound_timer(), 0);
    }

    #[test]
    fn test_take_frame_clears_dirty_flag() {
        let mut machine = machine_with(&[0x00, 0xE0]);
        assert!(machine.take_frame().is_none());
        machine.step().unwrap();
        assert!(machine.is_dirty());
        assert!(machine.take_frame().is_some());
        assert!(!machine.is_dirty());
        assert!(machine.take_frame().is_none());
    }

    #[test]
    fn test_clear_dirty() {
        let mut machine = machine_with(&[0x00, 0xE0]);
        machine.step().unwrap();
        machine.clear_dirty();
        assert!(!machine.is_dirty());
    }

    #[test]
    fn test_pixel_reads_drawn_sprite() {
        // LD F, V0 ("0" glyph); DRW V0, V0, 1
        let mut machine = machine_with(&[0xF0, 0x29, 0xD0, 0x01]);
        machine.step().unwrap();
        machine.step().unwrap();
        assert_eq!(machine.pixel(0), Some(1));
        assert_eq!(machine.pixel(4), Some(0));
        assert_eq!(machine.pixel(DISPLAY_SIZE - 1), Some(0));
        assert_eq!(machine.pixel(DISPLAY_SIZE), None);
        assert_eq!(machine.state().v[VF], 0);
    }

    #[test]
    fn test_seeded_machines_agree() {
        let program = [0xC0, 0xFF, 0xC1, 0xFF, 0xC2, 0xFF];
        let mut a = machine_with(&program);
        let mut b = machine_with(&program);
        for _ in 0..3 {
            a.step().unwrap();
            b.step().unwrap();
        }
        assert_eq!(a.state().v, b.state().v);
    }
}
