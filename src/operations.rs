use rand::Rng;

use crate::constants::{
    DISPLAY_HEIGHT, DISPLAY_WIDTH, FONT_GLYPH_SIZE, KEY_COUNT, STACK_DEPTH, VF,
};
use crate::error::MachineError;
use crate::instruction::Instruction;
use crate::state::State;

/// How the program counter moves after an instruction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    /// pc += 2
    Next,
    /// pc += 4
    Skip,
    /// pc = addr
    Jump(u16),
    /// pc stays put; the instruction runs again on the next step
    Block { register: u8 },
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// Applies an Instruction to the state.
///
/// An `Err` means nothing was modified.
pub fn execute<R: Rng>(
    instruction: Instruction,
    state: &mut State,
    rng: &mut R,
) -> Result<Flow, MachineError> {
    use Instruction::*;

    let flow = match instruction {
        Clear => clear(state),
        Return => ret(state)?,
        Jump(nnn) => Flow::Jump(nnn),
        Call(nnn) => call(state, nnn)?,
        SkipIfEqual(x, kk) => Flow::skip_if(state.v[x as usize] == kk),
        SkipIfNotEqual(x, kk) => Flow::skip_if(state.v[x as usize] != kk),
        SkipIfRegistersEqual(x, y) => Flow::skip_if(state.v[x as usize] == state.v[y as usize]),
        SkipIfRegistersNotEqual(x, y) => {
            Flow::skip_if(state.v[x as usize] != state.v[y as usize])
        }
        Load(x, kk) => set(state, x, kk),
        AddImmediate(x, kk) => {
            let sum = state.v[x as usize].wrapping_add(kk);
            set(state, x, sum)
        }
        Move(x, y) => {
            let vy = state.v[y as usize];
            set(state, x, vy)
        }
        Or(x, y) => {
            let value = state.v[x as usize] | state.v[y as usize];
            set(state, x, value)
        }
        And(x, y) => {
            let value = state.v[x as usize] & state.v[y as usize];
            set(state, x, value)
        }
        Xor(x, y) => {
            let value = state.v[x as usize] ^ state.v[y as usize];
            set(state, x, value)
        }
        Add(x, y) => add(state, x, y),
        Sub(x, y) => sub(state, x, y),
        ShiftRight(x) => shr(state, x),
        SubReverse(x, y) => subn(state, x, y),
        ShiftLeft(x) => shl(state, x),
        LoadIndex(nnn) => {
            state.i = nnn;
            Flow::Next
        }
        JumpOffset(nnn) => Flow::Jump(nnn + u16::from(state.v[0x0])),
        Random(x, kk) => {
            let byte: u8 = rng.gen();
            set(state, x, byte & kk)
        }
        Draw(x, y, n) => draw(state, x, y, n)?,
        SkipIfPressed(x) => Flow::skip_if(key_pressed(state, x)?),
        SkipIfNotPressed(x) => Flow::skip_if(!key_pressed(state, x)?),
        ReadDelay(x) => {
            let delay = state.delay_timer;
            set(state, x, delay)
        }
        WaitForKey(x) => wait_for_key(state, x),
        SetDelay(x) => {
            state.delay_timer = state.v[x as usize];
            Flow::Next
        }
        SetSound(x) => {
            state.sound_timer = state.v[x as usize];
            Flow::Next
        }
        AddIndex(x) => add_index(state, x),
        LoadGlyph(x) => {
            state.i = u16::from(state.v[x as usize]) * FONT_GLYPH_SIZE;
            Flow::Next
        }
        StoreBcd(x) => bcd(state, x)?,
        StoreRegisters(x) => store(state, x)?,
        LoadRegisters(x) => read(state, x)?,
    };
    Ok(flow)
}

/// Vx = value
fn set(state: &mut State, x: u8, value: u8) -> Flow {
    state.v[x as usize] = value;
    Flow::Next
}

/// Vx = result; VF = flag
/// The flag is written last so it survives when x is F.
fn set_with_flag(state: &mut State, x: u8, result: u8, flag: bool) -> Flow {
    state.v[x as usize] = result;
    state.v[VF] = flag as u8;
    Flow::Next
}

/// clear
fn clear(state: &mut State) -> Flow {
    state.frame_buffer.iter_mut().for_each(|pixel| *pixel = 0);
    state.draw_flag = true;
    Flow::Next
}

/// PC = STACK.pop() + 2
fn ret(state: &mut State) -> Result<Flow, MachineError> {
    if state.sp == 0 {
        return Err(MachineError::StackUnderflow { pc: state.pc });
    }
    state.sp -= 1;
    Ok(Flow::Jump(state.stack[state.sp].wrapping_add(2)))
}

/// STACK.push(PC); PC = addr
fn call(state: &mut State, addr: u16) -> Result<Flow, MachineError> {
    if state.sp == STACK_DEPTH {
        return Err(MachineError::StackOverflow { pc: state.pc });
    }
    state.stack[state.sp] = state.pc;
    state.sp += 1;
    Ok(Flow::Jump(addr))
}

/// Vx += Vy; VF = carry
fn add(state: &mut State, x: u8, y: u8) -> Flow {
    let (res, carry) = state.v[x as usize].overflowing_add(state.v[y as usize]);
    set_with_flag(state, x, res, carry)
}

/// Vx -= Vy; VF = Vx > Vy
fn sub(state: &mut State, x: u8, y: u8) -> Flow {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    set_with_flag(state, x, vx.wrapping_sub(vy), vx > vy)
}

/// Vx = Vy - Vx; VF = Vy > Vx
fn subn(state: &mut State, x: u8, y: u8) -> Flow {
    let (vx, vy) = (state.v[x as usize], state.v[y as usize]);
    set_with_flag(state, x, vy.wrapping_sub(vx), vy > vx)
}

/// Vx >>= 1; VF = lsb
fn shr(state: &mut State, x: u8) -> Flow {
    let vx = state.v[x as usize];
    set_with_flag(state, x, vx >> 1, vx & 0x1 == 0x1)
}

/// Vx <<= 1; VF = msb
fn shl(state: &mut State, x: u8) -> Flow {
    let vx = state.v[x as usize];
    set_with_flag(state, x, vx << 1, vx & 0x80 == 0x80)
}

/// I += Vx; VF = I > 0xFFF
fn add_index(state: &mut State, x: u8) -> Flow {
    let vx = u16::from(state.v[x as usize]);
    let carry = u32::from(state.i) + u32::from(vx) > 0xFFF;
    state.i = state.i.wrapping_add(vx);
    state.v[VF] = carry as u8;
    Flow::Next
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs the n-byte sprite at I onto the FrameBuffer at (Vx, Vy), wrapping on both axes.
/// VF = 1 if any lit pixel was turned off.
fn draw(state: &mut State, x: u8, y: u8, n: u8) -> Result<Flow, MachineError> {
    let rows = n as usize;
    let mut sprite = [0u8; 0xF];
    sprite[..rows].copy_from_slice(state.memory_at(state.i as usize, rows)?);

    let (vx, vy) = (state.v[x as usize] as usize, state.v[y as usize] as usize);
    let mut collision = 0;
    for (row, byte) in sprite[..rows].iter().enumerate() {
        let py = (vy + row) % DISPLAY_HEIGHT;
        for col in 0..8 {
            if byte & (0x80 >> col) == 0 {
                continue;
            }
            let px = (vx + col) % DISPLAY_WIDTH;
            let pixel = &mut state.frame_buffer[px + py * DISPLAY_WIDTH];
            collision |= *pixel;
            *pixel ^= 1;
        }
    }

    state.v[VF] = collision;
    state.draw_flag = true;
    Ok(Flow::Next)
}

/// Vx.pressed
fn key_pressed(state: &State, x: u8) -> Result<bool, MachineError> {
    let key = state.v[x as usize];
    if key as usize >= KEY_COUNT {
        return Err(MachineError::InvalidKey { key });
    }
    Ok(state.keys[key as usize])
}

/// await keypress for Vx
fn wait_for_key(state: &mut State, x: u8) -> Flow {
    match state.first_pressed_key() {
        Some(key) => set(state, x, key),
        None => Flow::Block { register: x },
    }
}

/// mem[I..I+3] = bcd(Vx)
fn bcd(state: &mut State, x: u8) -> Result<Flow, MachineError> {
    let vx = state.v[x as usize];
    let digits = [vx / 100, vx / 10 % 10, vx % 10];
    let start = state.i as usize;
    state
        .memory_at_mut(start, digits.len())?
        .copy_from_slice(&digits);
    Ok(Flow::Next)
}

/// mem[I..=I+x] = V0..=Vx
fn store(state: &mut State, x: u8) -> Result<Flow, MachineError> {
    let len = x as usize + 1;
    let (v, start) = (state.v, state.i as usize);
    state
        .memory_at_mut(start, len)?
        .copy_from_slice(&v[..len]);
    Ok(Flow::Next)
}

/// V0..=Vx = mem[I..=I+x]
fn read(state: &mut State, x: u8) -> Result<Flow, MachineError> {
    let len = x as usize + 1;
    let start = state.i as usize;
    state.memory_at(start, len)?;
    state.v[..len].copy_from_slice(&state.memory[start..start + len]);
    Ok(Flow::Next)
}
