use std::fmt;

use crate::error::{DecodeStage, MachineError};
use crate::opcode::InstructionWord;

/// A decoded instruction with its operands.
///
/// Register operands are indices 0x0..=0xF; addresses are 12 bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    Clear,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk
    SkipIfEqual(u8, u8),
    /// 4xkk
    SkipIfNotEqual(u8, u8),
    /// 5xy0
    SkipIfRegistersEqual(u8, u8),
    /// 6xkk
    Load(u8, u8),
    /// 7xkk
    AddImmediate(u8, u8),
    /// 8xy0
    Move(u8, u8),
    /// 8xy1
    Or(u8, u8),
    /// 8xy2
    And(u8, u8),
    /// 8xy3
    Xor(u8, u8),
    /// 8xy4
    Add(u8, u8),
    /// 8xy5
    Sub(u8, u8),
    /// 8xy6
    ShiftRight(u8),
    /// 8xy7
    SubReverse(u8, u8),
    /// 8xyE
    ShiftLeft(u8),
    /// 9xy0
    SkipIfRegistersNotEqual(u8, u8),
    /// Annn
    LoadIndex(u16),
    /// Bnnn
    JumpOffset(u16),
    /// Cxkk
    Random(u8, u8),
    /// Dxyn
    Draw(u8, u8, u8),
    /// Ex9E
    SkipIfPressed(u8),
    /// ExA1
    SkipIfNotPressed(u8),
    /// Fx07
    ReadDelay(u8),
    /// Fx0A
    WaitForKey(u8),
    /// Fx15
    SetDelay(u8),
    /// Fx18
    SetSound(u8),
    /// Fx1E
    AddIndex(u8),
    /// Fx29
    LoadGlyph(u8),
    /// Fx33
    StoreBcd(u8),
    /// Fx55
    StoreRegisters(u8),
    /// Fx65
    LoadRegisters(u8),
}

impl Instruction {
    /// Selects the Instruction for a given word.
    ///
    /// The family nibble always matches something; words whose second
    /// discriminator doesn't name an operation fail with the stage that
    /// rejected them.
    pub fn decode(word: InstructionWord) -> Result<Self, MachineError> {
        use Instruction::*;

        let (x, y, n, kk, nnn) = (word.x(), word.y(), word.n(), word.kk(), word.nnn());
        let unknown = |stage| MachineError::UnknownInstruction { word, stage };

        let instruction = match word.family() {
            0x0 => match word.0 {
                0x00E0 => Clear,
                0x00EE => Return,
                _ => return Err(unknown(DecodeStage::System)),
            },
            0x1 => Jump(nnn),
            0x2 => Call(nnn),
            0x3 => SkipIfEqual(x, kk),
            0x4 => SkipIfNotEqual(x, kk),
            0x5 if n == 0x0 => SkipIfRegistersEqual(x, y),
            0x5 => return Err(unknown(DecodeStage::Register)),
            0x6 => Load(x, kk),
            0x7 => AddImmediate(x, kk),
            0x8 => match n {
                0x0 => Move(x, y),
                0x1 => Or(x, y),
                0x2 => And(x, y),
                0x3 => Xor(x, y),
                0x4 => Add(x, y),
                0x5 => Sub(x, y),
                0x6 => ShiftRight(x),
                0x7 => SubReverse(x, y),
                0xE => ShiftLeft(x),
                _ => return Err(unknown(DecodeStage::Arithmetic)),
            },
            0x9 if n == 0x0 => SkipIfRegistersNotEqual(x, y),
            0x9 => return Err(unknown(DecodeStage::Register)),
            0xA => LoadIndex(nnn),
            0xB => JumpOffset(nnn),
            0xC => Random(x, kk),
            0xD => Draw(x, y, n),
            0xE => match kk {
                0x9E => SkipIfPressed(x),
                0xA1 => SkipIfNotPressed(x),
                _ => return Err(unknown(DecodeStage::Key)),
            },
            0xF => match kk {
                0x07 => ReadDelay(x),
                0x0A => WaitForKey(x),
                0x15 => SetDelay(x),
                0x18 => SetSound(x),
                0x1E => AddIndex(x),
                0x29 => LoadGlyph(x),
                0x33 => StoreBcd(x),
                0x55 => StoreRegisters(x),
                0x65 => LoadRegisters(x),
                _ => return Err(unknown(DecodeStage::Misc)),
            },
            _ => return Err(unknown(DecodeStage::Family)),
        };
        Ok(instruction)
    }
}

/// Assembler-style mnemonics, used for instruction traces.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Instruction::*;

        match *self {
            Clear => write!(f, "CLS"),
            Return => write!(f, "RET"),
            Jump(nnn) => write!(f, "JP {:03X}", nnn),
            Call(nnn) => write!(f, "CALL {:03X}", nnn),
            SkipIfEqual(x, kk) => write!(f, "SE V{:X}, {:02X}", x, kk),
            SkipIfNotEqual(x, kk) => write!(f, "SNE V{:X}, {:02X}", x, kk),
            SkipIfRegistersEqual(x, y) => write!(f, "SE V{:X}, V{:X}", x, y),
            Load(x, kk) => write!(f, "LD V{:X}, {:02X}", x, kk),
            AddImmediate(x, kk) => write!(f, "ADD V{:X}, {:02X}", x, kk),
            Move(x, y) => write!(f, "LD V{:X}, V{:X}", x, y),
            Or(x, y) => write!(f, "OR V{:X}, V{:X}", x, y),
            And(x, y) => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor(x, y) => write!(f, "XOR V{:X}, V{:X}", x, y),
            Add(x, y) => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub(x, y) => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight(x) => write!(f, "SHR V{:X}", x),
            SubReverse(x, y) => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft(x) => write!(f, "SHL V{:X}", x),
            SkipIfRegistersNotEqual(x, y) => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex(nnn) => write!(f, "LD I, {:03X}", nnn),
            JumpOffset(nnn) => write!(f, "JP V0, {:03X}", nnn),
            Random(x, kk) => write!(f, "RND V{:X}, {:02X}", x, kk),
            Draw(x, y, n) => write!(f, "DRW V{:X}, V{:X}, {:X}", x, y, n),
            SkipIfPressed(x) => write!(f, "SKP V{:X}", x),
            SkipIfNotPressed(x) => write!(f, "SKNP V{:X}", x),
            ReadDelay(x) => write!(f, "LD V{:X}, DT", x),
            WaitForKey(x) => write!(f, "LD V{:X}, K", x),
            SetDelay(x) => write!(f, "LD DT, V{:X}", x),
            SetSound(x) => write!(f, "LD ST, V{:X}", x),
            AddIndex(x) => write!(f, "ADD I, V{:X}", x),
            LoadGlyph(x) => write!(f, "LD F, V{:X}", x),
            StoreBcd(x) => write!(f, "LD B, V{:X}", x),
            StoreRegisters(x) => write!(f, "LD [I], V{:X}", x),
            LoadRegisters(x) => write!(f, "LD V{:X}, [I]", x),
        }
    }
}
