use std::fmt;

use thiserror::Error;

use crate::opcode::InstructionWord;

/// The discriminator that failed to match while decoding an instruction word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DecodeStage {
    /// `[f___]`
    Family,
    /// `00kk`
    System,
    /// `[___n]` of the 0x5 and 0x9 register comparisons
    Register,
    /// `[___n]` of the 0x8 family
    Arithmetic,
    /// `[__kk]` of the 0xE family
    Key,
    /// `[__kk]` of the 0xF family
    Misc,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let stage = match self {
            DecodeStage::Family => "family",
            DecodeStage::System => "0x0 system",
            DecodeStage::Register => "register comparison",
            DecodeStage::Arithmetic => "0x8 arithmetic",
            DecodeStage::Key => "0xE key",
            DecodeStage::Misc => "0xF misc",
        };
        f.write_str(stage)
    }
}

/// Everything a guest program or a host call can do wrong.
///
/// None of these are fatal to the machine: the call that returned one left the
/// state exactly as it found it.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("unknown instruction {word} (no match at the {stage} stage)")]
    UnknownInstruction {
        word: InstructionWord,
        stage: DecodeStage,
    },

    #[error("stack overflow calling from {pc:#05X}")]
    StackOverflow { pc: u16 },

    #[error("stack underflow returning from {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    MemoryOutOfBounds { address: usize },

    #[error("key {key:#04X} is not on the keypad")]
    InvalidKey { key: u8 },

    #[error("program is {size} bytes but at most {max} fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),
}
