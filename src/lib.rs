pub use error::{DecodeStage, MachineError};
pub use instruction::Instruction;
pub use machine::{Machine, Mode};
pub use opcode::InstructionWord;
pub use state::{FrameBuffer, State};

pub mod constants;
mod error;
mod instruction;
mod machine;
mod opcode;
mod operations;
mod state;
