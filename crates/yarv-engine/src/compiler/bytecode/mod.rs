//! Bytecode definitions for the YARV engine

pub mod disasm;
pub mod instruction;
pub mod verify;

pub use disasm::{disassemble_sequence, MNEMONIC_WIDTH};
pub use instruction::{Instruction, StackEffect};
pub use verify::{verify_sequence, VerifyError, MAX_STACK_DEPTH};
