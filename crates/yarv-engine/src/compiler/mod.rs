//! Compiler-facing half of the engine
//!
//! The front end that produces instruction sequences lives elsewhere; this
//! module only owns the bytecode definitions shared with it.

pub mod bytecode;

pub use bytecode::{
    disassemble_sequence, verify_sequence, Instruction, StackEffect, VerifyError,
    MAX_STACK_DEPTH, MNEMONIC_WIDTH,
};
