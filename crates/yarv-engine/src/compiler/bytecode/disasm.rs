//! Disassembly
//!
//! The per-instruction format is compared byte-for-byte against listings
//! produced by the reference VM: the mnemonic is left-justified in a
//! 38-column field, followed by one space and the operand text.
//! `putobject_INT2FIX_1_` is the exception and prints its bare mnemonic.

use super::instruction::Instruction;
use crate::vm::inspect;
use std::fmt;
use std::fmt::Write;

/// Width of the mnemonic column
pub const MNEMONIC_WIDTH: usize = 38;

impl Instruction {
    /// Operand text as printed after the mnemonic, if the instruction has one
    pub fn operand_text(&self) -> Option<String> {
        match self {
            Self::GetConstant { name } => Some(inspect::symbol(name)),
            Self::NewHash { size } => Some(size.to_string()),
            Self::OptSetInlineCache { cache } => Some(format!("<is:{}>", cache)),
            Self::PutObject { object } => Some(object.inspect()),
            Self::SetN { index } => Some(index.to_string()),
            Self::Nop | Self::PutObjectInt2Fix1 => None,
        }
    }

    /// Render the instruction as one disassembly line.
    ///
    /// The position is accepted for parity with sequence-level listings;
    /// none of these instructions print it.
    pub fn disassemble(&self, _position: usize) -> String {
        self.to_string()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::PutObjectInt2Fix1 = self {
            return f.write_str(self.name());
        }
        match self.operand_text() {
            Some(operand) => write!(
                f,
                "{:<width$} {}",
                self.name(),
                operand,
                width = MNEMONIC_WIDTH
            ),
            None => write!(f, "{:<width$}", self.name(), width = MNEMONIC_WIDTH),
        }
    }
}

/// Render a whole sequence, one `NNNN <instruction>` row per instruction
pub fn disassemble_sequence(code: &[Instruction]) -> String {
    let mut output = String::new();
    for (position, instruction) in code.iter().enumerate() {
        let line = instruction.disassemble(position);
        let _ = writeln!(output, "{:04} {}", position, line.trim_end());
    }
    output
}
