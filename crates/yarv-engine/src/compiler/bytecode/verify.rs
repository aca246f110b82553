//! Bytecode verification
//!
//! Instructions assume the sequencer hands them a stack deep enough for
//! their operands. This pass checks that assumption statically for a
//! straight-line sequence, starting from an empty stack.

use super::instruction::Instruction;

/// Maximum stack depth a verified sequence may reach
pub const MAX_STACK_DEPTH: usize = 1024;

/// Bytecode verification errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// `newhash` with an odd operand count
    #[error("newhash size {size} is odd at position {position}")]
    OddHashSize {
        /// The invalid size operand
        size: usize,
        /// Position in the sequence
        position: usize,
    },

    /// Stack underflow
    #[error("Stack underflow at position {position}: needs {needed}, depth {depth}")]
    StackUnderflow {
        /// Position in the sequence
        position: usize,
        /// Minimum depth the instruction requires
        needed: usize,
        /// Depth reached before the instruction
        depth: usize,
    },

    /// Stack overflow
    #[error("Stack overflow at position {position} (depth: {depth})")]
    StackOverflow {
        /// Position in the sequence
        position: usize,
        /// Depth after the instruction
        depth: usize,
    },
}

/// Verify a straight-line sequence and return the maximum stack depth
pub fn verify_sequence(code: &[Instruction]) -> Result<usize, VerifyError> {
    verify_operands(code)?;
    verify_stack_depth(code)
}

fn verify_operands(code: &[Instruction]) -> Result<(), VerifyError> {
    for (position, instruction) in code.iter().enumerate() {
        if let Instruction::NewHash { size } = instruction {
            if size % 2 != 0 {
                return Err(VerifyError::OddHashSize {
                    size: *size,
                    position,
                });
            }
        }
    }
    Ok(())
}

fn verify_stack_depth(code: &[Instruction]) -> Result<usize, VerifyError> {
    let mut depth = 0usize;
    let mut max_depth = 0usize;

    for (position, instruction) in code.iter().enumerate() {
        let effect = instruction.stack_effect();

        // Check for underflow
        if depth < effect.min_depth {
            return Err(VerifyError::StackUnderflow {
                position,
                needed: effect.min_depth,
                depth,
            });
        }

        depth = depth - effect.pops + effect.pushes;

        // Check for overflow
        if depth > MAX_STACK_DEPTH {
            return Err(VerifyError::StackOverflow { position, depth });
        }
        max_depth = max_depth.max(depth);
    }

    Ok(max_depth)
}
