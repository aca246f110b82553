//! Instruction set
//!
//! This module defines the instructions the engine executes. Each variant
//! carries its operands, fixed when the instruction is built; equality is
//! structural (same variant, equal operands).
//!
//! | Instruction            | Operands | Pops   | Pushes |
//! |------------------------|----------|--------|--------|
//! | `getconstant`          | name     | 2      | 1      |
//! | `newhash`              | size     | size   | 1      |
//! | `nop`                  |          | 0      | 0      |
//! | `opt_setinlinecache`   | cache    | 0      | 0      |
//! | `putobject`            | object   | 0      | 1      |
//! | `putobject_INT2FIX_1_` |          | 0      | 1      |
//! | `setn`                 | index    | 0      | 0      |

use crate::vm::value::Value;
use std::sync::Arc;

/// A single bytecode instruction
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// Look up a constant.
    ///
    /// Pops `allow_nil` (top) and `klass` (below it). A nil `klass` means
    /// top-level lookup, allowed only when `allow_nil` is truthy.
    GetConstant {
        /// Constant name
        name: Arc<str>,
    },

    /// Build a hash from the top `size` values (`k1, v1, k2, v2, ...`)
    NewHash {
        /// Number of stack values consumed; always even
        size: usize,
    },

    /// No operation; pads the sequence so jumps have a target
    Nop,

    /// Finalize the inline cache of the preceding constant lookup
    OptSetInlineCache {
        /// Cache slot token
        cache: u32,
    },

    /// Push a literal
    PutObject {
        /// Value pushed on every execution
        object: Value,
    },

    /// Push the integer 1 (operand-unified `putobject 1`)
    PutObjectInt2Fix1,

    /// Copy the top value over the value `index` slots from the top
    SetN {
        /// Depth of the overwritten slot (0 = top)
        index: usize,
    },
}

/// Stack requirements and effect of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEffect {
    /// Values removed
    pub pops: usize,
    /// Values added
    pub pushes: usize,
    /// Minimum depth required before execution
    pub min_depth: usize,
}

impl StackEffect {
    const fn new(pops: usize, pushes: usize) -> Self {
        Self {
            pops,
            pushes,
            min_depth: pops,
        }
    }

    /// Net change in stack depth
    pub fn net(&self) -> isize {
        self.pushes as isize - self.pops as isize
    }
}

impl Instruction {
    /// `getconstant name`
    pub fn get_constant(name: impl Into<Arc<str>>) -> Self {
        Instruction::GetConstant { name: name.into() }
    }

    /// `newhash size`
    pub fn new_hash(size: usize) -> Self {
        Instruction::NewHash { size }
    }

    /// `opt_setinlinecache cache`
    pub fn opt_set_inline_cache(cache: u32) -> Self {
        Instruction::OptSetInlineCache { cache }
    }

    /// `putobject object`
    pub fn put_object(object: impl Into<Value>) -> Self {
        Instruction::PutObject {
            object: object.into(),
        }
    }

    /// `setn index`
    pub fn set_n(index: usize) -> Self {
        Instruction::SetN { index }
    }

    /// Canonical mnemonic
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetConstant { .. } => "getconstant",
            Self::NewHash { .. } => "newhash",
            Self::Nop => "nop",
            Self::OptSetInlineCache { .. } => "opt_setinlinecache",
            Self::PutObject { .. } => "putobject",
            Self::PutObjectInt2Fix1 => "putobject_INT2FIX_1_",
            Self::SetN { .. } => "setn",
        }
    }

    /// Get the stack effect of the instruction
    pub fn stack_effect(&self) -> StackEffect {
        match self {
            Self::GetConstant { .. } => StackEffect::new(2, 1),
            Self::NewHash { size } => StackEffect::new(*size, 1),
            Self::Nop | Self::OptSetInlineCache { .. } => StackEffect::new(0, 0),
            Self::PutObject { .. } | Self::PutObjectInt2Fix1 => StackEffect::new(0, 1),
            Self::SetN { index } => StackEffect {
                pops: 0,
                pushes: 0,
                min_depth: index.saturating_add(1),
            },
        }
    }

    /// Check if this instruction may dispatch a line trace event
    pub fn dispatches_line_event(&self) -> bool {
        matches!(self, Self::PutObject { .. } | Self::PutObjectInt2Fix1)
    }

    /// Apply operand unification: `putobject 1` becomes `putobject_INT2FIX_1_`
    pub fn unify_operands(self) -> Self {
        match self {
            Self::PutObject {
                object: Value::Integer(1),
            } => Self::PutObjectInt2Fix1,
            other => other,
        }
    }

    /// Undo operand unification: specialized forms become their generic form
    pub fn generalize(self) -> Self {
        match self {
            Self::PutObjectInt2Fix1 => Self::PutObject {
                object: Value::Integer(1),
            },
            other => other,
        }
    }
}
