//! YARV VM Core Runtime
//!
//! This module provides the runtime half of the engine:
//! - Value representation and `inspect` rendering
//! - Operand stack and execution context
//! - Object model adapter (constant lookup, hash construction)
//! - Inline constant caches
//! - Instruction interpreter

pub mod context;
pub mod inline_cache;
pub mod inspect;
pub mod interpreter;
pub mod object;
pub mod stack;
pub mod trace;
pub mod value;

pub use context::{ConfigError, ContextId, ExecutionContext, ResolvedConstant, VmOptions};
pub use inline_cache::{InlineCacheSlot, InlineCacheTable};
pub use interpreter::Interpreter;
pub use object::{ClassId, ClassKind, ClassRef, HostObjectModel, ObjectModel, ObjectModelError};
pub use stack::Stack;
pub use trace::{TraceEvent, TraceHook};
pub use value::{HashEntries, Value};

/// VM execution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VmError {
    /// Stack overflow
    #[error("Stack overflow (limit {max} slots)")]
    StackOverflow {
        /// Configured stack limit
        max: usize,
    },

    /// Stack underflow
    #[error("Stack underflow: needed {needed} values, found {depth}")]
    StackUnderflow {
        /// Values the instruction requires
        needed: usize,
        /// Values actually present
        depth: usize,
    },

    /// Constant lookup failed (`NameError` in the reference VM)
    #[error("uninitialized constant {0}")]
    UninitializedConstant(String),

    /// Type error
    #[error("Type error: {0}")]
    TypeError(String),

    /// Instruction operand outside its documented domain
    #[error("Invalid operand: {0}")]
    InvalidOperand(String),

    /// The context's instruction budget ran out
    #[error("Step limit of {0} instructions exceeded")]
    StepLimitExceeded(u64),
}

impl From<ObjectModelError> for VmError {
    fn from(err: ObjectModelError) -> Self {
        match &err {
            ObjectModelError::ConstantNotFound(name) => {
                VmError::UninitializedConstant(name.clone())
            }
            ObjectModelError::NotAClassOrModule(_) => VmError::TypeError(err.to_string()),
        }
    }
}

/// VM execution result
pub type VmResult<T> = Result<T, VmError>;
