//! YARV Instruction Engine
//!
//! This crate provides the execution core of a YARV-compatible stack VM:
//! - **Compiler side**: the instruction set, its disassembly format, and a
//!   straight-line verifier (`compiler` module)
//! - **VM side**: values, operand stack, execution context, object model
//!   adapter, inline caches, and the interpreter (`vm` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use yarv_engine::{ExecutionContext, HostObjectModel, Instruction, Interpreter, Value};
//!
//! let model = HostObjectModel::new();
//! let mut ctx = ExecutionContext::new();
//!
//! let code = vec![
//!     Instruction::put_object(Value::symbol("answer")),
//!     Instruction::put_object(Value::integer(42)),
//!     Instruction::new_hash(2),
//! ];
//!
//! Interpreter::new(&model).run(&mut ctx, &code)?;
//! assert_eq!(ctx.stack().peek()?.inspect(), "{:answer=>42}");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Compiler module: instruction set, disassembly, and verification
pub mod compiler;

/// VM module: values, stack, context, object model, and interpreter
pub mod vm;

// ============================================================================
// Re-exports from Compiler
// ============================================================================

pub use compiler::{
    disassemble_sequence, verify_sequence, Instruction, StackEffect, VerifyError,
    MAX_STACK_DEPTH, MNEMONIC_WIDTH,
};

// ============================================================================
// Re-exports from VM
// ============================================================================

pub use vm::{
    // Value model
    ClassKind, ClassRef, HashEntries, Value,
    // Object model adapter
    HostObjectModel, ObjectModel, ObjectModelError,
    // Execution
    ConfigError, ContextId, ExecutionContext, Interpreter, VmError, VmOptions, VmResult,
    // Stack
    Stack,
    // Inline caches
    InlineCacheSlot, InlineCacheTable,
    // Tracing hooks
    TraceEvent, TraceHook,
};
