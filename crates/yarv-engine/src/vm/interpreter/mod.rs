//! Instruction interpreter
//!
//! The interpreter executes instructions against an [`ExecutionContext`],
//! calling into an [`ObjectModel`] for anything that needs class semantics.
//! Handlers are grouped by category under `opcodes`.
//!
//! Control flow is the caller's job: [`Interpreter::run`] walks a
//! straight-line sequence in order, which is all the instructions here
//! need.

mod opcodes;

use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::object::ObjectModel;
use crate::vm::VmResult;
use tracing::{instrument, trace};

/// Executes instructions on behalf of a sequencer
pub struct Interpreter<'a> {
    /// Object model the instructions call into
    model: &'a dyn ObjectModel,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter backed by `model`
    pub fn new(model: &'a dyn ObjectModel) -> Self {
        Self { model }
    }

    /// Execute one instruction
    ///
    /// # Errors
    ///
    /// Returns `VmError::UninitializedConstant` from `getconstant`, stack
    /// errors when the caller violated an instruction's depth requirement,
    /// and `VmError::StepLimitExceeded` once the context's budget is spent.
    pub fn execute(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        ctx.count_step()?;
        trace!(
            context = ctx.id().as_u64(),
            insn = instruction.name(),
            depth = ctx.stack().depth(),
            "execute"
        );

        match instruction {
            Instruction::GetConstant { .. } => self.exec_constant_ops(ctx, instruction),
            Instruction::NewHash { .. } => self.exec_hash_ops(ctx, instruction),
            Instruction::PutObject { .. } | Instruction::PutObjectInt2Fix1 => {
                self.exec_object_ops(ctx, instruction)
            }
            Instruction::Nop | Instruction::SetN { .. } => self.exec_stack_ops(ctx, instruction),
            Instruction::OptSetInlineCache { .. } => self.exec_cache_ops(ctx, instruction),
        }
    }

    /// Execute a straight-line sequence, stopping at the first error
    #[instrument(skip_all, fields(context = ctx.id().as_u64(), len = code.len()))]
    pub fn run(&mut self, ctx: &mut ExecutionContext, code: &[Instruction]) -> VmResult<()> {
        for instruction in code {
            self.execute(ctx, instruction)?;
        }
        Ok(())
    }
}

impl Instruction {
    /// Execute this instruction against `ctx`
    pub fn execute(&self, ctx: &mut ExecutionContext, model: &dyn ObjectModel) -> VmResult<()> {
        Interpreter::new(model).execute(ctx, self)
    }
}
