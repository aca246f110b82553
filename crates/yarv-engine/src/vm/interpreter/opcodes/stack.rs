use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::interpreter::Interpreter;
use crate::vm::VmResult;

impl<'a> Interpreter<'a> {
    pub(in crate::vm::interpreter) fn exec_stack_ops(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        match instruction {
            Instruction::Nop => Ok(()),

            Instruction::SetN { index } => {
                let stack = ctx.stack_mut();
                let top = stack.peek()?.clone();
                stack.set_n(*index, top)
            }

            _ => unreachable!("Not a stack instruction: {:?}", instruction),
        }
    }
}
