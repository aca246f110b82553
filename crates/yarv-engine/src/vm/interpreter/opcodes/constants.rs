use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::interpreter::Interpreter;
use crate::vm::{VmError, VmResult};

impl<'a> Interpreter<'a> {
    pub(in crate::vm::interpreter) fn exec_constant_ops(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        match instruction {
            Instruction::GetConstant { name } => {
                // Operands are popped before the lookup, so a failed lookup
                // leaves them consumed.
                let operands = ctx.stack_mut().pop_n(2)?;
                let (klass, allow_nil) = (&operands[0], &operands[1]);

                if klass.is_nil() && !allow_nil.is_truthy() {
                    return Err(VmError::UninitializedConstant(name.to_string()));
                }

                // Serial is read before the lookup; a racing definition
                // leaves the recorded value stale.
                let serial = self.model.constant_serial();
                let value = self.model.resolve_constant(klass, name)?;
                ctx.record_constant(name.clone(), value.clone(), serial);
                ctx.stack_mut().push(value)
            }

            _ => unreachable!("Not a constant instruction: {:?}", instruction),
        }
    }
}
