use crate::compiler::Instruction;
use crate::vm::context::ExecutionContext;
use crate::vm::interpreter::Interpreter;
use crate::vm::{VmError, VmResult};

impl<'a> Interpreter<'a> {
    pub(in crate::vm::interpreter) fn exec_hash_ops(
        &mut self,
        ctx: &mut ExecutionContext,
        instruction: &Instruction,
    ) -> VmResult<()> {
        match instruction {
            Instruction::NewHash { size } => {
                if size % 2 != 0 {
                    return Err(VmError::InvalidOperand(format!(
                        "newhash size must be even, got {}",
                        size
                    )));
                }

                let mut values = ctx.stack_mut().pop_n(*size)?.into_iter();
                let mut pairs = Vec::with_capacity(size / 2);
                while let (Some(key), Some(value)) = (values.next(), values.next()) {
                    pairs.push((key, value));
                }

                let hash = self.model.build_hash(pairs);
                ctx.stack_mut().push(hash)
            }

            _ => unreachable!("Not a hash instruction: {:?}", instruction),
        }
    }
}
